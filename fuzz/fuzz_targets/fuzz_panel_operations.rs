#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use panelfig_core::{Point, Rect};
use panelfig_layout::{PanelOperation, PanelTree, SeparatorStyle, SplitAxis};

#[derive(Debug, Arbitrary)]
enum Op {
    Split { pick: u16, vertical: bool, count: u8 },
    Remove { pick: u16 },
    Resize { pick: u16, index: u8, boundary: i32 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    width: u16,
    height: u16,
    thickness: u8,
    min_extent: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let width = u32::from(input.width % 2000) + 1;
    let height = u32::from(input.height % 2000) + 1;
    let canvas = Rect::from_size(width, height);
    let Ok(tree) = PanelTree::new(canvas) else {
        return;
    };
    let mut tree = tree
        .with_style(SeparatorStyle {
            thickness: u32::from(input.thickness % 16),
            ..SeparatorStyle::default()
        })
        .with_min_extent(u32::from(input.min_extent % 32));

    for (op_id, op) in input.ops.into_iter().take(64).enumerate() {
        let nodes = tree.walk();
        let leaves = tree.leaves();
        let operation = match op {
            Op::Split { pick, vertical, count } => PanelOperation::Split {
                target: leaves[usize::from(pick) % leaves.len()],
                axis: if vertical { SplitAxis::Vertical } else { SplitAxis::Horizontal },
                count: u32::from(count % 8),
            },
            Op::Remove { pick } => PanelOperation::Remove {
                target: nodes[usize::from(pick) % nodes.len()],
            },
            Op::Resize { pick, index, boundary } => PanelOperation::ResizeBoundary {
                separator: nodes[usize::from(pick) % nodes.len()],
                index: usize::from(index % 8),
                boundary: i64::from(boundary),
            },
        };
        let before = tree.state_hash();
        if tree.apply_operation(op_id as u64, operation).is_err() {
            assert_eq!(tree.state_hash(), before, "rejected operation mutated the tree");
        }

        // Post-conditions that must always hold:
        tree.validate().expect("tree invariants");
        assert_eq!(tree.canvas(), canvas, "canvas changed");
        for leaf in tree.leaves() {
            let region = tree.region(leaf).expect("leaf region");
            let center = Point::new(
                f64::from(region.x) + f64::from(region.width) / 2.0,
                f64::from(region.y) + f64::from(region.height) / 2.0,
            );
            assert!(tree.hit_test(center).is_some(), "leaf center not hit");
        }
    }
});
