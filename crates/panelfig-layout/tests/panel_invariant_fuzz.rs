//! Property/fuzz-style invariants for panel tree operations.
//!
//! Random operation streams run against the public PanelTree API. After each
//! step the tree must validate, leaves must tile the canvas without overlap,
//! rejected operations must leave the tree untouched, and replaying the
//! accepted operations must reproduce the same state.

use panelfig_layout::{
    PanelId, PanelKind, PanelOperation, PanelTree, SeparatorStyle, SplitAxis,
};
use panelfig_core::{Point, Rect};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        debug_assert!(min <= max);
        if min == max {
            return min;
        }
        let span = u64::from(max - min + 1);
        min + (self.next_u64() % span) as u32
    }

    fn choose_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len as u64) as usize
    }

    fn choose_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 0
    }
}

const CANVAS: Rect = Rect::new(0, 0, 1200, 900);

fn fresh_tree() -> PanelTree {
    PanelTree::new(CANVAS)
        .expect("non-empty canvas")
        .with_style(SeparatorStyle {
            thickness: 3,
            ..SeparatorStyle::default()
        })
        .with_min_extent(6)
}

fn separator_ids(tree: &PanelTree) -> Vec<(PanelId, usize)> {
    tree.nodes()
        .filter_map(|node| match &node.kind {
            PanelKind::Separator(separator) => Some((node.id, separator.children.len())),
            PanelKind::Leaf(_) => None,
        })
        .collect()
}

fn random_axis(rng: &mut Lcg) -> SplitAxis {
    if rng.choose_bool() {
        SplitAxis::Horizontal
    } else {
        SplitAxis::Vertical
    }
}

fn random_operation(tree: &PanelTree, rng: &mut Lcg) -> PanelOperation {
    let leaves = tree.leaves();
    let separators = separator_ids(tree);
    let non_root: Vec<PanelId> = tree
        .walk()
        .into_iter()
        .filter(|id| *id != tree.root())
        .collect();

    let mut candidates = vec![0usize]; // Split (a leaf always exists)
    if !non_root.is_empty() {
        candidates.push(1); // Remove
    }
    if !separators.is_empty() {
        candidates.push(2); // ResizeBoundary
        candidates.push(2);
    }

    match candidates[rng.choose_index(candidates.len())] {
        1 => PanelOperation::Remove {
            target: non_root[rng.choose_index(non_root.len())],
        },
        2 => {
            let (separator, children) = separators[rng.choose_index(separators.len())];
            let region = tree.region(separator).expect("separator region");
            let far = region.x.max(region.y) + region.width.max(region.height);
            PanelOperation::ResizeBoundary {
                separator,
                index: rng.choose_index(children - 1),
                boundary: i64::from(rng.next_u32_range(0, far + 20)) - 10,
            }
        }
        _ => PanelOperation::Split {
            target: leaves[rng.choose_index(leaves.len())],
            axis: random_axis(rng),
            count: rng.next_u32_range(2, 4),
        },
    }
}

fn assert_tiling(tree: &PanelTree) {
    tree.validate().expect("tree should remain structurally valid");
    assert_eq!(tree.canvas(), CANVAS, "canvas must never change");

    let leaves = tree.leaves();
    let regions: Vec<Rect> = leaves
        .iter()
        .map(|id| tree.region(*id).expect("leaf region"))
        .collect();
    let mut covered = 0u64;
    for (i, region) in regions.iter().enumerate() {
        assert!(!region.is_empty(), "leaf {} is empty", leaves[i]);
        assert!(CANVAS.intersection_opt(region) == Some(*region));
        for other in &regions[i + 1..] {
            assert!(!region.overlaps(other), "{region:?} overlaps {other:?}");
        }
        covered += region.area();
    }
    assert!(covered <= CANVAS.area());

    for (id, region) in leaves.iter().zip(&regions) {
        let center = Point::new(
            f64::from(region.x) + f64::from(region.width) / 2.0,
            f64::from(region.y) + f64::from(region.height) / 2.0,
        );
        if region.width > 1 && region.height > 1 {
            assert_eq!(tree.hit_test(center), Some(*id));
        }
    }
}

fn run_sequence(seed: u64, steps: usize) -> (PanelTree, Vec<PanelOperation>) {
    let mut tree = fresh_tree();
    let mut rng = Lcg::new(seed);
    let mut applied = Vec::with_capacity(steps);

    for step in 0..steps {
        let operation = random_operation(&tree, &mut rng);
        let operation_id = (step as u64) + 1;
        let before = tree.clone();

        match tree.apply_operation(operation_id, operation.clone()) {
            Ok(outcome) => {
                assert_eq!(outcome.before_hash, before.state_hash());
                assert_eq!(outcome.after_hash, tree.state_hash());
                applied.push(operation);
            }
            Err(err) => {
                assert_eq!(
                    tree, before,
                    "rejected op must not change the tree (seed={seed}, step={step}, err={err})"
                );
            }
        }
        assert_tiling(&tree);
    }

    (tree, applied)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn panel_tree_random_operation_sequences_preserve_tiling(
        seed in any::<u64>(),
        steps in 20usize..120,
    ) {
        let (tree, _) = run_sequence(seed, steps);
        assert_tiling(&tree);
    }

    #[test]
    fn panel_tree_random_operation_sequences_replay_deterministically(
        seed in any::<u64>(),
        steps in 20usize..80,
    ) {
        let (final_tree, operations) = run_sequence(seed, steps);

        let mut replay_tree = fresh_tree();
        for (idx, operation) in operations.into_iter().enumerate() {
            replay_tree
                .apply_operation((idx as u64) + 1, operation)
                .expect("replay of an accepted operation should succeed");
        }

        prop_assert_eq!(replay_tree.state_hash(), final_tree.state_hash());
        prop_assert_eq!(replay_tree.to_snapshot(), final_tree.to_snapshot());
    }

    #[test]
    fn split_then_remove_new_siblings_restores_region(
        seed in any::<u64>(),
        count in 2u32..6,
    ) {
        let (mut tree, _) = run_sequence(seed, 12);
        let leaves = tree.leaves();
        let target = leaves[(seed % leaves.len() as u64) as usize];
        let original = tree.region(target).expect("leaf region");
        let axis = if seed % 2 == 0 { SplitAxis::Horizontal } else { SplitAxis::Vertical };

        let Ok(outcome) = tree.split(target, axis, count) else {
            // Too small to split that many ways.
            return Ok(());
        };
        let new_leaves = &outcome.created_nodes[1..];
        prop_assert_eq!(new_leaves.len(), count as usize);
        for leaf in new_leaves.iter().skip(1).rev() {
            tree.remove(*leaf).expect("remove new sibling");
        }
        prop_assert_eq!(tree.region(new_leaves[0]), Some(original));
        assert_tiling(&tree);
    }
}

#[test]
fn panel_tree_fuzz_seed_corpus_preserves_tiling() {
    let seeds = [
        0_u64,
        1,
        2,
        3,
        5,
        8,
        13,
        21,
        34,
        55,
        89,
        144,
        u32::MAX as u64,
        (u32::MAX as u64) + 1,
        u64::MAX - 1,
        u64::MAX,
    ];

    for seed in seeds {
        let (tree, _) = run_sequence(seed, 180);
        assert_tiling(&tree);
    }
}
