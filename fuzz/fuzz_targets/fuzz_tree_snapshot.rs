#![no_main]

use libfuzzer_sys::fuzz_target;
use panelfig_core::Point;
use panelfig_layout::{PanelTree, PanelTreeSnapshot};

fuzz_target!(|data: &[u8]| {
    let Ok(snapshot) = serde_json::from_slice::<PanelTreeSnapshot>(data) else {
        return;
    };
    let Ok(tree) = PanelTree::from_snapshot(snapshot) else {
        return;
    };

    // A tree that loads must tile its canvas and round-trip.
    tree.validate().expect("loaded tree validates");
    let canvas = tree.canvas();
    let probe = Point::new(
        f64::from(canvas.x) + f64::from(canvas.width) / 2.0,
        f64::from(canvas.y) + f64::from(canvas.height) / 2.0,
    );
    assert!(tree.hit_test(probe).is_some());
    let again = PanelTree::from_snapshot(tree.to_snapshot()).expect("round trip");
    assert_eq!(again.state_hash(), tree.state_hash());
});
