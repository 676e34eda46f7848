//! Property checks for stack indexing and quad geometry.

use std::collections::HashSet;

use panelfig_core::{Corner, PlaneIndex, Quad, StackDims};
use proptest::prelude::*;

proptest! {
    #[test]
    fn plane_offsets_are_a_bijection(channels in 1u32..5, slices in 1u32..5, frames in 1u32..5) {
        let dims = StackDims::new(channels, slices, frames);
        let mut seen = HashSet::new();
        for frame in 0..frames {
            for slice in 0..slices {
                for channel in 0..channels {
                    let offset = dims
                        .offset(PlaneIndex::new(channel, slice, frame))
                        .expect("index inside stack");
                    prop_assert!(offset < dims.plane_count());
                    prop_assert!(seen.insert(offset));
                }
            }
        }
        prop_assert_eq!(seen.len(), dims.plane_count());
    }

    #[test]
    fn axis_aligned_quad_area_matches_rect(
        x in -500.0f64..500.0,
        y in -500.0f64..500.0,
        w in 0.5f64..400.0,
        h in 0.5f64..400.0,
    ) {
        let quad = Quad::from_rect(x, y, w, h);
        prop_assert!((quad.signed_area() - w * h).abs() < 1e-6 * (1.0 + w * h));
        prop_assert!((quad.edge_length(Corner::TopLeft, Corner::TopRight) - w).abs() < 1e-9);
        prop_assert!((quad.edge_length(Corner::BottomLeft, Corner::BottomRight) - w).abs() < 1e-9);
    }
}
