#![forbid(unsafe_code)]

//! Which edits make sense for the current selection.
//!
//! [`PanelActions::available`] is recomputed from the tree, the selected
//! node, and whether a data clipboard is held. Hosts enable their controls
//! from the result instead of tracking enablement themselves.

use bitflags::bitflags;

use crate::panel::{PanelId, PanelKind, PanelTree};

bitflags! {
    /// Edits that can be applied to a selection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PanelActions: u16 {
        const NONE           = 0;
        /// Split the selected leaf.
        const SPLIT          = 1 << 0;
        /// Remove the selected node and its subtree.
        const REMOVE         = 1 << 1;
        /// Drop the selected leaf's data and pixels.
        const CLEAR          = 1 << 2;
        /// Copy the selected leaf's data source.
        const COPY           = 1 << 3;
        /// Paste a copied data source into the selected leaf.
        const PASTE          = 1 << 4;
        /// Fill the selected leaf from a new region.
        const FILL           = 1 << 5;
        /// Re-sample the selected leaf from its recorded region.
        const REFILL         = 1 << 6;
        /// Install externally edited pixels into the selected leaf.
        const ADOPT_PIXELS   = 1 << 7;
        /// Apply the selected leaf's region to another source.
        const REUSE_GEOMETRY = 1 << 8;
        /// Move a boundary of the selected separator.
        const RESIZE         = 1 << 9;
        /// Edit label, scale bar, or notes of the selected leaf.
        const ANNOTATE       = 1 << 10;
    }
}

impl Default for PanelActions {
    fn default() -> Self {
        Self::NONE
    }
}

impl PanelActions {
    /// Actions available for `selection` in `tree`.
    #[must_use]
    pub fn available(tree: &PanelTree, selection: Option<PanelId>, clipboard_filled: bool) -> Self {
        let Some(node) = selection.and_then(|id| tree.node(id)) else {
            return Self::NONE;
        };
        let mut actions = Self::NONE;
        if node.parent.is_some() {
            actions |= Self::REMOVE;
        }
        match &node.kind {
            PanelKind::Separator(_) => actions |= Self::RESIZE,
            PanelKind::Leaf(leaf) => {
                actions |= Self::SPLIT | Self::FILL | Self::ADOPT_PIXELS | Self::ANNOTATE;
                let has_data = !leaf.data.is_empty();
                if has_data || leaf.pixels.is_some() {
                    actions |= Self::CLEAR;
                }
                if has_data {
                    actions |= Self::COPY | Self::REFILL;
                }
                if leaf.data.corners.is_some() {
                    actions |= Self::REUSE_GEOMETRY;
                }
                if clipboard_filled {
                    actions |= Self::PASTE;
                }
            }
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceRef;
    use crate::panel::SplitAxis;
    use panelfig_core::{Quad, Rect};

    #[test]
    fn nothing_selected_enables_nothing() {
        let tree = PanelTree::new(Rect::from_size(10, 10)).expect("canvas");
        assert_eq!(PanelActions::available(&tree, None, true), PanelActions::NONE);
        let missing = PanelId::new(42).expect("non-zero");
        assert_eq!(
            PanelActions::available(&tree, Some(missing), true),
            PanelActions::NONE
        );
    }

    #[test]
    fn empty_root_leaf() {
        let tree = PanelTree::new(Rect::from_size(10, 10)).expect("canvas");
        let actions = PanelActions::available(&tree, Some(tree.root()), false);
        assert!(actions.contains(PanelActions::SPLIT | PanelActions::FILL));
        assert!(!actions.intersects(
            PanelActions::REMOVE | PanelActions::CLEAR | PanelActions::COPY | PanelActions::PASTE
        ));
    }

    #[test]
    fn filled_child_leaf_and_separator() {
        let mut tree = PanelTree::new(Rect::from_size(100, 100)).expect("canvas");
        tree.split(tree.root(), SplitAxis::Horizontal, 2).expect("split");
        let leaf = tree.leaves()[0];
        {
            let data = &mut tree.leaf_mut(leaf).expect("leaf").data;
            data.source = SourceRef::external("img");
            data.corners = Some(Quad::from_rect(0.0, 0.0, 10.0, 10.0));
        }
        let actions = PanelActions::available(&tree, Some(leaf), true);
        assert!(actions.contains(
            PanelActions::REMOVE
                | PanelActions::CLEAR
                | PanelActions::COPY
                | PanelActions::PASTE
                | PanelActions::REFILL
                | PanelActions::REUSE_GEOMETRY
        ));
        assert!(!actions.contains(PanelActions::RESIZE));

        let separator = PanelActions::available(&tree, Some(tree.root()), true);
        assert_eq!(separator, PanelActions::RESIZE);
    }
}
