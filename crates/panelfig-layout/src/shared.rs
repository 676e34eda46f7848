#![forbid(unsafe_code)]

//! Panel tree shared between one writer and many readers.
//!
//! Readers take a snapshot with [`SharedPanelTree::load`], which never
//! blocks. Writers are serialized by a mutex, run the operation on a private
//! copy, and publish it with a single atomic swap, so a reader sees either
//! the whole tree before an operation or the whole tree after it.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::{ArcSwap, Guard};

use crate::panel::{
    LeafPanel, PanelId, PanelModelError, PanelOperation, PanelOperationError,
    PanelOperationOutcome, PanelTree, Rgb,
};

/// Copy-on-write handle to a [`PanelTree`].
#[derive(Debug)]
pub struct SharedPanelTree {
    current: ArcSwap<PanelTree>,
    writer: Mutex<()>,
}

impl SharedPanelTree {
    #[must_use]
    pub fn new(tree: PanelTree) -> Self {
        Self {
            current: ArcSwap::from_pointee(tree),
            writer: Mutex::new(()),
        }
    }

    /// Borrow the current tree without cloning. Wait-free.
    #[must_use]
    pub fn load(&self) -> Guard<Arc<PanelTree>> {
        self.current.load()
    }

    /// Owned handle to the current tree.
    #[must_use]
    pub fn snapshot(&self) -> Arc<PanelTree> {
        self.current.load_full()
    }

    /// Apply one operation and publish the result. On failure nothing is
    /// published.
    pub fn apply_operation(
        &self,
        operation_id: u64,
        operation: PanelOperation,
    ) -> Result<PanelOperationOutcome, PanelOperationError> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut working = PanelTree::clone(&self.current.load());
        let outcome = working.apply_operation(operation_id, operation)?;
        self.current.store(Arc::new(working));
        Ok(outcome)
    }

    /// Edit leaf content (data, pixels, annotations) and publish the result.
    ///
    /// Returns `None` without publishing if `id` is not a leaf.
    pub fn update_leaf<R>(
        &self,
        id: PanelId,
        edit: impl FnOnce(&mut LeafPanel) -> R,
    ) -> Option<R> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut working = PanelTree::clone(&self.current.load());
        let result = edit(working.leaf_mut(id)?);
        self.current.store(Arc::new(working));
        Some(result)
    }

    /// Recolor every separator in one publish. Returns the separators that
    /// changed.
    pub fn recolor_separators(&self, color: Rgb) -> Vec<PanelId> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut working = PanelTree::clone(&self.current.load());
        let changed = working.recolor_separators(color);
        self.current.store(Arc::new(working));
        changed
    }

    /// Replace the whole tree after validating it.
    pub fn replace(&self, tree: PanelTree) -> Result<(), PanelModelError> {
        tree.validate()?;
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.current.store(Arc::new(tree));
        Ok(())
    }
}
