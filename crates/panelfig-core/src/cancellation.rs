#![forbid(unsafe_code)]

//! Stop signal for fills running on another thread.
//!
//! The caller keeps a [`CancellationSource`] and hands [`CancellationToken`]s
//! to the sampler, which checks them between destination rows. A cancelled
//! fill returns no buffer at all.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Read side of a cancellation flag. Clones share the flag.
#[derive(Debug, Clone)]
pub struct CancellationToken(Arc<AtomicBool>);

/// Write side of a cancellation flag.
///
/// Dropping the source leaves its tokens uncancelled.
#[derive(Debug, Default)]
pub struct CancellationSource(Arc<AtomicBool>);

impl CancellationSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken(Arc::clone(&self.0))
    }

    /// Ask every fill holding a token from this source to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl CancellationToken {
    /// Token with no source; it never fires.
    #[must_use]
    pub fn never() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
