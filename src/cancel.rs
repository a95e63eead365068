//! Cancellation tokens and per-call deadlines threaded through every backend request.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Shared flag that marks a unit of work as abandoned.
///
/// Clones observe the same flag. Cancelling never interrupts a request that is
/// already on the wire; it stops new requests from starting and tells the
/// controller to discard the late result.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Context passed to each backend call.
#[derive(Clone, Debug)]
pub struct CallContext {
    pub cancel: CancelToken,
    /// Deadline for a single request, covering connect through body read.
    pub timeout: Duration,
}

impl CallContext {
    pub fn new(timeout: Duration) -> Self {
        Self {
            cancel: CancelToken::new(),
            timeout,
        }
    }

    /// A context sharing this one's timeout but with a fresh token.
    pub fn fresh(&self) -> Self {
        Self::new(self.timeout)
    }
}
