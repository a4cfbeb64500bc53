//! Cooperative cancellation.
//!
//! A [`CancellationToken`] is a shared flag plus an optional deadline. Work
//! checks it at the start of each task and between blocking sub-operations.
//! Threads are never stopped from the outside; the one exception is a command
//! action's child process, which is killed once its token is cancelled. Child
//! tokens observe their parent, so cancelling the root (for example on SIGINT)
//! reaches every stage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
    parent: Option<Box<CancellationToken>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A child token: cancelled when `self` is, but cancelling it leaves
    /// `self` untouched.
    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: None,
            parent: Some(Box::new(self.clone())),
        }
    }

    /// A child token that also expires `timeout` from now.
    pub fn child_with_timeout(&self, timeout: Option<Duration>) -> Self {
        let mut child = self.child();
        child.deadline = timeout.map(|t| Instant::now() + t);
        child
    }

    /// The raw flag, for registering with a signal handler.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || self.is_expired()
            || self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }

    /// True when this token's own deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Returns `Err(Error::Cancelled)` once the token is cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
