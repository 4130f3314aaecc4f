//! Cancellation of blocked buffer calls
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

const DEFAULT_ORDERING: Ordering = Ordering::SeqCst;

/// Something threads wait on with a token, woken when the token is cancelled
pub(crate) trait Wake: Send + Sync {
    /// Must notify while holding the lock the waiters check the token under
    fn wake(&self);
}

struct TokenState {
    cancelled: AtomicBool,
    waiters: Mutex<Vec<Weak<dyn Wake>>>,
}

/// A shared flag that tells blocked `put_cancellable`/`get_cancellable` calls to stop waiting.
///
/// Clones share the same flag and one token can be used with any number of buffers. Cancelling it
/// wakes every call waiting with it, whatever buffer they wait on. Once cancelled, a token stays cancelled.
#[derive(Clone)]
pub struct CancelToken {
    state: Arc<TokenState>,
}

impl CancelToken {
    /// Creates a new token that is not cancelled
    pub fn new() -> Self {
        return CancelToken {
            state: Arc::new(TokenState {
                cancelled: AtomicBool::new(false),
                waiters: Mutex::new(Vec::new()),
            }),
        };
    }

    /// Returns true once the token was cancelled
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        return self.state.cancelled.load(DEFAULT_ORDERING);
    }

    /// Cancels the token and wakes every call waiting with it
    pub fn cancel(&self) {
        // the flag is set before the list is taken, so a waiter registering later already sees it
        self.state.cancelled.store(true, DEFAULT_ORDERING);
        let waiters = std::mem::take(&mut *self.state.waiters.lock());

        for waiter in waiters.iter().filter_map(|w| w.upgrade()) {
            waiter.wake();
        }
    }

    /// Registers `waiter` to be woken on cancel. Must happen before the waiter first checks the flag
    pub(crate) fn register(&self, waiter: Weak<dyn Wake>) {
        let mut waiters = self.state.waiters.lock();
        waiters.retain(|w| w.strong_count() > 0);
        if !waiters.iter().any(|w| w.ptr_eq(&waiter)) {
            waiters.push(waiter);
        }
    }

    #[cfg(test)]
    fn registered(&self) -> usize {
        return self.state.waiters.lock().len();
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        return CancelToken::new();
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return f.debug_struct("CancelToken").field("cancelled", &self.is_cancelled()).finish();
    }
}
