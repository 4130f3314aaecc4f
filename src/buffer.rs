//! Bounded blocking buffer
use crate::cancel::{CancelToken, Wake};
use crate::errors::{Error, PutError, Result};
use crate::signal::{Signals, SyncStrategy};
use log::{debug, trace};
use parking_lot::{Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Capacity used when none is given
pub const DEFAULT_CAPACITY: usize = 10;

/// How long a blocked call is willing to wait
#[derive(Clone, Copy)]
enum Until<'a> {
    Forever,
    Deadline(Instant),
    Cancelled(&'a CancelToken),
}

impl Until<'_> {
    // timeouts too large to be represented as an instant wait forever
    fn timeout(timeout: Duration) -> Self {
        return match Instant::now().checked_add(timeout) {
            Some(deadline) => Until::Deadline(deadline),
            None => Until::Forever,
        };
    }
}

/// Values and conditions, shared with the cancel tokens of waiting calls
struct Shared<T> {
    items: Mutex<VecDeque<T>>,
    signals: Signals,
}

impl<T: Send> Wake for Shared<T> {
    fn wake(&self) {
        // hold the guard so a waiter can't check the token and then miss the notification
        let _items = self.items.lock();
        self.signals.notify_all();
    }
}

/// A thread safe, fixed capacity FIFO buffer. Producers calling `put` block while the buffer is full and
/// consumers calling `get` block while it is empty.
///
/// Values leave the buffer in the order they were added. Which of several blocked threads is woken first is not specified.
pub struct BoundedBuffer<T> {
    capacity: usize,
    shared: Arc<Shared<T>>,
}

///```
/// use rustbuffer::BoundedBuffer;
/// use std::thread;
/// use std::time::Duration;
///
/// fn main() {
///    // a buffer holding at most 2 values, shared between threads
///    let buffer = BoundedBuffer::<u32>::new_arc(2).unwrap();
///
///    let producer = buffer.clone();
///    let handle = thread::spawn(move || {
///        // the third put blocks until the consumer below takes a value
///        for value in 1..=3 {
///            producer.put(value);
///        }
///    });
///
///    assert_eq!(1, buffer.get());
///    assert_eq!(2, buffer.get());
///    assert_eq!(3, buffer.get());
///    handle.join().unwrap();
///
///    // nothing left, wait at most 10 milliseconds
///    assert!(buffer.get_timeout(Duration::from_millis(10)).is_err());
///
///    // a capacity of zero is rejected
///    assert!(BoundedBuffer::<u32>::new(0).is_err());
///}
/// ```

impl<T> BoundedBuffer<T> {
    /// Create a new buffer holding at most `capacity` values. Fails if `capacity` is zero
    pub fn new(capacity: usize) -> Result<Self> {
        return BoundedBuffer::with_strategy(capacity, SyncStrategy::default());
    }

    /// Create a new buffer with fixed `capacity` wrapped as an atomic reference counter
    pub fn new_arc(capacity: usize) -> Result<Arc<Self>> {
        let buffer = BoundedBuffer::new(capacity)?;
        return Ok(Arc::new(buffer));
    }

    /// Create a new buffer using the given synchronization strategy
    pub fn with_strategy(capacity: usize, strategy: SyncStrategy) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfiguration("capacity must be greater than 0".to_string()));
        }

        debug!("creating bounded buffer with capacity {} and {:?} strategy", capacity, strategy);
        return Ok(BoundedBuffer::allocate(capacity, strategy));
    }

    fn allocate(capacity: usize, strategy: SyncStrategy) -> Self {
        let shared = Shared {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            signals: Signals::new(strategy),
        };

        return BoundedBuffer {
            capacity: capacity,
            shared: Arc::new(shared),
        };
    }

    /// Returns the maximum number of values the buffer holds
    #[inline]
    pub fn capacity(&self) -> usize {
        return self.capacity;
    }

    /// Returns the number of values currently in the buffer. Other threads may change it right after this returns
    #[inline]
    pub fn len(&self) -> usize {
        return self.shared.items.lock().len();
    }

    /// Returns true if the buffer holds no values
    #[inline]
    pub fn is_empty(&self) -> bool {
        return self.len() == 0;
    }

    /// Returns true if the buffer holds `capacity` values
    #[inline]
    pub fn is_full(&self) -> bool {
        return self.len() == self.capacity;
    }

    /// Returns the synchronization strategy this buffer was created with
    pub fn strategy(&self) -> SyncStrategy {
        return self.shared.signals.strategy();
    }

    /// Adds a value to the tail of the buffer, blocking for as long as the buffer is full
    pub fn put(&self, value: T) {
        let mut items = self.shared.items.lock();
        while items.len() == self.capacity {
            trace!("buffer full, producer waiting");
            self.shared.signals.wait_not_full(&mut items);
        }

        self.push(&mut items, value);
    }

    /// Adds a value, waiting at most `timeout` for a free slot. On expiry the value is returned in the error.
    /// A timeout too large to be represented waits like `put`
    pub fn put_timeout(&self, value: T, timeout: Duration) -> std::result::Result<(), PutError<T>> {
        return self.put_until(value, Until::timeout(timeout));
    }

    /// Adds a value only if there is a free slot, never blocking
    pub fn try_put(&self, value: T) -> std::result::Result<(), PutError<T>> {
        let mut items = self.shared.items.lock();
        if items.len() == self.capacity {
            return Err(PutError::Full(value));
        }

        self.push(&mut items, value);
        return Ok(());
    }

    /// Removes and returns the oldest value, blocking for as long as the buffer is empty
    pub fn get(&self) -> T {
        let mut items = self.shared.items.lock();
        loop {
            if let Some(value) = items.pop_front() {
                self.shared.signals.notify_not_full();
                return value;
            }

            trace!("buffer empty, consumer waiting");
            self.shared.signals.wait_not_empty(&mut items);
        }
    }

    /// Removes the oldest value, waiting at most `timeout` for one to be available.
    /// A timeout too large to be represented waits like `get`
    pub fn get_timeout(&self, timeout: Duration) -> Result<T> {
        return self.get_until(Until::timeout(timeout));
    }

    /// Removes the oldest value or returns None if the buffer is empty, never blocking
    pub fn try_get(&self) -> Option<T> {
        let mut items = self.shared.items.lock();
        let value = items.pop_front();
        if value.is_some() {
            self.shared.signals.notify_not_full();
        }
        return value;
    }

    #[inline]
    fn push(&self, items: &mut MutexGuard<'_, VecDeque<T>>, value: T) {
        items.push_back(value);
        self.shared.signals.notify_not_empty();
    }

    fn put_until(&self, value: T, until: Until<'_>) -> std::result::Result<(), PutError<T>> {
        let signals = &self.shared.signals;
        let mut items = self.shared.items.lock();
        let mut timed_out = false;

        while items.len() == self.capacity {
            match until {
                Until::Forever => {
                    signals.wait_not_full(&mut items);
                }
                Until::Deadline(deadline) => {
                    if timed_out {
                        trace!("producer timed out");
                        return Err(PutError::Timeout(value));
                    }
                    timed_out = signals.wait_not_full_until(&mut items, deadline);
                }
                Until::Cancelled(token) => {
                    if token.is_cancelled() {
                        trace!("producer cancelled");
                        return Err(PutError::Cancelled(value));
                    }
                    signals.wait_not_full(&mut items);
                }
            }
        }

        self.push(&mut items, value);
        return Ok(());
    }

    fn get_until(&self, until: Until<'_>) -> Result<T> {
        let signals = &self.shared.signals;
        let mut items = self.shared.items.lock();
        let mut timed_out = false;

        loop {
            if let Some(value) = items.pop_front() {
                signals.notify_not_full();
                return Ok(value);
            }

            match until {
                Until::Forever => {
                    signals.wait_not_empty(&mut items);
                }
                Until::Deadline(deadline) => {
                    if timed_out {
                        trace!("consumer timed out");
                        return Err(Error::Timeout);
                    }
                    timed_out = signals.wait_not_empty_until(&mut items, deadline);
                }
                Until::Cancelled(token) => {
                    if token.is_cancelled() {
                        trace!("consumer cancelled");
                        return Err(Error::Cancelled);
                    }
                    signals.wait_not_empty(&mut items);
                }
            }
        }
    }
}

impl<T: Send + 'static> BoundedBuffer<T> {
    /// Adds a value, blocking while the buffer is full until `token` is cancelled
    pub fn put_cancellable(&self, value: T, token: &CancelToken) -> std::result::Result<(), PutError<T>> {
        self.watch(token);
        return self.put_until(value, Until::Cancelled(token));
    }

    /// Removes the oldest value, blocking while the buffer is empty until `token` is cancelled
    pub fn get_cancellable(&self, token: &CancelToken) -> Result<T> {
        self.watch(token);
        return self.get_until(Until::Cancelled(token));
    }

    /// Cancels `token`. Calls waiting with that token on this or any other buffer return a cancelled error,
    /// every other waiter goes back to waiting. Same as [`CancelToken::cancel`]
    pub fn cancel(&self, token: &CancelToken) {
        token.cancel();
        debug!("cancelled waiters on bounded buffer");
    }

    // registers before the token is first checked, so a cancel can't slip in between
    fn watch(&self, token: &CancelToken) {
        let shared: Arc<dyn Wake> = self.shared.clone();
        token.register(Arc::downgrade(&shared));
    }
}

impl<T> Default for BoundedBuffer<T> {
    /// A buffer with [`DEFAULT_CAPACITY`] and the default strategy
    fn default() -> Self {
        return BoundedBuffer::allocate(DEFAULT_CAPACITY, SyncStrategy::default());
    }
}
