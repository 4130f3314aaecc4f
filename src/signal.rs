//! Wait conditions used by the buffer
use parking_lot::{Condvar, MutexGuard};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// How waiting producers and consumers are woken up. Both strategies give the same buffer behaviour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStrategy {
    /// A single condition shared by producers and consumers. Every change wakes all waiters,
    /// who then check their own predicate again
    Monitor,
    /// Two independent conditions, one for "not full" and one for "not empty". A change wakes
    /// a single waiter of the opposite side
    Conditions,
}

impl Default for SyncStrategy {
    fn default() -> Self {
        return SyncStrategy::Conditions;
    }
}

/// Condition variables for a buffer, always used together with the buffer's mutex
pub(crate) enum Signals {
    Monitor(Condvar),
    Conditions { not_full: Condvar, not_empty: Condvar },
}

impl Signals {
    pub(crate) fn new(strategy: SyncStrategy) -> Self {
        return match strategy {
            SyncStrategy::Monitor => Signals::Monitor(Condvar::new()),
            SyncStrategy::Conditions => Signals::Conditions {
                not_full: Condvar::new(),
                not_empty: Condvar::new(),
            },
        };
    }

    pub(crate) fn strategy(&self) -> SyncStrategy {
        return match self {
            Signals::Monitor(_) => SyncStrategy::Monitor,
            Signals::Conditions { .. } => SyncStrategy::Conditions,
        };
    }

    #[inline]
    fn not_full(&self) -> &Condvar {
        return match self {
            Signals::Monitor(cvar) => cvar,
            Signals::Conditions { not_full, .. } => not_full,
        };
    }

    #[inline]
    fn not_empty(&self) -> &Condvar {
        return match self {
            Signals::Monitor(cvar) => cvar,
            Signals::Conditions { not_empty, .. } => not_empty,
        };
    }

    /// Releases the guard until a slot may be free. Callers must check the size again
    #[inline]
    pub(crate) fn wait_not_full<T>(&self, guard: &mut MutexGuard<'_, T>) {
        self.not_full().wait(guard);
    }

    /// Same as `wait_not_full` but never past `deadline`. Returns true if the deadline was reached
    #[inline]
    pub(crate) fn wait_not_full_until<T>(&self, guard: &mut MutexGuard<'_, T>, deadline: Instant) -> bool {
        return self.not_full().wait_until(guard, deadline).timed_out();
    }

    /// Releases the guard until an item may be available. Callers must check the size again
    #[inline]
    pub(crate) fn wait_not_empty<T>(&self, guard: &mut MutexGuard<'_, T>) {
        self.not_empty().wait(guard);
    }

    #[inline]
    pub(crate) fn wait_not_empty_until<T>(&self, guard: &mut MutexGuard<'_, T>, deadline: Instant) -> bool {
        return self.not_empty().wait_until(guard, deadline).timed_out();
    }

    /// Called after an item was added
    #[inline]
    pub(crate) fn notify_not_empty(&self) {
        match self {
            Signals::Monitor(cvar) => {
                cvar.notify_all();
            }
            Signals::Conditions { not_empty, .. } => {
                not_empty.notify_one();
            }
        }
    }

    /// Called after an item was removed
    #[inline]
    pub(crate) fn notify_not_full(&self) {
        match self {
            Signals::Monitor(cvar) => {
                cvar.notify_all();
            }
            Signals::Conditions { not_full, .. } => {
                not_full.notify_one();
            }
        }
    }

    /// Wakes every waiter on both sides
    pub(crate) fn notify_all(&self) {
        match self {
            Signals::Monitor(cvar) => {
                cvar.notify_all();
            }
            Signals::Conditions { not_full, not_empty } => {
                not_full.notify_all();
                not_empty.notify_all();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_strategy_round_trip() {
        assert_eq!(SyncStrategy::Monitor, Signals::new(SyncStrategy::Monitor).strategy());
        assert_eq!(SyncStrategy::Conditions, Signals::new(SyncStrategy::Conditions).strategy());
        assert_eq!(SyncStrategy::Conditions, SyncStrategy::default());
    }

    #[test]
    fn test_wait_until_times_out() {
        let wait = Duration::from_millis(10);
        for strategy in [SyncStrategy::Monitor, SyncStrategy::Conditions].iter() {
            let signals = Signals::new(*strategy);
            let mtx = Mutex::new(());
            let mut guard = mtx.lock();
            let deadline = Instant::now() + wait;

            assert!(signals.wait_not_empty_until(&mut guard, deadline));
            assert!(Instant::now() >= deadline);
        }
    }

    #[test]
    fn test_notify_wakes_waiter() {
        let pair = Arc::new((Mutex::new(false), Signals::new(SyncStrategy::Conditions)));

        let tpair = pair.clone();
        let waiter = thread::spawn(move || {
            let (mtx, signals) = &*tpair;
            let mut ready = mtx.lock();
            while !*ready {
                signals.wait_not_empty(&mut ready);
            }
        });

        // give the waiter a chance to block first, it re-checks the flag anyway
        thread::sleep(Duration::from_millis(10));
        {
            let (mtx, signals) = &*pair;
            *mtx.lock() = true;
            signals.notify_not_empty();
        }

        waiter.join().unwrap();
    }

    #[test]
    fn test_notify_all_wakes_both_sides() {
        let pair = Arc::new((Mutex::new(false), Signals::new(SyncStrategy::Conditions)));

        let mut handles = Vec::new();
        for side in 0..2 {
            let tpair = pair.clone();
            handles.push(thread::spawn(move || {
                let (mtx, signals) = &*tpair;
                let mut done = mtx.lock();
                while !*done {
                    if side == 0 {
                        signals.wait_not_full(&mut done);
                    } else {
                        signals.wait_not_empty(&mut done);
                    }
                }
            }));
        }

        thread::sleep(Duration::from_millis(10));
        {
            let (mtx, signals) = &*pair;
            *mtx.lock() = true;
            signals.notify_all();
        }

        handles.into_iter().for_each(|jh| jh.join().unwrap());
    }
}
