use std::{error::Error, fmt};

use anyhow::bail;

use crate::{Condvar, Mutex};

/// The semaphore was closed while (or before) a caller tried to acquire.
///
/// This is a cooperative cancellation signal, not a failure: a task parked in
/// [Semaphore::acquire] unwinds without having consumed a permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closed;

impl fmt::Display for Closed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("semaphore closed")
    }
}

impl Error for Closed {}

#[derive(Debug)]
struct State {
    permits: u32,
    closed: bool,
}

/// Counting semaphore built from a raw mutex and condition variable.
///
/// Fairness: none. [release](Semaphore::release) broadcasts to every blocked
/// waiter and the woken threads race to re-take the state lock; any of them
/// may win the permit. The only guarantee is that the permit count never
/// goes negative.
#[derive(Debug)]
pub struct Semaphore {
    state: Mutex<State>,
    available: Condvar,
}

impl Semaphore {
    /// Fails when `permits` is negative; a semaphore can never owe permits.
    pub fn new(permits: i32) -> anyhow::Result<Self> {
        if permits < 0 {
            bail!("semaphore permits cannot be negative: {permits}");
        }
        Ok(Self {
            state: Mutex::new(State {
                permits: permits as u32,
                closed: false,
            }),
            available: Condvar::new(),
        })
    }

    /// Blocks until a permit is available, then consumes it.
    ///
    /// Returns [Closed] without consuming anything if the semaphore is, or
    /// becomes, closed. The state lock is dropped on every path.
    pub fn acquire(&self) -> Result<(), Closed> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(Closed);
            }
            if state.permits > 0 {
                state.permits -= 1;
                return Ok(());
            }
            state = self.available.wait(state);
        }
    }

    /// Consumes a permit only if one is immediately available. No side
    /// effect on failure; a closed semaphore always fails.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        if !state.closed && state.permits > 0 {
            state.permits -= 1;
            true
        } else {
            false
        }
    }

    /// Returns one permit and wakes blocked acquirers. Never blocks, never
    /// fails; a release racing with [close](Semaphore::close) still lands.
    pub fn release(&self) {
        let mut state = self.state.lock();
        state.permits += 1;
        drop(state);
        self.available.broadcast();
    }

    /// Advisory snapshot; stale as soon as it returns under concurrent use.
    pub fn available_permits(&self) -> u32 {
        self.state.lock().permits
    }

    /// Closes the semaphore: every blocked acquirer unwinds with [Closed]
    /// and all later acquires fail immediately. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        drop(state);
        self.available.broadcast();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    #[test]
    fn negative_permits_rejected() {
        let err = Semaphore::new(-1).unwrap_err();
        assert!(err.to_string().contains("cannot be negative"));
        assert!(Semaphore::new(0).is_ok());
    }

    #[test]
    fn try_acquire_on_empty_has_no_effect() {
        let sem = Semaphore::new(0).unwrap();
        assert!(!sem.try_acquire());
        assert_eq!(sem.available_permits(), 0);
    }

    #[test]
    fn release_adds_exactly_one_permit() {
        let sem = Semaphore::new(0).unwrap();
        sem.release();
        assert_eq!(sem.available_permits(), 1);
        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());
    }

    #[test]
    fn release_wakes_a_blocked_acquirer() {
        let sem = Arc::new(Semaphore::new(0).unwrap());
        let waiter = {
            let sem = sem.clone();
            thread::spawn(move || sem.acquire())
        };
        // Let the waiter park before releasing.
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());
        sem.release();
        assert_eq!(waiter.join().unwrap(), Ok(()));
        assert_eq!(sem.available_permits(), 0);
    }

    #[test]
    fn close_unblocks_waiters_without_consuming() {
        let sem = Arc::new(Semaphore::new(0).unwrap());
        let mut waiters = vec![];
        for _ in 0..4 {
            let sem = sem.clone();
            waiters.push(thread::spawn(move || sem.acquire()));
        }
        thread::sleep(Duration::from_millis(20));
        sem.close();
        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), Err(Closed));
        }
        assert_eq!(sem.available_permits(), 0);
        assert!(!sem.try_acquire());
        assert_eq!(sem.acquire(), Err(Closed));
    }

    #[test]
    fn concurrency_never_exceeds_permits() {
        let sem = Arc::new(Semaphore::new(3).unwrap());
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = vec![];
        for _ in 0..16 {
            let sem = sem.clone();
            let active = active.clone();
            let peak = peak.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    sem.acquire().unwrap();
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::yield_now();
                    active.fetch_sub(1, Ordering::SeqCst);
                    sem.release();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(sem.available_permits(), 3);
    }
}
