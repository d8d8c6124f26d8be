use std::{cell::UnsafeCell, mem::MaybeUninit, ptr::null};

use libc::{
    pthread_cond_broadcast, pthread_cond_destroy, pthread_cond_init, pthread_cond_signal,
    pthread_cond_t, pthread_cond_wait,
};

use crate::{CheckOk, MutexGuard};

/// Condition variable backed by a raw pthread cond, waiting on the lock
/// behind a [MutexGuard].
#[derive(Debug)]
pub struct Condvar {
    inner: UnsafeCell<MaybeUninit<pthread_cond_t>>,
}

impl Condvar {
    pub fn new() -> Self {
        let inner = UnsafeCell::new(MaybeUninit::uninit());
        unsafe {
            pthread_cond_init((*inner.get()).as_mut_ptr(), null())
                .r("cond_init")
                .unwrap();
        }
        Self { inner }
    }

    pub fn signal(&self) {
        unsafe {
            if pthread_cond_signal((*self.inner.get()).as_mut_ptr()) != 0 {
                panic!("failed to signal condvar");
            }
        }
    }

    pub fn broadcast(&self) {
        unsafe {
            if pthread_cond_broadcast((*self.inner.get()).as_mut_ptr()) != 0 {
                panic!("failed to broadcast condvar");
            }
        }
    }

    /// Atomically releases the guard's lock and blocks until woken; the lock
    /// is re-held when this returns. Spurious wake-ups are possible, so
    /// callers re-check their predicate in a loop.
    pub fn wait<'m, T>(&self, guard: MutexGuard<'m, T>) -> MutexGuard<'m, T> {
        unsafe {
            if pthread_cond_wait((*self.inner.get()).as_mut_ptr(), guard.get_inner_lock()) != 0 {
                panic!("failed to wait on condvar");
            }
        }
        guard
    }
}

impl Default for Condvar {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl Send for Condvar {}
unsafe impl Sync for Condvar {}

impl Drop for Condvar {
    fn drop(&mut self) {
        if unsafe { pthread_cond_destroy((*self.inner.get()).as_mut_ptr()) } != 0 {
            panic!("failed to destroy condvar");
        }
    }
}
