use std::cell::UnsafeCell;

use semaphore::{Closed, Semaphore};

use crate::car::Car;

/// Bounded FIFO of cars: a ring over a boxed slice with wrapping read/write
/// counters. Length is `write - read`; both only move forward.
#[derive(Debug)]
pub struct WaitingArea {
    buffer: Box<[Option<Car>]>,
    read: usize,
    write: usize,
}

impl WaitingArea {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "waiting area needs at least one slot");
        Self {
            buffer: vec![None; capacity].into_boxed_slice(),
            read: 0,
            write: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn len(&self) -> usize {
        self.write.wrapping_sub(self.read)
    }

    pub fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// Caller must have reserved a slot (an empty-slot permit); the ring
    /// never overwrites a live entry.
    pub fn enqueue(&mut self, car: Car) {
        debug_assert!(self.len() < self.capacity());
        let id = self.write % self.buffer.len();
        self.buffer[id] = Some(car);
        self.write = self.write.wrapping_add(1);
    }

    /// Empty is a first-class result, not an error: a woken pump may find
    /// that another pump already drained the last slot.
    pub fn dequeue(&mut self) -> Option<Car> {
        if self.is_empty() {
            return None;
        }
        let id = self.read % self.buffer.len();
        let car = self.buffer[id].take();
        self.read = self.read.wrapping_add(1);
        car
    }
}

/// The waiting area behind its mutual-exclusion semaphore (one permit).
///
/// [with](SharedQueue::with) is the only way to reach the queue: the permit
/// is held for the whole closure and returned by a drop guard, so it is not
/// lost even if the closure panics. That single permit is what makes the
/// `UnsafeCell` interior sound.
#[derive(Debug)]
pub struct SharedQueue {
    mutex: Semaphore,
    area: UnsafeCell<WaitingArea>,
}

unsafe impl Sync for SharedQueue {}

impl SharedQueue {
    pub fn new(capacity: usize) -> anyhow::Result<Self> {
        Ok(Self {
            mutex: Semaphore::new(1)?,
            area: UnsafeCell::new(WaitingArea::new(capacity)),
        })
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut WaitingArea) -> R) -> Result<R, Closed> {
        self.mutex.acquire()?;
        let _permit = ReleaseOnDrop(&self.mutex);
        // Safety: the mutex semaphore has a single permit and we hold it for
        // the whole borrow.
        let area = unsafe { &mut *self.area.get() };
        Ok(f(area))
    }
}

struct ReleaseOnDrop<'a>(&'a Semaphore);

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.release();
    }
}
