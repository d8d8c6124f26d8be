use std::fmt::{self, Write};

use arrayvec::ArrayString;
use crossbeam_channel::Sender;
use semaphore::Closed;

use crate::{event::Event, station::Shared};

pub type CarName = ArrayString<24>;

/// One arriving car. Identity only; immutable once created. A car is owned
/// by its arrival task until it lands in the waiting area, then by whichever
/// pump dequeues it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Car {
    name: CarName,
}

impl Car {
    pub fn new(ordinal: usize) -> Self {
        let mut name = CarName::new();
        write!(name, "C{ordinal}").unwrap();
        Self { name }
    }

    pub fn name(&self) -> CarName {
        self.name
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Arrival protocol, run once per car on its own thread.
///
/// Blocks on a free waiting-area slot, enqueues under mutual exclusion, then
/// signals the pumps. `Err(Closed)` means the station stopped admitting cars
/// while this one was still outside; it exits without having touched the
/// queue or released anything.
pub fn arrive(car: Car, shared: &Shared, events: &Sender<Event>) -> Result<(), Closed> {
    shared.empty.acquire()?;

    let waiting = shared.queue.with(|area| {
        area.enqueue(car);
        area.len()
    })?;

    let _ = events.send(Event::Arrive {
        car: car.name,
        waiting,
    });

    // One more car available for the pumps.
    shared.full.release();
    Ok(())
}
