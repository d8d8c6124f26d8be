use std::{thread, time::Duration};

use crossbeam_channel::Sender;

use crate::{event::Event, station::Shared, waiting_area::WaitingArea};

/// Service loop for one pump. Runs until the filled-slot semaphore is
/// closed, which is the station's shutdown signal.
///
/// Mutual exclusion is never held across the bay acquire or the service
/// sleep; it covers only the dequeue itself.
pub fn run(pump: usize, shared: &Shared, events: &Sender<Event>, service_time: Duration) {
    loop {
        // Blocks until a car is waiting; Err means shutdown.
        if shared.full.acquire().is_err() {
            break;
        }

        let car = match shared.queue.with(WaitingArea::dequeue) {
            Ok(car) => car,
            Err(_) => break,
        };

        // The slot is free either way; this accounts for queue capacity,
        // not dequeue success.
        shared.empty.release();

        let Some(car) = car else {
            // Another pump drained the slot between the wake-up and the
            // lock. Not an error; go back to waiting.
            continue;
        };

        // Best effort: with one thread per pump a bay permit is always
        // there. Proceeding without one beats deadlocking the pump.
        let bay = shared.bays.try_acquire();

        let _ = events.send(Event::ServiceStart {
            pump,
            car: car.name(),
        });

        thread::sleep(service_time);

        let _ = events.send(Event::ServiceDone {
            pump,
            car: car.name(),
        });

        if bay {
            shared.bays.release();
        }

        // Drain credit for the orchestrator.
        shared.serviced.release();
    }
}
