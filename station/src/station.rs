use std::{sync::Arc, thread, time::Duration};

use anyhow::bail;
use crossbeam_channel::Sender;
use semaphore::Semaphore;

use crate::{
    car::{self, Car},
    event::Event,
    pump,
    waiting_area::SharedQueue,
};

/// Largest waiting area the station will accept.
pub const MAX_CAPACITY: usize = 1024;
/// One thread per pump, so the pump count gets the same sanity bound.
pub const MAX_PUMPS: usize = 1024;

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub capacity: usize,
    pub pumps: usize,
    pub cars: usize,
    pub arrival_delay: Duration,
    pub service_time: Duration,
}

impl Config {
    /// Validates the three station quantities. Capacity and pump count must
    /// be positive and sane; zero cars is a valid (empty) run. Any violation
    /// is fatal before a single task starts.
    pub fn new(capacity: i64, pumps: i64, cars: i64) -> anyhow::Result<Self> {
        if capacity <= 0 {
            bail!("waiting area capacity must be positive, got {capacity}");
        }
        if capacity > MAX_CAPACITY as i64 {
            bail!("waiting area capacity {capacity} exceeds the maximum of {MAX_CAPACITY}");
        }
        if pumps <= 0 {
            bail!("number of pumps must be positive, got {pumps}");
        }
        if pumps > MAX_PUMPS as i64 {
            bail!("number of pumps {pumps} exceeds the maximum of {MAX_PUMPS}");
        }
        if cars < 0 {
            bail!("number of cars cannot be negative, got {cars}");
        }
        Ok(Self {
            capacity: capacity as usize,
            pumps: pumps as usize,
            cars: cars as usize,
            arrival_delay: Duration::from_millis(500),
            service_time: Duration::from_millis(1000),
        })
    }

    pub fn with_timing(mut self, arrival_delay: Duration, service_time: Duration) -> Self {
        self.arrival_delay = arrival_delay;
        self.service_time = service_time;
        self
    }
}

/// Everything the car and pump tasks share: the guarded waiting area plus
/// the station's semaphores.
#[derive(Debug)]
pub struct Shared {
    /// Waiting area behind its mutual-exclusion permit.
    pub queue: SharedQueue,
    /// Free waiting-area slots; arriving cars block here at capacity.
    pub empty: Semaphore,
    /// Cars waiting for service; pumps block here when the queue is dry.
    pub full: Semaphore,
    /// Station-wide cap on concurrent service operations.
    pub bays: Semaphore,
    /// One permit per finished car; the orchestrator drains these before
    /// shutting the pumps down.
    pub serviced: Semaphore,
}

impl Shared {
    pub(crate) fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            queue: SharedQueue::new(config.capacity)?,
            empty: Semaphore::new(config.capacity as i32)?,
            full: Semaphore::new(0)?,
            bays: Semaphore::new(config.pumps as i32)?,
            serviced: Semaphore::new(0)?,
        })
    }
}

/// Cooperative cancellation for a running station.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    shared: Arc<Shared>,
}

impl ShutdownHandle {
    /// Stops admitting new cars and stops waiting for the drain. Cars
    /// already being serviced finish; cars still waiting are abandoned and
    /// show up in the report as arrived-but-not-serviced.
    pub fn request(&self) {
        self.shared.empty.close();
        self.shared.serviced.close();
    }
}

/// Outcome of one full run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub arrived: usize,
    pub serviced: usize,
    pub interrupted: bool,
}

pub struct Station {
    config: Config,
    shared: Arc<Shared>,
}

impl Station {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Ok(Self {
            shared: Arc::new(Shared::new(&config)?),
            config,
        })
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shared: self.shared.clone(),
        }
    }

    /// Runs the simulation to completion.
    ///
    /// Pumps start first so the earliest arrivals always have a consumer,
    /// then one car thread is spawned per arrival with a fixed inter-arrival
    /// delay. Shutdown is a graceful drain: join every car, wait for one
    /// serviced credit per admitted car, then close the filled-slot
    /// semaphore so idle pumps unwind and the scope can join them.
    pub fn run(&self, events: Sender<Event>) -> RunReport {
        let shared = &*self.shared;
        let config = self.config;

        thread::scope(|s| {
            for id in 1..=config.pumps {
                let events = &events;
                s.spawn(move || pump::run(id, shared, events, config.service_time));
            }

            let mut arrivals = Vec::new();
            for ordinal in 1..=config.cars {
                let car = Car::new(ordinal);
                let events = &events;
                arrivals.push(s.spawn(move || car::arrive(car, shared, events)));
                thread::sleep(config.arrival_delay);
            }

            // A car thread reports success only once its car is in the
            // queue, so this is exactly the number of drain credits to wait
            // for.
            let mut arrived = 0;
            for handle in arrivals {
                if matches!(handle.join(), Ok(Ok(()))) {
                    arrived += 1;
                }
            }

            let mut serviced = 0;
            for _ in 0..arrived {
                if shared.serviced.acquire().is_err() {
                    break;
                }
                serviced += 1;
            }

            // Drained (or the drain was cancelled); unpark the pumps so the
            // scope can join them.
            shared.full.close();

            RunReport {
                arrived,
                serviced,
                interrupted: arrived < config.cars || serviced < arrived,
            }
        })
    }
}
