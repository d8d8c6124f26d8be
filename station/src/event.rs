use std::fmt;

use crate::car::CarName;

/// Lifecycle notifications emitted by the car and pump tasks. The tasks only
/// send values over the channel; rendering them is the printer's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A car entered the waiting area; `waiting` is the queue length right
    /// after the enqueue.
    Arrive { car: CarName, waiting: usize },
    ServiceStart { pump: usize, car: CarName },
    ServiceDone { pump: usize, car: CarName },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Arrive { car, waiting } => {
                write!(f, "[ARRIVE] {car} joined the queue. Waiting: {waiting}")
            }
            Event::ServiceStart { pump, car } => {
                write!(f, "[SERVICE] Pump {pump} is washing {car}")
            }
            Event::ServiceDone { pump, car } => {
                write!(f, "[DONE] Pump {pump} finished {car}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::Car;

    #[test]
    fn renders_console_lines() {
        let car = Car::new(7).name();
        assert_eq!(
            Event::Arrive { car, waiting: 2 }.to_string(),
            "[ARRIVE] C7 joined the queue. Waiting: 2"
        );
        assert_eq!(
            Event::ServiceStart { pump: 1, car }.to_string(),
            "[SERVICE] Pump 1 is washing C7"
        );
        assert_eq!(
            Event::ServiceDone { pump: 1, car }.to_string(),
            "[DONE] Pump 1 finished C7"
        );
    }
}
