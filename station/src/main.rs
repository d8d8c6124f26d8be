use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Duration,
};

use clap::Parser;
use crossbeam_channel::unbounded;

pub mod car;
pub mod cli;
pub mod event;
pub mod pump;
pub mod station;
pub mod waiting_area;

use cli::Args;
use station::{Config, Station};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::new(args.capacity, args.pumps, args.cars)?.with_timing(
        Duration::from_millis(args.arrival_delay_ms),
        Duration::from_millis(args.service_time_ms),
    );

    let station = Station::new(config)?;
    let shutdown = station.shutdown_handle();

    let pressed = AtomicBool::new(false);
    ctrlc::set_handler(move || {
        if pressed.swap(true, Ordering::Relaxed) {
            eprintln!("Killing");
            std::process::exit(1);
        } else {
            eprintln!("CTRL-C received, finishing in-flight cars (press again to kill)");
            shutdown.request();
        }
    })?;

    let (tx, rx) = unbounded();
    let printer = thread::spawn(move || {
        for event in rx {
            println!("{event}");
        }
    });

    println!(
        "Service station open: capacity {}, {} pumps, {} cars incoming",
        config.capacity, config.pumps, config.cars
    );

    let report = station.run(tx);
    printer.join().expect("event printer panicked");

    if report.interrupted {
        println!(
            "\nInterrupted: {} of {} cars arrived, {} serviced",
            report.arrived, config.cars, report.serviced
        );
    } else {
        println!("\nAll {} cars serviced", report.serviced);
    }
    Ok(())
}
