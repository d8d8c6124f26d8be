use clap::Parser;

/// Car wash service station simulation
#[derive(Debug, Clone, Parser)]
pub struct Args {
    /// Waiting area capacity (cars queued at once)
    #[arg(short, long)]
    pub capacity: i64,

    /// Number of pumps (service bays)
    #[arg(short, long)]
    pub pumps: i64,

    /// Number of cars arriving over the run
    #[arg(short = 'n', long)]
    pub cars: i64,

    /// Delay between car arrivals, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub arrival_delay_ms: u64,

    /// Time to service one car, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub service_time_ms: u64,
}
