//! Perimeter intrusion detection simulator: posts random breach alerts
//! to the monitoring backend at random intervals.

use std::time::Duration;

use clap::Parser;
use feed_edge::alert::{run, AlertConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Posts simulated perimeter breach alerts")]
struct Args {
    #[arg(long, env = "ALERT_ENDPOINT", default_value = "http://localhost:5000/pids_alert")]
    alert_endpoint: String,

    /// Locations a breach can originate from.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "Sector A,Sector B,Sector C"
    )]
    locations: Vec<String>,

    /// Minimum seconds between alerts.
    #[arg(long, default_value = "5")]
    min_interval: u64,

    /// Maximum seconds between alerts.
    #[arg(long, default_value = "20")]
    max_interval: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    anyhow::ensure!(
        args.min_interval <= args.max_interval,
        "--min-interval must not exceed --max-interval"
    );
    anyhow::ensure!(!args.locations.is_empty(), "at least one location is required");

    run(AlertConfig {
        endpoint: args.alert_endpoint,
        locations: args.locations,
        min_interval: Duration::from_secs(args.min_interval),
        max_interval: Duration::from_secs(args.max_interval),
    })
}
