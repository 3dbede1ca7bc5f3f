//! Perimeter intrusion alert simulator.
//!
//! A trivial timer: every few seconds pick a random location and post a
//! breach alert to the monitoring backend. No state, no concurrency.

use std::thread;
use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{error, info};

/// Alert payload understood by the monitoring backend.
#[derive(Debug, Clone, Serialize)]
pub struct BreachAlert {
    pub location: String,
    pub time: String,
    pub alert_type: String,
}

impl BreachAlert {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            alert_type: "PIDS_BREACH".to_string(),
        }
    }
}

/// Configuration for the alert loop.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    pub endpoint: String,
    pub locations: Vec<String>,
    pub min_interval: Duration,
    pub max_interval: Duration,
}

/// Post one alert. Failures are logged and non-fatal.
pub fn send_alert(agent: &ureq::Agent, endpoint: &str, alert: &BreachAlert) -> bool {
    match agent.post(endpoint).send_json(alert) {
        Ok(_) => {
            info!(location = %alert.location, "alert sent");
            true
        }
        Err(e) => {
            error!(error = %e, "failed to send alert");
            false
        }
    }
}

/// Fire random breach alerts until the process exits.
pub fn run(config: AlertConfig) -> ! {
    let agent = ureq::Agent::new_with_defaults();
    let mut rng = rand::rng();
    loop {
        let location = config
            .locations
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());
        info!(location = %location, "simulated breach");

        let alert = BreachAlert::new(location);
        send_alert(&agent, &config.endpoint, &alert);

        let sleep_secs = rng.random_range(config.min_interval.as_secs()..=config.max_interval.as_secs());
        info!(sleep_secs, "next breach simulation scheduled");
        thread::sleep(Duration::from_secs(sleep_secs));
    }
}
