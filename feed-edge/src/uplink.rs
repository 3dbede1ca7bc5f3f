//! Frame uplink client.
//!
//! Reads the local frame buffer at its own send interval and pushes each
//! frame to a remote ingestion endpoint with a cached bearer token. An
//! unauthenticated response triggers exactly one login refresh and one
//! retry of the same frame; every other failure is logged and the loop
//! proceeds to the next cycle.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use feed_core::FrameBuffer;

/// Error type for uplink operations.
#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("login rejected with status {0}")]
    LoginRejected(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("no token cached; login first")]
    NotLoggedIn,
}

/// Where and how to push frames.
#[derive(Debug, Clone)]
pub struct UplinkConfig {
    pub login_url: String,
    pub ingest_url: String,
    pub username: String,
    pub password: String,
    /// Interval between pushes; independent of, and typically slower
    /// than, the local production cadence.
    pub send_interval: Duration,
}

/// Outcome of pushing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Accepted by the collector.
    Delivered,
    /// Still unauthenticated after a token refresh; not retried again.
    RejectedAfterRefresh,
    /// Rejected for a non-authentication reason; not retried.
    Failed(u16),
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

pub struct UplinkClient {
    agent: ureq::Agent,
    config: UplinkConfig,
    token: Option<String>,
}

impl UplinkClient {
    pub fn new(config: UplinkConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(5)))
            .build();
        Self {
            agent: agent_config.new_agent(),
            config,
            token: None,
        }
    }

    /// Obtain and cache a fresh token.
    ///
    /// Callers treat a failure here as fatal at startup; the push loop
    /// retries it on later cycles.
    pub fn login(&mut self) -> Result<(), UplinkError> {
        let mut response = self
            .agent
            .post(&self.config.login_url)
            .send_json(serde_json::json!({
                "username": self.config.username,
                "password": self.config.password,
            }))
            .map_err(login_error)?;

        let body: LoginResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| UplinkError::Transport(e.to_string()))?;
        self.token = Some(body.token);
        info!(username = %self.config.username, "obtained uplink token");
        Ok(())
    }

    /// Send one frame; `Ok(None)` means accepted, `Ok(Some(status))` a
    /// rejection with that HTTP status.
    fn send_frame(&self, jpeg: &[u8]) -> Result<Option<u16>, UplinkError> {
        let token = self.token.as_ref().ok_or(UplinkError::NotLoggedIn)?;
        let result = self
            .agent
            .post(&self.config.ingest_url)
            .header("Authorization", &format!("Bearer {token}"))
            .header("Content-Type", "image/jpeg")
            .send(jpeg);

        match result {
            Ok(_) => Ok(None),
            Err(ureq::Error::StatusCode(code)) => Ok(Some(code)),
            Err(e) => Err(UplinkError::Transport(e.to_string())),
        }
    }

    /// Push one frame, refreshing the token and retrying exactly once if
    /// the collector rejects it as unauthenticated.
    pub fn push(&mut self, jpeg: &[u8]) -> Result<PushOutcome, UplinkError> {
        match self.send_frame(jpeg)? {
            None => Ok(PushOutcome::Delivered),
            Some(401) => {
                info!("upload rejected as unauthenticated, refreshing token");
                self.login()?;
                match self.send_frame(jpeg)? {
                    None => Ok(PushOutcome::Delivered),
                    Some(401) => {
                        warn!("upload still unauthenticated after token refresh");
                        Ok(PushOutcome::RejectedAfterRefresh)
                    }
                    Some(status) => {
                        warn!(status, "retried upload rejected");
                        Ok(PushOutcome::Failed(status))
                    }
                }
            }
            Some(status) => {
                warn!(status, "upload rejected");
                Ok(PushOutcome::Failed(status))
            }
        }
    }

    /// Drive the uplink until the process exits.
    ///
    /// Failures of any kind are logged; the loop always proceeds to the
    /// next cycle.
    pub fn run(mut self, buffer: Arc<FrameBuffer>) -> ! {
        info!(
            interval_ms = self.config.send_interval.as_millis() as u64,
            url = %self.config.ingest_url,
            "uplink loop starting"
        );
        loop {
            let snapshot = buffer.snapshot();
            if let Some(jpeg) = snapshot.frame {
                match self.push(&jpeg) {
                    Ok(PushOutcome::Delivered) => {
                        debug!(version = snapshot.version, "frame delivered")
                    }
                    Ok(outcome) => debug!(?outcome, "frame not delivered"),
                    Err(e) => warn!(error = %e, "upload failed"),
                }
            }
            thread::sleep(self.config.send_interval);
        }
    }
}

fn login_error(err: ureq::Error) -> UplinkError {
    match err {
        ureq::Error::StatusCode(code) => UplinkError::LoginRejected(code),
        other => UplinkError::Transport(other.to_string()),
    }
}
