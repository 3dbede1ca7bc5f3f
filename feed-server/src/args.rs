//! Shared command-line arguments for the feed server binaries.

use clap::Args;
use tracing::warn;

/// Built-in development secret; serving with it gets a startup warning.
const DEFAULT_SECRET: &str = "temp_key";

/// Arguments common to every feed server.
#[derive(Args, Debug, Clone)]
pub struct CommonServerArgs {
    #[arg(short = 'p', long, default_value = "5000")]
    pub port: u16,

    #[arg(short = 'b', long, default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Token signing secret.
    #[arg(long, env = "FEED_SECRET_KEY", default_value = DEFAULT_SECRET)]
    pub secret: String,

    /// How long an issued token stays valid, in seconds.
    #[arg(long, default_value = "300")]
    pub token_validity_secs: u64,

    /// `user:pass` pair accepted by the login endpoint; repeatable.
    #[arg(long = "credential", value_parser = parse_credential, default_value = "testUser:testPass")]
    pub credentials: Vec<(String, String)>,

    /// JPEG quality of published frames (1-100).
    #[arg(long, default_value = "80")]
    pub jpeg_quality: u8,

    /// Frame rate assumed when a source does not report one.
    #[arg(long, default_value = "23.98")]
    pub fallback_fps: f64,
}

impl CommonServerArgs {
    /// Sanity-check argument values; call before assembling the pipeline.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.fallback_fps.is_finite() && self.fallback_fps > 0.0,
            "--fallback-fps must be a positive number"
        );
        anyhow::ensure!(
            (1..=100).contains(&self.jpeg_quality),
            "--jpeg-quality must be between 1 and 100"
        );
        if self.secret == DEFAULT_SECRET {
            warn!("Secret key not configured, using built-in default");
        }
        Ok(())
    }
}

fn parse_credential(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(user, pass)| (user.to_string(), pass.to_string()))
        .ok_or_else(|| format!("expected user:pass, got {raw}"))
}
