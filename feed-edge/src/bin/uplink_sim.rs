//! Edge uplink simulator.
//!
//! Decodes frames locally on a producer thread, then pushes the latest
//! frame to a remote collector at a fixed send interval with a cached
//! bearer token. An initial login failure is fatal; everything after
//! startup is logged and retried on later cycles.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use feed_core::{
    FrameBuffer, FrameSource, Location, NavMailbox, NavigationController, Producer,
    ProducerConfig, SyntheticSource,
};
use feed_edge::uplink::{UplinkClient, UplinkConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pushes locally decoded frames to a remote collector")]
struct Args {
    /// Login endpoint of the collector.
    #[arg(long, default_value = "http://localhost:5000/login")]
    login_url: String,

    /// Frame ingestion endpoint of the collector.
    #[arg(long, default_value = "http://localhost:5000/ingest")]
    ingest_url: String,

    #[arg(long, default_value = "testUser")]
    username: String,

    #[arg(long, default_value = "testPass")]
    password: String,

    /// Seconds between uploads.
    #[arg(long, default_value = "1.0")]
    send_interval_secs: f64,

    /// Video file to decode. Requires a build with the `opencv` feature;
    /// without this flag the built-in synthetic feed is pushed.
    #[arg(long, env = "VIDEO_PATH")]
    video: Option<PathBuf>,

    #[arg(long, default_value = "640")]
    width: u32,

    #[arg(long, default_value = "480")]
    height: u32,

    /// Frames per loop of the synthetic feed.
    #[arg(long, default_value = "240")]
    synthetic_frames: u32,

    /// JPEG quality of pushed frames (1-100).
    #[arg(long, default_value = "80")]
    jpeg_quality: u8,
}

#[cfg(feature = "opencv")]
fn open_video(path: &Path) -> anyhow::Result<Box<dyn FrameSource + Send>> {
    let source = feed_core::VideoFileSource::open(path)
        .with_context(|| format!("failed to open video source {}", path.display()))?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "opencv"))]
fn open_video(path: &Path) -> anyhow::Result<Box<dyn FrameSource + Send>> {
    anyhow::bail!(
        "--video {} requires a build with the `opencv` feature",
        path.display()
    )
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    anyhow::ensure!(
        args.send_interval_secs.is_finite() && args.send_interval_secs > 0.0,
        "--send-interval-secs must be a positive number"
    );

    let (location, source): (Location, Box<dyn FrameSource + Send>) = match &args.video {
        Some(path) => {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "uplink".to_string());
            (Location::new(name, path.clone()), open_video(path)?)
        }
        None => (
            Location::new("uplink", "synthetic://uplink"),
            Box::new(SyntheticSource::new(
                args.width,
                args.height,
                args.synthetic_frames,
                0,
            )),
        ),
    };
    info!(location = %location.name, "decoding local feed");

    let buffer = Arc::new(FrameBuffer::new());
    let producer = Producer::new(
        vec![source],
        NavigationController::new(vec![location]),
        NavMailbox::new(),
        buffer.clone(),
        ProducerConfig {
            jpeg_quality: args.jpeg_quality,
            ..ProducerConfig::default()
        },
    );

    info!("Starting background producer loop...");
    std::thread::spawn(move || producer.run());

    let mut client = UplinkClient::new(UplinkConfig {
        login_url: args.login_url,
        ingest_url: args.ingest_url,
        username: args.username,
        password: args.password,
        send_interval: Duration::from_secs_f64(args.send_interval_secs),
    });
    client.login().context("initial login failed")?;

    client.run(buffer)
}
