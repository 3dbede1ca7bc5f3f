//! Fixed-camera feed simulator.
//!
//! Serves one video location as a token-gated MJPEG stream. The source
//! loops forever: on end of stream it rewinds and keeps going. There is
//! no navigation endpoint.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use feed_core::{
    CredentialStore, FrameBuffer, Location, NavMailbox, NavigationController, Producer,
    ProducerConfig,
};
use feed_server::args::CommonServerArgs;
use feed_server::source_init::{self, SyntheticParams};
use feed_server::state::AppState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP server for a simulated fixed camera feed")]
struct Args {
    #[command(flatten)]
    common: CommonServerArgs,

    /// Video file to serve. Requires a build with the `opencv` feature;
    /// without this flag the built-in synthetic feed is served.
    #[arg(long, env = "VIDEO_PATH")]
    video: Option<PathBuf>,

    #[arg(long, default_value = "640")]
    width: u32,

    #[arg(long, default_value = "480")]
    height: u32,

    /// Frames per loop of the synthetic feed.
    #[arg(long, default_value = "240")]
    synthetic_frames: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.common.validate()?;

    let (locations, sources) = match &args.video {
        Some(path) => {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "camera".to_string());
            source_init::video_feed(vec![Location::new(name, path.clone())])?
        }
        None => source_init::synthetic_feed(
            &["camera".to_string()],
            SyntheticParams {
                width: args.width,
                height: args.height,
                frames_per_loop: args.synthetic_frames,
            },
        ),
    };
    info!(location = %locations[0].name, "serving single camera feed");

    let buffer = Arc::new(FrameBuffer::new());
    let mailbox = NavMailbox::new();
    let producer = Producer::new(
        sources,
        NavigationController::new(locations.clone()),
        mailbox,
        buffer.clone(),
        ProducerConfig {
            fallback_fps: args.common.fallback_fps,
            jpeg_quality: args.common.jpeg_quality,
        },
    );
    let active_index = producer.active_index();

    info!("Starting background producer loop...");
    std::thread::spawn(move || producer.run());

    let state = Arc::new(AppState {
        gate: feed_core::AccessGate::new(
            &args.common.secret,
            Duration::from_secs(args.common.token_validity_secs),
        ),
        credentials: CredentialStore::from_pairs(args.common.credentials.clone()),
        buffer,
        stream_interval: Duration::from_secs_f64(1.0 / args.common.fallback_fps),
        location_names: locations.iter().map(|l| l.name.clone()).collect(),
        active_index,
        navigation: None,
    });

    feed_server::server::run_server(state, &args.common.bind_address, args.common.port).await
}
