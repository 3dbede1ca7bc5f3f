//! Drone feed simulator.
//!
//! Rotates through an ordered set of video locations: natural advance on
//! end of stream, plus an explicit navigation endpoint that jumps to a
//! requested location on the next production cycle.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use feed_core::{
    CredentialStore, FrameBuffer, NavMailbox, NavigationController, Producer, ProducerConfig,
};
use feed_server::args::CommonServerArgs;
use feed_server::source_init::{self, SyntheticParams};
use feed_server::state::AppState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP server for a simulated drone feed with navigation")]
struct Args {
    #[command(flatten)]
    common: CommonServerArgs,

    /// Directory scanned for `.mp4` locations. Requires a build with the
    /// `opencv` feature; without this flag synthetic locations are served.
    #[arg(long, env = "VIDEO_PATH")]
    video_dir: Option<PathBuf>,

    /// Synthetic location names used when no video directory is given.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "Sector A,Sector B,Sector C"
    )]
    locations: Vec<String>,

    #[arg(long, default_value = "640")]
    width: u32,

    #[arg(long, default_value = "480")]
    height: u32,

    /// Frames per loop of each synthetic location.
    #[arg(long, default_value = "240")]
    synthetic_frames: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.common.validate()?;

    let (locations, sources) = match &args.video_dir {
        Some(dir) => {
            let found = source_init::scan_video_dir(dir)?;
            if found.is_empty() {
                anyhow::bail!("No video files found in {}", dir.display());
            }
            source_init::video_feed(found)?
        }
        None => {
            anyhow::ensure!(!args.locations.is_empty(), "at least one location is required");
            source_init::synthetic_feed(
                &args.locations,
                SyntheticParams {
                    width: args.width,
                    height: args.height,
                    frames_per_loop: args.synthetic_frames,
                },
            )
        }
    };
    info!(
        count = locations.len(),
        "serving drone feed over {:?}",
        locations.iter().map(|l| l.name.as_str()).collect::<Vec<_>>()
    );

    let buffer = Arc::new(FrameBuffer::new());
    let mailbox = NavMailbox::new();
    let producer = Producer::new(
        sources,
        NavigationController::new(locations.clone()),
        mailbox.clone(),
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
        navigation: Some(mailbox),
    });

    feed_server::server::run_server(state, &args.common.bind_address, args.common.port).await
}
