//! Video source discovery and construction.
//!
//! Mirrors the camera-init indirection of the server binaries: the
//! binaries describe what they want (a video directory, a single file, or
//! the synthetic feed) and get back locations paired with boxed sources
//! ready for the producer.

use std::path::Path;

use anyhow::Context;
use feed_core::{FrameSource, Location, SyntheticSource};
use tracing::info;

/// A source the producer can drive; boxed so file-backed and synthetic
/// feeds share one pipeline type.
pub type BoxedSource = Box<dyn FrameSource + Send>;

/// Dimensions and length of the synthetic feed.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticParams {
    pub width: u32,
    pub height: u32,
    pub frames_per_loop: u32,
}

/// Enumerate `.mp4` files in a directory as locations, in name order.
pub fn scan_video_dir(dir: &Path) -> anyhow::Result<Vec<Location>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read video directory {}", dir.display()))?;

    let mut locations = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_mp4 = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"));
        if is_mp4 {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            locations.push(Location::new(name, path));
        }
    }
    locations.sort_by(|a, b| a.name.cmp(&b.name));

    info!(count = locations.len(), dir = %dir.display(), "enumerated video locations");
    Ok(locations)
}

/// Open one file-backed source per location.
#[cfg(feature = "opencv")]
pub fn video_feed(locations: Vec<Location>) -> anyhow::Result<(Vec<Location>, Vec<BoxedSource>)> {
    let mut sources: Vec<BoxedSource> = Vec::with_capacity(locations.len());
    for location in &locations {
        let source = feed_core::VideoFileSource::open(&location.path)
            .with_context(|| format!("failed to open video source {}", location.path.display()))?;
        sources.push(Box::new(source));
    }
    Ok((locations, sources))
}

/// Without the `opencv` feature file-backed feeds are a configuration
/// error rather than a silent fallback.
#[cfg(not(feature = "opencv"))]
pub fn video_feed(locations: Vec<Location>) -> anyhow::Result<(Vec<Location>, Vec<BoxedSource>)> {
    let _ = locations;
    anyhow::bail!("video file playback requires a build with the `opencv` feature")
}

/// Build one synthetic location + source per name, shaded per index so
/// the locations are visually distinct.
pub fn synthetic_feed(
    names: &[String],
    params: SyntheticParams,
) -> (Vec<Location>, Vec<BoxedSource>) {
    let locations: Vec<Location> = names
        .iter()
        .map(|name| Location::new(name.clone(), format!("synthetic://{name}")))
        .collect();
    let sources = locations
        .iter()
        .enumerate()
        .map(|(index, _)| {
            Box::new(SyntheticSource::new(
                params.width,
                params.height,
                params.frames_per_loop,
                (index as u8).wrapping_mul(40),
            )) as BoxedSource
        })
        .collect();
    (locations, sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_feed_pairs_locations_with_sources() {
        let names = vec!["Sector A".to_string(), "Sector B".to_string()];
        let (locations, sources) = synthetic_feed(
            &names,
            SyntheticParams {
                width: 8,
                height: 8,
                frames_per_loop: 4,
            },
        );
        assert_eq!(locations.len(), 2);
        assert_eq!(sources.len(), 2);
        assert_eq!(locations[0].name, "Sector A");
    }

    #[test]
    fn test_scan_video_dir_filters_and_sorts() {
        let dir = std::env::temp_dir().join(format!("feed-scan-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b.mp4"), b"").unwrap();
        std::fs::write(dir.join("a.mp4"), b"").unwrap();
        std::fs::write(dir.join("notes.txt"), b"").unwrap();

        let locations = scan_video_dir(&dir).unwrap();
        let names: Vec<&str> = locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
