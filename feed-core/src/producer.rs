//! The producer loop: pulls frames from the active source, encodes them
//! to JPEG, and publishes into the shared frame buffer.
//!
//! Exactly one producer runs per process. It is the sole writer to the
//! frame buffer and the sole owner of the navigation state; the rest of
//! the process only reaches it through the request mailbox.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::buffer::FrameBuffer;
use crate::frame::encode_gray_jpeg;
use crate::navigation::{NavMailbox, NavigationController};
use crate::source::FrameSource;

/// Frame rate assumed when the active source does not report one.
pub const FALLBACK_FPS: f64 = 23.98;

/// Tuning knobs for the producer loop.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Frame rate used when the active source reports none.
    pub fallback_fps: f64,
    /// JPEG quality of published frames (1-100).
    pub jpeg_quality: u8,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            fallback_fps: FALLBACK_FPS,
            jpeg_quality: 80,
        }
    }
}

/// What a single production cycle did.
///
/// Returned by [`Producer::cycle`] so tests can drive the loop
/// deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A frame was encoded and published at this buffer version.
    Published(u64),
    /// The active source hit end of stream; navigation was applied and
    /// nothing was published.
    SourceExhausted,
    /// A frame was pulled but dropped (decode or encode failure).
    Dropped,
}

/// Drives the decode → encode → publish pipeline at the source cadence.
pub struct Producer<S> {
    sources: Vec<S>,
    nav: NavigationController,
    requests: NavMailbox,
    buffer: Arc<FrameBuffer>,
    active_index: Arc<AtomicUsize>,
    cadence: Duration,
    config: ProducerConfig,
}

impl<S: FrameSource> Producer<S> {
    /// # Panics
    ///
    /// Panics if `sources` does not line up one-to-one with the
    /// controller's locations.
    pub fn new(
        sources: Vec<S>,
        nav: NavigationController,
        requests: NavMailbox,
        buffer: Arc<FrameBuffer>,
        config: ProducerConfig,
    ) -> Self {
        assert_eq!(
            sources.len(),
            nav.locations().len(),
            "one source per location"
        );
        let mut producer = Self {
            sources,
            nav,
            requests,
            buffer,
            active_index: Arc::new(AtomicUsize::new(0)),
            cadence: Duration::from_secs(1),
            config,
        };
        producer.refresh_cadence();
        producer
    }

    /// Shared handle reporting the active location index. Telemetry only;
    /// navigation itself goes through the mailbox.
    pub fn active_index(&self) -> Arc<AtomicUsize> {
        self.active_index.clone()
    }

    /// Interval between published frames for the active source.
    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    fn refresh_cadence(&mut self) {
        let reported = self.sources[self.nav.current()]
            .frame_rate()
            .unwrap_or(self.config.fallback_fps);
        let fps = if reported.is_finite() && reported > 0.0 {
            reported
        } else {
            self.config.fallback_fps
        };
        self.cadence = Duration::from_secs_f64(1.0 / fps);
    }

    fn switch_to(&mut self, index: usize) {
        if let Err(e) = self.sources[index].rewind() {
            warn!(index, error = %e, "failed to rewind selected source");
        }
        self.active_index.store(index, Ordering::Relaxed);
        self.refresh_cadence();
    }

    /// Run one production cycle: apply pending navigation, pull one
    /// frame, encode and publish it.
    ///
    /// An explicit navigation request pre-empts the natural end-of-stream
    /// advance; at most one location transition happens per cycle.
    pub fn cycle(&mut self) -> CycleOutcome {
        let explicit = match self.requests.take() {
            Some(request) => {
                let index = self.nav.apply(request);
                info!(index, name = %self.nav.current_location().name, "applied navigation request");
                self.switch_to(index);
                true
            }
            None => false,
        };

        let current = self.nav.current();
        match self.sources[current].next_frame() {
            Ok(Some(frame)) => match encode_gray_jpeg(&frame, self.config.jpeg_quality) {
                Ok(jpeg) => {
                    let version = self.buffer.publish(jpeg);
                    debug!(version, location = current, "published frame");
                    CycleOutcome::Published(version)
                }
                Err(e) => {
                    warn!(location = current, error = %e, "encode failed, dropping frame");
                    CycleOutcome::Dropped
                }
            },
            Ok(None) => {
                if let Err(e) = self.sources[current].rewind() {
                    warn!(location = current, error = %e, "failed to rewind exhausted source");
                }
                if !explicit {
                    let next = self.nav.advance();
                    debug!(from = current, to = next, "source exhausted, advancing");
                    if next != current {
                        self.switch_to(next);
                    }
                }
                CycleOutcome::SourceExhausted
            }
            Err(e) => {
                warn!(location = current, error = %e, "decode failed, dropping frame");
                CycleOutcome::Dropped
            }
        }
    }

    /// Drive the pipeline until the process exits.
    ///
    /// End-of-stream cycles publish nothing and roll straight into the
    /// next cycle; every other cycle sleeps out the cadence interval.
    /// Mid-stream failures never stop the loop.
    pub fn run(mut self) -> ! {
        info!(
            locations = self.nav.locations().len(),
            cadence_ms = self.cadence.as_millis() as u64,
            "producer loop starting"
        );
        loop {
            match self.cycle() {
                CycleOutcome::SourceExhausted => {}
                _ => thread::sleep(self.cadence),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{Location, NavRequest};
    use crate::source::{SourceError, SyntheticSource};
    use crate::Frame;

    fn locations(names: &[&str]) -> NavigationController {
        NavigationController::new(
            names
                .iter()
                .map(|name| Location::new(*name, format!("synthetic://{name}")))
                .collect(),
        )
    }

    fn producer_with_frame_counts(
        names: &[&str],
        frames_per_source: u32,
    ) -> (Producer<SyntheticSource>, NavMailbox, Arc<FrameBuffer>) {
        let sources = (0..names.len())
            .map(|i| SyntheticSource::new(8, 8, frames_per_source, (i as u8).wrapping_mul(40)))
            .collect();
        let mailbox = NavMailbox::new();
        let buffer = Arc::new(FrameBuffer::new());
        let producer = Producer::new(
            sources,
            locations(names),
            mailbox.clone(),
            buffer.clone(),
            ProducerConfig::default(),
        );
        (producer, mailbox, buffer)
    }

    /// Drive cycles until one publishes, returning the active location at
    /// publish time. End-of-stream cycles are not production cycles.
    fn next_published_location(
        producer: &mut Producer<SyntheticSource>,
        active: &Arc<AtomicUsize>,
    ) -> usize {
        loop {
            match producer.cycle() {
                CycleOutcome::Published(_) => return active.load(Ordering::Relaxed),
                CycleOutcome::SourceExhausted => {}
                CycleOutcome::Dropped => panic!("synthetic source dropped a frame"),
            }
        }
    }

    #[test]
    fn test_seven_cycle_rotation_over_three_locations() {
        let names = ["A", "B", "C"];
        let (mut producer, _mailbox, _buffer) = producer_with_frame_counts(&names, 2);
        let active = producer.active_index();

        let observed: Vec<&str> = (0..7)
            .map(|_| names[next_published_location(&mut producer, &active)])
            .collect();
        assert_eq!(observed, vec!["A", "A", "B", "B", "C", "C", "A"]);
    }

    #[test]
    fn test_goto_overrides_pending_advance_in_same_cycle() {
        let (mut producer, mailbox, _buffer) = producer_with_frame_counts(&["A", "B", "C"], 4);
        let active = producer.active_index();

        mailbox.post(NavRequest::Advance);
        mailbox.post(NavRequest::GoTo(2));

        assert!(matches!(producer.cycle(), CycleOutcome::Published(_)));
        assert_eq!(active.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_invalid_goto_resets_to_first_location() {
        let (mut producer, mailbox, _buffer) = producer_with_frame_counts(&["A", "B", "C"], 4);
        let active = producer.active_index();

        mailbox.post(NavRequest::GoTo(1));
        producer.cycle();
        assert_eq!(active.load(Ordering::Relaxed), 1);

        mailbox.post(NavRequest::GoTo(9));
        producer.cycle();
        assert_eq!(active.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_reselecting_current_location_rewinds_it() {
        let (mut producer, mailbox, _buffer) = producer_with_frame_counts(&["A"], 4);

        let first = producer.cycle();
        producer.cycle();
        mailbox.post(NavRequest::GoTo(0));
        // After the rewind the next published frame is the first frame
        // again, which publishes at a fresh version.
        let republished = producer.cycle();
        assert!(matches!(first, CycleOutcome::Published(1)));
        assert!(matches!(republished, CycleOutcome::Published(3)));
    }

    #[test]
    fn test_single_location_loops_on_end_of_stream() {
        let (mut producer, _mailbox, buffer) = producer_with_frame_counts(&["A"], 2);
        let active = producer.active_index();

        for _ in 0..6 {
            next_published_location(&mut producer, &active);
            assert_eq!(active.load(Ordering::Relaxed), 0);
        }
        assert_eq!(buffer.version(), 6);
    }

    #[test]
    fn test_navigation_applied_between_cycles() {
        let names = ["A", "B", "C"];
        let (mut producer, mailbox, _buffer) = producer_with_frame_counts(&names, 8);
        let active = producer.active_index();

        assert_eq!(next_published_location(&mut producer, &active), 0);
        mailbox.post(NavRequest::GoTo(1));
        assert_eq!(next_published_location(&mut producer, &active), 1);
        mailbox.post(NavRequest::Advance);
        assert_eq!(next_published_location(&mut producer, &active), 2);
    }

    struct FailingSource;

    impl FrameSource for FailingSource {
        fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
            Err(SourceError::Decode("injected failure".into()))
        }

        fn rewind(&mut self) -> Result<(), SourceError> {
            Ok(())
        }
    }

    #[test]
    fn test_decode_failure_drops_frame_and_continues() {
        let buffer = Arc::new(FrameBuffer::new());
        let mut producer = Producer::new(
            vec![FailingSource],
            locations(&["A"]),
            NavMailbox::new(),
            buffer.clone(),
            ProducerConfig::default(),
        );

        assert_eq!(producer.cycle(), CycleOutcome::Dropped);
        assert_eq!(producer.cycle(), CycleOutcome::Dropped);
        assert_eq!(buffer.version(), 0);
    }

    #[test]
    fn test_cadence_follows_source_frame_rate() {
        let sources = vec![SyntheticSource::new(8, 8, 4, 0).with_fps(10.0)];
        let producer = Producer::new(
            sources,
            locations(&["A"]),
            NavMailbox::new(),
            Arc::new(FrameBuffer::new()),
            ProducerConfig::default(),
        );
        assert_eq!(producer.cadence(), Duration::from_millis(100));
    }

    #[test]
    fn test_cadence_falls_back_when_source_reports_none() {
        let buffer = Arc::new(FrameBuffer::new());
        let producer = Producer::new(
            vec![FailingSource],
            locations(&["A"]),
            NavMailbox::new(),
            buffer,
            ProducerConfig {
                fallback_fps: 20.0,
                ..ProducerConfig::default()
            },
        );
        assert_eq!(producer.cadence(), Duration::from_millis(50));
    }
}
