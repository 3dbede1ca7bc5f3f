//! Single-slot latest-frame buffer shared between the producer and readers.
//!
//! This is a latest-value overwrite channel, not a queue: every publish
//! replaces the stored frame, slow readers skip intermediate frames, and
//! fast readers may observe the same version repeatedly. No backpressure
//! is applied to the producer.

use std::sync::RwLock;

use bytes::Bytes;

/// A point-in-time view of the buffer contents.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Latest encoded frame; absent until the first publish.
    pub frame: Option<Bytes>,
    /// Publish counter; increases by one with every publish.
    pub version: u64,
}

#[derive(Debug, Default)]
struct Slot {
    frame: Option<Bytes>,
    version: u64,
}

/// Lock-protected holder of the most recently encoded frame.
///
/// Exactly one producer publishes; any number of readers snapshot. The
/// lock is held only across the swap of the stored handle, never across
/// encoding or I/O, so a snapshot burst cannot stall the producer for
/// longer than a reference copy.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    slot: RwLock<Slot>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored frame and return the new version.
    pub fn publish(&self, frame: Bytes) -> u64 {
        let mut slot = self.slot.write().unwrap();
        slot.frame = Some(frame);
        slot.version += 1;
        slot.version
    }

    /// Read the current frame and version.
    ///
    /// The returned handle is a reference-counted view of the published
    /// bytes; cloning it does not copy the frame.
    pub fn snapshot(&self) -> Snapshot {
        let slot = self.slot.read().unwrap();
        Snapshot {
            frame: slot.frame.clone(),
            version: slot.version,
        }
    }

    /// Current publish counter without touching the frame handle.
    pub fn version(&self) -> u64 {
        self.slot.read().unwrap().version
    }
}
