//! Shared application state for the feed servers.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use feed_core::{AccessGate, CredentialStore, FrameBuffer, NavMailbox};

/// State shared by every request handler.
///
/// Wrap in `Arc` and hand to the router; the producer thread holds its
/// own clones of the buffer and mailbox.
pub struct AppState {
    pub gate: AccessGate,
    pub credentials: CredentialStore,
    pub buffer: Arc<FrameBuffer>,
    /// Interval between parts emitted to one streaming client.
    pub stream_interval: Duration,
    /// Display names of the configured locations, in rotation order.
    pub location_names: Vec<String>,
    /// Active location index, published by the producer loop.
    pub active_index: Arc<AtomicUsize>,
    /// Navigation request mailbox; `None` for the fixed-camera server.
    pub navigation: Option<NavMailbox>,
}
