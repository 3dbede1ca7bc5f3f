//! Playback navigation: which video location is active, and how location
//! changes are requested and applied.
//!
//! The controller is owned by the producer loop. External callers only
//! touch the [`NavMailbox`], a single-slot last-write-wins handoff that
//! the producer drains once per production cycle.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

/// One selectable video source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub path: PathBuf,
}

impl Location {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// A pending navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavRequest {
    /// Move to the next location in rotation order.
    Advance,
    /// Jump to a specific location index.
    GoTo(usize),
}

/// Single-slot request mailbox between the navigation API and the
/// producer loop.
///
/// Last write wins: posting a request before the previous one has been
/// applied replaces it. This is a single-producer/single-consumer
/// handoff, not a queue.
#[derive(Debug, Clone, Default)]
pub struct NavMailbox {
    slot: Arc<Mutex<Option<NavRequest>>>,
}

impl NavMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a request, replacing any request not yet applied.
    pub fn post(&self, request: NavRequest) {
        *self.slot.lock().unwrap() = Some(request);
    }

    /// Read and clear the pending request, if any.
    pub fn take(&self) -> Option<NavRequest> {
        self.slot.lock().unwrap().take()
    }
}

/// Tracks the active location among a fixed ordered set.
///
/// `current` is always a valid index into the location set.
#[derive(Debug)]
pub struct NavigationController {
    locations: Vec<Location>,
    current: usize,
}

impl NavigationController {
    /// # Panics
    ///
    /// Panics if `locations` is empty. An empty location set is a
    /// configuration error callers must reject at startup.
    pub fn new(locations: Vec<Location>) -> Self {
        assert!(!locations.is_empty(), "location set must not be empty");
        Self {
            locations,
            current: 0,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_location(&self) -> &Location {
        &self.locations[self.current]
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Apply an explicit navigation request and return the new index.
    ///
    /// An out-of-range target is not fatal: it logs a warning and resets
    /// the rotation to the first location.
    pub fn apply(&mut self, request: NavRequest) -> usize {
        match request {
            NavRequest::Advance => self.advance(),
            NavRequest::GoTo(index) if index < self.locations.len() => {
                info!(index, name = %self.locations[index].name, "navigating to requested location");
                self.current = index;
                self.current
            }
            NavRequest::GoTo(index) => {
                warn!(
                    index,
                    count = self.locations.len(),
                    "navigation target out of range, resetting to first location"
                );
                self.current = 0;
                self.current
            }
        }
    }

    /// Advance to the next location in cyclic order and return the new
    /// index.
    pub fn advance(&mut self) -> usize {
        self.current = (self.current + 1) % self.locations.len();
        self.current
    }
}
