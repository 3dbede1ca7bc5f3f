//! Core frame production and distribution pipeline shared by the feed
//! simulators.
//!
//! The pipeline is a straight line: a [`FrameSource`] decodes frames from
//! the active video location, the [`Producer`] loop encodes each one to
//! JPEG and publishes it into the [`FrameBuffer`], and any number of
//! readers snapshot the latest frame at their own cadence. Which location
//! is active is decided by the [`NavigationController`], and access to the
//! streamed output is gated by signed, time-limited tokens from
//! [`AccessGate`].

pub mod auth;
pub mod buffer;
pub mod frame;
pub mod mjpeg;
pub mod navigation;
pub mod producer;
pub mod source;

pub use auth::{AccessGate, CredentialStore, TokenError};
pub use buffer::{FrameBuffer, Snapshot};
pub use frame::{encode_gray_jpeg, EncodeError, Frame};
pub use navigation::{Location, NavMailbox, NavRequest, NavigationController};
pub use producer::{CycleOutcome, Producer, ProducerConfig, FALLBACK_FPS};
#[cfg(feature = "opencv")]
pub use source::VideoFileSource;
pub use source::{FrameSource, SourceError, SyntheticSource};
