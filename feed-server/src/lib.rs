//! HTTP servers for the simulated camera and drone feeds.
//!
//! Both binaries share the same application: a producer thread decoding
//! the active video location into the frame buffer, and an axum router
//! exposing login, the token-gated MJPEG stream, and status endpoints.
//! The drone variant additionally mounts the navigation endpoint.

pub mod args;
pub mod routes;
pub mod server;
pub mod source_init;
pub mod state;
