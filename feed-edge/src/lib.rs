//! Edge-side clients: the frame uplink loop and the perimeter alert
//! timer.
//!
//! Both run as plain blocking loops over a `ureq` agent; neither needs an
//! async runtime.

pub mod alert;
pub mod uplink;
