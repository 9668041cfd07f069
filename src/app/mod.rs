//! Application core — pipeline orchestration behind port traits.
//!
//! Everything here is synchronous and device-free: the service turns bytes
//! into passes, the runner drives it from a [`ports::SerialLink`]. Adapters
//! for real devices live in [`crate::adapters`].

pub mod events;
pub mod ports;
pub mod runner;
pub mod service;
