//! Oracle presence pipeline library.
//!
//! Exposes the pipeline stages, the application core and the adapters for
//! the binary and for integration testing. Everything except the serial
//! adapter builds without the `cli` feature.

#![deny(unused_must_use)]

pub mod actuation;
pub mod adapters;
pub mod analysis;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod lidar;
