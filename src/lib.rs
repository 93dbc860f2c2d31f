//! Relay prop firmware library.
//!
//! Exposes the pure-logic modules for integration testing and fuzzing.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod channels;
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod pins;
pub mod registry;
pub mod reporter;
pub mod supervisor;
pub mod text;
pub mod timer;
