//! Application core — pure domain logic, zero I/O.
//!
//! This module holds the prop's business rules: routing inbox and
//! settings messages, running commands against the pin registry, and
//! deciding what goes out on the outbox.  All interaction with hardware
//! and the broker happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
