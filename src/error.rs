//! Error types for the relay prop firmware.
//!
//! One enum per subsystem.  None of these are fatal: the control loop
//! logs them, reports a `MESG` warning where useful, and keeps running.

use core::fmt;

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Every binding slot is taken and the pin is not already bound.
    Full,
    /// No binding exists for the pin.
    NotFound(u8),
    /// A `clear:D<n>` request did not name a pin.
    BadPredicate,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "no free binding slot"),
            Self::NotFound(pin) => write!(f, "pin {pin} not bound"),
            Self::BadPredicate => write!(f, "no pin number in clear request"),
        }
    }
}

impl std::error::Error for RegistryError {}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload is not valid JSON or misses a required field.
    Malformed(String),
    /// Pin field is neither an integer nor `D<n>` / `GPIO<n>`.
    BadPin,
    /// Symbolic name is empty.
    EmptyName,
    /// The board never allows this pin to be driven.
    ReservedPin(u8),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed pin settings ({msg})"),
            Self::BadPin => write!(f, "unrecognised pin identifier"),
            Self::EmptyName => write!(f, "empty variable name"),
            Self::ReservedPin(pin) => write!(f, "pin {pin} is reserved on this board"),
        }
    }
}

impl std::error::Error for DecodeError {}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    ConnectFailed,
    SubscribeFailed,
    NotConnected,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "broker connect failed"),
            Self::SubscribeFailed => write!(f, "subscribe failed"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

impl std::error::Error for CommsError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed validation.
    /// The `&'static str` names the field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
