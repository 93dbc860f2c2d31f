//! Command parsing and dispatch.
//!
//! A command is `<predicate>:<level>`.  The split happens on the **last**
//! colon so names may contain colons themselves.  The level must be the
//! literal `1` or `0`; anything else is omitted without touching a pin.
//!
//! ```text
//!   "light1:1"      exact name, first match wins
//!   "zoneA/*:0"     every binding whose name starts with "zoneA/"
//! ```

use heapless::Vec;

use crate::app::ports::{OutputPort, PinState};
use crate::registry::{BindingHandle, MAX_BINDINGS, PinRegistry};

/// Suffix marking a group predicate.
pub const GROUP_SUFFIX: &str = "/*";

/// What a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate<'a> {
    /// One binding with exactly this name.
    Exact(&'a str),
    /// Every binding whose name starts with this prefix (trailing `/` kept).
    Group(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    pub predicate: Predicate<'a>,
    pub level: PinState,
}

/// Why a command text was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoSeparator,
    EmptyPredicate,
    EmptyLevel,
    /// Level token was neither `1` nor `0`.
    BadLevel,
    /// Exact predicate matched no binding.
    UnknownName,
}

/// Result of dispatching one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Accepted.  `matched` is how many pins were driven; a group command
    /// is accepted even when it matches nothing.
    Done { matched: usize },
    Omitted(Rejection),
}

impl Outcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

/// Parse command text without looking at the registry.
pub fn parse(text: &str) -> Result<Command<'_>, Rejection> {
    let (predicate, level) = text.rsplit_once(':').ok_or(Rejection::NoSeparator)?;
    if predicate.is_empty() {
        return Err(Rejection::EmptyPredicate);
    }
    let level = match level {
        "1" => PinState::High,
        "0" => PinState::Low,
        "" => return Err(Rejection::EmptyLevel),
        _ => return Err(Rejection::BadLevel),
    };

    let predicate = if predicate.ends_with(GROUP_SUFFIX) {
        // Drop only the `*`; the separator stays part of the prefix so
        // "zone/*" cannot match "zoneB/fan".
        Predicate::Group(&predicate[..predicate.len() - 1])
    } else {
        Predicate::Exact(predicate)
    };

    Ok(Command { predicate, level })
}

/// Parse `text`, resolve it against `registry` and drive the matching pins.
///
/// Reporting is left to the caller: a [`Outcome::Done`] should be followed
/// by a change report and a `DONE` echo, an [`Outcome::Omitted`] by an
/// `OMIT` echo.
pub fn dispatch(registry: &mut PinRegistry, io: &mut impl OutputPort, text: &str) -> Outcome {
    let command = match parse(text) {
        Ok(c) => c,
        Err(r) => return Outcome::Omitted(r),
    };

    let targets: Vec<BindingHandle, MAX_BINDINGS> = match command.predicate {
        Predicate::Group(prefix) => registry.find_by_wildcard_prefix(prefix),
        Predicate::Exact(name) => match registry.find_by_name(name) {
            Some(handle) => core::iter::once(handle).collect(),
            None => return Outcome::Omitted(Rejection::UnknownName),
        },
    };

    let matched = targets
        .iter()
        .filter(|h| registry.apply_level(**h, command.level, io))
        .count();

    Outcome::Done { matched }
}
