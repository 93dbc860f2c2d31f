//! Bounded strings for names and state labels.
//!
//! Everything that arrives over the wire and ends up stored in the
//! registry goes through [`truncate`], so an oversized field is cut at the
//! last UTF-8 character boundary that fits instead of being rejected.

/// Maximum byte length of a symbolic variable name.
pub const NAME_CAP: usize = 31;

/// Maximum byte length of a high/low state label.
pub const LABEL_CAP: usize = 17;

/// Symbolic variable name exposed to the control room.
pub type Name = heapless::String<NAME_CAP>;

/// Human-readable label for one logical state (e.g. `"on"`, `"closed"`).
pub type Label = heapless::String<LABEL_CAP>;

/// Copy `s` into a fixed-capacity string, dropping whatever does not fit.
///
/// The cut never splits a multi-byte character.
pub fn truncate<const N: usize>(s: &str) -> heapless::String<N> {
    let mut end = s.len().min(N);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = heapless::String::new();
    // Cannot fail: `end <= N`.
    let _ = out.push_str(&s[..end]);
    out
}
