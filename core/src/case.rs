//! ASCII case folding for case-insensitive literals.
//!
//! RFC 5234 quoted strings are case-insensitive over US-ASCII only. Every
//! case-insensitive comparison in the crate goes through [`fold`], so all
//! literal terminals agree on what "same letter" means.

/// Fold a byte to its ASCII lowercase form. Bytes outside `A-Z` are unchanged.
///
/// ```
/// use rabnf::case::fold;
///
/// assert_eq!(fold(b'Q'), b'q');
/// assert_eq!(fold(b'q'), b'q');
/// assert_eq!(fold(0xC4), 0xC4); // not ASCII, never folded
/// ```
#[inline]
#[must_use]
pub const fn fold(b: u8) -> u8 {
    b.to_ascii_lowercase()
}

/// Compare two byte strings after folding both through [`fold`].
#[must_use]
pub fn eq_folded(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| fold(x) == fold(y))
}

/// Returns `true` if the byte has a distinct case variant (ASCII letters).
#[inline]
#[must_use]
pub const fn is_cased(b: u8) -> bool {
    b.is_ascii_alphabetic()
}
