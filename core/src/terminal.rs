//! Terminal: Fixed-length byte primitives
//!
//! A [`Terminal`] is the only element that inspects input bytes. Each terminal
//! matches a slice of one fixed length, known at construction time:
//!
//! - [`Terminal::Literal`]: the literal's own length
//! - [`Terminal::Byte`] / [`Terminal::Range`]: exactly one byte
//!
//! Variable-length matching is built above terminals with repetition.

use crate::{case, GrammarError};
use std::fmt;

/// An inclusive byte range with `lo <= hi`.
///
/// The bounds are private so that an empty range cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    lo: u8,
    hi: u8,
}

impl ByteRange {
    /// Create a new byte range.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidRange`] if `lo > hi`.
    pub fn new(lo: u8, hi: u8) -> Result<Self, GrammarError> {
        if lo > hi {
            return Err(GrammarError::InvalidRange { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// The full octet range `%x00-FF`.
    #[must_use]
    pub const fn full() -> Self {
        Self { lo: 0x00, hi: 0xFF }
    }

    // Callers guarantee lo <= hi.
    pub(crate) const fn new_unchecked(lo: u8, hi: u8) -> Self {
        Self { lo, hi }
    }

    /// Lower bound (inclusive).
    #[must_use]
    pub const fn lo(&self) -> u8 {
        self.lo
    }

    /// Upper bound (inclusive).
    #[must_use]
    pub const fn hi(&self) -> u8 {
        self.hi
    }

    /// Returns `true` if `b` lies within the range.
    #[must_use]
    pub const fn contains(&self, b: u8) -> bool {
        self.lo <= b && b <= self.hi
    }
}

/// An atomic, fixed-length byte matcher.
///
/// # Example
///
/// ```
/// use rabnf::Terminal;
///
/// let digit = Terminal::range(b'0', b'9').unwrap();
/// assert!(digit.matches(b"7"));
/// assert!(!digit.matches(b"77")); // wrong length
///
/// let get = Terminal::literal("GET", false);
/// assert!(get.matches(b"get"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// A literal byte string.
    Literal {
        /// The literal bytes, as written.
        bytes: Vec<u8>,
        /// When `false`, comparison folds ASCII case on both sides.
        case_sensitive: bool,
    },

    /// A single byte value (`%xHH`).
    Byte(u8),

    /// An inclusive byte range (`%xLL-HH`).
    Range(ByteRange),
}

impl Terminal {
    /// Create a literal terminal.
    pub fn literal(bytes: impl AsRef<[u8]>, case_sensitive: bool) -> Self {
        Self::Literal {
            bytes: bytes.as_ref().to_vec(),
            case_sensitive,
        }
    }

    /// Create a single-byte terminal.
    #[must_use]
    pub const fn byte(value: u8) -> Self {
        Self::Byte(value)
    }

    /// Create a byte-range terminal.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidRange`] if `lo > hi`.
    pub fn range(lo: u8, hi: u8) -> Result<Self, GrammarError> {
        ByteRange::new(lo, hi).map(Self::Range)
    }

    /// The exact number of bytes this terminal consumes when it matches.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Literal { bytes, .. } => bytes.len(),
            Self::Byte(_) | Self::Range(_) => 1,
        }
    }

    /// Returns `true` for the empty literal, which matches only the empty slice.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether `slice` matches this terminal in its entirety.
    ///
    /// Total and side-effect free; a slice of the wrong length never matches.
    #[must_use]
    pub fn matches(&self, slice: &[u8]) -> bool {
        match self {
            Self::Literal {
                bytes,
                case_sensitive: true,
            } => slice == bytes.as_slice(),
            Self::Literal {
                bytes,
                case_sensitive: false,
            } => case::eq_folded(slice, bytes),
            Self::Byte(v) => slice.len() == 1 && slice[0] == *v,
            Self::Range(r) => slice.len() == 1 && r.contains(slice[0]),
        }
    }

    /// Match at `offset` within `input`, returning the bytes consumed.
    ///
    /// Returns `None` when fewer than [`len()`](Self::len) bytes remain or the
    /// slice there does not match.
    #[must_use]
    pub fn match_at(&self, input: &[u8], offset: usize) -> Option<usize> {
        let len = self.len();
        let end = offset.checked_add(len)?;
        let slice = input.get(offset..end)?;
        self.matches(slice).then_some(len)
    }
}

impl From<ByteRange> for Terminal {
    fn from(range: ByteRange) -> Self {
        Self::Range(range)
    }
}

/// Renders ABNF notation: `"abc"`, `%s"Abc"`, `%x0D`, `%x30-39`.
///
/// Literals containing `"` or bytes outside `%x20-7E` cannot be written as a
/// quoted string and render as a dotted byte sequence (`%x0D.0A`). A dotted
/// sequence is exact, so a case-insensitive literal with letters renders as
/// a concatenation instead (`("a" %x22 "b")`).
impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal {
                bytes,
                case_sensitive,
            } => {
                let cased = bytes.iter().any(|&b| case::is_cased(b));
                if bytes.iter().all(|&b| is_quotable(b)) {
                    // %s only changes meaning when a letter is present.
                    if *case_sensitive && cased {
                        write!(f, "%s")?;
                    }
                    return write_quoted(f, bytes);
                }
                if *case_sensitive || !cased {
                    return write_dotted(f, bytes);
                }
                write!(f, "(")?;
                for (i, run) in bytes
                    .chunk_by(|a, b| is_quotable(*a) == is_quotable(*b))
                    .enumerate()
                {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    if is_quotable(run[0]) {
                        write_quoted(f, run)?;
                    } else {
                        write_dotted(f, run)?;
                    }
                }
                write!(f, ")")
            }
            Self::Byte(v) => write!(f, "%x{v:02X}"),
            Self::Range(r) => write!(f, "%x{:02X}-{:02X}", r.lo, r.hi),
        }
    }
}

fn is_quotable(b: u8) -> bool {
    (0x20..=0x7E).contains(&b) && b != b'"'
}

fn write_quoted(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    write!(f, "\"")?;
    for &b in bytes {
        write!(f, "{}", char::from(b))?;
    }
    write!(f, "\"")
}

fn write_dotted(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    write!(f, "%x")?;
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            write!(f, ".")?;
        }
        write!(f, "{b:02X}")?;
    }
    Ok(())
}
