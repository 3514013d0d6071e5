//! RFC 5234 Appendix B.1 core rules.
//!
//! Each rule is defined inline from terminals, with no rule references, so
//! the standalone [`validate()`](crate::validate) accepts every one of them.
//! Where the RFC writes `CRLF = CR LF`, the table spells out `%x0D %x0A`.
//!
//! | Rule | Definition |
//! |------|------------|
//! | `ALPHA` | `%x41-5A / %x61-7A` |
//! | `BIT` | `"0" / "1"` |
//! | `CHAR` | `%x01-7F` |
//! | `CR` | `%x0D` |
//! | `CRLF` | `CR LF` |
//! | `CTL` | `%x00-1F / %x7F` |
//! | `DIGIT` | `%x30-39` |
//! | `DQUOTE` | `%x22` |
//! | `HEXDIG` | `DIGIT / "A" / "B" / "C" / "D" / "E" / "F"` |
//! | `HTAB` | `%x09` |
//! | `LF` | `%x0A` |
//! | `LWSP` | `*(WSP / CRLF WSP)` |
//! | `OCTET` | `%x00-FF` |
//! | `SP` | `%x20` |
//! | `VCHAR` | `%x21-7E` |
//! | `WSP` | `SP / HTAB` |
//!
//! Quoted strings in ABNF are case-insensitive, so `HEXDIG` accepts `a-f` too.

use std::fmt;
use std::sync::LazyLock;

use crate::{ByteRange, Element, Rule, Terminal};

/// One of the sixteen core rules.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoreRule {
    ALPHA,
    BIT,
    CHAR,
    CR,
    CRLF,
    CTL,
    DIGIT,
    DQUOTE,
    HEXDIG,
    HTAB,
    LF,
    LWSP,
    OCTET,
    SP,
    VCHAR,
    WSP,
}

// Same order as the enum; `rule()` indexes by discriminant.
static TABLE: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    CoreRule::ALL
        .iter()
        .map(|r| Rule::new_unchecked(r.name(), r.define()))
        .collect()
});

impl CoreRule {
    /// Every core rule, in alphabetical order.
    pub const ALL: [CoreRule; 16] = [
        Self::ALPHA,
        Self::BIT,
        Self::CHAR,
        Self::CR,
        Self::CRLF,
        Self::CTL,
        Self::DIGIT,
        Self::DQUOTE,
        Self::HEXDIG,
        Self::HTAB,
        Self::LF,
        Self::LWSP,
        Self::OCTET,
        Self::SP,
        Self::VCHAR,
        Self::WSP,
    ];

    /// The rule name as written in RFC 5234.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ALPHA => "ALPHA",
            Self::BIT => "BIT",
            Self::CHAR => "CHAR",
            Self::CR => "CR",
            Self::CRLF => "CRLF",
            Self::CTL => "CTL",
            Self::DIGIT => "DIGIT",
            Self::DQUOTE => "DQUOTE",
            Self::HEXDIG => "HEXDIG",
            Self::HTAB => "HTAB",
            Self::LF => "LF",
            Self::LWSP => "LWSP",
            Self::OCTET => "OCTET",
            Self::SP => "SP",
            Self::VCHAR => "VCHAR",
            Self::WSP => "WSP",
        }
    }

    /// The pre-built rule.
    #[must_use]
    pub fn rule(self) -> &'static Rule {
        &TABLE[self as usize]
    }

    /// Look up a core rule by name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
    }

    fn define(self) -> Element {
        match self {
            Self::ALPHA => Element::alternation([range(0x41, 0x5A), range(0x61, 0x7A)]),
            Self::BIT => Element::alternation([Element::literal("0", false), Element::literal("1", false)]),
            Self::CHAR => range(0x01, 0x7F),
            Self::CR => Element::byte(0x0D),
            Self::CRLF => crlf(),
            Self::CTL => Element::alternation([range(0x00, 0x1F), Element::byte(0x7F)]),
            Self::DIGIT => range(0x30, 0x39),
            Self::DQUOTE => Element::byte(0x22),
            Self::HEXDIG => Element::alternation(
                std::iter::once(range(0x30, 0x39))
                    .chain(["A", "B", "C", "D", "E", "F"].map(|s| Element::literal(s, false))),
            ),
            Self::HTAB => Element::byte(0x09),
            Self::LF => Element::byte(0x0A),
            Self::LWSP => Element::zero_or_more(Element::alternation([
                wsp(),
                Element::sequence([crlf(), wsp()]),
            ])),
            Self::OCTET => Element::Terminal(Terminal::Range(ByteRange::full())),
            Self::SP => Element::byte(0x20),
            Self::VCHAR => range(0x21, 0x7E),
            Self::WSP => wsp(),
        }
    }
}

impl fmt::Display for CoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Look up a core rule by name (case-insensitive).
///
/// ```
/// use rabnf::{core_rules, validate};
///
/// let digit = core_rules::get("digit").unwrap();
/// assert!(validate(b"7", digit).is_ok());
/// assert!(core_rules::get("DIGITS").is_none());
/// ```
#[must_use]
pub fn get(name: &str) -> Option<&'static Rule> {
    CoreRule::from_name(name).map(CoreRule::rule)
}

fn range(lo: u8, hi: u8) -> Element {
    Element::Terminal(Terminal::Range(ByteRange::new_unchecked(lo, hi)))
}

fn crlf() -> Element {
    Element::sequence([Element::byte(0x0D), Element::byte(0x0A)])
}

fn wsp() -> Element {
    Element::alternation([Element::byte(0x20), Element::byte(0x09)])
}
