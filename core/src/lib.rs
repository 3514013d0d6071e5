//! rabnf - ABNF (RFC 5234) grammar model and validation engine
//!
//! Grammars are built as values (rule name + element tree) and a byte
//! sequence is checked against a named rule. There is no ABNF text parser:
//! rules are constructed in code or loaded from a JSON/YAML description of
//! the same data model (feature = `"config"`).
//!
//! # Architecture
//!
//! - [`Terminal`]: Fixed-length byte primitive (literal, single byte, byte range)
//! - [`Element`]: Recursive grammar node (terminal, reference, sequence, alternation, optional, repetition)
//! - [`Rule`]: Named top-level element; the unit a caller validates against
//! - [`Grammar`]: Immutable rule registry that resolves references at match time
//! - [`Matcher`]: Recursive-descent engine with a selectable [`Strategy`]
//!
//! # Key Design Insights
//!
//! 1. **Whole-input semantics**: a rule matching a strict prefix is an
//!    [`MatchError::IncompleteMatch`], never a partial success.
//!
//! 2. **Greedy by default**: sequences commit to each child's first match,
//!    alternations take the first branch that matches, repetitions never back
//!    off. [`Strategy::Backtracking`] explores every split instead.
//!
//! 3. **References need an environment**: a bare [`validate()`] fails with
//!    [`MatchError::UnsupportedFeature`] on rule references; match through a
//!    [`Grammar`] to resolve them.
//!
//! # Example
//!
//! ```
//! use rabnf::prelude::*;
//!
//! // hex-pair = 2HEXDIG
//! let rule = Rule::new(
//!     "hex-pair",
//!     Element::repeat(CoreRule::HEXDIG.rule().element().clone(), 2, Some(2)).unwrap(),
//! )
//! .unwrap();
//!
//! assert!(validate(b"7f", &rule).is_ok());
//! assert_eq!(
//!     validate(b"7", &rule),
//!     Err(MatchError::DoesNotMatch { rule: "hex-pair".into() })
//! );
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod backtrack;
pub mod case;
pub mod core_rules;
mod element;
mod engine;
mod grammar;
mod rule;
mod terminal;
mod trace;

#[cfg(feature = "config")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use core_rules::CoreRule;
pub use element::{Bounds, Element, Repetition};
pub use engine::{validate, Matcher, Strategy};
pub use grammar::{Grammar, GrammarBuilder};
pub use rule::Rule;
pub use terminal::{ByteRange, Terminal};
pub use trace::{ElementTrace, ValidateTrace};

#[cfg(feature = "config")]
pub use config::{ElementConfig, GrammarConfig, RuleConfig};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use rabnf::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        validate, Bounds, ByteRange, CoreRule, Element, ElementTrace, Grammar, GrammarBuilder,
        GrammarError, MatchError, Matcher, Repetition, Rule, Strategy, Terminal, ValidateTrace,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed nesting depth of an element tree.
///
/// Enforced by [`Rule::new`] so that matching a single rule cannot exhaust the
/// stack through element nesting alone.
pub const MAX_DEPTH: usize = 64;

/// Maximum number of children of a sequence or alternation loaded from config.
pub const MAX_CHILDREN: usize = 256;

/// Maximum length in bytes of a literal loaded from config.
pub const MAX_LITERAL_LENGTH: usize = 8192;

/// Maximum number of nested rule-reference expansions during one match.
///
/// Element depth is bounded per rule by [`MAX_DEPTH`]; this bounds the chain
/// of references between rules.
pub const MAX_REFERENCE_DEPTH: usize = 256;

/// Maximum nesting of element matches during one match, counted across rule
/// expansions (the references themselves count against
/// [`MAX_REFERENCE_DEPTH`]).
///
/// Each level costs a few stack frames, so this is what bounds stack use:
/// a rule [`MAX_DEPTH`] deep that references itself would otherwise nest
/// `MAX_DEPTH × MAX_REFERENCE_DEPTH` levels. Sized to fit a 2 MiB thread.
pub const MAX_MATCH_DEPTH: usize = 512;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from matching a byte sequence against a rule.
///
/// All variants are recoverable: they describe the input (or the grammar's
/// use of unsupported constructs), never an engine fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// No prefix of the input matches the rule.
    #[error("input does not match rule \"{rule}\"")]
    DoesNotMatch {
        /// Name of the rule validated against.
        rule: String,
    },

    /// A prefix matched but bytes remained after it.
    #[error("rule \"{rule}\" matched {consumed} of {total} bytes")]
    IncompleteMatch {
        /// Name of the rule validated against.
        rule: String,
        /// Bytes consumed by the match.
        consumed: usize,
        /// Total input length.
        total: usize,
    },

    /// The element tree uses a construct this matcher cannot evaluate.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// A rule reference names a rule the grammar does not define.
    #[error("unknown rule \"{name}\"")]
    UnknownRule {
        /// The unresolved name.
        name: String,
    },

    /// A rule was re-entered at the same offset while still being matched.
    #[error("rule \"{rule}\" is left-recursive at offset {offset}")]
    LeftRecursion {
        /// The re-entered rule.
        rule: String,
        /// Input offset at which the cycle was detected.
        offset: usize,
    },

    /// Rule references nested deeper than [`MAX_REFERENCE_DEPTH`], or
    /// element matches deeper than [`MAX_MATCH_DEPTH`].
    #[error("matching nested deeper than the limit of {max}")]
    RecursionLimit {
        /// The limit that was hit.
        max: usize,
    },
}

/// Errors from grammar construction and config loading.
///
/// These are caught when a rule or grammar is built, not at match time.
/// Fix the definition and rebuild.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    /// A byte range with `lo > hi`.
    #[error("invalid byte range %x{lo:02X}-{hi:02X}: lower bound exceeds upper bound")]
    InvalidRange {
        /// Lower bound.
        lo: u8,
        /// Upper bound.
        hi: u8,
    },

    /// Repetition bounds with `min > max`.
    #[error("invalid repetition {min}*{max}: minimum exceeds maximum")]
    InvalidBounds {
        /// Minimum count.
        min: usize,
        /// Maximum count.
        max: usize,
    },

    /// A rule name that is not `ALPHA *(ALPHA / DIGIT / "-")`.
    #[error("invalid rule name \"{name}\": expected a letter followed by letters, digits or '-'")]
    InvalidRuleName {
        /// The rejected name.
        name: String,
    },

    /// Element nesting exceeds [`MAX_DEPTH`].
    #[error("rule \"{rule}\" nests {depth} levels deep, but maximum allowed is {max}")]
    DepthExceeded {
        /// Rule whose element is too deep.
        rule: String,
        /// Actual depth.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// Too many children in one sequence or alternation.
    #[error("compound element has {count} children, but maximum allowed is {max}")]
    TooManyChildren {
        /// Actual count.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// A literal longer than [`MAX_LITERAL_LENGTH`].
    #[error("literal length is {len}, but maximum allowed is {max}")]
    LiteralTooLong {
        /// Actual length.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// Two rules share a name (names compare case-insensitively).
    #[error("rule \"{name}\" is defined more than once")]
    DuplicateRule {
        /// The duplicated name.
        name: String,
    },

    /// A rule references a name no rule defines.
    #[error("rule \"{referenced_by}\" references undefined rule \"{name}\"{}", available_suffix(.available))]
    UndefinedRule {
        /// The undefined name.
        name: String,
        /// The rule containing the reference.
        referenced_by: String,
        /// Rules that ARE defined (for self-correcting error messages).
        available: Vec<String>,
    },

    /// Configuration deserialization failed.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// The underlying error message.
        message: String,
    },
}

fn available_suffix(available: &[String]) -> String {
    if available.is_empty() {
        " (no rules are defined)".to_owned()
    } else {
        format!(" (defined: {})", available.join(", "))
    }
}
