//! Match trace types for debugging validation.
//!
//! Trace types mirror [`Element`](crate::Element) but capture what happened at
//! each node instead of what the node expects. Use
//! [`Matcher::validate_with_trace()`](crate::Matcher::validate_with_trace) to
//! see the engine's full decision path.
//!
//! # Two Levels of Trace
//!
//! - [`ElementTrace`]: Per-element: where it started, what it consumed, which branch won
//! - [`ValidateTrace`]: Per-validation: the element trace plus the final verdict
//!
//! # Example
//!
//! ```
//! use rabnf::{CoreRule, Matcher};
//!
//! let trace = Matcher::new().validate_with_trace(b"\r", CoreRule::CRLF.rule());
//! assert!(trace.result.is_err());
//! println!("{trace}");
//! ```

use crate::{Bounds, MatchError};
use std::fmt;

/// Trace of one element's match attempt.
///
/// Compound traces record children in the order the greedy engine tried them:
///
/// - Sequence stops after the first failing child
/// - Alternation stops after the first matching branch
/// - Repetition includes the attempt that ended the loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementTrace {
    /// A terminal compared against the input.
    Terminal {
        /// ABNF rendering of the terminal.
        terminal: String,
        /// Offset the terminal was tried at.
        offset: usize,
        /// Bytes consumed, or `None` on mismatch.
        consumed: Option<usize>,
    },
    /// A rule reference expanded through the grammar.
    Reference {
        /// The referenced rule's name, as defined.
        name: String,
        /// Offset the rule was entered at.
        offset: usize,
        /// Bytes consumed, or `None` on mismatch.
        consumed: Option<usize>,
        /// Trace of the rule's element.
        inner: Box<ElementTrace>,
    },
    /// A sequence of children matched back to back.
    Sequence {
        /// Offset of the first child.
        offset: usize,
        /// Total bytes consumed, or `None` if any child failed.
        consumed: Option<usize>,
        /// Children up to and including the first failure.
        children: Vec<ElementTrace>,
    },
    /// Ordered choice.
    Alternation {
        /// Offset every branch was tried at.
        offset: usize,
        /// Bytes consumed by the chosen branch.
        consumed: Option<usize>,
        /// Index of the branch that matched.
        chosen: Option<usize>,
        /// Branches up to and including the chosen one.
        children: Vec<ElementTrace>,
    },
    /// Zero-or-one occurrence. Always matches.
    Optional {
        /// Offset the inner element was tried at.
        offset: usize,
        /// Bytes consumed (zero when the inner element did not match).
        consumed: Option<usize>,
        /// Trace of the inner element.
        inner: Box<ElementTrace>,
    },
    /// Bounded repetition.
    Repetition {
        /// Offset of the first iteration.
        offset: usize,
        /// Total bytes consumed, or `None` if the minimum was not reached.
        consumed: Option<usize>,
        /// The repetition bounds.
        bounds: Bounds,
        /// Iterations counted toward the bounds.
        iterations: usize,
        /// Every iteration attempted, including the one that stopped the loop.
        children: Vec<ElementTrace>,
    },
}

impl ElementTrace {
    /// Bytes consumed by this element, or `None` if it did not match.
    #[must_use]
    pub fn consumed(&self) -> Option<usize> {
        match self {
            Self::Terminal { consumed, .. }
            | Self::Reference { consumed, .. }
            | Self::Sequence { consumed, .. }
            | Self::Alternation { consumed, .. }
            | Self::Optional { consumed, .. }
            | Self::Repetition { consumed, .. } => *consumed,
        }
    }

    /// Whether this element matched.
    #[must_use]
    pub fn matched(&self) -> bool {
        self.consumed().is_some()
    }

    /// Offset this element was tried at.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Self::Terminal { offset, .. }
            | Self::Reference { offset, .. }
            | Self::Sequence { offset, .. }
            | Self::Alternation { offset, .. }
            | Self::Optional { offset, .. }
            | Self::Repetition { offset, .. } => *offset,
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Terminal { terminal, .. } => terminal.clone(),
            Self::Reference { name, .. } => name.clone(),
            Self::Sequence { .. } => "sequence".to_owned(),
            Self::Alternation { chosen, .. } => match chosen {
                Some(i) => format!("alternation (branch {i})"),
                None => "alternation".to_owned(),
            },
            Self::Optional { .. } => "optional".to_owned(),
            Self::Repetition {
                bounds, iterations, ..
            } => format!("repetition {bounds} x{iterations}"),
        }
    }

    fn children(&self) -> &[ElementTrace] {
        match self {
            Self::Terminal { .. } => &[],
            Self::Reference { inner, .. } | Self::Optional { inner, .. } => std::slice::from_ref(inner),
            Self::Sequence { children, .. }
            | Self::Alternation { children, .. }
            | Self::Repetition { children, .. } => children,
        }
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{:indent$}{} @{} ", "", self.label(), self.offset())?;
        match self.consumed() {
            Some(n) => writeln!(f, "-> {n}")?,
            None => writeln!(f, "-> no match")?,
        }
        for child in self.children() {
            child.write_tree(f, indent + 2)?;
        }
        Ok(())
    }
}

/// Trace of a full [`Matcher`](crate::Matcher) validation.
///
/// # INV: `result` == `validate()` result
///
/// The `result` field always equals what
/// [`Matcher::validate()`](crate::Matcher::validate) returns for the same
/// input and rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateTrace {
    /// Name of the rule validated against.
    pub rule: String,
    /// Input length in bytes.
    pub total: usize,
    /// Greedy decision path, or `None` if reference resolution aborted the walk.
    pub root: Option<ElementTrace>,
    /// The final verdict (identical to what `validate()` returns).
    pub result: Result<(), MatchError>,
}

impl ValidateTrace {
    /// Whether the input was accepted.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.result.is_ok()
    }
}

/// Renders an indented tree, one line per element, followed by the verdict.
impl fmt::Display for ValidateTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} bytes)", self.rule, self.total)?;
        if let Some(root) = &self.root {
            root.write_tree(f, 2)?;
        }
        match &self.result {
            Ok(()) => write!(f, "match"),
            Err(e) => write!(f, "{e}"),
        }
    }
}
