//! Element: The recursive grammar tree
//!
//! An [`Element`] tree describes the byte sequences a rule accepts. Elements
//! are immutable values compared and hashed structurally; a [`Rule`](crate::Rule)
//! owns its tree by value.

use crate::{GrammarError, Terminal};
use std::collections::BTreeSet;
use std::{fmt, mem, slice};

/// Repetition bounds: `min` to `max` iterations, `max = None` for unbounded.
///
/// # INV: `min <= max`
///
/// Enforced by [`Bounds::new`]; the fields are private.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    min: usize,
    max: Option<usize>,
}

impl Bounds {
    /// Create bounds from a minimum and optional maximum.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidBounds`] if `max < min`.
    pub fn new(min: usize, max: Option<usize>) -> Result<Self, GrammarError> {
        match max {
            Some(max) if max < min => Err(GrammarError::InvalidBounds { min, max }),
            _ => Ok(Self { min, max }),
        }
    }

    /// `*`: zero or more.
    #[must_use]
    pub const fn any() -> Self {
        Self { min: 0, max: None }
    }

    /// `n*`: at least `n`.
    #[must_use]
    pub const fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    /// `n`: exactly `n`.
    #[must_use]
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    /// Minimum number of iterations.
    #[must_use]
    pub const fn min(&self) -> usize {
        self.min
    }

    /// Maximum number of iterations, `None` when unbounded.
    #[must_use]
    pub const fn max(&self) -> Option<usize> {
        self.max
    }

    /// Returns `true` if `count` more iterations may still be attempted.
    #[must_use]
    pub fn allows_more(&self, count: usize) -> bool {
        self.max.map_or(true, |max| count < max)
    }

    /// Returns `true` if `count` iterations satisfy the minimum.
    #[must_use]
    pub const fn is_satisfied(&self, count: usize) -> bool {
        count >= self.min
    }
}

/// Renders the ABNF repeat prefix: `*`, `2*`, `*4`, `2*4`, `3`.
impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (min, Some(max)) if min == max => write!(f, "{min}"),
            (0, None) => write!(f, "*"),
            (min, None) => write!(f, "{min}*"),
            (0, Some(max)) => write!(f, "*{max}"),
            (min, Some(max)) => write!(f, "{min}*{max}"),
        }
    }
}

/// A bounded repetition of an inner element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repetition {
    element: Box<Element>,
    bounds: Bounds,
}

impl Repetition {
    /// Create a repetition of `element` within `bounds`.
    #[must_use]
    pub fn new(element: Element, bounds: Bounds) -> Self {
        Self {
            element: Box::new(element),
            bounds,
        }
    }

    /// The repeated element.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// The repetition bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// A node in the grammar tree.
///
/// # Variants
///
/// - `Terminal`: Fixed-length byte primitive
/// - `RuleRef`: Reference to a named rule, resolved through a [`Grammar`](crate::Grammar)
/// - `Sequence`: Concatenation; `Sequence([])` matches only the empty slice
/// - `Alternation`: Ordered choice; `Alternation([])` matches nothing
/// - `Optional`: Zero or one; never fails
/// - `Repetition`: `min` to `max` iterations
///
/// # Example
///
/// ```
/// use rabnf::Element;
///
/// // "0x" 1*2(%x30-39 / "A" / "B")
/// let element = Element::sequence([
///     Element::literal("0x", false),
///     Element::repeat(
///         Element::alternation([
///             Element::range(0x30, 0x39).unwrap(),
///             Element::literal("A", false),
///             Element::literal("B", false),
///         ]),
///         1,
///         Some(2),
///     )
///     .unwrap(),
/// ]);
/// assert_eq!(element.to_string(), "(\"0x\" 1*2(%x30-39 / \"A\" / \"B\"))");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    /// A terminal byte matcher.
    Terminal(Terminal),

    /// A reference to a rule by name.
    RuleRef(String),

    /// Children matched left to right, each starting where the previous ended.
    Sequence(Vec<Element>),

    /// Children tried in declaration order.
    Alternation(Vec<Element>),

    /// The inner element, or nothing.
    Optional(Box<Element>),

    /// Bounded repetition of the inner element.
    Repetition(Repetition),
}

impl Element {
    /// A literal terminal element.
    pub fn literal(bytes: impl AsRef<[u8]>, case_sensitive: bool) -> Self {
        Self::Terminal(Terminal::literal(bytes, case_sensitive))
    }

    /// A single-byte terminal element.
    #[must_use]
    pub const fn byte(value: u8) -> Self {
        Self::Terminal(Terminal::byte(value))
    }

    /// A byte-range terminal element.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidRange`] if `lo > hi`.
    pub fn range(lo: u8, hi: u8) -> Result<Self, GrammarError> {
        Terminal::range(lo, hi).map(Self::Terminal)
    }

    /// A reference to the rule called `name`.
    pub fn rule_ref(name: impl Into<String>) -> Self {
        Self::RuleRef(name.into())
    }

    /// A sequence of elements.
    pub fn sequence(elements: impl IntoIterator<Item = Element>) -> Self {
        Self::Sequence(elements.into_iter().collect())
    }

    /// An ordered alternation of elements.
    pub fn alternation(elements: impl IntoIterator<Item = Element>) -> Self {
        Self::Alternation(elements.into_iter().collect())
    }

    /// An optional element.
    #[must_use]
    pub fn optional(element: Element) -> Self {
        Self::Optional(Box::new(element))
    }

    /// A repetition of `element`, `min` to `max` times.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidBounds`] if `max < min`.
    pub fn repeat(element: Element, min: usize, max: Option<usize>) -> Result<Self, GrammarError> {
        Ok(Self::Repetition(Repetition::new(element, Bounds::new(min, max)?)))
    }

    /// A repetition of `element` within already-validated `bounds`.
    #[must_use]
    pub fn repeat_within(element: Element, bounds: Bounds) -> Self {
        Self::Repetition(Repetition::new(element, bounds))
    }

    /// `*element`
    #[must_use]
    pub fn zero_or_more(element: Element) -> Self {
        Self::repeat_within(element, Bounds::any())
    }

    /// `1*element`
    #[must_use]
    pub fn one_or_more(element: Element) -> Self {
        Self::repeat_within(element, Bounds::at_least(1))
    }

    /// Returns `true` if this is a `Terminal` element.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// Returns `true` if this is a `RuleRef` element.
    #[must_use]
    pub fn is_rule_ref(&self) -> bool {
        matches!(self, Self::RuleRef(_))
    }

    /// Calculate the depth of this element tree.
    ///
    /// A terminal or reference has depth 1. Used for depth limit validation
    /// when a rule is constructed.
    ///
    /// Walks with an explicit stack, so trees of any depth can be measured
    /// (and rejected) without recursing.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((element, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(element.children().iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Names of all rules referenced anywhere in this tree.
    #[must_use]
    pub fn references(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(element) = stack.pop() {
            if let Self::RuleRef(name) = element {
                names.insert(name.as_str());
            }
            stack.extend(element.children().iter());
        }
        names
    }

    fn children(&self) -> &[Element] {
        match self {
            Self::Terminal(_) | Self::RuleRef(_) => &[],
            Self::Sequence(es) | Self::Alternation(es) => es,
            Self::Optional(e) => slice::from_ref(&**e),
            Self::Repetition(r) => slice::from_ref(&*r.element),
        }
    }

    // Moves direct children onto `stack`, leaving `self` a leaf.
    fn detach_children(&mut self, stack: &mut Vec<Element>) {
        match self {
            Self::Terminal(_) | Self::RuleRef(_) => {}
            Self::Sequence(es) | Self::Alternation(es) => stack.append(es),
            Self::Optional(e) => stack.push(mem::replace(&mut **e, Self::Sequence(Vec::new()))),
            Self::Repetition(r) => stack.push(mem::replace(&mut *r.element, Self::Sequence(Vec::new()))),
        }
    }
}

// Dropping nested boxes recursively would overflow the stack on trees deep
// enough to be rejected by `Rule::new`.
impl Drop for Element {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.detach_children(&mut stack);
        while let Some(mut element) = stack.pop() {
            element.detach_children(&mut stack);
        }
    }
}

impl From<Terminal> for Element {
    fn from(terminal: Terminal) -> Self {
        Self::Terminal(terminal)
    }
}

impl From<Repetition> for Element {
    fn from(repetition: Repetition) -> Self {
        Self::Repetition(repetition)
    }
}

/// Renders ABNF notation. Compound elements are parenthesized so the output
/// never depends on operator precedence.
impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(t) => write!(f, "{t}"),
            Self::RuleRef(name) => write!(f, "{name}"),
            Self::Sequence(es) => write_group(f, es, " ", "\"\""),
            Self::Alternation(es) => write_group(f, es, " / ", "()"),
            Self::Optional(e) => write!(f, "[{e}]"),
            Self::Repetition(r) => write!(f, "{}{}", r.bounds, r.element),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, es: &[Element], sep: &str, empty: &str) -> fmt::Result {
    match es {
        [] => write!(f, "{empty}"),
        [single] => write!(f, "({single})"),
        _ => {
            write!(f, "(")?;
            for (i, e) in es.iter().enumerate() {
                if i > 0 {
                    write!(f, "{sep}")?;
                }
                write!(f, "{e}")?;
            }
            write!(f, ")")
        }
    }
}
