//! Matcher: Recursive-descent validation engine
//!
//! The [`Matcher`] walks an element tree from a fixed start offset, reporting
//! how many bytes each element consumed. Only the top level decides whether a
//! match that left bytes over is an error.
//!
//! # Strategies
//!
//! | Strategy | Sequence | Alternation | Repetition |
//! |----------|----------|-------------|------------|
//! | [`Strategy::Greedy`] | commits to each child's match | first branch that matches | as many as possible, never backs off |
//! | [`Strategy::Backtracking`] | every split | every branch | every count in bounds |
//!
//! Greedy is O(input × grammar) and correct whenever no construct's
//! consumption is ambiguous relative to what follows (true of the RFC 5234
//! core rules). Backtracking accepts every input a full ABNF matcher accepts.

use crate::{
    backtrack::Backtracker, trace::ElementTrace, Element, Grammar, MatchError, Repetition, Rule,
    ValidateTrace, MAX_MATCH_DEPTH, MAX_REFERENCE_DEPTH,
};

/// How the matcher resolves ambiguity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strategy {
    /// First-match-commits: no choice is ever revisited.
    #[default]
    Greedy,
    /// Explore every reachable end offset, memoized per (rule, offset).
    Backtracking,
}

/// Validation engine, optionally bound to a [`Grammar`] for rule references.
///
/// A `Matcher` holds no mutable state; it is `Copy` and can validate from
/// many threads at once.
///
/// # Example
///
/// ```
/// use rabnf::{Element, Matcher, MatchError, Rule, Strategy};
///
/// // greeting = *"a" "ab"
/// let rule = Rule::new(
///     "greeting",
///     Element::sequence([
///         Element::zero_or_more(Element::literal("a", false)),
///         Element::literal("ab", false),
///     ]),
/// )
/// .unwrap();
///
/// // Greedy: *"a" takes both bytes, then "ab" has nothing left.
/// assert_eq!(
///     Matcher::new().validate(b"aab", &rule),
///     Err(MatchError::DoesNotMatch { rule: "greeting".into() })
/// );
///
/// // Backtracking: *"a" gives one back.
/// let matcher = Matcher::new().with_strategy(Strategy::Backtracking);
/// assert!(matcher.validate(b"aab", &rule).is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher<'g> {
    grammar: Option<&'g Grammar>,
    strategy: Strategy,
}

impl Matcher<'static> {
    /// A standalone greedy matcher. Rule references fail with
    /// [`MatchError::UnsupportedFeature`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            grammar: None,
            strategy: Strategy::Greedy,
        }
    }
}

impl<'g> Matcher<'g> {
    /// A greedy matcher that resolves rule references through `grammar`.
    #[must_use]
    pub const fn with_grammar(grammar: &'g Grammar) -> Self {
        Self {
            grammar: Some(grammar),
            strategy: Strategy::Greedy,
        }
    }

    /// Select the matching strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The grammar references resolve against, if any.
    #[must_use]
    pub const fn grammar(&self) -> Option<&'g Grammar> {
        self.grammar
    }

    /// The configured strategy.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Validate that `input` matches `rule` in its entirety.
    ///
    /// # Errors
    ///
    /// - [`MatchError::DoesNotMatch`]: no prefix of the input matches
    /// - [`MatchError::IncompleteMatch`]: a prefix matched but bytes remain
    /// - [`MatchError::UnsupportedFeature`]: a rule reference with no grammar
    /// - [`MatchError::UnknownRule`], [`MatchError::LeftRecursion`],
    ///   [`MatchError::RecursionLimit`]: reference resolution failed
    pub fn validate(&self, input: &[u8], rule: &Rule) -> Result<(), MatchError> {
        let result = match self.strategy {
            Strategy::Greedy => {
                let consumed = Greedy::new(self.grammar).match_element(rule.element(), input, 0)?;
                judge(rule, input.len(), consumed)
            }
            Strategy::Backtracking => {
                let ends = Backtracker::new(self.grammar).ends(rule.element(), input, 0)?;
                if ends.contains(&input.len()) {
                    Ok(())
                } else {
                    judge(rule, input.len(), ends.last().copied())
                }
            }
        };
        match &result {
            Ok(()) => log::trace!("rule \"{}\" matched {} bytes", rule.name(), input.len()),
            Err(e) => log::debug!("{e}"),
        }
        result
    }

    /// Match `rule` against a prefix of `input`, returning the bytes consumed.
    ///
    /// Greedy reports the committed match; backtracking reports the longest
    /// reachable one. `Ok(None)` means no prefix matches.
    ///
    /// # Errors
    ///
    /// Same reference-resolution errors as [`validate()`](Self::validate).
    pub fn match_prefix(&self, input: &[u8], rule: &Rule) -> Result<Option<usize>, MatchError> {
        self.match_element(rule.element(), input, 0)
    }

    /// Match `element` at exactly `offset` (no scanning for a later start).
    ///
    /// # Errors
    ///
    /// Same reference-resolution errors as [`validate()`](Self::validate).
    pub fn match_element(
        &self,
        element: &Element,
        input: &[u8],
        offset: usize,
    ) -> Result<Option<usize>, MatchError> {
        match self.strategy {
            Strategy::Greedy => Greedy::new(self.grammar).match_element(element, input, offset),
            Strategy::Backtracking => Ok(Backtracker::new(self.grammar)
                .ends(element, input, offset)?
                .last()
                .map(|end| end - offset)),
        }
    }

    /// Validate with a full trace of the greedy decision path.
    ///
    /// `result` always equals what [`validate()`](Self::validate) returns for
    /// this matcher. The trace itself follows greedy semantics regardless of
    /// strategy, which is what explains a greedy rejection that backtracking
    /// accepts. `root` is `None` when matching aborted with a resolution error.
    #[must_use]
    pub fn validate_with_trace(&self, input: &[u8], rule: &Rule) -> ValidateTrace {
        let root = Greedy::new(self.grammar)
            .trace_element(rule.element(), input, 0)
            .ok();
        ValidateTrace {
            rule: rule.name().to_owned(),
            total: input.len(),
            root,
            result: self.validate(input, rule),
        }
    }
}

/// Validate `input` against `rule` with a standalone greedy [`Matcher`].
///
/// # Errors
///
/// See [`Matcher::validate`]. Rule references always fail with
/// [`MatchError::UnsupportedFeature`]; use [`Grammar::validate`] to resolve them.
///
/// ```
/// use rabnf::{validate, CoreRule, MatchError};
///
/// assert!(validate(&[0x35], CoreRule::DIGIT.rule()).is_ok());
/// assert_eq!(
///     validate(&[0x0D], CoreRule::CRLF.rule()),
///     Err(MatchError::DoesNotMatch { rule: "CRLF".into() })
/// );
/// ```
pub fn validate(input: &[u8], rule: &Rule) -> Result<(), MatchError> {
    Matcher::new().validate(input, rule)
}

fn judge(rule: &Rule, total: usize, consumed: Option<usize>) -> Result<(), MatchError> {
    match consumed {
        Some(consumed) if consumed == total => Ok(()),
        Some(consumed) => Err(MatchError::IncompleteMatch {
            rule: rule.name().to_owned(),
            consumed,
            total,
        }),
        None => Err(MatchError::DoesNotMatch {
            rule: rule.name().to_owned(),
        }),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Reference resolution
// ═══════════════════════════════════════════════════════════════════════════════

/// Look up a referenced rule, returning its grammar index.
pub(crate) fn resolve<'g>(
    grammar: Option<&'g Grammar>,
    name: &str,
) -> Result<(usize, &'g Rule), MatchError> {
    let grammar = grammar.ok_or_else(|| {
        MatchError::UnsupportedFeature(format!(
            "rule reference \"{name}\" cannot be resolved without a grammar"
        ))
    })?;
    grammar
        .resolve(name)
        .ok_or_else(|| MatchError::UnknownRule {
            name: name.to_owned(),
        })
}

/// Stack of rule expansions currently in progress, plus the element nesting
/// of the walk.
///
/// # INV: no (rule, offset) pair appears twice
///
/// Re-entering a rule at the offset it is already being matched at would
/// recurse forever without consuming input.
///
/// # INV: `depth <= MAX_MATCH_DEPTH`
///
/// Every walker calls [`descend`](Self::descend) once per element it enters,
/// so together with the reference limit, recursion depth is bounded no
/// matter how rules and nesting combine.
#[derive(Debug, Default)]
pub(crate) struct Frames {
    active: Vec<(usize, usize)>,
    depth: usize,
}

impl Frames {
    /// Count one level of element nesting. References are bounded by
    /// [`enter`](Self::enter) instead and do not count here.
    pub(crate) fn descend(&mut self, element: &Element) -> Result<(), MatchError> {
        if element.is_rule_ref() {
            return Ok(());
        }
        if self.depth >= MAX_MATCH_DEPTH {
            return Err(MatchError::RecursionLimit {
                max: MAX_MATCH_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn ascend(&mut self, element: &Element) {
        if !element.is_rule_ref() {
            self.depth -= 1;
        }
    }

    pub(crate) fn enter(&mut self, index: usize, offset: usize, name: &str) -> Result<(), MatchError> {
        if self.active.len() >= MAX_REFERENCE_DEPTH {
            return Err(MatchError::RecursionLimit {
                max: MAX_REFERENCE_DEPTH,
            });
        }
        if self.active.contains(&(index, offset)) {
            return Err(MatchError::LeftRecursion {
                rule: name.to_owned(),
                offset,
            });
        }
        self.active.push((index, offset));
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        self.active.pop();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Greedy walker
// ═══════════════════════════════════════════════════════════════════════════════

/// One greedy match run.
///
/// # Safety Consideration
///
/// This recurses once per element level, rule expansions included. The total
/// is capped by [`MAX_MATCH_DEPTH`] through [`Frames`].
struct Greedy<'g> {
    grammar: Option<&'g Grammar>,
    frames: Frames,
}

impl<'g> Greedy<'g> {
    fn new(grammar: Option<&'g Grammar>) -> Self {
        Self {
            grammar,
            frames: Frames::default(),
        }
    }

    fn match_element(
        &mut self,
        element: &Element,
        input: &[u8],
        offset: usize,
    ) -> Result<Option<usize>, MatchError> {
        self.frames.descend(element)?;
        let result = self.match_variant(element, input, offset);
        self.frames.ascend(element);
        result
    }

    fn match_variant(
        &mut self,
        element: &Element,
        input: &[u8],
        offset: usize,
    ) -> Result<Option<usize>, MatchError> {
        match element {
            Element::Terminal(t) => Ok(t.match_at(input, offset)),
            Element::RuleRef(name) => {
                let (index, rule) = resolve(self.grammar, name)?;
                self.frames.enter(index, offset, rule.name())?;
                let result = self.match_element(rule.element(), input, offset);
                self.frames.exit();
                result
            }
            Element::Sequence(elements) => {
                let mut consumed = 0;
                for e in elements {
                    match self.match_element(e, input, offset + consumed)? {
                        Some(n) => consumed += n,
                        // No partial credit.
                        None => return Ok(None),
                    }
                }
                Ok(Some(consumed))
            }
            Element::Alternation(elements) => {
                for e in elements {
                    if let Some(n) = self.match_element(e, input, offset)? {
                        return Ok(Some(n));
                    }
                }
                Ok(None)
            }
            Element::Optional(e) => Ok(Some(self.match_element(e, input, offset)?.unwrap_or(0))),
            Element::Repetition(r) => self.match_repetition(r, input, offset),
        }
    }

    fn match_repetition(
        &mut self,
        repetition: &Repetition,
        input: &[u8],
        offset: usize,
    ) -> Result<Option<usize>, MatchError> {
        let bounds = repetition.bounds();
        let mut count = 0;
        let mut consumed = 0;
        // End of input stops the loop even below the minimum.
        while bounds.allows_more(count) && offset + consumed < input.len() {
            match self.match_element(repetition.element(), input, offset + consumed)? {
                // Every further iteration would also match empty.
                Some(0) => {
                    count = count.max(bounds.min());
                    break;
                }
                Some(n) => {
                    count += 1;
                    consumed += n;
                }
                None => break,
            }
        }
        Ok(bounds.is_satisfied(count).then_some(consumed))
    }

    /// Same walk as [`match_element`](Self::match_element), recording each step.
    fn trace_element(
        &mut self,
        element: &Element,
        input: &[u8],
        offset: usize,
    ) -> Result<ElementTrace, MatchError> {
        self.frames.descend(element)?;
        let result = self.trace_variant(element, input, offset);
        self.frames.ascend(element);
        result
    }

    fn trace_variant(
        &mut self,
        element: &Element,
        input: &[u8],
        offset: usize,
    ) -> Result<ElementTrace, MatchError> {
        match element {
            Element::Terminal(t) => Ok(ElementTrace::Terminal {
                terminal: t.to_string(),
                offset,
                consumed: t.match_at(input, offset),
            }),
            Element::RuleRef(name) => {
                let (index, rule) = resolve(self.grammar, name)?;
                self.frames.enter(index, offset, rule.name())?;
                let inner = self.trace_element(rule.element(), input, offset);
                self.frames.exit();
                let inner = inner?;
                Ok(ElementTrace::Reference {
                    name: rule.name().to_owned(),
                    offset,
                    consumed: inner.consumed(),
                    inner: Box::new(inner),
                })
            }
            Element::Sequence(elements) => {
                let mut children = Vec::with_capacity(elements.len());
                let mut consumed = Some(0);
                for e in elements {
                    let at = offset + consumed.unwrap_or(0);
                    let child = self.trace_element(e, input, at)?;
                    let step = child.consumed();
                    children.push(child);
                    match step {
                        Some(n) => consumed = consumed.map(|c| c + n),
                        None => {
                            consumed = None;
                            break;
                        }
                    }
                }
                Ok(ElementTrace::Sequence {
                    offset,
                    consumed,
                    children,
                })
            }
            Element::Alternation(elements) => {
                let mut children = Vec::new();
                let mut chosen = None;
                for (i, e) in elements.iter().enumerate() {
                    let child = self.trace_element(e, input, offset)?;
                    let matched = child.matched();
                    children.push(child);
                    if matched {
                        chosen = Some(i);
                        break;
                    }
                }
                let consumed = chosen.and_then(|i| children[i].consumed());
                Ok(ElementTrace::Alternation {
                    offset,
                    consumed,
                    chosen,
                    children,
                })
            }
            Element::Optional(e) => {
                let inner = self.trace_element(e, input, offset)?;
                Ok(ElementTrace::Optional {
                    offset,
                    consumed: Some(inner.consumed().unwrap_or(0)),
                    inner: Box::new(inner),
                })
            }
            Element::Repetition(r) => {
                let bounds = r.bounds();
                let mut children = Vec::new();
                let mut count = 0;
                let mut consumed = 0;
                while bounds.allows_more(count) && offset + consumed < input.len() {
                    let child = self.trace_element(r.element(), input, offset + consumed)?;
                    let step = child.consumed();
                    children.push(child);
                    match step {
                        Some(0) => {
                            count = count.max(bounds.min());
                            break;
                        }
                        Some(n) => {
                            count += 1;
                            consumed += n;
                        }
                        None => break,
                    }
                }
                Ok(ElementTrace::Repetition {
                    offset,
                    consumed: bounds.is_satisfied(count).then_some(consumed),
                    bounds,
                    iterations: count,
                    children,
                })
            }
        }
    }
}
