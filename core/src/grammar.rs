//! Grammar: Rule registry and reference environment
//!
//! A [`Grammar`] is the environment rule references resolve against. It is
//! built once through [`GrammarBuilder`] and immutable afterwards: no rule can
//! be added or replaced after [`build()`](GrammarBuilder::build).
//!
//! # Example
//!
//! ```
//! use rabnf::{Element, GrammarBuilder, Rule};
//!
//! // number = 1*DIGIT ["." 1*DIGIT]
//! let number = Rule::new(
//!     "number",
//!     Element::sequence([
//!         Element::one_or_more(Element::rule_ref("DIGIT")),
//!         Element::optional(Element::sequence([
//!             Element::literal(".", false),
//!             Element::one_or_more(Element::rule_ref("DIGIT")),
//!         ])),
//!     ]),
//! )
//! .unwrap();
//!
//! let grammar = GrammarBuilder::new().core_rules().rule(number).build().unwrap();
//! assert!(grammar.validate(b"3.14", "number").is_ok());
//! assert!(grammar.validate(b"3.", "number").is_err());
//! ```

use std::collections::HashMap;

use crate::{CoreRule, GrammarError, MatchError, Matcher, Rule, Strategy};

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`Grammar`].
///
/// Add rules in any order (forward references are fine), then call
/// [`build()`](Self::build) to check them as a whole.
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    rules: Vec<Rule>,
    core_rules: bool,
}

impl GrammarBuilder {
    /// Create a new empty grammar builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add several rules.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Include the RFC 5234 Appendix B.1 core rules (`ALPHA`, `DIGIT`, …).
    #[must_use]
    pub fn core_rules(mut self) -> Self {
        self.core_rules = true;
        self
    }

    /// Freeze the grammar.
    ///
    /// # Errors
    ///
    /// - [`GrammarError::DuplicateRule`]: two rules share a name, compared
    ///   case-insensitively (core rules included)
    /// - [`GrammarError::UndefinedRule`]: a rule references a name no rule defines
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut rules = Vec::with_capacity(self.rules.len() + CoreRule::ALL.len());
        if self.core_rules {
            rules.extend(CoreRule::ALL.iter().map(|r| r.rule().clone()));
        }
        rules.extend(self.rules);

        let mut index = HashMap::with_capacity(rules.len());
        for (i, rule) in rules.iter().enumerate() {
            if index.insert(rule.name().to_ascii_lowercase(), i).is_some() {
                return Err(GrammarError::DuplicateRule {
                    name: rule.name().to_owned(),
                });
            }
        }

        for rule in &rules {
            for name in rule.element().references() {
                if !index.contains_key(&name.to_ascii_lowercase()) {
                    let mut available: Vec<String> =
                        rules.iter().map(|r| r.name().to_owned()).collect();
                    available.sort_unstable();
                    return Err(GrammarError::UndefinedRule {
                        name: name.to_owned(),
                        referenced_by: rule.name().to_owned(),
                        available,
                    });
                }
            }
        }

        log::debug!(
            "built grammar with {} rules ({} core)",
            rules.len(),
            if self.core_rules { CoreRule::ALL.len() } else { 0 }
        );
        Ok(Grammar { rules, index })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Grammar
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable set of named rules.
///
/// # INV: every reference resolves
///
/// Each name referenced by any rule is defined in the grammar, so matching
/// through it never fails with [`MatchError::UnknownRule`] for a rule
/// reached from a defined one.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<Rule>,
    // lowercase name -> position in `rules`
    index: HashMap<String, usize>,
}

impl Grammar {
    /// Look up a rule by name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.resolve(name).map(|(_, rule)| rule)
    }

    /// Returns `true` if a rule with this name (case-insensitive) is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the grammar defines no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the rule names, sorted.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.iter().map(Rule::name).collect();
        names.sort_unstable();
        names
    }

    /// Iterate the rules in definition order (core rules first when included).
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// A greedy [`Matcher`] bound to this grammar.
    #[must_use]
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::with_grammar(self)
    }

    /// Validate `input` against the rule called `name`, greedily.
    ///
    /// # Errors
    ///
    /// [`MatchError::UnknownRule`] if `name` is not defined, otherwise as
    /// [`Matcher::validate`].
    pub fn validate(&self, input: &[u8], name: &str) -> Result<(), MatchError> {
        self.validate_with(input, name, Strategy::Greedy)
    }

    /// Validate `input` against the rule called `name` with `strategy`.
    ///
    /// # Errors
    ///
    /// [`MatchError::UnknownRule`] if `name` is not defined, otherwise as
    /// [`Matcher::validate`].
    pub fn validate_with(
        &self,
        input: &[u8],
        name: &str,
        strategy: Strategy,
    ) -> Result<(), MatchError> {
        let rule = self.get(name).ok_or_else(|| MatchError::UnknownRule {
            name: name.to_owned(),
        })?;
        self.matcher().with_strategy(strategy).validate(input, rule)
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<(usize, &Rule)> {
        let i = *self.index.get(&name.to_ascii_lowercase())?;
        Some((i, &self.rules[i]))
    }
}
