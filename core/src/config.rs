//! Config types for data-driven grammar construction.
//!
//! These types mirror the runtime grammar model but are serde-deserializable,
//! so a grammar can live in a JSON or YAML file and be loaded with
//! [`GrammarConfig::load()`].
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type | Loader method |
//! |-------------|-------------|---------------|
//! | [`GrammarConfig`] | [`Grammar`] | [`GrammarConfig::load()`] |
//! | [`RuleConfig`] | [`Rule`] | [`RuleConfig::load()`] |
//! | [`ElementConfig`] | [`Element`] | [`ElementConfig::load()`] |
//!
//! Loading applies every construction check the runtime constructors apply,
//! plus the size limits [`MAX_CHILDREN`] and [`MAX_LITERAL_LENGTH`].

use serde::Deserialize;

use crate::{
    Element, Grammar, GrammarBuilder, GrammarError, Rule, MAX_CHILDREN, MAX_DEPTH,
    MAX_LITERAL_LENGTH,
};

/// Configuration for a [`Grammar`].
///
/// ```json
/// {
///   "core_rules": true,
///   "rules": [
///     { "name": "number", "element": { "type": "repetition", "min": 1, "element": { "type": "rule", "name": "DIGIT" } } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrammarConfig {
    /// Include the RFC 5234 Appendix B.1 core rules.
    #[serde(default)]
    pub core_rules: bool,

    /// Rule definitions, in any order.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Configuration for a [`Rule`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// The rule name (`ALPHA *(ALPHA / DIGIT / "-")`).
    pub name: String,

    /// The rule's element tree.
    pub element: ElementConfig,
}

/// Configuration for an [`Element`].
///
/// Uses `#[serde(tag = "type")]` for discriminated union deserialization:
///
/// ```json
/// { "type": "literal", "value": "GET", "case_sensitive": true }
/// { "type": "byte", "value": 13 }
/// { "type": "range", "lo": 48, "hi": 57 }
/// { "type": "rule", "name": "DIGIT" }
/// { "type": "sequence", "elements": [...] }
/// { "type": "alternation", "elements": [...] }
/// { "type": "optional", "element": { ... } }
/// { "type": "repetition", "element": { ... }, "min": 1, "max": 4 }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum ElementConfig {
    /// A literal string, case-insensitive unless `case_sensitive` is set.
    #[serde(rename = "literal")]
    Literal {
        /// The literal text (its UTF-8 bytes are matched).
        value: String,
        /// Compare bytes exactly instead of folding ASCII case.
        #[serde(default)]
        case_sensitive: bool,
    },

    /// A single byte value.
    #[serde(rename = "byte")]
    Byte {
        /// The byte.
        value: u8,
    },

    /// An inclusive byte range.
    #[serde(rename = "range")]
    Range {
        /// Lower bound.
        lo: u8,
        /// Upper bound.
        hi: u8,
    },

    /// A reference to another rule by name.
    #[serde(rename = "rule")]
    Rule {
        /// The referenced rule.
        name: String,
    },

    /// Children matched back to back.
    #[serde(rename = "sequence")]
    Sequence {
        /// The children, in order.
        elements: Vec<ElementConfig>,
    },

    /// Ordered choice.
    #[serde(rename = "alternation")]
    Alternation {
        /// The branches, in priority order.
        elements: Vec<ElementConfig>,
    },

    /// Zero or one occurrence.
    #[serde(rename = "optional")]
    Optional {
        /// The optional element.
        element: Box<ElementConfig>,
    },

    /// Bounded repetition; `max` absent or `null` means unbounded.
    #[serde(rename = "repetition")]
    Repetition {
        /// The repeated element.
        element: Box<ElementConfig>,
        /// Minimum count.
        #[serde(default)]
        min: usize,
        /// Maximum count.
        #[serde(default)]
        max: Option<usize>,
    },
}

impl GrammarConfig {
    /// Parse a grammar config from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidConfig`] if the JSON does not describe a
    /// grammar config.
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        serde_json::from_str(json).map_err(|e| GrammarError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Build the runtime [`Grammar`].
    ///
    /// # Errors
    ///
    /// - Any error from [`RuleConfig::load()`]
    /// - [`GrammarError::DuplicateRule`] / [`GrammarError::UndefinedRule`] from
    ///   [`GrammarBuilder::build()`]
    pub fn load(self) -> Result<Grammar, GrammarError> {
        let rules = self
            .rules
            .into_iter()
            .map(RuleConfig::load)
            .collect::<Result<Vec<_>, _>>()?;
        let builder = GrammarBuilder::new().rules(rules);
        if self.core_rules {
            builder.core_rules().build()
        } else {
            builder.build()
        }
    }
}

impl RuleConfig {
    /// Build the runtime [`Rule`].
    ///
    /// # Errors
    ///
    /// - [`GrammarError::InvalidRuleName`]: not a valid ABNF rule name
    /// - [`GrammarError::DepthExceeded`]: element nests deeper than [`MAX_DEPTH`]
    /// - Any error from [`ElementConfig::load()`]
    pub fn load(self) -> Result<Rule, GrammarError> {
        let element = self.element.load_at(&self.name, 1)?;
        Rule::new(self.name, element)
    }
}

impl ElementConfig {
    /// Build the runtime [`Element`].
    ///
    /// # Errors
    ///
    /// - [`GrammarError::InvalidRange`] / [`GrammarError::InvalidBounds`]
    /// - [`GrammarError::TooManyChildren`]: more than [`MAX_CHILDREN`] children
    /// - [`GrammarError::LiteralTooLong`]: literal longer than [`MAX_LITERAL_LENGTH`]
    /// - [`GrammarError::DepthExceeded`]: nesting deeper than [`MAX_DEPTH`]
    pub fn load(self) -> Result<Element, GrammarError> {
        self.load_at("<element>", 1)
    }

    // Depth is checked on the way down so a hostile config cannot recurse
    // past the limit before `Rule::new` sees the finished tree.
    fn load_at(self, rule: &str, depth: usize) -> Result<Element, GrammarError> {
        if depth > MAX_DEPTH {
            return Err(GrammarError::DepthExceeded {
                rule: rule.to_owned(),
                depth,
                max: MAX_DEPTH,
            });
        }
        match self {
            Self::Literal {
                value,
                case_sensitive,
            } => {
                if value.len() > MAX_LITERAL_LENGTH {
                    return Err(GrammarError::LiteralTooLong {
                        len: value.len(),
                        max: MAX_LITERAL_LENGTH,
                    });
                }
                Ok(Element::literal(value, case_sensitive))
            }
            Self::Byte { value } => Ok(Element::byte(value)),
            Self::Range { lo, hi } => Element::range(lo, hi),
            Self::Rule { name } => {
                if !crate::rule::is_valid_name(&name) {
                    return Err(GrammarError::InvalidRuleName { name });
                }
                Ok(Element::rule_ref(name))
            }
            Self::Sequence { elements } => {
                Ok(Element::sequence(load_children(elements, rule, depth)?))
            }
            Self::Alternation { elements } => {
                Ok(Element::alternation(load_children(elements, rule, depth)?))
            }
            Self::Optional { element } => Ok(Element::optional(element.load_at(rule, depth + 1)?)),
            Self::Repetition { element, min, max } => {
                Element::repeat(element.load_at(rule, depth + 1)?, min, max)
            }
        }
    }
}

fn load_children(
    elements: Vec<ElementConfig>,
    rule: &str,
    depth: usize,
) -> Result<Vec<Element>, GrammarError> {
    if elements.len() > MAX_CHILDREN {
        return Err(GrammarError::TooManyChildren {
            count: elements.len(),
            max: MAX_CHILDREN,
        });
    }
    elements
        .into_iter()
        .map(|e| e.load_at(rule, depth + 1))
        .collect()
}
