//! Rule: A named top-level element

use crate::{Element, GrammarError, MAX_DEPTH};
use std::fmt;

/// A named grammar rule: the unit a caller validates against.
///
/// The name is diagnostic (it appears in every [`MatchError`](crate::MatchError))
/// and is the lookup key inside a [`Grammar`](crate::Grammar). Rule names
/// compare case-insensitively there, per RFC 5234 §2.1.
///
/// # INV: valid name, bounded depth
///
/// [`Rule::new`] rejects names that are not `ALPHA *(ALPHA / DIGIT / "-")`
/// and element trees deeper than [`MAX_DEPTH`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    name: String,
    element: Element,
}

impl Rule {
    /// Create a new rule.
    ///
    /// # Errors
    ///
    /// - [`GrammarError::InvalidRuleName`] if the name is not a valid ABNF rule name
    /// - [`GrammarError::DepthExceeded`] if the element nests deeper than [`MAX_DEPTH`]
    pub fn new(name: impl Into<String>, element: Element) -> Result<Self, GrammarError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(GrammarError::InvalidRuleName { name });
        }
        let depth = element.depth();
        if depth > MAX_DEPTH {
            return Err(GrammarError::DepthExceeded {
                rule: name,
                depth,
                max: MAX_DEPTH,
            });
        }
        Ok(Self { name, element })
    }

    // For the built-in table, whose names and depths are fixed.
    pub(crate) fn new_unchecked(name: &str, element: Element) -> Self {
        debug_assert!(is_valid_name(name));
        Self {
            name: name.to_owned(),
            element,
        }
    }

    /// The rule name, as written.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rule's element tree.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Depth of the rule's element tree.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.element.depth()
    }

    /// Consume the rule, returning its name and element.
    #[must_use]
    pub fn into_parts(self) -> (String, Element) {
        (self.name, self.element)
    }
}

/// Renders `name = element`.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.element)
    }
}

/// `rulename = ALPHA *(ALPHA / DIGIT / "-")`
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'-')
}
