//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the rabnf engine. A fixture is a
//! grammar in the config format (the same shape as [`GrammarConfig`]), the
//! rule to validate against, and a list of inputs with their expected outcome:
//!
//! ```yaml
//! name: crlf
//! description: CRLF needs both bytes
//! grammar:
//!   core_rules: true
//! rule: CRLF
//! cases:
//!   - name: both bytes
//!     hex: "0d0a"
//!     expect: match
//!   - name: cr only
//!     hex: "0d"
//!     expect: does_not_match
//! ```

use rabnf::prelude::*;
use rabnf::GrammarConfig;
use serde::Deserialize;
use std::fmt;

/// A complete test fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Raw grammar config; parsed at run time so malformed grammars can be
    /// fixtures too.
    pub grammar: serde_json::Value,
    /// The grammar fails to load (parse, limits, or build checks).
    #[serde(default)]
    pub expect_error: bool,
    #[serde(default)]
    pub rule: Option<String>,
    #[serde(default)]
    pub strategy: Strategy,
    /// Validate with a matcher that has no grammar, so references are unsupported.
    #[serde(default)]
    pub standalone: bool,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub name: String,
    /// Input as text (its UTF-8 bytes).
    #[serde(default)]
    pub input: Option<String>,
    /// Input as hex digits, for bytes text cannot carry.
    #[serde(default)]
    pub hex: Option<String>,
    pub expect: Expect,
    /// Bytes consumed, checked for `incomplete`.
    #[serde(default)]
    pub consumed: Option<usize>,
}

/// Expected outcome of one case, one per [`MatchError`] variant plus `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expect {
    Match,
    DoesNotMatch,
    Incomplete,
    Unsupported,
    UnknownRule,
    LeftRecursion,
    RecursionLimit,
}

/// What a case actually produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub expect: Expect,
    pub consumed: Option<usize>,
}

impl Outcome {
    fn of(result: &Result<(), MatchError>) -> Self {
        let (expect, consumed) = match result {
            Ok(()) => (Expect::Match, None),
            Err(MatchError::DoesNotMatch { .. }) => (Expect::DoesNotMatch, None),
            Err(MatchError::IncompleteMatch { consumed, .. }) => (Expect::Incomplete, Some(*consumed)),
            Err(MatchError::UnsupportedFeature(_)) => (Expect::Unsupported, None),
            Err(MatchError::UnknownRule { .. }) => (Expect::UnknownRule, None),
            Err(MatchError::LeftRecursion { .. }) => (Expect::LeftRecursion, None),
            Err(MatchError::RecursionLimit { .. }) => (Expect::RecursionLimit, None),
        };
        Self { expect, consumed }
    }

    fn satisfies(&self, case: &TestCase) -> bool {
        self.expect == case.expect && (case.consumed.is_none() || case.consumed == self.consumed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.consumed {
            Some(n) => write!(f, "{:?} (consumed {n})", self.expect),
            None => write!(f, "{:?}", self.expect),
        }
    }
}

impl TestCase {
    /// The input bytes, from `input` or `hex` (exactly one must be set).
    pub fn bytes(&self) -> Result<Vec<u8>, String> {
        match (&self.input, &self.hex) {
            (Some(text), None) => Ok(text.as_bytes().to_vec()),
            (None, Some(digits)) => hex::decode(digits).map_err(|e| format!("bad hex: {e}")),
            (None, None) => Err("case has neither `input` nor `hex`".to_owned()),
            (Some(_), Some(_)) => Err("case has both `input` and `hex`".to_owned()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Expect,
    pub actual: Outcome,
    /// The error message, when matching failed.
    pub message: Option<String>,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Load the fixture's grammar through the config path.
    pub fn grammar(&self) -> Result<Grammar, GrammarError> {
        let config: GrammarConfig =
            serde_json::from_value(self.grammar.clone()).map_err(|e| GrammarError::InvalidConfig {
                message: e.to_string(),
            })?;
        config.load()
    }

    /// Run all test cases and return results
    pub fn run(&self) -> Result<Vec<CaseResult>, GrammarError> {
        let grammar = self.grammar()?;
        let matcher = if self.standalone {
            Matcher::new()
        } else {
            Matcher::with_grammar(&grammar)
        }
        .with_strategy(self.strategy);

        let rule_name = self.rule.as_deref().unwrap_or_default();
        let rule = grammar.get(rule_name);

        Ok(self
            .cases
            .iter()
            .map(|case| {
                let input = case.bytes().unwrap_or_else(|e| {
                    panic!("fixture '{}' case '{}': {e}", self.name, case.name)
                });
                let result = match rule {
                    Some(rule) => matcher.validate(&input, rule),
                    None => Err(MatchError::UnknownRule {
                        name: rule_name.to_owned(),
                    }),
                };
                let actual = Outcome::of(&result);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual.satisfies(case),
                    expected: case.expect,
                    actual,
                    message: result.err().map(|e| e.to_string()),
                }
            })
            .collect())
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        if self.expect_error {
            let result = self.grammar();
            assert!(
                result.is_err(),
                "Fixture '{}' expected a grammar error, but the grammar loaded",
                self.name
            );
            return;
        }

        let results = self
            .run()
            .unwrap_or_else(|e| panic!("Fixture '{}' grammar failed to load: {e}", self.name));
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {:?}, got {} ({})",
                self.name,
                result.case_name,
                result.expected,
                result.actual,
                result.message.as_deref().unwrap_or("no error")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGIT_FIXTURE: &str = r#"
name: digit
grammar:
  core_rules: true
rule: DIGIT
cases:
  - name: five
    input: "5"
    expect: match
  - name: two digits
    input: "55"
    expect: incomplete
    consumed: 1
  - name: letter
    hex: "41"
    expect: does_not_match
"#;

    #[test]
    fn parse_and_run_fixture() {
        let fixture = Fixture::from_yaml(DIGIT_FIXTURE).unwrap();
        assert_eq!(fixture.strategy, Strategy::Greedy);
        let results = fixture.run().unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
        fixture.run_and_assert();
    }

    #[test]
    fn wrong_expectation_fails() {
        let yaml = DIGIT_FIXTURE.replace("expect: match", "expect: does_not_match");
        let fixture = Fixture::from_yaml(&yaml).unwrap();
        let results = fixture.run().unwrap();
        assert!(!results[0].passed);
        assert_eq!(results[0].actual.expect, Expect::Match);
    }

    #[test]
    fn multi_document_yaml() {
        let yaml = format!("{DIGIT_FIXTURE}---\n{DIGIT_FIXTURE}");
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
    }

    #[test]
    fn case_bytes_from_text_or_hex() {
        let case = |input: Option<&str>, hex: Option<&str>| TestCase {
            name: "c".into(),
            input: input.map(str::to_owned),
            hex: hex.map(str::to_owned),
            expect: Expect::Match,
            consumed: None,
        };
        assert_eq!(case(Some("ab"), None).bytes().unwrap(), b"ab");
        assert_eq!(case(None, Some("0d0a")).bytes().unwrap(), vec![0x0D, 0x0A]);
        assert!(case(None, None).bytes().is_err());
        assert!(case(Some("x"), Some("78")).bytes().is_err());
        assert!(case(None, Some("zz")).bytes().is_err());
    }
}
