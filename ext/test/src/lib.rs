//! rabnf-test: Conformance fixtures and sample grammars
//!
//! Provides grammars taken from real IETF specifications, built in code, for
//! exercising the engine beyond single rules. The YAML fixture runner lives in
//! [`fixture`] (feature = `"fixtures"`, on by default).
//!
//! # Example
//!
//! ```
//! use rabnf_test::grammars;
//!
//! let grammar = grammars::http_version();
//! assert!(grammar.validate(b"HTTP/1.1", "HTTP-version").is_ok());
//! assert!(grammar.validate(b"http/1.1", "HTTP-version").is_err());
//! ```

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Sample grammars built with the public API.
pub mod grammars {
    use rabnf::prelude::*;

    fn rule(name: &str, element: Element) -> Rule {
        match Rule::new(name, element) {
            Ok(rule) => rule,
            Err(e) => panic!("sample rule {name} is invalid: {e}"),
        }
    }

    fn build(builder: GrammarBuilder) -> Grammar {
        match builder.core_rules().build() {
            Ok(grammar) => grammar,
            Err(e) => panic!("sample grammar is invalid: {e}"),
        }
    }

    fn lit(s: &str) -> Element {
        Element::literal(s, false)
    }

    fn r(name: &str) -> Element {
        Element::rule_ref(name)
    }

    fn range(lo: u8, hi: u8) -> Element {
        match Element::range(lo, hi) {
            Ok(e) => e,
            Err(e) => panic!("sample range is invalid: {e}"),
        }
    }

    fn exactly(n: usize, element: Element) -> Element {
        Element::repeat_within(element, Bounds::exactly(n))
    }

    /// RFC 3986 §3.1: `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
    #[must_use]
    pub fn uri_scheme() -> Grammar {
        build(GrammarBuilder::new().rule(rule(
            "scheme",
            Element::sequence([
                r("ALPHA"),
                Element::zero_or_more(Element::alternation([
                    r("ALPHA"),
                    r("DIGIT"),
                    lit("+"),
                    lit("-"),
                    lit("."),
                ])),
            ]),
        )))
    }

    /// RFC 9112 §2.3: `HTTP-version = HTTP-name "/" DIGIT "." DIGIT`
    /// where `HTTP-name = %s"HTTP"`.
    #[must_use]
    pub fn http_version() -> Grammar {
        build(GrammarBuilder::new().rules([
            rule(
                "HTTP-version",
                Element::sequence([r("HTTP-name"), lit("/"), r("DIGIT"), lit("."), r("DIGIT")]),
            ),
            rule("HTTP-name", Element::literal("HTTP", true)),
        ]))
    }

    /// RFC 3986 §3.2.2 `IPv4address`, with `dec-octet` alternatives in the
    /// RFC's own order (shortest first).
    ///
    /// ```abnf
    /// IPv4address = dec-octet "." dec-octet "." dec-octet "." dec-octet
    /// dec-octet   = DIGIT                 ; 0-9
    ///             / %x31-39 DIGIT         ; 10-99
    ///             / "1" 2DIGIT            ; 100-199
    ///             / "2" %x30-34 DIGIT     ; 200-249
    ///             / "25" %x30-35          ; 250-255
    /// ```
    ///
    /// The greedy strategy commits to `DIGIT` and rejects multi-digit octets;
    /// backtracking accepts every valid address.
    #[must_use]
    pub fn ipv4_rfc_order() -> Grammar {
        ipv4([
            r("DIGIT"),
            Element::sequence([range(0x31, 0x39), r("DIGIT")]),
            Element::sequence([lit("1"), exactly(2, r("DIGIT"))]),
            Element::sequence([lit("2"), range(0x30, 0x34), r("DIGIT")]),
            Element::sequence([lit("25"), range(0x30, 0x35)]),
        ])
    }

    /// `IPv4address` with `dec-octet` alternatives reordered longest first,
    /// which the greedy strategy handles correctly.
    #[must_use]
    pub fn ipv4_longest_first() -> Grammar {
        ipv4([
            Element::sequence([lit("25"), range(0x30, 0x35)]),
            Element::sequence([lit("2"), range(0x30, 0x34), r("DIGIT")]),
            Element::sequence([lit("1"), exactly(2, r("DIGIT"))]),
            Element::sequence([range(0x31, 0x39), r("DIGIT")]),
            r("DIGIT"),
        ])
    }

    fn ipv4(dec_octet: [Element; 5]) -> Grammar {
        build(GrammarBuilder::new().rules([
            rule(
                "IPv4address",
                Element::sequence([
                    r("dec-octet"),
                    lit("."),
                    r("dec-octet"),
                    lit("."),
                    r("dec-octet"),
                    lit("."),
                    r("dec-octet"),
                ]),
            ),
            rule("dec-octet", Element::alternation(dec_octet)),
        ]))
    }

    /// RFC 5322-style `quoted-string` subset:
    /// `quoted-string = DQUOTE *(qtext / quoted-pair) DQUOTE`.
    #[must_use]
    pub fn quoted_string() -> Grammar {
        build(GrammarBuilder::new().rules([
            rule(
                "quoted-string",
                Element::sequence([
                    r("DQUOTE"),
                    Element::zero_or_more(Element::alternation([r("qtext"), r("quoted-pair")])),
                    r("DQUOTE"),
                ]),
            ),
            // %d33 / %d35-91 / %d93-126: VCHAR minus DQUOTE and backslash, plus SP
            rule(
                "qtext",
                Element::alternation([
                    Element::byte(0x20),
                    Element::byte(0x21),
                    range(0x23, 0x5B),
                    range(0x5D, 0x7E),
                ]),
            ),
            rule(
                "quoted-pair",
                Element::sequence([Element::byte(b'\\'), Element::alternation([r("VCHAR"), r("WSP")])]),
            ),
        ]))
    }

    /// Every sample grammar with the rule to validate against.
    #[must_use]
    pub fn all() -> Vec<(&'static str, Grammar)> {
        vec![
            ("scheme", uri_scheme()),
            ("HTTP-version", http_version()),
            ("IPv4address", ipv4_rfc_order()),
            ("IPv4address", ipv4_longest_first()),
            ("quoted-string", quoted_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::grammars;
    use rabnf::{MatchError, Strategy};

    #[test]
    fn uri_scheme() {
        let g = grammars::uri_scheme();
        for ok in ["http", "svn+ssh", "a", "z39.50r"] {
            assert!(g.validate(ok.as_bytes(), "scheme").is_ok(), "{ok}");
        }
        for bad in ["", "1http", "+x"] {
            assert!(g.validate(bad.as_bytes(), "scheme").is_err(), "{bad}");
        }
    }

    #[test]
    fn http_version_is_case_sensitive() {
        let g = grammars::http_version();
        assert!(g.validate(b"HTTP/2.0", "HTTP-version").is_ok());
        assert!(g.validate(b"Http/1.1", "http-version").is_err());
        assert!(matches!(
            g.validate(b"HTTP/1.10", "HTTP-version"),
            Err(MatchError::IncompleteMatch { consumed: 8, total: 9, .. })
        ));
    }

    #[test]
    fn ipv4_rule_order_matters_for_greedy() {
        let rfc = grammars::ipv4_rfc_order();
        let longest = grammars::ipv4_longest_first();

        assert!(rfc.validate(b"1.2.3.4", "IPv4address").is_ok());
        assert!(rfc.validate(b"192.168.0.1", "IPv4address").is_err());
        assert!(rfc
            .validate_with(b"192.168.0.1", "IPv4address", Strategy::Backtracking)
            .is_ok());

        for addr in ["192.168.0.1", "255.255.255.255", "0.0.0.0", "10.200.49.250"] {
            assert!(longest.validate(addr.as_bytes(), "IPv4address").is_ok(), "{addr}");
        }
        for bad in ["256.1.1.1", "1.2.3", "1.2.3.4.5", "01.2.3.4"] {
            assert!(longest.validate(bad.as_bytes(), "IPv4address").is_err(), "{bad}");
            assert!(
                rfc.validate_with(bad.as_bytes(), "IPv4address", Strategy::Backtracking)
                    .is_err(),
                "{bad}"
            );
        }
    }

    #[test]
    fn quoted_string() {
        let g = grammars::quoted_string();
        assert!(g.validate(br#""hello world""#, "quoted-string").is_ok());
        assert!(g.validate(br#""say \"hi\"""#, "quoted-string").is_ok());
        assert!(g.validate(br#""""#, "quoted-string").is_ok());
        assert!(g.validate(br#""unterminated"#, "quoted-string").is_err());
    }
}
