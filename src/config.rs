use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub weight: f64,
    pub predicate: Predicate,
}

/// Closed set of detection predicates. Each variant is evaluated against the
/// scan input by the engine; adding a heuristic means adding a variant here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Predicate {
    /// Case-insensitive substring match over body and subject
    SubstringMatch {
        pattern: String,
    },
    /// Regex match over body and subject (compiled once at engine construction)
    RegexMatch {
        pattern: String,
    },
    /// Matches when at least `min_hits` distinct keywords occur (default: 1)
    KeywordList {
        keywords: Vec<String>,
        min_hits: Option<usize>,
    },
    /// Sender domain differs from the domain of a link in the body.
    /// Never matches when the input has no sender or the body has no links.
    DomainMismatch {
        // Treat subdomains of the sender domain as related (default: true)
        allow_subdomains: Option<bool>,
    },
    /// A body link is hosted on a known URL-shortener domain
    ShortenedUrl {
        // Override the built-in shortener list
        domains: Option<Vec<String>>,
    },
    /// A body link uses a literal IPv4 address instead of a hostname
    IpAddressUrl,
    /// Displayed link text claims a different domain than the actual target
    /// (HTML anchors, markdown links, parenthesized URLs)
    MismatchedLink,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet {
            rules: vec![
                Rule {
                    name: "phishing_keywords".to_string(),
                    weight: 0.30,
                    predicate: Predicate::KeywordList {
                        keywords: vec![
                            "account".to_string(),
                            "verify".to_string(),
                            "update".to_string(),
                            "password".to_string(),
                            "login".to_string(),
                            "bank".to_string(),
                            "secure".to_string(),
                            "urgent".to_string(),
                            "limited".to_string(),
                            "suspend".to_string(),
                            "confirm".to_string(),
                            "click".to_string(),
                            "link".to_string(),
                            "ssn".to_string(),
                            "social security".to_string(),
                        ],
                        min_hits: Some(4),
                    },
                },
                Rule {
                    name: "urgency_language".to_string(),
                    weight: 0.30,
                    predicate: Predicate::KeywordList {
                        keywords: vec![
                            "urgent".to_string(),
                            "act now".to_string(),
                            "immediately".to_string(),
                            "click here".to_string(),
                            "wire transfer".to_string(),
                        ],
                        min_hits: Some(1),
                    },
                },
                Rule {
                    name: "shortened_url".to_string(),
                    weight: 0.25,
                    predicate: Predicate::ShortenedUrl { domains: None },
                },
                Rule {
                    name: "ip_address_url".to_string(),
                    weight: 0.30,
                    predicate: Predicate::IpAddressUrl,
                },
                Rule {
                    name: "mismatched_link".to_string(),
                    weight: 0.50,
                    predicate: Predicate::MismatchedLink,
                },
                Rule {
                    name: "sender_link_mismatch".to_string(),
                    weight: 0.50,
                    predicate: Predicate::DomainMismatch {
                        allow_subdomains: Some(true),
                    },
                },
            ],
        }
    }
}

impl RuleSet {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let ruleset: RuleSet = serde_yaml::from_str(&content)?;
        Ok(ruleset)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ruleset_yaml_round_trip() {
        let ruleset = RuleSet::default();
        let yaml = serde_yaml::to_string(&ruleset).unwrap();
        let parsed: RuleSet = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.rules.len(), ruleset.rules.len());
        for (a, b) in parsed.rules.iter().zip(ruleset.rules.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.weight, b.weight);
        }
    }

    #[test]
    fn test_parse_tagged_predicate() {
        let yaml = r#"
rules:
  - name: "bogus brand"
    weight: 0.4
    predicate:
      type: RegexMatch
      pattern: "(?i)paypa1"
  - name: "shortener"
    weight: 0.25
    predicate:
      type: ShortenedUrl
      domains: ["sho.rt"]
"#;
        let ruleset: RuleSet = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(ruleset.rules.len(), 2);
        match &ruleset.rules[0].predicate {
            Predicate::RegexMatch { pattern } => assert_eq!(pattern, "(?i)paypa1"),
            other => panic!("expected RegexMatch, got {other:?}"),
        }
        match &ruleset.rules[1].predicate {
            Predicate::ShortenedUrl { domains } => {
                assert_eq!(domains.as_deref(), Some(["sho.rt".to_string()].as_slice()))
            }
            other => panic!("expected ShortenedUrl, got {other:?}"),
        }
    }

    #[test]
    fn test_default_rule_order_is_stable() {
        let ruleset = RuleSet::default();
        let names: Vec<&str> = ruleset.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "phishing_keywords",
                "urgency_language",
                "shortened_url",
                "ip_address_url",
                "mismatched_link",
                "sender_link_mismatch",
            ]
        );
    }
}
