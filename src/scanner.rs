use crate::config::{Predicate, RuleSet};
use crate::domain_utils;
use crate::link_analysis;
use crate::url_utils;

use anyhow::Context;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Shortener domains flagged by `Predicate::ShortenedUrl` unless the rule
/// carries its own list
const SHORTENER_DOMAINS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "t.co",
    "goo.gl",
    "ow.ly",
    "is.gd",
    "buff.ly",
    "tiny.cc",
    "short.link",
    "soo.gd",
];

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input is not valid UTF-8 text")]
    NotText,
    #[error("input contains binary content")]
    BinaryContent,
    #[error("threshold {0} is outside the range 0.0..=1.0")]
    InvalidThreshold(f64),
}

/// The text and optional metadata submitted for one scan. Immutable for the
/// duration of the scan.
#[derive(Debug, Default, Clone)]
pub struct ScanInput {
    pub body: String,
    pub subject: Option<String>,
    pub sender: Option<String>,
}

impl ScanInput {
    pub fn new(body: impl Into<String>) -> Self {
        ScanInput {
            body: body.into(),
            subject: None,
            sender: None,
        }
    }

    /// Decode raw bytes as UTF-8 text, rejecting non-text input
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InputError> {
        let body = std::str::from_utf8(bytes).map_err(|_| InputError::NotText)?;
        Ok(ScanInput::new(body))
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    pub fn with_sender(mut self, sender: &str) -> Self {
        self.sender = Some(sender.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub score: f64,
    pub matched_rules: Vec<String>,
    pub verdict: bool,
}

/// Evaluates an immutable, ordered ruleset against scan inputs. All regex
/// patterns are compiled once at construction; scans take `&self` and are
/// free of side effects, so one engine can be shared across threads.
pub struct ScorerEngine {
    ruleset: RuleSet,
    compiled_patterns: HashMap<String, Regex>,
}

impl ScorerEngine {
    pub fn new(ruleset: RuleSet) -> anyhow::Result<Self> {
        let mut engine = ScorerEngine {
            ruleset,
            compiled_patterns: HashMap::new(),
        };
        engine.validate_rules()?;
        engine.compile_patterns()?;
        Ok(engine)
    }

    /// Engine over the built-in default ruleset
    pub fn with_default_rules() -> anyhow::Result<Self> {
        Self::new(RuleSet::default())
    }

    pub fn ruleset(&self) -> &RuleSet {
        &self.ruleset
    }

    fn validate_rules(&self) -> anyhow::Result<()> {
        for rule in &self.ruleset.rules {
            if rule.name.trim().is_empty() {
                anyhow::bail!("rule with empty name in ruleset");
            }
            if !rule.weight.is_finite() || rule.weight < 0.0 {
                anyhow::bail!(
                    "rule '{}' has invalid weight {} (must be non-negative)",
                    rule.name,
                    rule.weight
                );
            }
        }
        Ok(())
    }

    fn compile_patterns(&mut self) -> anyhow::Result<()> {
        for rule in &self.ruleset.rules {
            if let Predicate::RegexMatch { pattern } = &rule.predicate {
                if !self.compiled_patterns.contains_key(pattern) {
                    let regex = Regex::new(pattern)
                        .with_context(|| format!("invalid pattern in rule '{}'", rule.name))?;
                    self.compiled_patterns.insert(pattern.clone(), regex);
                }
            }
        }
        Ok(())
    }

    /// Evaluate every rule in declaration order against the input and
    /// aggregate matched weights into a score clamped to [0, 1].
    ///
    /// Fails fast on a threshold outside [0, 1] or a body containing binary
    /// content; never returns a partial result.
    pub fn scan(&self, input: &ScanInput, threshold: f64) -> Result<ScanResult, InputError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(InputError::InvalidThreshold(threshold));
        }
        if input.body.contains('\0') {
            return Err(InputError::BinaryContent);
        }

        // An empty body matches no rules, whatever the subject says
        if input.body.is_empty() {
            return Ok(ScanResult {
                score: 0.0,
                matched_rules: Vec::new(),
                verdict: 0.0 >= threshold,
            });
        }

        let mut score = 0.0;
        let mut matched_rules = Vec::new();
        for rule in &self.ruleset.rules {
            if self.evaluate(&rule.predicate, input) {
                log::debug!("rule '{}' matched (weight {})", rule.name, rule.weight);
                score += rule.weight;
                matched_rules.push(rule.name.clone());
            }
        }

        let score = score.clamp(0.0, 1.0);
        Ok(ScanResult {
            score,
            matched_rules,
            verdict: score >= threshold,
        })
    }

    fn evaluate(&self, predicate: &Predicate, input: &ScanInput) -> bool {
        match predicate {
            Predicate::SubstringMatch { pattern } => self
                .searchable_text(input)
                .contains(&pattern.to_lowercase()),
            Predicate::RegexMatch { pattern } => {
                // Patterns are compiled in new(); a miss here means the rule
                // was added after construction, which the API does not allow
                self.compiled_patterns
                    .get(pattern)
                    .map(|regex| {
                        regex.is_match(&input.body)
                            || input
                                .subject
                                .as_deref()
                                .is_some_and(|subject| regex.is_match(subject))
                    })
                    .unwrap_or(false)
            }
            Predicate::KeywordList { keywords, min_hits } => {
                let text = self.searchable_text(input);
                let hits = keywords
                    .iter()
                    .filter(|kw| text.contains(&kw.to_lowercase()))
                    .count();
                hits >= min_hits.unwrap_or(1).max(1)
            }
            Predicate::DomainMismatch { allow_subdomains } => {
                let allow_subs = allow_subdomains.unwrap_or(true);
                let sender_domain = match input
                    .sender
                    .as_deref()
                    .and_then(domain_utils::address_domain)
                {
                    Some(domain) => domain,
                    None => return false,
                };
                for url in url_utils::extract_urls(&input.body) {
                    if let Some(host) = url_utils::url_host(&url) {
                        if !domain_utils::related(&sender_domain, &host, allow_subs) {
                            log::info!(
                                "link domain '{host}' unrelated to sender domain '{sender_domain}'"
                            );
                            return true;
                        }
                    }
                }
                false
            }
            Predicate::ShortenedUrl { domains } => {
                let shorteners: Vec<String> = match domains {
                    Some(list) => list.iter().map(|d| d.to_lowercase()).collect(),
                    None => SHORTENER_DOMAINS.iter().map(|d| d.to_string()).collect(),
                };
                for url in url_utils::extract_urls(&input.body) {
                    if let Some(host) = url_utils::url_host(&url) {
                        if shorteners
                            .iter()
                            .any(|s| domain_utils::is_subdomain_of(&host, s))
                        {
                            log::info!("URL shortener detected: {url}");
                            return true;
                        }
                    }
                }
                false
            }
            Predicate::IpAddressUrl => {
                for url in url_utils::extract_urls(&input.body) {
                    if let Some(host) = url_utils::url_host(&url) {
                        if url_utils::is_ipv4_host(&host) {
                            log::info!("IP address URL detected: {url}");
                            return true;
                        }
                    }
                }
                false
            }
            Predicate::MismatchedLink => link_analysis::has_mismatched_display_link(&input.body),
        }
    }

    /// Body and subject lowercased into one haystack for text predicates
    fn searchable_text(&self, input: &ScanInput) -> String {
        match &input.subject {
            Some(subject) => format!("{}\n{}", subject, input.body).to_lowercase(),
            None => input.body.to_lowercase(),
        }
    }
}
