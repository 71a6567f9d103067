use crate::domain_utils;
use crate::url_utils;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ANCHOR_RE: Regex =
        Regex::new(r#"(?is)<a\s[^>]*href\s*=\s*["'](https?://[^"']+)["'][^>]*>(.*?)</a>"#)
            .unwrap();
    static ref TAG_RE: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref MD_LINK_RE: Regex = Regex::new(r"\[([^\]]+)\]\((https?://[^)\s]+)\)").unwrap();
    static ref PAREN_URL_RE: Regex = Regex::new(r"\((https?://[^)\s]+)\)").unwrap();
    static ref DOMAIN_TOKEN_RE: Regex =
        Regex::new(r"(?i)\b[a-z0-9][a-z0-9.-]*\.[a-z]{2,}\b").unwrap();
}

/// Detect links whose displayed text claims a different domain than the
/// actual target. Covers HTML anchors, markdown links, and bare URLs in
/// parentheses whose domain appears nowhere else in the text.
pub fn has_mismatched_display_link(text: &str) -> bool {
    anchor_mismatch(text) || markdown_mismatch(text) || parenthesized_mismatch(text)
}

/// First domain-looking token in a piece of display text, lowercased
fn display_domain(text: &str) -> Option<String> {
    DOMAIN_TOKEN_RE
        .find(text)
        .map(|m| m.as_str().to_lowercase())
}

fn anchor_mismatch(html: &str) -> bool {
    for caps in ANCHOR_RE.captures_iter(html) {
        let href = &caps[1];
        let visible = TAG_RE.replace_all(&caps[2], "");
        let claimed = match display_domain(visible.trim()) {
            Some(domain) => domain,
            None => continue,
        };
        if let Some(host) = url_utils::url_host(href) {
            if !domain_utils::related(&claimed, &host, true) {
                log::debug!("anchor text claims '{claimed}' but href points at '{host}'");
                return true;
            }
        }
    }
    false
}

fn markdown_mismatch(text: &str) -> bool {
    for caps in MD_LINK_RE.captures_iter(text) {
        let label = &caps[1];
        let target = &caps[2];
        let claimed = match display_domain(label) {
            Some(domain) => domain,
            None => continue,
        };
        if let Some(host) = url_utils::url_host(target) {
            if !domain_utils::related(&claimed, &host, true) {
                log::debug!("markdown label claims '{claimed}' but link points at '{host}'");
                return true;
            }
        }
    }
    false
}

/// A URL in parentheses is suspicious when its domain is never mentioned in
/// the surrounding text, e.g. "visit our portal (http://evil.example/x)".
fn parenthesized_mismatch(text: &str) -> bool {
    let mut targets = Vec::new();
    let mut remaining = String::with_capacity(text.len());
    let mut last_end = 0;
    for m in PAREN_URL_RE.find_iter(text) {
        // "[label](url)" is a markdown link, handled above
        if text[..m.start()].ends_with(']') {
            continue;
        }
        remaining.push_str(&text[last_end..m.start()]);
        last_end = m.end();
        if let Some(caps) = PAREN_URL_RE.captures(m.as_str()) {
            if let Some(host) = url_utils::url_host(&caps[1]) {
                targets.push(domain_utils::canonicalize(&host));
            }
        }
    }
    remaining.push_str(&text[last_end..]);

    let remaining = remaining.to_lowercase();
    for domain in targets {
        if !remaining.contains(&domain) {
            log::debug!("parenthesized link domain '{domain}' not mentioned in text");
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_text_claiming_other_domain() {
        let html = r#"<html><body><p>Please <a href="http://malicious.example">www.yourbank.com</a> to verify.</p></body></html>"#;
        assert!(has_mismatched_display_link(html));
    }

    #[test]
    fn test_anchor_text_matching_href() {
        let html = r#"<a href="https://www.example.com/page">example.com</a>"#;
        assert!(!has_mismatched_display_link(html));
    }

    #[test]
    fn test_anchor_plain_text_label_is_ignored() {
        let html = r#"<a href="https://news.example.com/issue/42">Read the newsletter</a>"#;
        assert!(!has_mismatched_display_link(html));
    }

    #[test]
    fn test_markdown_label_claiming_other_domain() {
        let text = "Login at [www.paypal.com](http://evil.example/session)";
        assert!(has_mismatched_display_link(text));
    }

    #[test]
    fn test_markdown_label_matching_target() {
        let text = "Docs live at [example.com](https://example.com/docs)";
        assert!(!has_mismatched_display_link(text));
    }

    #[test]
    fn test_parenthesized_url_with_unmentioned_domain() {
        let text = "Update your billing info here (http://evil.example/login) today.";
        assert!(has_mismatched_display_link(text));
    }

    #[test]
    fn test_parenthesized_url_with_mentioned_domain() {
        let text = "See www.example.com (https://example.com/docs) for details.";
        assert!(!has_mismatched_display_link(text));
    }

    #[test]
    fn test_plain_text_without_links() {
        assert!(!has_mismatched_display_link(
            "Hello, see attached invoice for March."
        ));
    }
}
