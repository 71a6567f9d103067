use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r#"(?i)https?://[^\s<>()\[\]"']+"#).unwrap();
    static ref IPV4_RE: Regex = Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").unwrap();
}

/// Extract all http/https URLs from free text, deduplicated, in order of
/// first appearance.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut urls = Vec::new();
    for m in URL_RE.find_iter(text) {
        let url = m.as_str().trim_end_matches(['.', ',', ';', '!', '?']);
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// Lowercased host of a URL, or None if it does not parse
pub fn url_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(|h| h.to_lowercase())
}

/// Whether a host is a literal IPv4 address
pub fn is_ipv4_host(host: &str) -> bool {
    IPV4_RE.is_match(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_urls() {
        let text = "Go to http://example.com/a and https://other.example/b?x=1 now.";
        assert_eq!(
            extract_urls(text),
            vec![
                "http://example.com/a".to_string(),
                "https://other.example/b?x=1".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_urls_dedup_and_punctuation() {
        let text = "See http://example.com/a, then http://example.com/a.";
        assert_eq!(extract_urls(text), vec!["http://example.com/a".to_string()]);
    }

    #[test]
    fn test_extract_urls_none() {
        assert!(extract_urls("no links here").is_empty());
    }

    #[test]
    fn test_url_host() {
        assert_eq!(
            url_host("http://Mail.Example.COM/login"),
            Some("mail.example.com".to_string())
        );
        assert_eq!(
            url_host("http://192.0.2.1/login"),
            Some("192.0.2.1".to_string())
        );
        assert_eq!(url_host("not a url"), None);
    }

    #[test]
    fn test_is_ipv4_host() {
        assert!(is_ipv4_host("192.0.2.1"));
        assert!(!is_ipv4_host("example.com"));
        assert!(!is_ipv4_host("192.0.2.1.evil.example"));
    }
}
