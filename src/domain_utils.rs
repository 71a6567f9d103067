//! Minimal domain and address helpers shared by the predicates.

/// Extract the bare email address from a header-style value.
/// Handles "Display Name <user@example.com>" as well as a bare address.
pub fn extract_address(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let (Some(start), Some(end)) = (raw.find('<'), raw.rfind('>')) {
        if start < end {
            return Some(raw[start + 1..end].trim().to_lowercase());
        }
    }
    if raw.contains('@') {
        Some(raw.to_lowercase())
    } else {
        None
    }
}

/// Extract the domain part of an email address (header-style values accepted)
pub fn address_domain(raw: &str) -> Option<String> {
    let address = extract_address(raw)?;
    address.split('@').nth(1).map(|s| s.to_lowercase())
}

/// Canonicalize a domain for comparison (lowercase, strip "www." prefix)
pub fn canonicalize(domain: &str) -> String {
    let lower = domain.to_lowercase();
    match lower.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Check if domain1 is a subdomain of domain2.
/// - is_subdomain_of("mail.etsy.com", "etsy.com") -> true
/// - is_subdomain_of("etsy.com", "mail.etsy.com") -> false
/// - is_subdomain_of("notetsy.com", "etsy.com") -> false
pub fn is_subdomain_of(domain1: &str, domain2: &str) -> bool {
    if domain1 == domain2 {
        return true;
    }
    if domain1.len() > domain2.len() && domain1.ends_with(domain2) {
        let prefix_len = domain1.len() - domain2.len();
        domain1.as_bytes()[prefix_len - 1] == b'.'
    } else {
        false
    }
}

/// Whether two domains belong together. With `allow_subdomains` a subdomain
/// relation in either direction counts as related.
pub fn related(domain1: &str, domain2: &str, allow_subdomains: bool) -> bool {
    let d1 = canonicalize(domain1);
    let d2 = canonicalize(domain2);
    if d1 == d2 {
        return true;
    }
    allow_subdomains && (is_subdomain_of(&d1, &d2) || is_subdomain_of(&d2, &d1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_address() {
        assert_eq!(
            extract_address("Alice <alice@example.com>"),
            Some("alice@example.com".to_string())
        );
        assert_eq!(
            extract_address("bob@example.com"),
            Some("bob@example.com".to_string())
        );
        assert_eq!(extract_address("not an address"), None);
    }

    #[test]
    fn test_address_domain() {
        assert_eq!(
            address_domain("user@Example.COM"),
            Some("example.com".to_string())
        );
        assert_eq!(
            address_domain("\"Support\" <help@bank.example>"),
            Some("bank.example".to_string())
        );
        assert_eq!(address_domain("invalid"), None);
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("www.example.com"), "example.com");
        assert_eq!(canonicalize("Example.com"), "example.com");
    }

    #[test]
    fn test_is_subdomain_of() {
        assert!(is_subdomain_of("mail.etsy.com", "etsy.com"));
        assert!(!is_subdomain_of("etsy.com", "mail.etsy.com"));
        assert!(!is_subdomain_of("notetsy.com", "etsy.com"));
    }

    #[test]
    fn test_related() {
        assert!(related("www.example.com", "example.com", false));
        assert!(related("mail.example.com", "example.com", true));
        assert!(!related("mail.example.com", "example.com", false));
        assert!(!related("malicious.example", "example.com", true));
    }
}
