//! IPv4 canonicalization.

use std::net::{IpAddr, Ipv4Addr};

/// Parse `raw` as an IPv4 address and re-format it in dotted-decimal form.
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are unwrapped. Anything else,
/// including plain IPv6, returns `None`.
pub fn canonical_ipv4(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match raw.parse::<IpAddr>().ok()? {
        IpAddr::V4(v4) => Some(v4.to_string()),
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(|v4: Ipv4Addr| v4.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ipv4_is_unchanged() {
        assert_eq!(canonical_ipv4("203.0.113.5").as_deref(), Some("203.0.113.5"));
        assert_eq!(canonical_ipv4("  10.0.0.1 ").as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_mapped_ipv6_is_unwrapped() {
        assert_eq!(
            canonical_ipv4("::ffff:192.0.2.44").as_deref(),
            Some("192.0.2.44")
        );
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert_eq!(canonical_ipv4(""), None);
        assert_eq!(canonical_ipv4("unknown"), None);
        assert_eq!(canonical_ipv4("256.1.1.1"), None);
        assert_eq!(canonical_ipv4("1.2.3.4, 5.6.7.8"), None);
        assert_eq!(canonical_ipv4("1.2.3.4<script>"), None);
        assert_eq!(canonical_ipv4("2001:db8::1"), None);
    }
}
