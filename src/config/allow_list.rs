//! IP allow-list parsing.

use std::collections::HashSet;

use crate::utils::ip::canonical_ipv4;

/// Set of canonical IPv4 addresses.
///
/// Used for the login allow-list, where an empty list means no restriction,
/// and for the trusted proxy set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    entries: HashSet<String>,
}

impl AllowList {
    /// Parse a comma-separated list, ignoring whitespace and empty entries.
    ///
    /// Entries that are not IPv4 addresses are logged and dropped.
    pub fn parse(value: &str) -> Self {
        let stripped: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        let entries = stripped
            .split(',')
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| match canonical_ipv4(entry) {
                Some(ip) => Some(ip),
                None => {
                    tracing::warn!(entry, "Ignoring invalid IP list entry");
                    None
                }
            })
            .collect();

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.entries.contains(ip)
    }

    /// Whether `ip` may attempt a login under this list
    pub fn permits(&self, ip: &str) -> bool {
        self.is_empty() || self.contains(ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_means_no_restriction() {
        let list = AllowList::parse("  , ,");
        assert!(list.is_empty());
        assert!(list.permits("203.0.113.5"));
        assert!(list.permits(""));
    }

    #[test]
    fn test_whitespace_and_order_are_ignored() {
        let list = AllowList::parse(" 198.51.100.1 ,\n10.0.0.2,, 198.51.100.1");
        assert_eq!(list.len(), 2);
        assert!(list.contains("10.0.0.2"));
        assert!(list.permits("198.51.100.1"));
        assert!(!list.permits("198.51.100.2"));
    }

    #[test]
    fn test_invalid_entries_are_dropped() {
        let list = AllowList::parse("198.51.100.1,example.com,300.1.1.1");
        assert_eq!(list.len(), 1);
        assert!(!list.permits(""));
    }
}
