//! Zone suffix matching.

use spate_proto::Name;

/// Returns the most specific zone that `qname` falls under, or `None` when
/// no configured zone covers it.
pub fn matches<'a>(zones: &'a [Name], qname: &Name) -> Option<&'a Name> {
    zones
        .iter()
        .filter(|zone| qname.is_subdomain_of(zone))
        .max_by_key(|zone| zone.label_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn names(strs: &[&str]) -> Vec<Name> {
        strs.iter().map(|s| Name::from_str(s).unwrap()).collect()
    }

    #[test]
    fn test_longest_match_wins() {
        let zones = names(&["com.", "example.com.", "www.example.com."]);
        let qname = Name::from_str("a.www.example.com").unwrap();
        assert_eq!(
            matches(&zones, &qname).unwrap().as_str(),
            "www.example.com."
        );
    }

    #[test]
    fn test_no_match() {
        let zones = names(&["not.example.com."]);
        let qname = Name::from_str("example.com").unwrap();
        assert!(matches(&zones, &qname).is_none());
    }

    #[test]
    fn test_root_matches_everything() {
        let zones = vec![Name::root()];
        let qname = Name::from_str("anything.at.all").unwrap();
        assert!(matches(&zones, &qname).is_some());
    }

    #[test]
    fn test_exact_zone_matches_itself() {
        let zones = names(&["example.com."]);
        let qname = Name::from_str("example.com").unwrap();
        assert!(matches(&zones, &qname).is_some());
    }
}
