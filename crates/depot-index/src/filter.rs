//! Package filtering.
//!
//! Two predicates may apply to a record: the builder-wide filter and a
//! per-source one. A version survives only if every applicable predicate
//! accepts it. Filtering runs before caching, so cache entries never hold
//! rejected versions.

use std::sync::Arc;

use depot_manifest::PackageRecord;

/// A shared package predicate.
pub type PackageFilter = Arc<dyn Fn(&PackageRecord) -> bool + Send + Sync>;

/// Apply the global and per-source filters; absent filters accept.
pub(crate) fn accepts(
    global: Option<&PackageFilter>,
    per_source: Option<&PackageFilter>,
    record: &PackageRecord,
) -> bool {
    global.map_or(true, |f| f(record)) && per_source.map_or(true, |f| f(record))
}

/// A filter accepting packages whose name starts with any of the given
/// prefixes (an exact name is a prefix of itself).
pub fn name_prefix_filter(prefixes: Vec<String>) -> PackageFilter {
    Arc::new(move |record| prefixes.iter().any(|p| record.name.starts_with(p.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> PackageRecord {
        PackageRecord::parse(&format!(r#"{{"name": "{name}"}}"#)).unwrap()
    }

    #[test]
    fn absent_filters_accept() {
        assert!(accepts(None, None, &record("a/b")));
    }

    #[test]
    fn both_filters_must_accept() {
        let yes: PackageFilter = Arc::new(|_| true);
        let no: PackageFilter = Arc::new(|_| false);
        let r = record("a/b");
        assert!(accepts(Some(&yes), Some(&yes), &r));
        assert!(!accepts(Some(&no), Some(&yes), &r));
        assert!(!accepts(Some(&yes), Some(&no), &r));
        assert!(!accepts(Some(&no), Some(&no), &r));
    }

    #[test]
    fn prefix_filter_matches_vendor() {
        let filter = name_prefix_filter(vec!["acme/".to_string()]);
        assert!(filter(&record("acme/widget")));
        assert!(!filter(&record("other/widget")));
    }

    #[test]
    fn prefix_filter_exact_name() {
        let filter = name_prefix_filter(vec!["acme/widget".to_string()]);
        assert!(filter(&record("acme/widget")));
        assert!(!filter(&record("acme/other")));
    }
}
