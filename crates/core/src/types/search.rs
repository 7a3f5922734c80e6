//! Search rules shared by the public vendor search and the admin listing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{RowRange, VendorRecord};

/// Which listing a search belongs to.
///
/// The two listings share matching and paging but differ in how they treat
/// an empty query, how long they wait for typing to settle, and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Home page search: empty query shows nothing.
    Public,
    /// Dashboard listing: empty query lists every vendor.
    AdminListing,
}

impl SearchMode {
    /// Quiet interval before a query edit triggers a fetch.
    #[must_use]
    pub const fn debounce(self) -> Duration {
        match self {
            Self::Public => Duration::from_millis(300),
            Self::AdminListing => Duration::from_millis(500),
        }
    }

    /// Whether a blank query lists everything instead of nothing.
    #[must_use]
    pub const fn empty_query_matches_all(self) -> bool {
        matches!(self, Self::AdminListing)
    }

    #[must_use]
    pub const fn order(self) -> ResultOrder {
        match self {
            Self::Public => ResultOrder::StoreDefault,
            Self::AdminListing => ResultOrder::SequenceAscending,
        }
    }

    /// Build the store query for a raw search box value and page, or `None`
    /// when the listing should be empty without asking the store.
    #[must_use]
    pub fn query(self, raw: &str, range: RowRange) -> Option<VendorQuery> {
        let needle = raw.trim();
        if needle.is_empty() && !self.empty_query_matches_all() {
            return None;
        }
        Some(VendorQuery {
            needle: (!needle.is_empty()).then(|| needle.to_owned()),
            range,
            order: self.order(),
        })
    }
}

/// Row ordering requested from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrder {
    /// Whatever order the store returns.
    StoreDefault,
    /// Sequence number, ascending.
    SequenceAscending,
}

/// A filtered, counted, paged vendor query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorQuery {
    /// Trimmed search text; `None` matches every vendor.
    pub needle: Option<String>,
    pub range: RowRange,
    pub order: ResultOrder,
}

/// The slice of a results page a caller is allowed to see.
///
/// Anonymous visitors get a teaser of the first result; signed-in users see the
/// whole page. The full page is always fetched so the "more results" count is
/// accurate.
#[must_use]
pub fn visible_results(results: &[VendorRecord], authenticated: bool) -> &[VendorRecord] {
    if authenticated {
        results
    } else {
        results.get(..1).unwrap_or(results)
    }
}

/// How many results on the page are withheld from the caller.
#[must_use]
pub fn hidden_result_count(results: &[VendorRecord], authenticated: bool) -> usize {
    results.len() - visible_results(results, authenticated).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SequenceNumber, VendorDetails};

    fn records(n: u64) -> Vec<VendorRecord> {
        (1..=n)
            .map(|i| VendorRecord::new(SequenceNumber::new(i), VendorDetails::default()))
            .collect()
    }

    #[test]
    fn test_visible_results_anonymous_sees_one() {
        let page = records(5);
        assert_eq!(visible_results(&page, false).len(), 1);
        assert_eq!(hidden_result_count(&page, false), 4);
    }

    #[test]
    fn test_visible_results_authenticated_sees_page() {
        let page = records(5);
        assert_eq!(visible_results(&page, true).len(), 5);
        assert_eq!(hidden_result_count(&page, true), 0);
    }

    #[test]
    fn test_visible_results_empty_page() {
        assert!(visible_results(&[], false).is_empty());
        assert_eq!(hidden_result_count(&[], false), 0);
    }

    #[test]
    fn test_public_blank_query_skips_fetch() {
        let range = RowRange::for_page(1, 10);
        assert!(SearchMode::Public.query("   ", range).is_none());
    }

    #[test]
    fn test_admin_blank_query_lists_all() {
        let range = RowRange::for_page(2, 10);
        let query = SearchMode::AdminListing.query("", range);
        assert_eq!(
            query,
            Some(VendorQuery {
                needle: None,
                range,
                order: ResultOrder::SequenceAscending,
            })
        );
    }

    #[test]
    fn test_query_is_trimmed() {
        let range = RowRange::for_page(1, 10);
        let query = SearchMode::Public.query("  67-64 ", range);
        assert_eq!(query.and_then(|q| q.needle).as_deref(), Some("67-64"));
    }

    #[test]
    fn test_debounce_intervals() {
        assert_eq!(SearchMode::Public.debounce(), Duration::from_millis(300));
        assert_eq!(
            SearchMode::AdminListing.debounce(),
            Duration::from_millis(500)
        );
    }
}
