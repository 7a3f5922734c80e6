//! Query-string helpers shared by the listing pages.

use elate_chem_core::PageWindow;
use serde::{Deserialize, Deserializer};

/// Deserialize a page number, treating blanks and garbage as page 1.
pub fn lenient_page<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.and_then(|s| s.trim().parse().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1))
}

/// `?q=&page=` listing parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "first_page", deserialize_with = "lenient_page")]
    pub page: u64,
    /// Short key of a status message to show once.
    #[serde(default)]
    pub notice: Option<String>,
}

const fn first_page() -> u64 {
    1
}

/// Pager links for a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl Pager {
    /// Build links to the neighbouring pages of `window` under `path`.
    #[must_use]
    pub fn new(path: &str, query: &str, window: &PageWindow) -> Self {
        let href = |page: u64| {
            if query.is_empty() {
                format!("{path}?page={page}")
            } else {
                format!("{path}?q={}&page={page}", urlencoding::encode(query))
            }
        };

        Self {
            page: window.page(),
            total_pages: window.total_pages(),
            total_count: window.total_count(),
            prev_href: window.has_previous().then(|| href(window.page() - 1)),
            next_href: window.has_next().then(|| href(window.page() + 1)),
        }
    }

    /// Whether there is more than one page to move between.
    #[must_use]
    pub const fn is_paged(&self) -> bool {
        self.total_pages > 1
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Parse `a=b&c=d` the way the `Query` extractor would, minus decoding.
    fn parse(qs: &str) -> ListingParams {
        let map: serde_json::Map<String, serde_json::Value> = qs
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn test_page_defaults_to_one() {
        assert_eq!(parse("").page, 1);
        assert_eq!(parse("page=").page, 1);
        assert_eq!(parse("page=abc").page, 1);
        assert_eq!(parse("page=0").page, 1);
        assert_eq!(parse("page=4").page, 4);
    }

    #[test]
    fn test_pager_links() {
        let window = PageWindow::new(2, 35);
        let pager = Pager::new("/dashboard", "acetic acid", &window);

        assert_eq!(pager.total_pages, 4);
        assert_eq!(
            pager.prev_href.as_deref(),
            Some("/dashboard?q=acetic%20acid&page=1")
        );
        assert_eq!(
            pager.next_href.as_deref(),
            Some("/dashboard?q=acetic%20acid&page=3")
        );
    }

    #[test]
    fn test_pager_single_page() {
        let pager = Pager::new("/", "x", &PageWindow::new(1, 3));
        assert!(!pager.is_paged());
        assert!(pager.prev_href.is_none());
        assert!(pager.next_href.is_none());
    }
}
