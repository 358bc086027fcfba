//! # Navigator
//!
//! Page-to-page navigation over a [`Location`] (the browser's
//! `window.location` + `history`).
//!
//! ```text
//! go("product-detail", [("id","1001")]) ──► assign("product-detail.html?id=1001")
//! back()                                ──► history.back()
//! params()                              ──► {"id": "1001"}
//! ```

use tracing::debug;

use zhisheng_core::navigation::{build_url, parse_query, search_of, QueryParams};

/// The host's current location and history.
pub trait Location {
    /// The current URL.
    fn href(&self) -> &str;

    /// Navigates to `url`, pushing a history entry.
    fn assign(&mut self, url: &str);

    /// Goes one history entry back. No-op at the first entry.
    fn back(&mut self);

    /// Query part of the current URL, including the `?`.
    fn search(&self) -> &str {
        search_of(self.href())
    }
}

/// History stack for tests and headless hosts.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    history: Vec<String>,
    index: usize,
}

impl MemoryLocation {
    pub fn new(initial: impl Into<String>) -> Self {
        MemoryLocation {
            history: vec![initial.into()],
            index: 0,
        }
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Location for MemoryLocation {
    fn href(&self) -> &str {
        &self.history[self.index]
    }

    fn assign(&mut self, url: &str) {
        self.history.truncate(self.index + 1);
        self.history.push(url.to_string());
        self.index = self.history.len() - 1;
    }

    fn back(&mut self) {
        self.index = self.index.saturating_sub(1);
    }
}

/// Navigation helper bound to a location.
#[derive(Debug, Clone)]
pub struct Navigator<L> {
    location: L,
}

impl<L: Location> Navigator<L> {
    pub fn new(location: L) -> Self {
        Navigator { location }
    }

    /// Navigates to `page.html` with `params` as the query string.
    /// Returns the URL navigated to.
    pub fn go<I, K, V>(&mut self, page: &str, params: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let url = build_url(page, params);
        debug!(url = %url, "Navigating");
        self.location.assign(&url);
        url
    }

    pub fn back(&mut self) {
        debug!(from = %self.location.href(), "Navigating back");
        self.location.back();
    }

    /// Query parameters of the current page.
    pub fn params(&self) -> QueryParams {
        parse_query(self.location.search())
    }

    pub fn location(&self) -> &L {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_and_params() {
        let mut nav = Navigator::new(MemoryLocation::new("index.html"));
        let url = nav.go("product-detail", [("id", "1001"), ("from", "首页 推荐")]);

        assert_eq!(url, "product-detail.html?id=1001&from=%E9%A6%96%E9%A1%B5%20%E6%8E%A8%E8%8D%90");
        assert_eq!(nav.location().href(), url);

        let params = nav.params();
        assert_eq!(params.get("id").map(String::as_str), Some("1001"));
        assert_eq!(params.get("from").map(String::as_str), Some("首页 推荐"));
    }

    #[test]
    fn test_back_walks_history() {
        let mut nav = Navigator::new(MemoryLocation::new("index.html"));
        let empty: [(&str, &str); 0] = [];
        nav.go("cart", empty);

        nav.back();
        assert_eq!(nav.location().href(), "index.html");
        assert!(nav.params().is_empty());

        // Already at the first entry
        nav.back();
        assert_eq!(nav.location().href(), "index.html");
    }

    #[test]
    fn test_go_after_back_drops_forward_entries() {
        let mut location = MemoryLocation::new("index.html");
        location.assign("a.html");
        location.back();
        location.assign("b.html");
        assert_eq!(location.history(), ["index.html", "b.html"]);
    }
}
