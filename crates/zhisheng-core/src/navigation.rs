//! # Navigation URLs
//!
//! Building page URLs and reading query strings. The side-effecting half
//! (actually navigating) lives in the storefront's `Navigator`.
//!
//! ```rust
//! use zhisheng_core::navigation::{build_url, parse_query};
//!
//! let url = build_url("product-detail", [("id", "1001"), ("from", "搜索")]);
//! assert_eq!(url, "product-detail.html?id=1001&from=%E6%90%9C%E7%B4%A2");
//!
//! let params = parse_query("?id=1001&from=%E6%90%9C%E7%B4%A2");
//! assert_eq!(params.get("from").map(String::as_str), Some("搜索"));
//! ```

use std::collections::BTreeMap;
use url::form_urlencoded;

/// Query parameters read from a URL. A key given twice keeps its last value.
pub type QueryParams = BTreeMap<String, String>;

/// Percent-encodes a query component the way page scripts'
/// `encodeURIComponent` does for the characters that matter (spaces become
/// `%20`, not `+`).
pub fn encode_component(raw: &str) -> String {
    // byte_serialize writes '+' only for spaces; literal '+' becomes %2B
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// `page.html` plus `?k=v&…` in the order given. No params, no `?`.
pub fn build_url<I, K, V>(page: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let query = params
        .into_iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                encode_component(k.as_ref()),
                encode_component(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        format!("{}.html", page)
    } else {
        format!("{}.html?{}", page, query)
    }
}

/// Parses a query string (with or without the leading `?`).
pub fn parse_query(search: &str) -> QueryParams {
    let search = search.strip_prefix('?').unwrap_or(search);
    form_urlencoded::parse(search.as_bytes())
        .into_owned()
        .collect()
}

/// Extracts the query part of a URL or path (`a.html?x=1#top` → `?x=1`).
pub fn search_of(url: &str) -> &str {
    let without_fragment = url.split('#').next().unwrap_or("");
    match without_fragment.find('?') {
        Some(pos) => &without_fragment[pos..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_without_params() {
        let empty: [(&str, &str); 0] = [];
        assert_eq!(build_url("cart", empty), "cart.html");
    }

    #[test]
    fn test_build_url_keeps_order_and_encodes() {
        let url = build_url("search", vec![("q", "感冒 灵"), ("page", "2"), ("tag", "a+b&c")]);
        assert_eq!(
            url,
            "search.html?q=%E6%84%9F%E5%86%92%20%E7%81%B5&page=2&tag=a%2Bb%26c"
        );
    }

    #[test]
    fn test_parse_query_round_trip() {
        let url = build_url("search", vec![("q", "感冒 灵"), ("tag", "a+b&c")]);
        let params = parse_query(search_of(&url));
        assert_eq!(params.get("q").map(String::as_str), Some("感冒 灵"));
        assert_eq!(params.get("tag").map(String::as_str), Some("a+b&c"));
    }

    #[test]
    fn test_parse_query_last_value_wins() {
        let params = parse_query("a=1&b=2&a=3");
        assert_eq!(params.get("a").map(String::as_str), Some("3"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_parse_query_empty() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("?").is_empty());
    }

    #[test]
    fn test_search_of() {
        assert_eq!(search_of("order.html?id=9#pay"), "?id=9");
        assert_eq!(search_of("index.html"), "");
        assert_eq!(search_of("index.html#x?y"), "");
    }
}
