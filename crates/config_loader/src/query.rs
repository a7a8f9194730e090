//! Query-string helpers for the log override

use std::collections::HashMap;

/// Query parameter that overrides the logging flag during `configure`
pub const LOG_QUERY_PARAM: &str = "beacon_log";

/// Parse a location search string (`?a=1&b=2`) into key/value pairs
///
/// Later duplicates win.
pub fn parse_query_string(search: &str) -> HashMap<String, String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// `"true"` (any case) is true, anything else is false
pub fn string_to_boolean(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Log override carried by the search string, if present
pub fn log_override(search: &str) -> Option<bool> {
    parse_query_string(search)
        .get(LOG_QUERY_PARAM)
        .map(|v| string_to_boolean(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_string() {
        let parsed = parse_query_string("?a=1&b=hello%20world");
        assert_eq!(parsed.get("a").map(String::as_str), Some("1"));
        assert_eq!(parsed.get("b").map(String::as_str), Some("hello world"));
        assert!(parse_query_string("").is_empty());
    }

    #[test]
    fn test_string_to_boolean() {
        assert!(string_to_boolean("true"));
        assert!(string_to_boolean("TRUE"));
        assert!(!string_to_boolean("false"));
        assert!(!string_to_boolean("1"));
        assert!(!string_to_boolean(""));
    }

    #[test]
    fn test_log_override() {
        assert_eq!(log_override("?beacon_log=true"), Some(true));
        assert_eq!(log_override("?x=1&beacon_log=false"), Some(false));
        assert_eq!(log_override("?beacon_log"), Some(false));
        assert_eq!(log_override("?x=1"), None);
    }
}
