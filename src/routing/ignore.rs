//! Private path predicate
//!
//! A path is private when any segment starts with `_` or `.`, or when it
//! falls under one of the project's configured ignore prefixes. Private
//! paths are never served, compiled or static.

use std::borrow::Cow;

/// Whether a URL path (or a bare directory entry name) must not be served
pub fn should_ignore(rules: &[String], path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    let decoded = urlencoding::decode(path).unwrap_or(Cow::Borrowed(path));
    let trimmed = decoded.trim_matches('/');

    if trimmed
        .split('/')
        .any(|segment| segment.starts_with('_') || segment.starts_with('.'))
    {
        return true;
    }

    rules
        .iter()
        .map(|rule| rule.trim_matches('/'))
        .filter(|rule| !rule.is_empty())
        .any(|rule| {
            trimmed == rule
                || trimmed
                    .strip_prefix(rule)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore_and_dot_segments() {
        assert!(should_ignore(&[], "/_layout.jinja"));
        assert!(should_ignore(&[], "/blog/_partials/nav.html"));
        assert!(should_ignore(&[], "/.git/config"));
        assert!(should_ignore(&[], "/.env"));
        assert!(!should_ignore(&[], "/blog/post_one.html"));
        assert!(!should_ignore(&[], "/"));
    }

    #[test]
    fn test_percent_encoded_segments() {
        assert!(should_ignore(&[], "/%5Fdata.json"));
        assert!(should_ignore(&[], "/%2Egit/HEAD"));
    }

    #[test]
    fn test_configured_prefixes() {
        let rules = vec!["drafts".to_string(), "/vendor/cache/".to_string()];
        assert!(should_ignore(&rules, "/drafts"));
        assert!(should_ignore(&rules, "/drafts/today.html"));
        assert!(should_ignore(&rules, "/vendor/cache/x.js"));
        assert!(!should_ignore(&rules, "/drafts-archive/old.html"));
        assert!(!should_ignore(&rules, "/vendor/lib.js"));
    }

    #[test]
    fn test_query_string_is_not_a_path() {
        assert!(!should_ignore(&[], "/search?q=_private"));
    }

    #[test]
    fn test_bare_names() {
        assert!(should_ignore(&[], "_drafts"));
        assert!(!should_ignore(&[], "site-a"));
    }
}
