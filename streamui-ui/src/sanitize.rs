//! Prop sanitization: URLs and allow-listed style keys.

use url::Url;

/// Where a URL will be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlPolicy {
    /// Anchor targets: `http`, `https`, `mailto`.
    Link,
    /// Image sources: `http`, `https`.
    Image,
}

/// Return the normalized URL if its scheme is allowed for `policy`.
///
/// Relative URLs and every other scheme (`javascript:`, `data:`, ...) are
/// rejected.
#[must_use]
pub fn sanitize_url(raw: &str, policy: UrlPolicy) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let allowed = match url.scheme() {
        "http" | "https" => true,
        "mailto" => policy == UrlPolicy::Link,
        _ => false,
    };
    if allowed {
        Some(url.into())
    } else {
        tracing::debug!(scheme = url.scheme(), "Dropping URL with disallowed scheme");
        None
    }
}

/// Pick `value` if it is in `allowed`, else `default`.
///
/// The result always comes from the allow-list, never from the input.
#[must_use]
pub fn allow<'a>(value: Option<&str>, allowed: &[&'a str], default: &'a str) -> &'a str {
    value
        .map(|v| v.trim().to_ascii_lowercase())
        .and_then(|v| allowed.iter().copied().find(|a| *a == v))
        .unwrap_or(default)
}

/// Like [`allow`] but with no default.
#[must_use]
pub fn allow_opt<'a>(value: Option<&str>, allowed: &[&'a str]) -> Option<&'a str> {
    let v = value?.trim().to_ascii_lowercase();
    allowed.iter().copied().find(|a| *a == v)
}

/// A code language usable as a class suffix, if it looks like one.
#[must_use]
pub fn language_class(language: &str) -> Option<String> {
    let lang = language.trim().to_ascii_lowercase();
    let valid = !lang.is_empty()
        && lang.len() <= 20
        && lang
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '#'));
    valid.then(|| format!("language-{lang}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/a?b=1", UrlPolicy::Link, Some("https://example.com/a?b=1"))]
    #[case("  http://example.com/x  ", UrlPolicy::Image, Some("http://example.com/x"))]
    #[case("mailto:team@example.com", UrlPolicy::Link, Some("mailto:team@example.com"))]
    #[case("mailto:team@example.com", UrlPolicy::Image, None)]
    #[case("javascript:alert(1)", UrlPolicy::Link, None)]
    #[case("JavaScript:alert(1)", UrlPolicy::Link, None)]
    #[case("data:image/png;base64,AAAA", UrlPolicy::Image, None)]
    #[case("/relative/path", UrlPolicy::Link, None)]
    #[case("", UrlPolicy::Link, None)]
    fn test_sanitize_url(
        #[case] raw: &str,
        #[case] policy: UrlPolicy,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(sanitize_url(raw, policy).as_deref(), expected);
    }

    #[test]
    fn test_allow() {
        let colors = ["neutral", "success"];
        assert_eq!(allow(Some("SUCCESS"), &colors, "neutral"), "success");
        assert_eq!(allow(Some("red; background:url(x)"), &colors, "neutral"), "neutral");
        assert_eq!(allow(None, &colors, "neutral"), "neutral");
        assert_eq!(allow_opt(Some("nope"), &colors), None);
    }

    #[test]
    fn test_language_class() {
        assert_eq!(language_class("Rust").as_deref(), Some("language-rust"));
        assert_eq!(language_class("c++").as_deref(), Some("language-c++"));
        assert_eq!(language_class("x\" onload=\"y"), None);
    }
}
