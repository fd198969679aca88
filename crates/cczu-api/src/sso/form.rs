//! Hidden-field scraping for SSO login pages.
//!
//! The login forms carry server-generated state (`lt`, `execution`,
//! `_eventId`, …) in hidden inputs that must be echoed back on the POST.
//! Only `<input type="hidden">` elements are needed, so this is pattern
//! matching over the markup rather than a full HTML parse; an intentional
//! scope limitation, not an oversight.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static HIDDEN_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<input[^>]*type\s*=\s*["']hidden["'][^>]*>"#).unwrap()
});
static NAME_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bname\s*=\s*["']([^"']*)["']"#).unwrap());
static VALUE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bvalue\s*=\s*["']([^"']*)["']"#).unwrap());

/// Extracts `name` → `value` for every hidden input in `html`.
///
/// Inputs without both attributes are skipped. The result is consumed
/// immediately to build the next form submission and never persisted.
pub(crate) fn parse_hidden_fields(html: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();

    for tag in HIDDEN_INPUT.find_iter(html) {
        let tag = tag.as_str();
        let name = NAME_ATTR.captures(tag).and_then(|c| c.get(1));
        let value = VALUE_ATTR.captures(tag).and_then(|c| c.get(1));
        if let (Some(name), Some(value)) = (name, value) {
            fields.insert(name.as_str().to_string(), value.as_str().to_string());
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_hidden_fields() {
        let html = r#"
            <form action="login" method="post">
                <input type="hidden" name="lt" value="LT-12345-abcde"/>
                <input type="hidden" name="execution" value="e1s1">
                <input type="text" name="username" value="should-not-appear">
            </form>
        "#;
        let fields = parse_hidden_fields(html);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["lt"], "LT-12345-abcde");
        assert_eq!(fields["execution"], "e1s1");
    }

    #[test]
    fn attribute_order_does_not_matter() {
        let html = r#"<input name="_eventId" value="submit" type="hidden">"#;
        let fields = parse_hidden_fields(html);
        assert_eq!(fields["_eventId"], "submit");
    }

    #[test]
    fn single_quoted_attributes_and_case() {
        let html = r#"<INPUT TYPE='HIDDEN' NAME='token' VALUE='x-9'/>"#;
        let fields = parse_hidden_fields(html);
        assert_eq!(fields["token"], "x-9");
    }

    #[test]
    fn empty_value_is_kept() {
        let html = r#"<input type="hidden" name="service" value="">"#;
        let fields = parse_hidden_fields(html);
        assert_eq!(fields["service"], "");
    }

    #[test]
    fn input_without_name_is_skipped() {
        let html = r#"<input type="hidden" value="orphan">"#;
        assert!(parse_hidden_fields(html).is_empty());
    }
}
