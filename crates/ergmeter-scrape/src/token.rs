//! Anti-forgery token discovery on the login page.

/// Find the login form's anti-forgery token.
///
/// Checks `<input name="_token" value="...">` first, then
/// `<meta name="csrf-token" content="...">`. Empty values count as absent.
pub fn find_csrf_token(html: &str) -> Option<String> {
    tag_attr(html, "input", "name", "_token", "value")
        .filter(|value| !value.is_empty())
        .or_else(|| tag_attr(html, "meta", "name", "csrf-token", "content"))
        .filter(|value| !value.is_empty())
}

/// Scan for the first `<tag ...>` whose `match_attr` equals `match_value`
/// and return its `want_attr` value. ASCII case-insensitive on tag and
/// attribute names, like the markup helpers this crate is modeled on.
fn tag_attr(
    html: &str,
    tag: &str,
    match_attr: &str,
    match_value: &str,
    want_attr: &str,
) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag}");
    let mut from = 0;
    while let Some(found) = lower[from..].find(&open) {
        let start = from + found;
        let name_end = start + open.len();
        // Reject prefix matches such as <inputmode>.
        let boundary = lower[name_end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_whitespace() || c == '>' || c == '/');
        let Some(close) = lower[start..].find('>') else {
            return None;
        };
        let end = start + close;
        if boundary {
            let tag_src = &html[name_end..end];
            if attr_value(tag_src, match_attr).as_deref() == Some(match_value) {
                return attr_value(tag_src, want_attr);
            }
        }
        from = end + 1;
    }
    None
}

/// Extract an attribute value from the inside of a single opening tag.
/// Handles double-quoted, single-quoted, and bare values.
fn attr_value(tag_src: &str, attr: &str) -> Option<String> {
    let lower = tag_src.to_ascii_lowercase();
    let needle = format!("{attr}=");
    let mut from = 0;
    loop {
        let found = lower[from..].find(&needle)? + from;
        let preceded_ok = found == 0 || lower.as_bytes()[found - 1].is_ascii_whitespace();
        let value_start = found + needle.len();
        if !preceded_ok {
            from = value_start;
            continue;
        }
        let rest = &tag_src[value_start..];
        let mut chars = rest.chars();
        return Some(match chars.next() {
            Some(quote @ ('"' | '\'')) => {
                let inner = &rest[1..];
                let close = inner.find(quote).unwrap_or(inner.len());
                inner[..close].to_string()
            }
            Some(_) => {
                let close = rest
                    .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
                    .unwrap_or(rest.len());
                rest[..close].to_string()
            }
            None => String::new(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_token_input() {
        let html = r#"<form><input type="hidden" name="_token" value="abc123"></form>"#;
        assert_eq!(find_csrf_token(html).as_deref(), Some("abc123"));
    }

    #[test]
    fn finds_token_with_reordered_attributes() {
        let html = r#"<input value='xyz' name='_token' type='hidden'>"#;
        assert_eq!(find_csrf_token(html).as_deref(), Some("xyz"));
    }

    #[test]
    fn falls_back_to_meta_tag() {
        let html = r#"<head><meta name="csrf-token" content="meta-token"/></head>"#;
        assert_eq!(find_csrf_token(html).as_deref(), Some("meta-token"));
    }

    #[test]
    fn input_wins_over_meta() {
        let html = concat!(
            r#"<meta name="csrf-token" content="from-meta">"#,
            r#"<input name="_token" value="from-input">"#,
        );
        assert_eq!(find_csrf_token(html).as_deref(), Some("from-input"));
    }

    #[test]
    fn empty_or_missing_token_is_none() {
        assert_eq!(find_csrf_token(r#"<input name="_token" value="">"#), None);
        assert_eq!(find_csrf_token("<html><body>no form</body></html>"), None);
        assert_eq!(
            find_csrf_token(r#"<input name="other" value="nope">"#),
            None
        );
    }

    #[test]
    fn empty_input_value_falls_back_to_meta() {
        let html = r#"<input name="_token" value=""><meta name="csrf-token" content="m">"#;
        assert_eq!(find_csrf_token(html).as_deref(), Some("m"));
    }

    #[test]
    fn ignores_lookalike_attributes() {
        // data-name must not satisfy the name lookup.
        let html = r#"<input data-name="_token" value="bad" name="_token" data-value="x">"#;
        assert_eq!(find_csrf_token(html).as_deref(), Some("bad"));
        let html2 = r#"<input data-name="_token" value="bad">"#;
        assert_eq!(find_csrf_token(html2), None);
    }
}
