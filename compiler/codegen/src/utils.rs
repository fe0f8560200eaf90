// codegen/src/utils.rs

/// Escape text for use inside a double-quoted XML attribute.
///
/// # Examples
/// ```
/// use wsbridge_codegen::utils::escape_attr;
/// assert_eq!(escape_attr(r#"a<b & "c""#), "a&lt;b &amp; &quot;c&quot;");
/// ```
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `name="value"` pairs, escaping every value.
pub fn attrs(pairs: &[(&str, &str)]) -> String {
    pairs.iter().map(|(k, v)| format!(" {}=\"{}\"", k, escape_attr(v))).collect()
}

/// Two spaces per nesting level.
pub fn indent(level: usize) -> String { "  ".repeat(level) }
