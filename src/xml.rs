/// Escape XML special characters, for both text content and attribute values.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Trims `s`, drops everything but alphanumerics, `-`, `_`, `.` and whitespace,
/// then collapses each whitespace run into a single `_`.
///
/// Used for organization identifiers and archive file names, so the same input
/// always yields the same token.
pub fn clean_and_trim(s: &str) -> String {
    let kept = s
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '_' | '.'))
        .collect::<String>();
    kept.split_whitespace().collect::<Vec<&str>>().join("_")
}

/// Appends one `indent`-deep line to `out`.
pub(crate) fn push_line(out: &mut String, indent: usize, line: &str) {
    for _ in 0..indent {
        out.push_str("  ");
    }
    out.push_str(line);
    out.push('\n');
}

/// `<name>escaped text</name>`
pub(crate) fn text_element(name: &str, text: &str) -> String {
    format!("<{}>{}</{}>", name, escape_xml(text), name)
}
