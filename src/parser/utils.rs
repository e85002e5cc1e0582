//! Text helpers shared by the extractors

/// Sanitize user input to prevent prompt injection through control characters
pub fn sanitize_user_input(input: &str) -> String {
    // Filter out control characters except for newlines and tabs
    input
        .chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
        .collect::<String>()
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The outermost `{...}` in a model reply, ignoring code fences or prose around it
pub fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

/// Treat blank strings and the words "null"/"none" as absent
pub fn meaningful(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| {
        !v.is_empty() && !v.eq_ignore_ascii_case("null") && !v.eq_ignore_ascii_case("none")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_user_input() {
        assert_eq!(sanitize_user_input("Lunch\u{0}\u{7} at\tnoon\n"), "Lunch at\tnoon\n");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Team   lunch \n at  noon "), "Team lunch at noon");
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(extract_json_object("```json\n{\"a\":{\"b\":1}}\n```"), Some("{\"a\":{\"b\":1}}"));
        assert_eq!(extract_json_object("Sure! {\"a\":1} Hope that helps."), Some("{\"a\":1}"));
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_meaningful() {
        assert_eq!(meaningful(Some(" Room 4 ".to_string())), Some("Room 4".to_string()));
        assert_eq!(meaningful(Some("null".to_string())), None);
        assert_eq!(meaningful(Some("  ".to_string())), None);
        assert_eq!(meaningful(None), None);
    }
}
