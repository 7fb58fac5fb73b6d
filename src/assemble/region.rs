//! @acp:module "Region Markers"
//! @acp:summary "Wrap injected content in traceable region comments"
//! @acp:domain build
//! @acp:layer utility

/// Wrap `content` as
///
/// ```text
/// // region: <name> [<source>]
/// <content, trailing whitespace trimmed>
/// // endregion: <name>
/// ```
pub fn wrap(name: &str, source: &str, content: &str) -> String {
    format!(
        "// region: {} [{}]\n{}\n// endregion: {}\n",
        name,
        source,
        content.trim_end(),
        name
    )
}

/// Text enclosed by the first region called `name`
pub fn extract<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("// region: {} [", name);
    let close = format!("\n// endregion: {}\n", name);

    let start = text.find(&open)?;
    let body = start + text[start..].find('\n')? + 1;
    let end = body + text[body..].find(&close)?;
    Some(&text[body..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_modulo_trailing_whitespace() {
        let content = "function a() {\n    return 1;\n}\n\n  ";
        let wrapped = wrap("a", "(globals)/a.js", content);
        let text = format!("before\n{}{}after\n", wrapped, wrap("b", "(globals)/b.js", "b"));

        assert_eq!(extract(&text, "a"), Some(content.trim_end()));
        assert_eq!(extract(&text, "b"), Some("b"));
        assert_eq!(extract(&text, "c"), None);
    }

    #[test]
    fn test_header_names_source() {
        assert!(wrap("ui.Button", "(types)/ui/Button.js", "x")
            .starts_with("// region: ui.Button [(types)/ui/Button.js]\n"));
    }
}
