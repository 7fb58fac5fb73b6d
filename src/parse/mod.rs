//! @acp:module "Source Scanner"
//! @acp:summary "Comment/literal-aware lexer, definition detection, balance lint, minify"
//! @acp:domain build
//! @acp:layer parser
//!
//! The lexer splits source text into code, comment and literal segments.
//! Everything that reasons about code (definition keywords, brackets,
//! whitespace) only ever looks at code segments, so keywords inside comments
//! or strings never count.
//!
//! Regex literals are recognised with the usual previous-token heuristic: a
//! `/` starts a regex after an operator, an opening bracket, a separator or a
//! keyword such as `return`, and is a division everywhere else.

use serde::{Deserialize, Serialize};

/// Source dialect understood by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// Line and block comments, quotes, templates, regex literals
    Script,
    /// Block comments and quotes only
    Style,
}

impl Syntax {
    pub fn for_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" | "mjs" | "cjs" => Some(Syntax::Script),
            "css" => Some(Syntax::Style),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Code,
    LineComment,
    BlockComment,
    Literal,
}

/// Byte range of one lexical segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub start: usize,
    pub end: usize,
}

/// Operators and separators after which `/` opens a regex literal
const REGEX_PRECEDERS: &[u8] = b"(,=:[!&|?{};+-*%<>~^";

/// Keywords after which `/` opens a regex literal
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "of", "new", "delete", "void", "throw",
    "yield", "await",
];

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// @acp:summary "Split source text into code, comment and literal segments"
pub fn segments(source: &str, syntax: Syntax) -> Vec<Segment> {
    let bytes = source.as_bytes();
    let mut out = Vec::new();
    let mut code_start = 0;
    let mut last_significant: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        let script = syntax == Syntax::Script;

        let special = match b {
            b'/' if next == Some(b'*') => Some((SegmentKind::BlockComment, block_end(bytes, i))),
            b'/' if script && next == Some(b'/') => Some((SegmentKind::LineComment, line_end(bytes, i))),
            b'\'' | b'"' => Some((SegmentKind::Literal, string_end(bytes, i, b))),
            b'`' if script => Some((SegmentKind::Literal, template_end(bytes, i))),
            b'/' if script && regex_allowed(source, last_significant) => {
                regex_end(bytes, i).map(|end| (SegmentKind::Literal, end))
            }
            _ => None,
        };

        match special {
            Some((kind, end)) => {
                if code_start < i {
                    out.push(Segment { kind: SegmentKind::Code, start: code_start, end: i });
                }
                out.push(Segment { kind, start: i, end });
                if kind == SegmentKind::Literal {
                    // A literal is an operand, a following `/` divides
                    last_significant = Some(end - 1);
                }
                i = end;
                code_start = end;
            }
            None => {
                if !b.is_ascii_whitespace() {
                    last_significant = Some(i);
                }
                i += 1;
            }
        }
    }

    if code_start < bytes.len() {
        out.push(Segment { kind: SegmentKind::Code, start: code_start, end: bytes.len() });
    }
    out
}

fn regex_allowed(source: &str, last_significant: Option<usize>) -> bool {
    let Some(pos) = last_significant else {
        return true;
    };
    let bytes = source.as_bytes();
    let b = bytes[pos];
    if REGEX_PRECEDERS.contains(&b) {
        return true;
    }
    if !is_ident_byte(b) {
        return false;
    }
    let start = bytes[..=pos]
        .iter()
        .rposition(|c| !is_ident_byte(*c))
        .map(|p| p + 1)
        .unwrap_or(0);
    REGEX_KEYWORDS.contains(&&source[start..=pos])
}

fn block_end(bytes: &[u8], start: usize) -> usize {
    let mut j = start + 2;
    while j + 1 < bytes.len() {
        if bytes[j] == b'*' && bytes[j + 1] == b'/' {
            return j + 2;
        }
        j += 1;
    }
    bytes.len()
}

fn line_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map(|p| start + p)
        .unwrap_or(bytes.len())
}

fn string_end(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            c if c == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn template_end(bytes: &[u8], start: usize) -> usize {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'`' => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn regex_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start + 1;
    let mut in_class = false;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return None,
            b'[' => {
                in_class = true;
                j += 1;
            }
            b']' => {
                in_class = false;
                j += 1;
            }
            b'/' if !in_class => {
                j += 1;
                while j < bytes.len() && bytes[j].is_ascii_alphabetic() {
                    j += 1;
                }
                return Some(j);
            }
            _ => j += 1,
        }
    }
    None
}

/// 1-based line number of a byte offset
pub fn line_of(source: &str, offset: usize) -> usize {
    source.as_bytes()[..offset.min(source.len())]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

/// Byte offset where the line holding `offset` begins
pub fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map(|p| p + 1).unwrap_or(0)
}

// ============================================================================
// Definition detection
// ============================================================================

/// @acp:summary "Top-level definition keywords"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Component,
    Class,
    Struct,
    Mixin,
    Interface,
    Enum,
}

impl DefinitionKind {
    pub const ALL: [DefinitionKind; 6] = [
        DefinitionKind::Component,
        DefinitionKind::Class,
        DefinitionKind::Struct,
        DefinitionKind::Mixin,
        DefinitionKind::Interface,
        DefinitionKind::Enum,
    ];

    /// Keyword as written in source
    pub fn keyword(&self) -> &'static str {
        match self {
            DefinitionKind::Component => "Component",
            DefinitionKind::Class => "Class",
            DefinitionKind::Struct => "Struct",
            DefinitionKind::Mixin => "Mixin",
            DefinitionKind::Interface => "Interface",
            DefinitionKind::Enum => "Enum",
        }
    }

    /// Kind name recorded in manifests
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Component => "component",
            DefinitionKind::Class => "class",
            DefinitionKind::Struct => "struct",
            DefinitionKind::Mixin => "mixin",
            DefinitionKind::Interface => "interface",
            DefinitionKind::Enum => "enum",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == word)
    }
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One `Keyword(` occurrence in code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Definition {
    pub kind: DefinitionKind,
    /// Byte offset of the keyword
    pub offset: usize,
    /// 1-based line of the keyword
    pub line: usize,
    /// Byte offset where that line begins
    pub line_start: usize,
}

/// @acp:summary "Outcome of scanning a member file for its definition"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    None,
    Single(Definition),
    Multiple(Vec<Definition>),
}

/// @acp:summary "Find the definition keywords of a script outside comments and literals"
pub fn detect_definition(source: &str) -> Detection {
    let bytes = source.as_bytes();
    let mut found = Vec::new();

    for segment in segments(source, Syntax::Script) {
        if segment.kind != SegmentKind::Code {
            continue;
        }
        let mut i = segment.start;
        while i < segment.end {
            if !is_ident_byte(bytes[i]) || bytes[i].is_ascii_digit() {
                i += 1;
                continue;
            }
            let start = i;
            while i < segment.end && is_ident_byte(bytes[i]) {
                i += 1;
            }
            let Some(kind) = DefinitionKind::from_keyword(&source[start..i]) else {
                continue;
            };
            if is_call(bytes, segment, i) && !is_member_access(bytes, segment, start) {
                found.push(Definition {
                    kind,
                    offset: start,
                    line: line_of(source, start),
                    line_start: line_start(source, start),
                });
            }
        }
    }

    match found.len() {
        0 => Detection::None,
        1 => Detection::Single(found[0]),
        _ => Detection::Multiple(found),
    }
}

fn is_call(bytes: &[u8], segment: Segment, after: usize) -> bool {
    bytes[after..segment.end]
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'(')
}

fn is_member_access(bytes: &[u8], segment: Segment, start: usize) -> bool {
    bytes[segment.start..start]
        .iter()
        .rev()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'.')
}

// ============================================================================
// Bracket balance (built-in lint)
// ============================================================================

/// @acp:summary "Report the first unbalanced bracket, `None` when balanced"
pub fn check_balance(source: &str, syntax: Syntax) -> Option<String> {
    let bytes = source.as_bytes();
    let mut stack: Vec<usize> = Vec::new();

    for segment in segments(source, syntax) {
        if segment.kind != SegmentKind::Code {
            continue;
        }
        for i in segment.start..segment.end {
            match bytes[i] {
                b'(' | b'[' | b'{' => stack.push(i),
                close @ (b')' | b']' | b'}') => {
                    let expected = match close {
                        b')' => b'(',
                        b']' => b'[',
                        _ => b'{',
                    };
                    match stack.pop() {
                        Some(open) if bytes[open] == expected => {}
                        Some(open) => {
                            return Some(format!(
                                "line {}: '{}' closes '{}' opened on line {}",
                                line_of(source, i),
                                close as char,
                                bytes[open] as char,
                                line_of(source, open)
                            ))
                        }
                        None => {
                            return Some(format!(
                                "line {}: unexpected '{}'",
                                line_of(source, i),
                                close as char
                            ))
                        }
                    }
                }
                _ => {}
            }
        }
    }

    stack.first().map(|open| {
        format!(
            "line {}: '{}' is never closed",
            line_of(source, *open),
            bytes[*open] as char
        )
    })
}

// ============================================================================
// Whitespace and comment stripping (built-in minify)
// ============================================================================

/// @acp:summary "Drop comments, indentation and blank lines; keep literals verbatim"
///
/// Block comments opened with `/*!` are kept.
pub fn minify(source: &str, syntax: Syntax) -> String {
    let mut out = String::with_capacity(source.len());
    let mut at_line_start = true;

    for segment in segments(source, syntax) {
        let text = &source[segment.start..segment.end];
        match segment.kind {
            SegmentKind::Literal => {
                out.push_str(text);
                at_line_start = false;
            }
            SegmentKind::LineComment => {}
            SegmentKind::BlockComment if text.starts_with("/*!") => {
                out.push_str(text);
                at_line_start = false;
            }
            SegmentKind::BlockComment => {
                if text.contains('\n') {
                    end_line(&mut out);
                    at_line_start = true;
                } else if !at_line_start && !out.ends_with([' ', '\t']) {
                    out.push(' ');
                }
            }
            SegmentKind::Code => {
                for ch in text.chars() {
                    match ch {
                        '\n' => {
                            end_line(&mut out);
                            at_line_start = true;
                        }
                        ' ' | '\t' | '\r' if at_line_start => {}
                        _ => {
                            out.push(ch);
                            at_line_start = false;
                        }
                    }
                }
            }
        }
    }

    end_line(&mut out);
    out
}

fn end_line(out: &mut String) {
    let trimmed = out.trim_end_matches([' ', '\t', '\r']).len();
    out.truncate(trimmed);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_definition() {
        let source = "// Class('Ignored')\nconst Button = Class('Button', function() {\n});\n";
        match detect_definition(source) {
            Detection::Single(def) => {
                assert_eq!(def.kind, DefinitionKind::Class);
                assert_eq!(def.line, 2);
                assert_eq!(&source[def.line_start..def.offset], "const Button = ");
            }
            other => panic!("expected single definition, got {:?}", other),
        }
    }

    #[test]
    fn test_keywords_in_comments_and_literals_ignored() {
        let source = r#"
/* Component('A') */
const label = "Component('B')";
const tpl = `Enum(${x})`;
const Real = Component('Real', {});
"#;
        assert!(matches!(
            detect_definition(source),
            Detection::Single(Definition { kind: DefinitionKind::Component, .. })
        ));
    }

    #[test]
    fn test_member_access_and_plain_words_ignored() {
        let source = "registry.Class('x');\nconst Enum = 1;\nconst Mixed = Mixin ('M', {});\n";
        match detect_definition(source) {
            Detection::Single(def) => assert_eq!(def.kind, DefinitionKind::Mixin),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_multiple_and_none() {
        let two = "const A = Class('A', {});\nconst B = Struct('B', {});\n";
        assert!(matches!(detect_definition(two), Detection::Multiple(defs) if defs.len() == 2));
        assert_eq!(detect_definition("const x = 1;\n"), Detection::None);
    }

    #[test]
    fn test_regex_literal_with_quote_does_not_open_string() {
        let source = "const re = /'/g;\nconst T = Class('T', {});\n";
        assert!(matches!(detect_definition(source), Detection::Single(_)));
        // Division is not a regex
        let division = "const half = total / 2; const T = Class('T', {}); // /\n";
        assert!(matches!(detect_definition(division), Detection::Single(_)));
    }

    #[test]
    fn test_balance() {
        assert_eq!(check_balance("function a() { return [1, (2)]; }", Syntax::Script), None);
        assert_eq!(
            check_balance("function a() {\n  return 1;\n", Syntax::Script),
            Some("line 1: '{' is never closed".to_string())
        );
        assert_eq!(
            check_balance("a(]\n", Syntax::Script),
            Some("line 1: ']' closes '(' opened on line 1".to_string())
        );
        assert_eq!(check_balance("const s = '{';", Syntax::Script), None);
    }

    #[test]
    fn test_minify_script() {
        let source = "/* header */\nfunction a() {\n    // note\n    return 'x  //  y';   \n}\n\n\n";
        assert_eq!(minify(source, Syntax::Script), "function a() {\nreturn 'x  //  y';\n}\n");
    }

    #[test]
    fn test_minify_keeps_license_and_templates() {
        let source = "/*! MIT */\nconst t = `a\n    b`;\n";
        assert_eq!(minify(source, Syntax::Script), "/*! MIT */\nconst t = `a\n    b`;\n");
    }

    #[test]
    fn test_style_has_no_line_comments() {
        let source = ".a {\n  background: url(http://example.com/x.png); /* c */\n}\n";
        assert_eq!(
            minify(source, Syntax::Style),
            ".a {\nbackground: url(http://example.com/x.png);\n}\n"
        );
    }
}
