//! JSONC read/write - JSON with `//` and `/* */` comments
//!
//! Task files are plain JSON plus comment lines. Comments may appear
//! anywhere outside string literals and are stripped before structural
//! parsing. Writing goes through `serde_json`, which escapes quotes and
//! control characters, so descriptions round-trip exactly.

use crate::core::model::TaskFile;
use crate::error::ConvertError;
use std::fs;
use std::path::Path;

/// Strip `//` line comments and `/* */` block comments, preserving
/// everything inside string literals.
pub fn strip_comments(source: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        InString,
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '"' => {
                    state = State::InString;
                    out.push(c);
                }
                '/' => match chars.peek() {
                    Some(&'/') => {
                        chars.next();
                        state = State::LineComment;
                    }
                    Some(&'*') => {
                        chars.next();
                        state = State::BlockComment;
                    }
                    _ => out.push(c),
                },
                _ => out.push(c),
            },
            State::InString => {
                out.push(c);
                match c {
                    '\\' => {
                        // Escaped character, keep it verbatim
                        if let Some(next) = chars.next() {
                            out.push(next);
                        }
                    }
                    '"' => state = State::Code,
                    _ => {}
                }
            }
            State::LineComment => {
                if c == '\n' {
                    out.push(c);
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
            }
        }
    }

    out
}

/// Parse a task file from JSONC text
pub fn parse_task_file(source: &str) -> Result<TaskFile, ConvertError> {
    let stripped = strip_comments(source);
    let file: TaskFile = serde_json::from_str(&stripped)?;
    Ok(file)
}

/// Load a task file from disk
pub fn load_task_file(path: &Path) -> Result<TaskFile, ConvertError> {
    let content = fs::read_to_string(path)?;
    parse_task_file(&content)
}

/// Serialize a task file, with an optional comment block prepended
/// outside the structured payload.
pub fn render_task_file(file: &TaskFile, header: Option<&str>) -> Result<String, ConvertError> {
    let json = serde_json::to_string_pretty(file)?;
    match header {
        Some(header) => Ok(format!("{header}\n{json}\n")),
        None => Ok(format!("{json}\n")),
    }
}

/// Write a task file to disk as a whole-file replacement.
///
/// Serializes fully first and lands via a sibling temp file plus rename,
/// so a failed write never leaves a truncated file in place.
pub fn write_task_file(path: &Path, file: &TaskFile, header: Option<&str>) -> Result<(), ConvertError> {
    let rendered = render_task_file(file, header)?;
    let tmp = path.with_extension("jsonc.tmp");
    fs::write(&tmp, rendered)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Task, TaskStatus};

    #[test]
    fn test_strip_line_comments() {
        let src = "{\n// a comment\n\"version\": 1 // trailing\n}";
        let stripped = strip_comments(src);
        assert!(!stripped.contains("comment"));
        assert!(stripped.contains("\"version\": 1"));
    }

    #[test]
    fn test_strip_block_comments() {
        let src = "{ /* block\nspanning lines */ \"version\": 1 }";
        let stripped = strip_comments(src);
        assert!(!stripped.contains("block"));
        let parsed: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(parsed["version"], 1);
    }

    #[test]
    fn test_comment_markers_inside_strings_survive() {
        let src = r#"{ "description": "use // not /* here */", "version": 1 }"#;
        let stripped = strip_comments(src);
        let parsed: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(parsed["description"], "use // not /* here */");
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let src = r#"{ "description": "say \"hi\" // still in string", "version": 1 }"#;
        let stripped = strip_comments(src);
        let parsed: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(parsed["description"], "say \"hi\" // still in string");
    }

    #[test]
    fn test_round_trip_hostile_descriptions() {
        let descriptions = [
            r#"nested "quotes" and ""empty"" pairs"#,
            r#""""""#,
            r"regex chars .*+?[](){}|\d\\ and a \ backslash",
            "tabs\tand\nnewlines",
            "// looks like a comment /* and a block */",
        ];

        for desc in descriptions {
            let mut task = Task::new("1.1", "Hostile", desc);
            task.status = TaskStatus::Completed;
            let file = TaskFile::flat(vec![task]);

            let rendered = render_task_file(&file, Some("// generated\n// header")).unwrap();
            let parsed = parse_task_file(&rendered).unwrap();
            assert_eq!(parsed.tasks[0].description, desc);
            assert_eq!(parsed, file);
        }
    }
}
