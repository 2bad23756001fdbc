//! Parser for INI-style `.conf` files.
//!
//! Handles the stanza format used by Splunk settings files:
//! ```text
//! # comment
//! [tcpout:indexers]
//! server = idx1:9997, idx2:9997
//! compressed=true
//! ```
//!
//! Every line is kept, including comments and blank lines, so the
//! document can be written back unchanged.

use super::{Block, Document, Line, LineKind};
use crate::error::{Error, Result};
use crate::types::{LineEnding, ParseOptions};

const BOM: char = '\u{feff}';

/// Parse a document from raw bytes.
///
/// Input that is not valid UTF-8 is reported as malformed at the line
/// containing the first invalid byte.
pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> Result<Document> {
    match std::str::from_utf8(bytes) {
        Ok(content) => parse_string(content, options),
        Err(e) => {
            let valid = &bytes[..e.valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
            Err(Error::malformed(line, "invalid UTF-8"))
        }
    }
}

/// Parse a document from a string.
pub fn parse_string(content: &str, options: &ParseOptions) -> Result<Document> {
    let mut document = Document::with_options(options.clone());

    let content = match content.strip_prefix(BOM) {
        Some(rest) => {
            document.bom = true;
            rest
        }
        None => content,
    };

    let mut newline = None;

    for (index, raw) in content.split_inclusive('\n').enumerate() {
        let line_num = index + 1;
        let (text, eol) = split_terminator(raw);
        if newline.is_none() && eol != LineEnding::None {
            newline = Some(eol);
        }

        let line = parse_line(text, eol, line_num, options)?;

        if line.kind == LineKind::Header {
            let name = header_name(text, line_num)?;
            if document.has_section(&name) {
                return Err(Error::malformed(
                    line_num,
                    format!("duplicate section [{name}]"),
                ));
            }
            let leading = match document.blocks.last_mut() {
                Some(block) => take_detached_comments(&mut block.body),
                None => Vec::new(),
            };
            document.blocks.push(Block {
                name,
                leading,
                header: line,
                body: Vec::new(),
            });
            continue;
        }

        match document.blocks.last_mut() {
            Some(block) => block.body.push(line),
            None if matches!(line.kind, LineKind::Property { .. }) => {
                return Err(Error::malformed(
                    line_num,
                    "key outside of any [section]",
                ));
            }
            None => document.preamble.push(line),
        }
    }

    document.newline = newline.unwrap_or_default();
    Ok(document)
}

/// Split a raw line into its text and terminator.
fn split_terminator(raw: &str) -> (&str, LineEnding) {
    if let Some(text) = raw.strip_suffix("\r\n") {
        (text, LineEnding::CrLf)
    } else if let Some(text) = raw.strip_suffix('\n') {
        (text, LineEnding::Lf)
    } else {
        (raw, LineEnding::None)
    }
}

/// Classify a single line.
fn parse_line(text: &str, eol: LineEnding, line_num: usize, options: &ParseOptions) -> Result<Line> {
    let trimmed = text.trim();

    let kind = if trimmed.is_empty() {
        LineKind::Blank
    } else if options.is_comment(trimmed) {
        LineKind::Comment
    } else if trimmed.starts_with('[') {
        LineKind::Header
    } else {
        parse_property(text, line_num)?
    };

    Ok(Line {
        text: text.to_string(),
        eol,
        kind,
    })
}

/// Extract the section name from a header line.
fn header_name(text: &str, line_num: usize) -> Result<String> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| Error::malformed(line_num, "unterminated section header"))?;

    let name = inner.trim();
    if name.is_empty() {
        return Err(Error::malformed(line_num, "empty section name"));
    }
    Ok(name.to_string())
}

/// Parse `key = value`, remembering where the value starts.
fn parse_property(text: &str, line_num: usize) -> Result<LineKind> {
    let eq = text
        .find('=')
        .ok_or_else(|| Error::malformed(line_num, "expected `key = value`"))?;

    let key = text[..eq].trim();
    if key.is_empty() {
        return Err(Error::malformed(line_num, "empty key"));
    }

    let after = &text[eq + 1..];
    let value_start = eq + 1 + (after.len() - after.trim_start().len());
    let value = text[value_start..].trim_end();

    Ok(LineKind::Property {
        key: key.to_string(),
        value: value.to_string(),
        value_start,
    })
}

/// Detach the run of comment lines at the end of a section body.
///
/// The run describes the next section only if a blank line sets it apart
/// from the body above; otherwise it stays where it was written. Comments
/// before the first header are file comments and never move.
fn take_detached_comments(body: &mut Vec<Line>) -> Vec<Line> {
    let split = body
        .iter()
        .rposition(|l| !l.is_comment())
        .map_or(0, |i| i + 1);
    if split == body.len() || !body[..split].last().is_some_and(Line::is_blank) {
        return Vec::new();
    }
    body.split_off(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Section;

    fn parse(content: &str) -> Result<Document> {
        parse_string(content, &ParseOptions::default())
    }

    #[test]
    fn test_parse_sections_and_properties() {
        let doc = parse("[default]\nhost = old\n\n[tcpout]\ndefaultGroup=indexers\n").unwrap();
        assert_eq!(
            doc.sections(),
            vec![
                Section::new("default").with("host", "old"),
                Section::new("tcpout").with("defaultGroup", "indexers"),
            ]
        );
    }

    #[test]
    fn test_parse_empty() {
        let doc = parse("").unwrap();
        assert!(doc.is_empty());
        assert!(doc.sections().is_empty());
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let content = "# top comment\n\n[a]\n; semicolon comment\nx = 1\n\n# trailing\n";
        let doc = parse(content).unwrap();
        assert_eq!(doc.sections(), vec![Section::new("a").with("x", "1")]);
    }

    #[test]
    fn test_value_keeps_inner_equals_and_spaces() {
        let doc = parse("[a]\nregex = ^(?<k>[^=]+)=(.*) $\n").unwrap();
        assert_eq!(
            doc.section("a").unwrap().get("regex"),
            Some("^(?<k>[^=]+)=(.*) $")
        );
    }

    #[test]
    fn test_header_name_is_trimmed() {
        let doc = parse("  [ monitor:///var/log ]  \n").unwrap();
        assert!(doc.has_section("monitor:///var/log"));
    }

    #[test]
    fn test_redeclared_key_last_value_first_position() {
        let doc = parse("[a]\nk = 1\nj = 0\nk = 2\n").unwrap();
        let section = doc.section("a").unwrap();
        assert_eq!(
            section.properties,
            vec![("k".into(), "2".into()), ("j".into(), "0".into())]
        );
    }

    #[test]
    fn test_empty_value() {
        let doc = parse("[a]\nk =\n").unwrap();
        assert_eq!(doc.section("a").unwrap().get("k"), Some(""));
    }

    #[test]
    fn test_key_outside_section() {
        let err = parse("# hi\nhost = x\n[a]\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn test_unterminated_header() {
        let err = parse("[a]\nx = 1\n[b\n").unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_empty_header() {
        assert!(parse("[ ]\n").is_err());
    }

    #[test]
    fn test_line_without_equals() {
        let err = parse("[a]\njust words\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_duplicate_section() {
        let err = parse("[a]\n[b]\n[a]\n").unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_hash_only_comments() {
        let err = parse_string("[a]\n; not a comment\n", &ParseOptions::hash_only()).unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = parse_bytes(b"[a]\nk = \xff\n", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_detects_crlf() {
        let doc = parse("[a]\r\nx = 1\r\n").unwrap();
        assert_eq!(doc.newline, LineEnding::CrLf);
        assert_eq!(doc.section("a").unwrap().get("x"), Some("1"));
    }

    #[test]
    fn test_comments_above_header_belong_to_section() {
        let doc = parse("[a]\nx = 1\n\n# about b\n# more\n[b]\n").unwrap();
        assert_eq!(doc.blocks[0].body.len(), 2);
        assert_eq!(doc.blocks[1].leading.len(), 2);
    }

    #[test]
    fn test_comment_right_after_properties_stays_in_section() {
        let doc = parse("[a]\nx = 1\n# note about x\n[b]\ny = 2\n").unwrap();
        assert_eq!(doc.blocks[0].body.len(), 2);
        assert!(doc.blocks[0].body[1].is_comment());
        assert!(doc.blocks[1].leading.is_empty());
    }

    #[test]
    fn test_comment_only_body_stays_in_section() {
        let doc = parse("[a]\n# nothing here yet\n[b]\n").unwrap();
        assert_eq!(doc.blocks[0].body.len(), 1);
        assert!(doc.blocks[1].leading.is_empty());
    }

    #[test]
    fn test_file_header_comment_stays_in_preamble() {
        let doc = parse("# Managed by ops\n[a]\nx = 1\n").unwrap();
        assert_eq!(doc.preamble.len(), 1);
        assert!(doc.blocks[0].leading.is_empty());
    }
}
