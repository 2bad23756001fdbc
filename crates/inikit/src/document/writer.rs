//! Writer for serializing documents back to text.
//!
//! Lines are emitted exactly as stored. A line that lost its position as
//! the last line of the file (because something was appended after it)
//! gets the document's newline.

use super::Document;
use crate::types::LineEnding;

/// Serialize a document to a string.
pub fn write_string(document: &Document) -> String {
    let lines: Vec<_> = document.lines().collect();
    let mut output = String::new();

    if document.bom {
        output.push('\u{feff}');
    }

    for (index, line) in lines.iter().enumerate() {
        output.push_str(&line.text);
        let is_last = index + 1 == lines.len();
        let eol = if line.eol == LineEnding::None && !is_last {
            document.newline
        } else {
            line.eol
        };
        output.push_str(eol.as_str());
    }

    output
}

/// Serialize a document to bytes.
pub fn write_bytes(document: &Document) -> Vec<u8> {
    write_string(document).into_bytes()
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::document::parse_string;
    use crate::types::ParseOptions;
    use proptest::prelude::*;

    fn indent() -> impl Strategy<Value = String> {
        "[ \t]{0,2}"
    }

    fn comment() -> impl Strategy<Value = String> {
        (indent(), "[#;][^\r\n]{0,12}").prop_map(|(i, c)| format!("{i}{c}"))
    }

    fn property() -> impl Strategy<Value = String> {
        (
            indent(),
            "[a-zA-Z_][a-zA-Z0-9_.]{0,6}",
            " {0,2}",
            " {0,2}",
            "[^\r\n]{0,12}",
        )
            .prop_map(|(i, k, before, after, v)| format!("{i}{k}{before}={after}{v}"))
    }

    /// Comment, blank or property line inside a section
    fn body_line() -> impl Strategy<Value = String> {
        prop_oneof![comment(), indent(), property(), property()]
    }

    /// Physical lines of a whole file, terminators not yet applied
    fn file_lines() -> impl Strategy<Value = Vec<String>> {
        let preamble = prop::collection::vec(prop_oneof![comment(), indent()], 0..3);
        let sections = prop::collection::btree_map(
            "[a-z][a-z0-9:_]{0,6}",
            (indent(), indent(), prop::collection::vec(body_line(), 0..5)),
            0..4,
        );
        (preamble, sections).prop_map(|(mut lines, sections)| {
            for (name, (before, after, body)) in sections {
                lines.push(format!("{before}[{name}]{after}"));
                lines.extend(body);
            }
            lines
        })
    }

    fn file() -> impl Strategy<Value = String> {
        (file_lines(), any::<bool>(), any::<bool>(), any::<u64>()).prop_map(
            |(lines, bom, final_newline, crlf_mask)| {
                let mut out = String::new();
                if bom {
                    out.push('\u{feff}');
                }
                let count = lines.len();
                for (i, line) in lines.into_iter().enumerate() {
                    out.push_str(&line);
                    if i + 1 == count && !final_newline {
                        break;
                    }
                    out.push_str(if (crlf_mask >> (i % 64)) & 1 == 1 { "\r\n" } else { "\n" });
                }
                out
            },
        )
    }

    proptest! {
        /// Writing an untouched document reproduces the input exactly
        #[test]
        fn write_reproduces_parsed_input(content in file()) {
            let doc = parse_string(&content, &ParseOptions::default()).unwrap();
            prop_assert_eq!(write_string(&doc), content);
        }

        /// An edit changes the semantic view and survives a reparse
        #[test]
        fn edit_survives_reparse(
            content in file(),
            key in "[a-zA-Z][a-zA-Z0-9_]{0,6}",
            value in "[a-z0-9:/.,]{0,8}",
        ) {
            let mut doc = parse_string(&content, &ParseOptions::default()).unwrap();
            let section = match doc.sections().first() {
                Some(s) => s.name.clone(),
                None => {
                    doc.add_section("new").unwrap();
                    "new".to_string()
                }
            };
            doc.set_property(&section, &key, &value).unwrap();

            let written = write_string(&doc);
            let reparsed = parse_string(&written, &ParseOptions::default()).unwrap();
            let reparsed_section = reparsed.section(&section).unwrap();
            prop_assert_eq!(reparsed_section.get(&key), Some(value.as_str()));
            prop_assert_eq!(write_string(&reparsed), written);
        }
    }
}
