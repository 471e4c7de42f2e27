/*!
 * Reconstruction of source files from translated elements.
 *
 * Every element is turned into an edit on the immutable original content:
 * the element's payload bytes are replaced, everything else is copied
 * verbatim. Edits are validated against their anchors, ordered by position
 * and checked for overlap before a single forward pass builds the result,
 * so the outcome never depends on the order in which pairs are supplied.
 */

use log::warn;
use std::ops::Range;

use crate::errors::ReconstructError;
use crate::extractor::{Delimiter, Element, LineIndex};

/// A single planned replacement
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    line: usize,
    col: usize,
    range: Range<usize>,
    replacement: String,
}

/// Rebuilds file content from (element, translation) pairs
pub struct Reconstructor;

impl Reconstructor {
    /// Produce new content that differs from `content` only inside the
    /// payloads of the given elements.
    pub fn reconstruct(
        content: &str,
        translations: &[(Element, String)],
    ) -> Result<String, ReconstructError> {
        let index = LineIndex::new(content);

        let mut edits = translations
            .iter()
            .map(|(element, translated)| Self::plan_edit(content, &index, element, translated))
            .collect::<Result<Vec<_>, _>>()?;

        // Same-line elements are ordered by column
        edits.sort_by_key(|edit| (edit.line, edit.col));
        for pair in edits.windows(2) {
            if pair[0].range.end > pair[1].range.start {
                return Err(ReconstructError::Overlap {
                    first: pair[0].line,
                    second: pair[1].line,
                });
            }
        }

        let mut output = String::with_capacity(content.len());
        let mut cursor = 0;
        for edit in &edits {
            output.push_str(&content[cursor..edit.range.start]);
            output.push_str(&edit.replacement);
            cursor = edit.range.end;
        }
        output.push_str(&content[cursor..]);

        Ok(output)
    }

    fn plan_edit(
        content: &str,
        index: &LineIndex,
        element: &Element,
        translated: &str,
    ) -> Result<Edit, ReconstructError> {
        let out_of_range = |range: &Range<usize>| ReconstructError::OutOfRange {
            start: range.start,
            end: range.end,
            len: content.len(),
        };
        let mismatch = || ReconstructError::AnchorMismatch {
            line: element.start_line,
            expected: element.text.clone(),
        };

        let payload = content
            .get(element.text_span.clone())
            .ok_or_else(|| out_of_range(&element.text_span))?;
        if payload != element.text {
            return Err(mismatch());
        }
        let whole = content
            .get(element.span.clone())
            .ok_or_else(|| out_of_range(&element.span))?;
        if index.line_start(element.start_line) + element.start_col != element.span.start {
            return Err(mismatch());
        }

        let delimited = match &element.delimiter {
            Delimiter::LineMarker(marker) => whole.starts_with(marker.as_str()),
            Delimiter::Pair { open, close } => {
                whole.starts_with(open.as_str()) && whole.ends_with(close.as_str())
            }
            Delimiter::Quote(quote) | Delimiter::RawQuote(quote) => {
                whole.starts_with(*quote) && whole.ends_with(*quote) && whole.len() >= 2
            }
        };
        if !delimited {
            return Err(mismatch());
        }

        let replacement = Self::render(index.line_text(content, element.start_line), element, translated);

        Ok(Edit {
            line: element.start_line,
            col: element.start_col,
            range: element.text_span.clone(),
            replacement,
        })
    }

    /// Shape the translated text for the element's delimiter style
    fn render(opening_line: &str, element: &Element, translated: &str) -> String {
        let translated = translated.trim();
        if translated.is_empty() || translated == element.text {
            return element.text.clone();
        }

        let keep_original = |reason: &str| {
            warn!(
                "Translation at line {} {}; keeping original text",
                element.start_line + 1,
                reason
            );
            element.text.clone()
        };

        match &element.delimiter {
            Delimiter::LineMarker(_) => {
                let joined = translated
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                // A trailing backslash continues a C-style line comment
                let joined = joined.trim_end_matches('\\').trim_end();
                if joined.is_empty() {
                    element.text.clone()
                } else {
                    joined.to_string()
                }
            }
            Delimiter::Pair { open, close } => {
                if let Some(reason) = pair_conflict(open, close, translated) {
                    return keep_original(reason);
                }
                let indent: String = opening_line
                    .chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .collect();
                let mut rendered = reindent(translated, &indent);

                // `"""Say "hi""""` would end the docstring one quote early
                let abuts_closer = element.text_span.end + close.len() == element.span.end;
                if abuts_closer && close.chars().next().is_some_and(|c| rendered.ends_with(c)) {
                    rendered.push(' ');
                }
                rendered
            }
            Delimiter::Quote(quote) => escape_for_quote(translated, *quote),
            Delimiter::RawQuote(quote) => {
                if translated.contains(*quote) || translated.contains(['\n', '\r']) {
                    return keep_original("cannot be written as a raw string");
                }
                translated.to_string()
            }
        }
    }
}

/// Why a translation cannot sit between `open` and `close`, if it cannot
fn pair_conflict(open: &str, close: &str, translated: &str) -> Option<&'static str> {
    if translated.contains(close) {
        return Some("contains the closing delimiter");
    }
    // Rust block comments nest
    if open.starts_with("/*") && translated.contains("/*") {
        return Some("contains a nested block comment opener");
    }
    if close.starts_with(['"', '\'']) && translated.ends_with('\\') {
        return Some("ends with a backslash that would escape the closing quote");
    }
    None
}

/// Indent every line after the first to `indent` unless it already carries it
fn reindent(text: &str, indent: &str) -> String {
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 || line.is_empty() || line.starts_with(indent) {
                line.to_string()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape unescaped quote characters and raw line breaks
fn escape_for_quote(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                out.push(c);
                escaped = true;
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    // A trailing backslash would swallow the closing quote
    if escaped {
        out.push('\\');
    }
    out
}
