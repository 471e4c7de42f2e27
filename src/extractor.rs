/*!
 * Extraction of translatable elements from source code.
 *
 * The extractor runs a language's lexical patterns over the whole file and
 * keeps the matches whose payload contains foreign-script text. Elements carry
 * exact byte and line/column positions so that the reconstructor can splice
 * translations back without touching anything else.
 *
 * Two modes are supported:
 * - conservative: comments, doc comments and docstrings
 * - aggressive: everything above plus string literals that are not already
 *   covered by a comment or docstring
 */

use log::trace;
use regex::Captures;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

use crate::grammar::{Language, LanguageGrammar, LexicalPattern, PatternKind};
use crate::script::ScriptPredicate;

/// Kind of translatable element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Comment,
    Docstring,
    StringLiteral,
    /// Reserved for identifier translation; never produced by the extractor
    Identifier,
}

impl ElementKind {
    /// Stable snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Docstring => "docstring",
            Self::StringLiteral => "string_literal",
            Self::Identifier => "identifier",
        }
    }

    /// Human-readable hint passed to the translation engine
    pub fn context_hint(&self) -> &'static str {
        match self {
            Self::Comment => "code comment",
            Self::Docstring => "documentation comment",
            Self::StringLiteral => "string literal in source code",
            Self::Identifier => "source code identifier",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lexical shape of an element, as observed in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delimiter {
    /// A marker that runs to end of line (`#`, `//`, `///`)
    LineMarker(String),
    /// An opening and closing pair (`"""`, `/*` `*/`, `/**` `*/`)
    Pair { open: String, close: String },
    /// A single-line quoted literal
    Quote(char),
    /// A single-line raw literal without escape sequences (Go backticks)
    RawQuote(char),
}

/// A translatable span discovered in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    /// Foreign-script payload, delimiters and surrounding whitespace stripped
    pub text: String,
    /// Zero-based, inclusive
    pub start_line: usize,
    pub end_line: usize,
    /// Byte column of the opening delimiter on `start_line`
    pub start_col: usize,
    /// Byte column just past the closing delimiter on `end_line`
    pub end_col: usize,
    /// Containing line for line comments and literals, full match otherwise
    pub original_text: String,
    pub delimiter: Delimiter,
    /// Absolute byte range of the whole match
    pub span: Range<usize>,
    /// Absolute byte range of `text`
    pub text_span: Range<usize>,
}

impl Element {
    /// Whether the element spans more than one line
    pub fn is_multiline(&self) -> bool {
        self.end_line > self.start_line
    }
}

/// Extraction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Comments, doc comments and docstrings only
    #[default]
    Conservative,
    /// Also string literals; may change program behaviour
    Aggressive,
}

/// Byte offsets of every line start, for offset to line/column conversion
pub(crate) struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub(crate) fn new(content: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(content.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts, len: content.len() }
    }

    /// Zero-based line containing `offset`
    pub(crate) fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset) - 1
    }

    /// Byte offset where `line` starts; one past the end for lines beyond the content
    pub(crate) fn line_start(&self, line: usize) -> usize {
        self.starts.get(line).copied().unwrap_or(self.len)
    }

    /// Line and column of an offset
    pub(crate) fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.line_of(offset);
        (line, offset - self.starts[line])
    }

    /// Text of `line` without its line feed
    pub(crate) fn line_text<'a>(&self, content: &'a str, line: usize) -> &'a str {
        let start = self.line_start(line);
        let end = self
            .starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        &content[start..end.max(start)]
    }
}

/// Scans source files for translatable elements
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    predicate: ScriptPredicate,
}

impl Extractor {
    /// Create an extractor that uses the given script predicate as its gate
    pub fn new(predicate: ScriptPredicate) -> Self {
        Self { predicate }
    }

    /// The predicate gating every extraction decision
    pub fn predicate(&self) -> &ScriptPredicate {
        &self.predicate
    }

    /// Extract elements in the requested mode
    pub fn extract(&self, content: &str, language: Language, mode: ExtractionMode) -> Vec<Element> {
        match mode {
            ExtractionMode::Conservative => self.extract_comments(content, language),
            ExtractionMode::Aggressive => self.extract_all(content, language),
        }
    }

    /// Extract comments, doc comments and docstrings containing foreign text.
    ///
    /// The file is scanned left to right. At each step the comment that starts
    /// first wins, with pattern priority deciding only between matches at the
    /// same offset, and scanning resumes after it. Markers inside an earlier
    /// comment (a `/*` after `//`, a `'''` after `#`, the `//` of a `///`
    /// line) are therefore never read as comments of their own. Comments
    /// without foreign text still claim their range.
    pub fn extract_comments(&self, content: &str, language: Language) -> Vec<Element> {
        let grammar = language.grammar();
        let index = LineIndex::new(content);
        let patterns: Vec<&LexicalPattern> = grammar.comment_patterns().collect();

        // Per pattern: `None` needs a search, `Some(None)` is exhausted
        let mut pending: Vec<Option<Option<Candidate<'_>>>> = patterns.iter().map(|_| None).collect();
        let mut elements = Vec::new();
        let mut pos = 0;

        loop {
            let mut best: Option<(usize, usize)> = None;
            for (slot, (pattern, next)) in patterns.iter().zip(pending.iter_mut()).enumerate() {
                let stale = match &*next {
                    None => true,
                    Some(Some(candidate)) => candidate.start < pos,
                    Some(None) => false,
                };
                if stale {
                    *next = Some(next_comment(grammar, &index, content, pattern, pos));
                }
                let start = match &*next {
                    Some(Some(candidate)) => candidate.start,
                    _ => continue,
                };
                if best.is_none_or(|(best_start, _)| start < best_start) {
                    best = Some((start, slot));
                }
            }

            let Some((_, slot)) = best else {
                break;
            };
            let Some(Some(candidate)) = pending[slot].take() else {
                break;
            };
            let Some(whole) = candidate.caps.get(0) else {
                break;
            };
            pos = if whole.end() > whole.start() {
                whole.end()
            } else {
                next_char_boundary(content, whole.end())
            };

            if let Some(element) = self.build_element(grammar, content, &index, patterns[slot], &candidate.caps) {
                elements.push(element);
            }
        }

        trace!("Extracted {} comment elements ({})", elements.len(), language);
        elements
    }

    /// Extract comments, docstrings and string literals containing foreign text.
    ///
    /// String literals on lines already covered by a comment or docstring are
    /// skipped so text inside documentation is never counted twice.
    pub fn extract_all(&self, content: &str, language: Language) -> Vec<Element> {
        let mut elements = self.extract_comments(content, language);
        let grammar = language.grammar();
        let Some(pattern) = grammar.string_literal.as_ref() else {
            return elements;
        };

        let index = LineIndex::new(content);
        let covered: Vec<Range<usize>> = elements
            .iter()
            .map(|e| index.line_start(e.start_line)..index.line_start(e.end_line + 1))
            .collect();

        let mut literals = Vec::new();
        for caps in pattern.regex.captures_iter(content) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let is_covered = covered
                .iter()
                .any(|range| whole.start() >= range.start && whole.end() <= range.end);
            if is_covered {
                continue;
            }
            if let Some(element) = self.build_element(grammar, content, &index, pattern, &caps) {
                literals.push(element);
            }
        }

        elements.extend(literals);
        elements.sort_by_key(|e| e.span.start);
        elements
    }

    fn build_element(
        &self,
        grammar: &LanguageGrammar,
        content: &str,
        index: &LineIndex,
        pattern: &LexicalPattern,
        caps: &Captures<'_>,
    ) -> Option<Element> {
        let whole = caps.get(0)?;
        let inner = caps.iter().skip(1).flatten().next()?;

        let raw = inner.as_str();
        let leading = raw.len() - raw.trim_start().len();
        let text = raw.trim();
        if !self.predicate.is_foreign_script(text) {
            return None;
        }
        let text_start = inner.start() + leading;
        let text_span = text_start..text_start + text.len();

        let (start_line, start_col) = index.position(whole.start());
        let (end_line, end_col) = index.position(whole.end());

        let kind = match pattern.kind {
            PatternKind::StringLiteral => ElementKind::StringLiteral,
            kind if kind.is_documentation() => ElementKind::Docstring,
            _ => ElementKind::Comment,
        };

        let delimiter = match pattern.kind {
            PatternKind::StringLiteral => {
                let quote = whole.as_str().chars().next()?;
                if grammar.raw_quote_chars.contains(&quote) {
                    Delimiter::RawQuote(quote)
                } else {
                    Delimiter::Quote(quote)
                }
            }
            kind if kind.is_line_based() => {
                Delimiter::LineMarker(content[whole.start()..inner.start()].to_string())
            }
            _ => Delimiter::Pair {
                open: content[whole.start()..inner.start()].to_string(),
                close: content[inner.end()..whole.end()].to_string(),
            },
        };

        let original_text = match &delimiter {
            Delimiter::Pair { .. } => whole.as_str().to_string(),
            _ => index.line_text(content, start_line).to_string(),
        };

        Some(Element {
            kind,
            text: text.to_string(),
            start_line,
            end_line,
            start_col,
            end_col,
            original_text,
            delimiter,
            span: whole.range(),
            text_span,
        })
    }
}

/// Next match of a comment pattern at or after `from`
struct Candidate<'t> {
    start: usize,
    caps: Captures<'t>,
}

fn next_comment<'t>(
    grammar: &LanguageGrammar,
    index: &LineIndex,
    content: &'t str,
    pattern: &LexicalPattern,
    from: usize,
) -> Option<Candidate<'t>> {
    let mut at = from;
    while at <= content.len() {
        let caps = pattern.regex.captures_at(content, at)?;
        let start = caps.get(0)?.start();
        if !marker_inside_string(grammar, index, content, start) {
            return Some(Candidate { start, caps });
        }
        // Not a comment; look for a real marker further along
        at = next_char_boundary(content, start);
    }
    None
}

fn next_char_boundary(content: &str, offset: usize) -> usize {
    content[offset..]
        .chars()
        .next()
        .map(|c| offset + c.len_utf8())
        .unwrap_or(content.len() + 1)
}

/// True when `offset` sits inside a string literal opened earlier on its line
fn marker_inside_string(
    grammar: &LanguageGrammar,
    index: &LineIndex,
    content: &str,
    offset: usize,
) -> bool {
    let line_start = index.line_start(index.line_of(offset));
    let prefix: Vec<char> = content[line_start..offset].chars().collect();
    let mut open: Option<char> = None;
    let mut i = 0;

    while i < prefix.len() {
        let c = prefix[i];
        match open {
            Some(quote) if c == '\\' && !grammar.raw_quote_chars.contains(&quote) => i += 1,
            Some(quote) if c == quote => open = None,
            Some(_) => {}
            None if grammar.quote_chars.contains(&c) => open = Some(c),
            // `'"'` in languages where `'` only starts a char literal
            None if c == '\'' => i += char_literal_len(&prefix[i..]) - 1,
            None => {}
        }
        i += 1;
    }
    open.is_some()
}

/// Length of the char literal starting at `chars[0]`, or 1 for a lone `'`
/// such as a Rust lifetime
fn char_literal_len(chars: &[char]) -> usize {
    match chars {
        ['\'', '\\', _, tail @ ..] => tail
            .iter()
            .take(10)
            .position(|&c| c == '\'')
            .map_or(1, |p| p + 4),
        ['\'', _, '\'', ..] => 3,
        _ => 1,
    }
}
