/*!
 * Language grammar registry.
 *
 * Maps file extensions to a closed set of languages and gives each language a
 * small, immutable table of lexical patterns. A language without an entry for
 * a pattern kind never yields elements of that kind.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::Path;

// @module: Per-language lexical patterns

/// Supported source languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    Java,
    Go,
    Rust,
    C,
}

impl Language {
    /// Look up a language by file extension (without the dot, any case)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "py" | "pyw" => Some(Self::Python),
            "js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "java" => Some(Self::Java),
            "go" => Some(Self::Go),
            "rs" => Some(Self::Rust),
            "c" | "h" | "cpp" | "cc" | "cxx" | "hpp" => Some(Self::C),
            _ => None,
        }
    }

    /// Lowercase identifier of the language
    pub fn name(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Java => "java",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::C => "c",
        }
    }

    /// Pattern table for this language
    pub fn grammar(&self) -> &'static LanguageGrammar {
        match self {
            Self::Python => &PYTHON,
            Self::JavaScript => &JAVASCRIPT,
            Self::Java => &JAVA,
            Self::Go => &GO,
            Self::Rust => &RUST,
            Self::C => &C_FAMILY,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the language of a file from its extension
pub fn detect_language<P: AsRef<Path>>(path: P) -> Option<Language> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Language::from_extension)
}

/// Kind of lexical pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    LineComment,
    DocComment,
    BlockComment,
    Docstring,
    StringLiteral,
}

impl PatternKind {
    /// Whether matches of this pattern are documentation
    pub fn is_documentation(&self) -> bool {
        matches!(self, Self::DocComment | Self::Docstring)
    }

    /// Whether the pattern is delimited by a marker running to end of line
    pub fn is_line_based(&self) -> bool {
        matches!(self, Self::LineComment | Self::DocComment)
    }
}

/// A compiled pattern. The payload is the first capture group that
/// participated in the match; the text around it is the delimiter.
#[derive(Debug)]
pub struct LexicalPattern {
    pub kind: PatternKind,
    pub regex: Regex,
}

impl LexicalPattern {
    fn new(kind: PatternKind, pattern: &str) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).expect("built-in lexical pattern must compile"),
        }
    }
}

/// Immutable pattern set for a single language
#[derive(Debug)]
pub struct LanguageGrammar {
    pub line_comment: Option<LexicalPattern>,
    pub doc_comment: Option<LexicalPattern>,
    pub block_comment: Option<LexicalPattern>,
    pub docstring: Option<LexicalPattern>,
    pub string_literal: Option<LexicalPattern>,
    /// Characters that open a string literal on a single line
    pub quote_chars: &'static [char],
    /// Quote characters whose literals take no escape sequences
    pub raw_quote_chars: &'static [char],
}

impl LanguageGrammar {
    /// Comment and documentation patterns in priority order: delimited
    /// documentation first, then blocks, then plain line comments. Priority
    /// only decides between matches that start at the same offset.
    pub fn comment_patterns(&self) -> impl Iterator<Item = &LexicalPattern> {
        [
            self.docstring.as_ref(),
            self.doc_comment.as_ref(),
            self.block_comment.as_ref(),
            self.line_comment.as_ref(),
        ]
        .into_iter()
        .flatten()
    }
}

const LINE_HASH: &str = r"(?m)#(.*)$";
const LINE_SLASH: &str = r"(?m)//(.*)$";
const BLOCK: &str = r"(?s)/\*(.*?)\*/";
// `/**/` and `/***/` are plain blocks, not documentation
const JAVADOC: &str = r"(?s)/\*\*([^*/].*?)\*/";
const DOUBLE_QUOTED: &str = r#""((?:[^"\\\n]|\\.)*)""#;

static PYTHON: Lazy<LanguageGrammar> = Lazy::new(|| LanguageGrammar {
    line_comment: Some(LexicalPattern::new(PatternKind::LineComment, LINE_HASH)),
    doc_comment: None,
    block_comment: None,
    docstring: Some(LexicalPattern::new(
        PatternKind::Docstring,
        r#"(?s)"""(.*?)"""|'''(.*?)'''"#,
    )),
    string_literal: Some(LexicalPattern::new(
        PatternKind::StringLiteral,
        r#""((?:[^"\\\n]|\\.)*)"|'((?:[^'\\\n]|\\.)*)'"#,
    )),
    quote_chars: &['"', '\''],
    raw_quote_chars: &[],
});

static JAVASCRIPT: Lazy<LanguageGrammar> = Lazy::new(|| LanguageGrammar {
    line_comment: Some(LexicalPattern::new(PatternKind::LineComment, LINE_SLASH)),
    doc_comment: None,
    block_comment: Some(LexicalPattern::new(PatternKind::BlockComment, BLOCK)),
    docstring: Some(LexicalPattern::new(PatternKind::Docstring, JAVADOC)),
    string_literal: Some(LexicalPattern::new(
        PatternKind::StringLiteral,
        r#""((?:[^"\\\n]|\\.)*)"|'((?:[^'\\\n]|\\.)*)'|`((?:[^`\\\n]|\\.)*)`"#,
    )),
    quote_chars: &['"', '\'', '`'],
    raw_quote_chars: &[],
});

static JAVA: Lazy<LanguageGrammar> = Lazy::new(|| LanguageGrammar {
    line_comment: Some(LexicalPattern::new(PatternKind::LineComment, LINE_SLASH)),
    doc_comment: None,
    block_comment: Some(LexicalPattern::new(PatternKind::BlockComment, BLOCK)),
    docstring: Some(LexicalPattern::new(PatternKind::Docstring, JAVADOC)),
    string_literal: Some(LexicalPattern::new(PatternKind::StringLiteral, DOUBLE_QUOTED)),
    quote_chars: &['"'],
    raw_quote_chars: &[],
});

static GO: Lazy<LanguageGrammar> = Lazy::new(|| LanguageGrammar {
    line_comment: Some(LexicalPattern::new(PatternKind::LineComment, LINE_SLASH)),
    doc_comment: None,
    block_comment: Some(LexicalPattern::new(PatternKind::BlockComment, BLOCK)),
    docstring: None,
    string_literal: Some(LexicalPattern::new(
        PatternKind::StringLiteral,
        r#""((?:[^"\\\n]|\\.)*)"|`([^`\n]*)`"#,
    )),
    quote_chars: &['"', '`'],
    raw_quote_chars: &['`'],
});

static RUST: Lazy<LanguageGrammar> = Lazy::new(|| LanguageGrammar {
    line_comment: Some(LexicalPattern::new(PatternKind::LineComment, LINE_SLASH)),
    doc_comment: Some(LexicalPattern::new(PatternKind::DocComment, r"(?m)//[/!](.*)$")),
    block_comment: Some(LexicalPattern::new(PatternKind::BlockComment, BLOCK)),
    docstring: None,
    string_literal: Some(LexicalPattern::new(PatternKind::StringLiteral, DOUBLE_QUOTED)),
    quote_chars: &['"'],
    raw_quote_chars: &[],
});

static C_FAMILY: Lazy<LanguageGrammar> = Lazy::new(|| LanguageGrammar {
    line_comment: Some(LexicalPattern::new(PatternKind::LineComment, LINE_SLASH)),
    doc_comment: None,
    block_comment: Some(LexicalPattern::new(PatternKind::BlockComment, BLOCK)),
    docstring: None,
    string_literal: Some(LexicalPattern::new(PatternKind::StringLiteral, DOUBLE_QUOTED)),
    quote_chars: &['"'],
    raw_quote_chars: &[],
});
