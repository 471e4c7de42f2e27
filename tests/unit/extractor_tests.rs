/*!
 * Tests for element extraction across languages
 */

use code_translator::extractor::{Delimiter, ElementKind, ExtractionMode, Extractor};
use code_translator::grammar::Language;
use code_translator::script::{Script, ScriptPredicate};
use crate::common;

fn extractor() -> Extractor {
    Extractor::default()
}

#[test]
fn test_extract_withPythonSample_shouldFindDocstringAndComments() {
    let elements = extractor().extract(common::PYTHON_SAMPLE, Language::Python, ExtractionMode::Conservative);

    let texts: Vec<&str> = elements.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["数据处理模块", "读取文件", "返回内容"]);
    assert_eq!(elements[0].kind, ElementKind::Docstring);
    assert_eq!(elements[1].kind, ElementKind::Comment);
    assert_eq!(elements[2].start_line, 4);
}

#[test]
fn test_extract_withAggressiveMode_shouldAddStringLiterals() {
    let elements = extractor().extract(common::PYTHON_SAMPLE, Language::Python, ExtractionMode::Aggressive);

    assert_eq!(elements.len(), 4);
    let literal = elements.last().unwrap();
    assert_eq!(literal.kind, ElementKind::StringLiteral);
    assert_eq!(literal.text, "加载完成");
    assert_eq!(literal.start_line, 6);
}

#[test]
fn test_extract_withAggressiveMode_shouldNeverOverlap() {
    let content = "/**\n * 类说明 \"引号\"\n */\nclass A {\n  String s = \"你好\"; // 问候\n  String t = \"世界\"; /* 注 */\n}\n";
    let elements = extractor().extract_all(content, Language::Java);

    assert_eq!(elements.len(), 5);
    for pair in elements.windows(2) {
        assert!(pair[0].span.end <= pair[1].span.start, "{:?} overlaps {:?}", pair[0], pair[1]);
    }
}

#[test]
fn test_extract_withGoFile_shouldTreatDocCommentsAsLineComments() {
    let content = "// Package 工具 提供帮助函数\npackage util\n\nvar s = `原始字符串`\n";
    let comments = extractor().extract_comments(content, Language::Go);
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].kind, ElementKind::Comment);
    assert_eq!(comments[0].text, "Package 工具 提供帮助函数");

    let all = extractor().extract_all(content, Language::Go);
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].delimiter, Delimiter::RawQuote('`'));
}

#[test]
fn test_extract_withCFile_shouldHandleMultilineBlock() {
    let content = "/*\n * 初始化\n * 设备\n */\nint init(void);\n";
    let elements = extractor().extract_comments(content, Language::C);

    assert_eq!(elements.len(), 1);
    let e = &elements[0];
    assert!(e.is_multiline());
    assert_eq!((e.start_line, e.end_line), (0, 3));
    assert_eq!(e.text, "* 初始化\n * 设备");
    assert_eq!(e.original_text, &content[e.span.clone()]);
}

#[test]
fn test_extract_withJapaneseAndKorean_shouldDetectDefaultScripts() {
    let content = "// カタカナのコメント\n// 한국어 주석\n// english\n";
    let elements = extractor().extract_comments(content, Language::JavaScript);
    assert_eq!(elements.len(), 2);
}

#[test]
fn test_extract_withConfiguredScripts_shouldOnlyMatchThoseScripts() {
    let content = "# Привет\n# 你好\n";
    let cyrillic = Extractor::new(ScriptPredicate::new(&[Script::Cyrillic]));
    let elements = cyrillic.extract_comments(content, Language::Python);

    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].text, "Привет");
}

#[test]
fn test_extract_withEmptyContent_shouldReturnNothing() {
    assert!(extractor().extract_all("", Language::Rust).is_empty());
    assert!(extractor().extract_comments("#\n#   \n", Language::Python).is_empty());
}

#[test]
fn test_text_span_shouldPointAtPayload() {
    let elements = extractor().extract_all(common::RUST_SAMPLE, Language::Rust);
    assert_eq!(elements.len(), 2);
    for e in &elements {
        assert_eq!(&common::RUST_SAMPLE[e.text_span.clone()], e.text);
    }
}
