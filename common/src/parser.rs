//! モデル応答パーサー
//!
//! ビジョンモデルの自由形式の複数行応答を行単位で分類し、
//! ExtractedElements を組み立てる。入力がどれだけ崩れていても失敗しない。

use crate::types::{ExtractedElements, PatternKind, SpecialPattern};
use regex::Regex;

/// モデルが付け足しがちな前置き・感想（内容ではないので捨てる）
const DISALLOWED_PREFIXES: &[&str] = &[
    "here is the text",
    "here’s the text",
    "the rest of the image",
    "no other text is visible",
    "that is the only",
    "the image appears",
    "this image",
];

/// これらを含む行はコード候補
const CODE_MARKERS: &[char] = &['<', '>', '«', '»', '(', ')', '[', ']', '#'];

lazy_static::lazy_static! {
    // 括弧類がない場合のコード判定
    static ref CODE_FALLBACK_RE: Regex = Regex::new(r"[A-Z]{2,}.*\d+|^\d+[A-Z]+").unwrap();
    // 3要素の数値日付 or 4桁の年
    static ref DATE_RE: Regex = Regex::new(r"\d{1,4}[-/\s]\d{1,2}[-/\s]\d{1,4}|\b\d{4}\b").unwrap();
    // 日 月'年 （例: 26 6'95）
    pub(crate) static ref DATE_COMPACT_RE: Regex = Regex::new(r"\b(\d{1,2})\s+(\d{1,2})'(\d{2})\b").unwrap();
    static ref NUMERIC_RE: Regex = Regex::new(r"\d{3,}").unwrap();
    static ref NAME_RE: Regex = Regex::new(r"[A-Z][a-z]+\s+[A-Z][a-z]+").unwrap();
    // 定型コード書式（先に一致したものを採用）
    static ref SPECIAL_CODE_RES: [Regex; 2] = [
        Regex::new(r"^[A-Z]{1,4}\d{2,4}-\d{2,4}\s+[<«][^>»]{1,4}[>»]\s+[A-Z]{2,4}$").unwrap(),
        Regex::new(r"^[A-Z]{2,4}\s+[«<][^>»]{1,4}[>»]\s+\d{2,4}-\d{2,4}$").unwrap(),
    ];
}

/// モデル応答を分類する
///
/// 各行は独立に判定され、1行が複数のバケットに入ることがある。
///
/// # Examples
/// ```
/// use photo_ocr_common::parse_raw_response;
///
/// let elements = parse_raw_response("Here is the text:\n- back: KD12-34 <A> ST\n1987");
/// assert_eq!(elements.all_text_lines, vec!["back: KD12-34 <A> ST", "1987"]);
/// assert_eq!(elements.potential_dates, vec!["1987"]);
/// ```
pub fn parse_raw_response(raw_response: &str) -> ExtractedElements {
    let mut elements = ExtractedElements::default();

    for line in raw_response.trim().lines() {
        let line = strip_bullet(line);
        if line.is_empty() || is_meta_commentary(line) {
            continue;
        }

        elements.all_text_lines.push(line.to_string());

        if let Some((location, text)) = line.split_once(':') {
            elements
                .location_tagged
                .entry(location.to_lowercase())
                .or_default()
                .push(text.trim().to_string());
        }

        if line.contains(CODE_MARKERS) || CODE_FALLBACK_RE.is_match(line) {
            elements.potential_codes.push(line.to_string());
        }

        if DATE_RE.is_match(line) {
            elements.potential_dates.push(line.to_string());
        }
        if DATE_COMPACT_RE.is_match(line) {
            elements.potential_dates.push(line.to_string());
        }

        if NUMERIC_RE.is_match(line) {
            elements.numeric_sequences.push(line.to_string());
        }
        if NAME_RE.is_match(line) {
            elements.potential_names.push(line.to_string());
        }

        if SPECIAL_CODE_RES.iter().any(|re| re.is_match(line)) {
            elements.potential_codes.push(line.to_string());
            elements.special_patterns.push(SpecialPattern {
                kind: PatternKind::Code,
                value: line.to_string(),
            });
        }
    }

    elements
}

/// 前後の空白と先頭の箇条書き記号を除く
fn strip_bullet(line: &str) -> &str {
    line.trim()
        .trim_start_matches(['-', '•', ' '])
        .trim()
}

fn is_meta_commentary(line: &str) -> bool {
    let lower = line.to_lowercase();
    DISALLOWED_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}
