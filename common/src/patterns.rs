//! パターン学習
//!
//! コードの文字種テンプレートを求め、日付を解析し、
//! 実行中に見つかったテンプレートを蓄積する。
//! PatternLibrary は1回の実行ごとに作られ、重複排除も消去もしない。

use crate::dates::flexible_date_parse;
use crate::types::{Analysis, Classification, DateRecord, ExtractedElements, PatternRecord};
use regex::Regex;
use std::collections::BTreeMap;

/// discovered_patterns のコード用キー
pub const CODES_KEY: &str = "codes";

lazy_static::lazy_static! {
    static ref SEPARATOR_RE: Regex = Regex::new(r"[<>()\[\]\-/\s]+").unwrap();
}

/// 文字種テンプレートに変換する
///
/// 大文字→`A`、小文字→`a`、数字（0-9、全角含む）→`D`、括弧類と `- _ /` はそのまま、
/// それ以外は `?`。文字数は変わらない。
///
/// # Examples
/// ```
/// use photo_ocr_common::abstract_pattern;
///
/// assert_eq!(abstract_pattern("KD12-34 <x>"), "AADD-DD?<a>");
/// ```
pub fn abstract_pattern(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '<' | '>' | '(' | ')' | '[' | ']' | '{' | '}' => c,
            '-' | '_' | '/' => c,
            c if is_decimal_digit(c) => 'D',
            // Ⅻ のような数を表す文字は英字扱いしない
            c if c.is_alphabetic() && !c.is_numeric() => {
                if c.is_uppercase() {
                    'A'
                } else {
                    'a'
                }
            }
            _ => '?',
        })
        .collect()
}

/// 半角・全角の 0-9 のみ（½ や ① は数字扱いしない）
fn is_decimal_digit(c: char) -> bool {
    c.is_ascii_digit() || ('０'..='９').contains(&c)
}

/// 区切り（括弧類・`-`・`/`・空白）で分解する
///
/// 区切り自体は要素に含めない。
pub fn decompose(text: &str) -> Vec<String> {
    SEPARATOR_RE
        .split(text)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// 実行単位のパターン蓄積
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    discovered_patterns: BTreeMap<String, Vec<String>>,
}

impl PatternLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1画像分の分類結果からコード・日付を解析し、テンプレートを蓄積する
    ///
    /// 戻り値は元テキスト → 分類 の対応（この呼び出し分のみ）。
    pub fn analyze_and_learn(&mut self, elements: &ExtractedElements) -> Analysis {
        let mut analysis = Analysis::default();

        for code in &elements.potential_codes {
            let pattern = abstract_pattern(code);
            if pattern.is_empty() {
                continue;
            }
            self.discovered_patterns
                .entry(CODES_KEY.to_string())
                .or_default()
                .push(pattern.clone());
            analysis.identified_patterns.insert(
                code.clone(),
                Classification::Code(PatternRecord {
                    pattern,
                    components: decompose(code),
                }),
            );
        }

        for date_str in &elements.potential_dates {
            if let Some(parsed) = flexible_date_parse(date_str) {
                analysis.identified_patterns.insert(
                    date_str.clone(),
                    Classification::Date(DateRecord {
                        parsed,
                        original: date_str.clone(),
                    }),
                );
            }
        }

        analysis
    }

    /// 種類 → テンプレート一覧（出現順、重複あり）
    pub fn discovered_patterns(&self) -> &BTreeMap<String, Vec<String>> {
        &self.discovered_patterns
    }

    /// 全種類のテンプレートを1列に並べる
    pub fn all_patterns(&self) -> impl Iterator<Item = &str> {
        self.discovered_patterns
            .values()
            .flat_map(|list| list.iter().map(String::as_str))
    }
}
