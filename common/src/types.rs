//! 抽出・解析結果の型定義
//!
//! CLIとテストで共有される型:
//! - ExtractedElements: 1画像分のモデル応答を分類した結果
//! - Analysis / Classification: パターン学習の出力
//! - ExtractionResult: 1画像分の抽出結果（失敗時はエラー付き）
//! - PhotoPair / PhotoRecord: 表裏ペアと統合済みレコード

use crate::error::Error;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 写真の面（プロンプト選択に使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
    #[default]
    Unknown,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
            Side::Unknown => "unknown",
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "front" | "f" => Ok(Side::Front),
            "back" | "b" => Ok(Side::Back),
            "unknown" | "u" => Ok(Side::Unknown),
            _ => Err(Error::Parse(format!(
                "Unknown side: {}. Use front, back, or unknown",
                s
            ))),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 表裏ペアの組み方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingStrategy {
    /// ファイル名の front/back から推定
    #[default]
    Auto,
    /// 2枚ずつ（表, 裏）の順で組む
    Sequential,
    /// すべて表のみ
    Single,
}

impl FromStr for PairingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(PairingStrategy::Auto),
            "sequential" | "seq" => Ok(PairingStrategy::Sequential),
            "single" => Ok(PairingStrategy::Single),
            _ => Err(Error::Parse(format!(
                "Unknown pairing: {}. Use auto, sequential, or single",
                s
            ))),
        }
    }
}

impl fmt::Display for PairingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairingStrategy::Auto => write!(f, "auto"),
            PairingStrategy::Sequential => write!(f, "sequential"),
            PairingStrategy::Single => write!(f, "single"),
        }
    }
}

/// 分類の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Code,
    Date,
}

/// 定型コード書式に一致した行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialPattern {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub value: String,
}

/// モデル応答1件を分類した結果
///
/// `potential_*` の各要素は必ず `all_text_lines` にも含まれる。
/// 分類は排他的ではなく、同じ行が複数のバケットに入ることがある。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedElements {
    pub all_text_lines: Vec<String>,
    /// 位置ラベル（小文字）→ テキスト
    pub location_tagged: BTreeMap<String, Vec<String>>,
    pub potential_codes: Vec<String>,
    pub potential_dates: Vec<String>,
    pub potential_names: Vec<String>,
    pub numeric_sequences: Vec<String>,
    pub special_patterns: Vec<SpecialPattern>,
}

impl ExtractedElements {
    /// どのバケットにも何も入っていない
    pub fn is_empty(&self) -> bool {
        self.all_text_lines.is_empty()
            && self.location_tagged.is_empty()
            && self.potential_codes.is_empty()
            && self.potential_dates.is_empty()
            && self.potential_names.is_empty()
            && self.numeric_sequences.is_empty()
            && self.special_patterns.is_empty()
    }
}

/// コードの抽象パターンと分解結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRecord {
    /// 文字種テンプレート（例: `AADD-DD`）
    pub pattern: String,
    pub components: Vec<String>,
}

/// 解析済みの日付
///
/// テキストから月・日が読み取れない場合は `None`。
/// `iso` は欠けた部分を `01` で埋めた `YYYY-MM-DD`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDate {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub iso: String,
}

impl ParsedDate {
    pub fn new(year: i32, month: Option<u32>, day: Option<u32>) -> Self {
        let iso = format!(
            "{:04}-{:02}-{:02}",
            year,
            month.unwrap_or(1),
            day.unwrap_or(1)
        );
        Self { year, month, day, iso }
    }

    pub fn year_only(year: i32) -> Self {
        Self::new(year, None, None)
    }
}

/// 日付として解釈できた行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRecord {
    pub parsed: ParsedDate,
    pub original: String,
}

/// パターン学習での1行分の分類
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Classification {
    Code(PatternRecord),
    Date(DateRecord),
}

impl Classification {
    pub fn kind(&self) -> PatternKind {
        match self {
            Classification::Code(_) => PatternKind::Code,
            Classification::Date(_) => PatternKind::Date,
        }
    }
}

/// 元テキスト → 分類 の挿入順マップ
///
/// 同じキーを再挿入すると、元の位置のまま値だけ置き換わる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifiedPatterns {
    entries: Vec<(String, Classification)>,
}

impl IdentifiedPatterns {
    pub fn insert(&mut self, text: String, classification: Classification) {
        match self.entries.iter_mut().find(|(k, _)| *k == text) {
            Some((_, existing)) => *existing = classification,
            None => self.entries.push((text, classification)),
        }
    }

    pub fn get(&self, text: &str) -> Option<&Classification> {
        self.entries
            .iter()
            .find(|(k, _)| k == text)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Classification)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &Classification> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for IdentifiedPatterns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// 1画像分のパターン学習結果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub identified_patterns: IdentifiedPatterns,
}

/// 1画像分の抽出結果
///
/// 失敗時は `error` が入り、`extracted_elements` は `None`。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub source_file: String,
    pub side: Side,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_elements: Option<ExtractedElements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn success(source_file: String, side: Side, raw_response: String, elements: ExtractedElements) -> Self {
        Self {
            source_file,
            side,
            raw_response: Some(raw_response),
            timestamp: now_timestamp(),
            extracted_elements: Some(elements),
            error: None,
        }
    }

    pub fn failure(source_file: String, side: Side, error: String) -> Self {
        Self {
            source_file,
            side,
            raw_response: None,
            timestamp: now_timestamp(),
            extracted_elements: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// 抽出テキスト行（失敗時は空）
    pub fn text_lines(&self) -> &[String] {
        self.extracted_elements
            .as_ref()
            .map(|e| e.all_text_lines.as_slice())
            .unwrap_or(&[])
    }
}

/// 処理時刻（ローカル時刻、RFC 3339）
pub fn now_timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

/// 片面の抽出結果と解析結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideResult {
    pub raw: ExtractionResult,
    pub analysis: Analysis,
}

/// 表裏ペア（少なくとも一方は必ずある）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoPair {
    pub id: String,
    pub front: Option<String>,
    pub back: Option<String>,
}

/// 表裏を統合したメタデータ
///
/// `names` / `locations` は枠のみで、現状は常に空。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CombinedMetadata {
    pub all_text: Vec<String>,
    pub codes: Vec<PatternRecord>,
    pub dates: Vec<DateRecord>,
    pub names: Vec<String>,
    pub locations: Vec<String>,
}

/// 1写真分の最終レコード
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoRecord {
    pub photo_id: String,
    pub front: Option<SideResult>,
    pub back: Option<SideResult>,
    pub combined_metadata: CombinedMetadata,
}

/// コレクション全体のパターンレポート
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionReport {
    pub total_photos_processed: usize,
    pub discovered_patterns: BTreeMap<String, Vec<String>>,
    /// 出現回数の多い順（最大20件）。JSONでは `{テンプレート: 回数}` の順序付きオブジェクト
    #[serde(serialize_with = "serialize_frequency_map")]
    pub pattern_frequency: Vec<PatternFrequency>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternFrequency {
    pub pattern: String,
    pub count: usize,
}

fn serialize_frequency_map<S: Serializer>(entries: &[PatternFrequency], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for entry in entries {
        map.serialize_entry(&entry.pattern, &entry.count)?;
    }
    map.end()
}
