//! コレクション集計
//!
//! 実行全体の PhotoRecord から一覧表の行と、パターン頻度レポートを作る。

use crate::patterns::PatternLibrary;
use crate::types::{now_timestamp, CollectionReport, PatternFrequency, PhotoRecord};
use serde::Serialize;
use std::collections::HashMap;

/// パターン頻度の上位件数
pub const TOP_PATTERNS: usize = 20;

/// 一覧表の1行（1写真）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub photo_id: String,
    pub has_front: bool,
    pub has_back: bool,
    /// 全テキストを ` | ` で連結
    pub all_text: String,
    /// コード一覧（JSON配列）
    pub codes: String,
    /// 日付一覧（JSON配列）
    pub dates: String,
    pub front_file: Option<String>,
    pub back_file: Option<String>,
    pub timestamp: String,
}

impl SummaryRow {
    pub fn from_record(record: &PhotoRecord) -> Self {
        let metadata = &record.combined_metadata;
        Self {
            photo_id: record.photo_id.clone(),
            has_front: record.front.is_some(),
            has_back: record.back.is_some(),
            all_text: metadata.all_text.join(" | "),
            codes: serde_json::to_string(&metadata.codes).unwrap_or_else(|_| "[]".to_string()),
            dates: serde_json::to_string(&metadata.dates).unwrap_or_else(|_| "[]".to_string()),
            front_file: record.front.as_ref().map(|s| s.raw.source_file.clone()),
            back_file: record.back.as_ref().map(|s| s.raw.source_file.clone()),
            timestamp: now_timestamp(),
        }
    }
}

/// 全写真分の行を作る
pub fn summary_rows(records: &[PhotoRecord]) -> Vec<SummaryRow> {
    records.iter().map(SummaryRow::from_record).collect()
}

/// 出現回数の多い順に並べる（同数は先に出た方が上）
pub fn pattern_frequency<'a>(patterns: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<PatternFrequency> {
    let mut counts: Vec<PatternFrequency> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for pattern in patterns {
        match index.get(pattern) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(pattern, counts.len());
                counts.push(PatternFrequency {
                    pattern: pattern.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// パターンレポートを作る
pub fn build_report(total_photos_processed: usize, library: &PatternLibrary) -> CollectionReport {
    let pattern_frequency = pattern_frequency(library.all_patterns(), TOP_PATTERNS);

    let recommendations = pattern_frequency
        .first()
        .map(|top| vec![format!("Most common pattern: {}", top.pattern)])
        .unwrap_or_default();

    CollectionReport {
        total_photos_processed,
        discovered_patterns: library.discovered_patterns().clone(),
        pattern_frequency,
        recommendations,
    }
}
