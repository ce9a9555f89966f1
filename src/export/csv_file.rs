//! 一覧表のCSV出力

use crate::error::Result;
use photo_ocr_common::SummaryRow;
use std::path::Path;

/// 列名（行が無くても必ず書く）
pub const HEADERS: [&str; 9] = [
    "photo_id",
    "has_front",
    "has_back",
    "all_text",
    "codes",
    "dates",
    "front_file",
    "back_file",
    "timestamp",
];

pub fn write_csv(rows: &[SummaryRow], output_path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output_path)?;

    writer.write_record(HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
