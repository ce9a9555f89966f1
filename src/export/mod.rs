pub mod csv_file;
pub mod excel;
pub mod json;

use crate::error::Result;
use photo_ocr_common::{CollectionReport, PhotoRecord, SummaryRow};
use std::path::{Path, PathBuf};

pub const OUTPUT_DIR: &str = "ocr_results";
pub const CSV_FILE: &str = "photo_metadata.csv";
pub const EXCEL_FILE: &str = "photo_metadata.xlsx";
pub const DETAILED_FILE: &str = "detailed_results.json";
pub const REPORT_FILE: &str = "pattern_analysis.json";

pub fn output_dir_for(directory: &Path) -> PathBuf {
    directory.join(OUTPUT_DIR)
}

/// `<directory>/ocr_results/` に一式を書き出す
///
/// Excel だけは失敗しても警告にとどめる。
pub fn save_results(
    directory: &Path,
    rows: &[SummaryRow],
    records: &[PhotoRecord],
    report: &CollectionReport,
) -> Result<PathBuf> {
    let output_dir = output_dir_for(directory);
    std::fs::create_dir_all(&output_dir)?;

    csv_file::write_csv(rows, &output_dir.join(CSV_FILE))?;

    if let Err(e) = excel::write_excel(rows, &output_dir.join(EXCEL_FILE)) {
        log::warn!("Excel出力に失敗しました: {}", e);
    }

    json::write_json(records, &output_dir.join(DETAILED_FILE))?;

    let report_path = output_dir.join(REPORT_FILE);
    json::write_json(report, &report_path)?;
    log::info!("パターンレポート: {}", report_path.display());

    Ok(output_dir)
}
