//! 一覧表のExcel出力

use super::csv_file::HEADERS;
use crate::error::{PhotoOcrError, Result};
use photo_ocr_common::SummaryRow;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;

pub fn write_excel(rows: &[SummaryRow], output_path: &Path) -> Result<()> {
    build_workbook(rows, output_path).map_err(|e| PhotoOcrError::ExcelGeneration(e.to_string()))
}

fn build_workbook(rows: &[SummaryRow], output_path: &Path) -> std::result::Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("photo_metadata")?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, &row.photo_id)?;
        worksheet.write_boolean(r, 1, row.has_front)?;
        worksheet.write_boolean(r, 2, row.has_back)?;
        worksheet.write_string(r, 3, &row.all_text)?;
        worksheet.write_string(r, 4, &row.codes)?;
        worksheet.write_string(r, 5, &row.dates)?;
        // 欠けている面は空セルのまま
        if let Some(front) = &row.front_file {
            worksheet.write_string(r, 6, front)?;
        }
        if let Some(back) = &row.back_file {
            worksheet.write_string(r, 7, back)?;
        }
        worksheet.write_string(r, 8, &row.timestamp)?;
    }

    workbook.save(output_path)?;
    Ok(())
}
