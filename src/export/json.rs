//! 詳細結果とパターンレポートのJSON出力

use crate::error::Result;
use serde::Serialize;
use std::path::Path;

pub fn write_json<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(output_path, json)?;
    Ok(())
}
