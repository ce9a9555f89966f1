//! ログ初期化
//!
//! 端末には常に出し、`--log-file` 指定時はファイルにも書く。

use crate::error::Result;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// `--log-file` を値なしで指定したときのファイル名
pub const DEFAULT_LOG_FILE: &str = "photo_ocr.log";

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = level_for(verbose);

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(path)?));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}
