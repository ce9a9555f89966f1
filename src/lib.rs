//! photo-ocr
//!
//! 家族写真の表裏からテキストを抽出し、コードや日付の型を学習する。
//! 分類・集計の本体は `photo_ocr_common`、こちらはAPI呼び出しと入出力。

pub mod ai_provider;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod processor;
pub mod scanner;
