use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use crate::logging::DEFAULT_LOG_FILE;
use photo_ocr_common::{PairingStrategy, Side};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-ocr")]
#[command(about = "家族写真の表裏テキスト抽出・パターン学習ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// AIプロバイダ (anthropic/openai、省略時は設定ファイル)
    #[arg(long, global = true)]
    pub provider: Option<AiProvider>,

    /// モデル名（省略時はプロバイダの既定）
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// APIキー（環境変数・設定ファイルより優先）
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// ログをファイルにも出力
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = DEFAULT_LOG_FILE)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像1枚からテキストを抽出
    Image {
        /// 画像ファイルのパス
        #[arg(required = true)]
        path: PathBuf,

        /// 写真の面 (front/back/unknown)
        #[arg(short, long, default_value = "unknown")]
        side: Side,
    },

    /// フォルダ内の写真をまとめて処理
    Dir {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// ペアの作り方 (auto/sequential/single)
        #[arg(short, long, default_value = "auto")]
        pairing: PairingStrategy,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
