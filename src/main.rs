use clap::Parser;
use photo_ocr::{analyzer, cli, config, error, logging, processor};
use analyzer::{ImageOptions, OcrEngine, VisionClient};
use cli::{Cli, Commands};
use config::Config;
use error::{PhotoOcrError, Result};
use processor::CollectionProcessor;

/// ディレクトリモードで表示する行数
const PREVIEW_ROWS: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    let mut config = Config::load()?;
    // 引数の指定は実行時だけ反映し、設定ファイルには保存しない
    let runtime = config.clone().with_overrides(cli.provider, cli.model.clone());

    match cli.command {
        Commands::Image { path, side } => {
            println!("📸 photo-ocr - 画像1枚\n");

            if !path.is_file() {
                return Err(PhotoOcrError::FileNotFound(path.display().to_string()));
            }
            let engine = build_engine(&runtime, cli.api_key.as_deref())?;

            println!("[1/1] テキスト抽出中... ({}, {})", runtime.provider, runtime.model_name());
            let result = engine.extract_text(&path, side).await;

            if analyzer::validate_extraction(&result) {
                println!("✔ 抽出したテキスト:");
                for line in result.text_lines() {
                    println!("  - {}", line);
                }
            } else {
                println!("✘ 抽出に失敗しました:");
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }

        Commands::Dir { folder, pairing } => {
            println!("🗂  photo-ocr - フォルダ一括処理\n");

            if !folder.is_dir() {
                return Err(PhotoOcrError::FolderNotFound(folder.display().to_string()));
            }
            let engine = build_engine(&runtime, cli.api_key.as_deref())?;

            println!("[1/2] 写真を処理中... (ペア: {})", pairing);
            let mut processor = CollectionProcessor::new(engine);
            let rows = processor.process_directory(&folder, pairing).await?;
            println!("✔ {}件の写真を処理\n", rows.len());

            println!("[2/2] 結果:");
            for row in rows.iter().take(PREVIEW_ROWS) {
                println!("  {} 表:{} 裏:{} | {}", row.photo_id, row.has_front, row.has_back, row.all_text);
            }
            if rows.len() > PREVIEW_ROWS {
                println!("  ... 他 {}件", rows.len() - PREVIEW_ROWS);
            }

            let report = processor.report();
            if let Some(top) = report.recommendations.first() {
                println!("\n  {}", top);
            }

            println!("\n✅ 完了: {}", photo_ocr::export::output_dir_for(&folder).display());
        }

        Commands::Config { set_api_key, show } => {
            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  プロバイダ: {}", config.provider);
                println!("  モデル: {}", config.model_name());
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  再試行回数: {}", config.max_retries);
                println!("  APIキー: {}", if config.api_key.is_some() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

/// APIキーを確認してから OCR エンジンを組み立てる
fn build_engine(config: &Config, cli_key: Option<&str>) -> Result<OcrEngine<VisionClient>> {
    let api_key = config.resolve_api_key(cli_key)?;
    let client = VisionClient::from_config(config, api_key)?;
    Ok(OcrEngine::new(client, ImageOptions::from(config), config.retry_policy()))
}
