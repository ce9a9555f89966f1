//! 画像1枚ごとのテキスト抽出
//!
//! 画像調整 → 面ごとの指示文でモデル呼び出し（再試行つき）→ 応答の分類。
//! 失敗はエラーとして返さず、error 付きの ExtractionResult にする。

mod preprocess;
mod retry;
mod vision_api;

pub use preprocess::{encode_image, optimize_image, prepare_image, ImageOptions};
pub use retry::RetryPolicy;
pub use vision_api::{AnthropicClient, OpenAiClient, VisionClient, VisionModel};

use crate::error::{PhotoOcrError, Result};
use photo_ocr_common::{parse_raw_response, prompt_for, ExtractionResult, Side};
use std::path::Path;

pub struct OcrEngine<M> {
    model: M,
    image_options: ImageOptions,
    retry: RetryPolicy,
}

impl<M: VisionModel> OcrEngine<M> {
    pub fn new(model: M, image_options: ImageOptions, retry: RetryPolicy) -> Self {
        Self {
            model,
            image_options,
            retry,
        }
    }

    /// 画像からテキストを抽出して分類する
    pub async fn extract_text(&self, path: &Path, side: Side) -> ExtractionResult {
        let source_file = path.display().to_string();

        match self.request_text(path, side).await {
            Ok(raw_response) => {
                let elements = parse_raw_response(&raw_response);
                log::debug!(
                    "{} ({}): {}行",
                    source_file,
                    side,
                    elements.all_text_lines.len()
                );
                ExtractionResult::success(source_file, side, raw_response, elements)
            }
            Err(e) => {
                log::error!("OCR失敗 {}: {}", source_file, e);
                ExtractionResult::failure(source_file, side, e.to_string())
            }
        }
    }

    async fn request_text(&self, path: &Path, side: Side) -> Result<String> {
        let image_base64 = prepare_image(path, &self.image_options)?;
        let prompt = prompt_for(side);

        self.retry
            .run(
                || self.model.describe(&image_base64, prompt),
                PhotoOcrError::is_transient,
            )
            .await
    }
}

/// 抽出結果が使えるか
///
/// エラーあり・要素なしは無効。テキストが空なのは警告のみ。
pub fn validate_extraction(result: &ExtractionResult) -> bool {
    if result.is_error() {
        return false;
    }
    match &result.extracted_elements {
        None => false,
        Some(elements) => {
            if elements.all_text_lines.is_empty() {
                log::warn!("テキストが見つかりません: {}", result.source_file);
            }
            true
        }
    }
}
