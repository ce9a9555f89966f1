//! 一括処理の統合テスト
//!
//! 実APIの代わりに、応答を台本どおり返すモデルで動かす。

use image::{Rgb, RgbImage};
use photo_ocr::analyzer::{validate_extraction, ImageOptions, OcrEngine, RetryPolicy, VisionModel};
use photo_ocr::error::{PhotoOcrError, Result};
use photo_ocr::export;
use photo_ocr::processor::CollectionProcessor;
use photo_ocr_common::{prompt_for, PairingStrategy, PhotoPair, Side};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

const FRONT_TEXT: &str = "Kodak (A1)\nSummer 1972";
const BACK_TEXT: &str = "KD12-345 <A> STU\n26 6'95";

/// 台本が尽きたら面ごとの固定テキストを返す
#[derive(Default)]
struct ScriptedModel {
    script: RefCell<VecDeque<std::result::Result<String, (Option<u16>, String)>>>,
    fail_back: Option<(Option<u16>, String)>,
    calls: Cell<usize>,
}

impl ScriptedModel {
    fn with_script(script: Vec<std::result::Result<&str, (Option<u16>, &str)>>) -> Self {
        Self {
            script: RefCell::new(
                script
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(|(s, m)| (s, m.to_string())))
                    .collect(),
            ),
            ..Default::default()
        }
    }
}

impl VisionModel for ScriptedModel {
    async fn describe(&self, image_base64: &str, prompt: &str) -> Result<String> {
        assert!(!image_base64.is_empty());
        self.calls.set(self.calls.get() + 1);

        if let Some(next) = self.script.borrow_mut().pop_front() {
            return next.map_err(|(status, message)| PhotoOcrError::ApiCall { status, message });
        }

        if prompt == prompt_for(Side::Back) {
            if let Some((status, message)) = &self.fail_back {
                return Err(PhotoOcrError::ApiCall {
                    status: *status,
                    message: message.clone(),
                });
            }
            Ok(BACK_TEXT.to_string())
        } else {
            Ok(FRONT_TEXT.to_string())
        }
    }
}

fn engine(model: ScriptedModel) -> OcrEngine<ScriptedModel> {
    let retry = RetryPolicy {
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        ..RetryPolicy::default()
    };
    OcrEngine::new(model, ImageOptions::default(), retry)
}

fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(16, 12, Rgb([200, 190, 180])).save(&path).unwrap();
    path
}

// =============================================
// OcrEngine
// =============================================

#[tokio::test]
async fn test_transient_errors_then_success() {
    let dir = tempdir().unwrap();
    let path = write_png(dir.path(), "photo.png");

    let model = ScriptedModel::with_script(vec![
        Err((Some(529), "overloaded_error")),
        Err((None, "Rate limit reached")),
        Ok("#12\n1985"),
    ]);
    let engine = engine(model);

    let result = engine.extract_text(&path, Side::Unknown).await;
    assert!(!result.is_error());
    assert!(validate_extraction(&result));
    assert_eq!(result.text_lines(), ["#12", "1985"]);
    assert_eq!(result.raw_response.as_deref(), Some("#12\n1985"));
}

#[tokio::test]
async fn test_fatal_error_becomes_error_result() {
    let dir = tempdir().unwrap();
    let path = write_png(dir.path(), "photo.png");

    let model = ScriptedModel::with_script(vec![Err((Some(401), "invalid x-api-key"))]);
    let engine = engine(model);

    let result = engine.extract_text(&path, Side::Front).await;
    assert!(result.is_error());
    assert!(result.extracted_elements.is_none());
    assert!(result.error.as_deref().unwrap_or_default().contains("invalid x-api-key"));
    assert_eq!(result.side, Side::Front);
    assert!(!validate_extraction(&result));
}

#[tokio::test]
async fn test_retry_ceiling_demotes_to_error() {
    let dir = tempdir().unwrap();
    let path = write_png(dir.path(), "photo.png");

    let model = ScriptedModel::with_script(vec![Err((Some(503), "unavailable")); 10]);
    let retry = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        ..RetryPolicy::default()
    };
    let engine = OcrEngine::new(model, ImageOptions::default(), retry);

    let result = engine.extract_text(&path, Side::Back).await;
    assert!(result.is_error());
}

#[tokio::test]
async fn test_unreadable_image_is_error_without_api_call() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"definitely not a jpeg").unwrap();

    let model = ScriptedModel::default();
    let engine = engine(model);

    let result = engine.extract_text(&path, Side::Front).await;
    assert!(result.is_error());
    assert!(result.extracted_elements.is_none());
    assert_eq!(result.source_file, path.display().to_string());
}

// =============================================
// CollectionProcessor
// =============================================

#[tokio::test]
async fn test_process_pair_with_failed_back() {
    let dir = tempdir().unwrap();
    let front = write_png(dir.path(), "a_front.png");
    let back = write_png(dir.path(), "a_back.png");

    let model = ScriptedModel {
        fail_back: Some((Some(400), "invalid_request_error".to_string())),
        ..Default::default()
    };
    let mut processor = CollectionProcessor::new(engine(model)).with_progress(false);

    let pair = PhotoPair {
        id: String::new(),
        front: Some(front.display().to_string()),
        back: Some(back.display().to_string()),
    };
    let record = processor.process_photo_pair(&pair).await;

    assert_eq!(record.photo_id.len(), 8);
    let back_side = record.back.as_ref().unwrap();
    assert!(back_side.raw.is_error());
    assert!(back_side.analysis.identified_patterns.is_empty());
    assert_eq!(record.combined_metadata.all_text, vec!["Kodak (A1)", "Summer 1972"]);
    assert_eq!(record.combined_metadata.codes.len(), 1);
    assert_eq!(record.combined_metadata.dates.len(), 1);
}

#[tokio::test]
async fn test_process_directory_auto_pairing() {
    let dir = tempdir().unwrap();
    write_png(dir.path(), "IMG_01_front.png");
    write_png(dir.path(), "IMG_01_back.png");
    write_png(dir.path(), "IMG_02.png");
    std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

    let mut processor = CollectionProcessor::new(engine(ScriptedModel::default())).with_progress(false);
    let rows = processor
        .process_directory(dir.path(), PairingStrategy::Auto)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].photo_id, "img01");
    assert!(rows[0].has_front && rows[0].has_back);
    assert_eq!(
        rows[0].all_text,
        "Kodak (A1) | Summer 1972 | KD12-345 <A> STU | 26 6'95"
    );
    assert_eq!(rows[1].photo_id, "IMG_02");
    assert!(rows[1].has_front && !rows[1].has_back);
    assert_eq!(rows[1].back_file, None);

    // 表2回 + 定型コードの裏（2回計上）
    let report = processor.report();
    assert_eq!(report.total_photos_processed, 2);
    assert_eq!(report.pattern_frequency[0].pattern, "Aaaaa?(AD)");
    assert_eq!(report.pattern_frequency[0].count, 2);
    assert_eq!(report.pattern_frequency[1].pattern, "AADD-DDD?<A>?AAA");
    assert_eq!(report.pattern_frequency[1].count, 2);
    assert_eq!(report.recommendations, vec!["Most common pattern: Aaaaa?(AD)".to_string()]);

    let output_dir = export::output_dir_for(dir.path());
    for name in [export::CSV_FILE, export::EXCEL_FILE, export::DETAILED_FILE, export::REPORT_FILE] {
        assert!(output_dir.join(name).exists(), "{} が無い", name);
    }

    let detailed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join(export::DETAILED_FILE)).unwrap()).unwrap();
    assert_eq!(detailed.as_array().unwrap().len(), 2);
    assert_eq!(detailed[0]["front"]["raw"]["side"], "front");
    assert_eq!(detailed[0]["back"]["raw"]["side"], "back");
    assert!(detailed[1]["back"].is_null());

    let report_json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join(export::REPORT_FILE)).unwrap()).unwrap();
    assert_eq!(report_json["total_photos_processed"], 2);
    assert_eq!(report_json["discovered_patterns"]["codes"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_process_directory_sequential() {
    let dir = tempdir().unwrap();
    for name in ["1.png", "2.png", "3.png"] {
        write_png(dir.path(), name);
    }

    let mut processor = CollectionProcessor::new(engine(ScriptedModel::default())).with_progress(false);
    let rows = processor
        .process_directory(dir.path(), PairingStrategy::Sequential)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].photo_id, "photo_0000");
    assert!(rows[0].has_back);
    assert!(!rows[1].has_back);
    assert_eq!(processor.results().len(), 2);
}

#[tokio::test]
async fn test_process_directory_without_images() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("readme.txt"), "no photos").unwrap();

    let mut processor = CollectionProcessor::new(engine(ScriptedModel::default())).with_progress(false);
    let result = processor.process_directory(dir.path(), PairingStrategy::Auto).await;

    assert!(matches!(result, Err(PhotoOcrError::NoImagesFound(_))));
    assert!(!export::output_dir_for(dir.path()).exists());
}
