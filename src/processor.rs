//! 写真コレクションの一括処理
//!
//! ペアを順番に1組ずつ処理する。パターン蓄積はこの構造体が持ち、
//! 各面の解析に `&mut` で渡す。

use crate::analyzer::{OcrEngine, VisionModel};
use crate::error::{PhotoOcrError, Result};
use crate::export;
use crate::scanner;
use indicatif::{ProgressBar, ProgressStyle};
use photo_ocr_common::{
    build_report, create_pairs, merge_metadata, summary_rows, CollectionReport, ExtractedElements,
    PairingStrategy, PatternLibrary, PhotoPair, PhotoRecord, Side, SideResult, SummaryRow,
};
use sha2::{Digest, Sha256};
use std::path::Path;

pub struct CollectionProcessor<M> {
    engine: OcrEngine<M>,
    library: PatternLibrary,
    results: Vec<PhotoRecord>,
    show_progress: bool,
}

impl<M: VisionModel> CollectionProcessor<M> {
    pub fn new(engine: OcrEngine<M>) -> Self {
        Self {
            engine,
            library: PatternLibrary::new(),
            results: Vec::new(),
            show_progress: true,
        }
    }

    /// 進捗バーを出すか（テストでは切る）
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// 1組分を処理する（表 → 裏）
    pub async fn process_photo_pair(&mut self, pair: &PhotoPair) -> PhotoRecord {
        let photo_id = if pair.id.is_empty() {
            derive_photo_id(pair.front.as_deref(), pair.back.as_deref())
        } else {
            pair.id.clone()
        };

        let front = match &pair.front {
            Some(path) => Some(self.process_side(path, Side::Front).await),
            None => None,
        };
        let back = match &pair.back {
            Some(path) => Some(self.process_side(path, Side::Back).await),
            None => None,
        };

        let combined_metadata = merge_metadata(front.as_ref(), back.as_ref());

        PhotoRecord {
            photo_id,
            front,
            back,
            combined_metadata,
        }
    }

    async fn process_side(&mut self, path: &str, side: Side) -> SideResult {
        log::info!("処理中 ({}): {}", side, path);
        let raw = self.engine.extract_text(Path::new(path), side).await;

        let empty = ExtractedElements::default();
        let elements = raw.extracted_elements.as_ref().unwrap_or(&empty);
        let analysis = self.library.analyze_and_learn(elements);

        SideResult { raw, analysis }
    }

    /// ペア一覧を順に処理し、結果を蓄積する
    pub async fn process_pairs(&mut self, pairs: &[PhotoPair]) -> Vec<PhotoRecord> {
        let bar = if self.show_progress {
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            ProgressBar::new(pairs.len() as u64).with_style(style)
        } else {
            ProgressBar::hidden()
        };
        bar.set_message("Processing photos");

        let mut records = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let record = self.process_photo_pair(pair).await;
            self.results.push(record.clone());
            records.push(record);
            bar.inc(1);
        }
        bar.finish_and_clear();

        records
    }

    /// フォルダ内の写真を処理し、`ocr_results/` に出力する
    pub async fn process_directory(&mut self, directory: &Path, strategy: PairingStrategy) -> Result<Vec<SummaryRow>> {
        let files: Vec<String> = scanner::scan_folder(directory)?
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();

        if files.is_empty() {
            return Err(PhotoOcrError::NoImagesFound(directory.display().to_string()));
        }

        let pairs = create_pairs(&files, strategy);
        log::info!("{}枚 → {}組 ({})", files.len(), pairs.len(), strategy);

        let records = self.process_pairs(&pairs).await;
        let rows = summary_rows(&records);
        let report = self.report();

        let output_dir = export::save_results(directory, &rows, &self.results, &report)?;
        log::info!("結果を保存しました: {}", output_dir.display());

        Ok(rows)
    }

    pub fn report(&self) -> CollectionReport {
        build_report(self.results.len(), &self.library)
    }

    pub fn results(&self) -> &[PhotoRecord] {
        &self.results
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }
}

/// ペアにIDが無いとき、パスから8桁の16進IDを作る
pub fn derive_photo_id(front: Option<&str>, back: Option<&str>) -> String {
    let key = format!("{}{}", front.unwrap_or(""), back.unwrap_or(""));
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..4])
}
