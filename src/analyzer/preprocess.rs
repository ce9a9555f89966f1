//! 送信前の画像調整
//!
//! RGB化 → 最大サイズに収める → コントラスト強調 → JPEG再エンコード → base64

use crate::config::Config;
use crate::error::{PhotoOcrError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageOptions {
    pub max_size: u32,
    pub jpeg_quality: u8,
    pub contrast: f32,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            max_size: 2048,
            jpeg_quality: 95,
            contrast: 10.0,
        }
    }
}

impl From<&Config> for ImageOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_size: config.max_image_size,
            jpeg_quality: config.jpeg_quality,
            contrast: config.contrast,
        }
    }
}

/// 画像を読み込んで調整済みJPEGのバイト列にする
pub fn optimize_image(path: &Path, options: &ImageOptions) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(PhotoOcrError::FileNotFound(path.display().to_string()));
    }

    let img = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| PhotoOcrError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let mut rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    // 縦横比を保って収める
    if rgb.width() > options.max_size || rgb.height() > options.max_size {
        rgb = rgb.thumbnail(options.max_size, options.max_size);
    }

    if options.contrast != 0.0 {
        rgb = rgb.adjust_contrast(options.contrast);
    }

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, options.jpeg_quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| PhotoOcrError::ImageLoad(format!("JPEGエンコード失敗: {}", e)))?;

    Ok(buffer.into_inner())
}

pub fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// 読み込みから base64 化まで
pub fn prepare_image(path: &Path, options: &ImageOptions) -> Result<String> {
    let bytes = optimize_image(path, options)?;
    log::debug!("{}: {} bytes に変換", path.display(), bytes.len());
    Ok(encode_image(&bytes))
}
