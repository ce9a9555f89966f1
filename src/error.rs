use thiserror::Error;

/// 再試行で回復しうるエラーの目印（小文字で比較）
const TRANSIENT_SIGNATURES: &[&str] = &[
    "rate_limit",
    "rate limit",
    "429",
    "overloaded",
    "529",
    "timeout",
    "timed out",
    "temporarily unavailable",
];

#[derive(Error, Debug)]
pub enum PhotoOcrError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。--api-key、環境変数 {0}、または `photo-ocr config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey(&'static str),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("API呼び出しエラー: {message}")]
    ApiCall { status: Option<u16>, message: String },

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV出力エラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("ログ初期化エラー: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error(transparent)]
    Common(#[from] photo_ocr_common::Error),
}

impl PhotoOcrError {
    /// 状態コードなしのAPIエラー
    pub fn api(message: impl Into<String>) -> Self {
        PhotoOcrError::ApiCall {
            status: None,
            message: message.into(),
        }
    }

    /// レート制限・過負荷・タイムアウトなど、待てば通る可能性があるか
    pub fn is_transient(&self) -> bool {
        // 状態コードがあればそれだけで判断する（本文の数字は見ない）
        if let PhotoOcrError::ApiCall { status: Some(code), .. } = self {
            return *code == 429 || *code == 529 || (500..600).contains(code);
        }

        let message = self.to_string().to_lowercase();
        TRANSIENT_SIGNATURES.iter().any(|sig| message.contains(sig))
    }
}

pub type Result<T> = std::result::Result<T, PhotoOcrError>;
