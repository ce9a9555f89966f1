use crate::ai_provider::AiProvider;
use crate::analyzer::RetryPolicy;
use crate::error::{PhotoOcrError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub provider: AiProvider,
    /// 未設定ならプロバイダの既定モデル
    pub model: Option<String>,
    pub max_image_size: u32,
    pub jpeg_quality: u8,
    /// `image::imageops::contrast` に渡す値（10.0 でおよそ1.2倍）
    pub contrast: f32,
    pub max_retries: u32,
    pub backoff_base_secs: f64,
    pub backoff_max_secs: f64,
    pub timeout_seconds: u64,
    pub max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: AiProvider::Anthropic,
            model: None,
            max_image_size: 2048,
            jpeg_quality: 95,
            contrast: 10.0,
            max_retries: 6,
            backoff_base_secs: 0.8,
            backoff_max_secs: 30.0,
            timeout_seconds: 120,
            max_tokens: 2048,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PhotoOcrError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("photo-ocr").join("config.json"))
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    /// 引数で指定されたプロバイダ・モデルで上書きする
    pub fn with_overrides(mut self, provider: Option<AiProvider>, model: Option<String>) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }
        if model.is_some() {
            self.model = model;
        }
        self
    }

    /// 使用するモデル名
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// APIキーを決める（引数 → 環境変数 → 設定ファイル）
    pub fn resolve_api_key(&self, cli_key: Option<&str>) -> Result<String> {
        let env_key = std::env::var(self.provider.env_var()).ok();
        pick_api_key(cli_key, env_key.as_deref(), self.api_key.as_deref())
            .ok_or(PhotoOcrError::MissingApiKey(self.provider.env_var()))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries.max(1),
            base_delay: Duration::from_secs_f64(self.backoff_base_secs.max(0.0)),
            max_delay: Duration::from_secs_f64(self.backoff_max_secs.max(0.0)),
            ..RetryPolicy::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// 空文字は未設定として扱う
fn pick_api_key(cli: Option<&str>, env: Option<&str>, file: Option<&str>) -> Option<String> {
    [cli, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
}
