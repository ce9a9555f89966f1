//! 画像対応モデルのAPI呼び出し
//!
//! Anthropic Messages API と OpenAI Chat Completions API。
//! どちらも base64 JPEG + 指示文を送り、返ってきたテキストだけを取り出す。

use crate::ai_provider::AiProvider;
use crate::config::Config;
use crate::error::{PhotoOcrError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const TEMPERATURE: f32 = 0.1;

/// 画像と指示文からテキストを返すモデル
#[allow(async_fn_in_trait)]
pub trait VisionModel {
    async fn describe(&self, image_base64: &str, prompt: &str) -> Result<String>;
}

// =============================================
// Anthropic
// =============================================

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: Vec<AnthropicBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum AnthropicBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'static str,
    data: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, max_tokens: u32, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http(timeout)?,
            api_key,
            model,
            max_tokens,
        })
    }
}

impl VisionModel for AnthropicClient {
    async fn describe(&self, image_base64: &str, prompt: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
            messages: vec![AnthropicMessage {
                role: "user",
                content: vec![
                    AnthropicBlock::Image {
                        source: ImageSource {
                            kind: "base64",
                            media_type: "image/jpeg",
                            data: image_base64,
                        },
                    },
                    AnthropicBlock::Text { text: prompt },
                ],
            }],
        };

        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let body: AnthropicResponse = read_json(response).await?;
        body.content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| PhotoOcrError::ApiParse("テキストブロックがありません".into()))
    }
}

// =============================================
// OpenAI
// =============================================

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<OpenAiMessage>,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: Vec<OpenAiPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAiPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, max_tokens: u32, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http(timeout)?,
            api_key,
            model,
            max_tokens,
        })
    }
}

impl VisionModel for OpenAiClient {
    async fn describe(&self, image_base64: &str, prompt: &str) -> Result<String> {
        let request = OpenAiRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
            messages: vec![OpenAiMessage {
                role: "user",
                content: vec![
                    OpenAiPart::Text { text: prompt.to_string() },
                    OpenAiPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{}", image_base64),
                        },
                    },
                ],
            }],
        };

        let response = self
            .http
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let body: OpenAiResponse = read_json(response).await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PhotoOcrError::ApiParse("choices が空です".into()))
    }
}

// =============================================
// プロバイダ切り替え
// =============================================

pub enum VisionClient {
    Anthropic(AnthropicClient),
    OpenAi(OpenAiClient),
}

impl VisionClient {
    /// 設定とAPIキーからクライアントを作る
    pub fn from_config(config: &Config, api_key: String) -> Result<Self> {
        let model = config.model_name().to_string();
        let client = match config.provider {
            AiProvider::Anthropic => VisionClient::Anthropic(AnthropicClient::new(
                api_key,
                model,
                config.max_tokens,
                config.timeout(),
            )?),
            AiProvider::OpenAi => VisionClient::OpenAi(OpenAiClient::new(
                api_key,
                model,
                config.max_tokens,
                config.timeout(),
            )?),
        };
        Ok(client)
    }
}

impl VisionModel for VisionClient {
    async fn describe(&self, image_base64: &str, prompt: &str) -> Result<String> {
        match self {
            VisionClient::Anthropic(client) => client.describe(image_base64, prompt).await,
            VisionClient::OpenAi(client) => client.describe(image_base64, prompt).await,
        }
    }
}

fn build_http(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PhotoOcrError::Config(format!("HTTPクライアント初期化失敗: {}", e)))
}

fn transport_error(e: reqwest::Error) -> PhotoOcrError {
    let message = if e.is_timeout() {
        format!("request timeout: {}", e)
    } else {
        e.to_string()
    };
    PhotoOcrError::ApiCall {
        status: e.status().map(|s| s.as_u16()),
        message,
    }
}

/// 成功ならJSONを読み、失敗なら状態コードと本文をエラーにする
async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PhotoOcrError::ApiCall {
            status: Some(status.as_u16()),
            message: format!("HTTP {}: {}", status.as_u16(), body),
        });
    }

    let text = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&text).map_err(|e| PhotoOcrError::ApiParse(format!("{}: {}", e, text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_anthropic_request_shape() {
        let request = AnthropicRequest {
            model: "claude-sonnet-4-20250514",
            max_tokens: 2048,
            temperature: TEMPERATURE,
            messages: vec![AnthropicMessage {
                role: "user",
                content: vec![
                    AnthropicBlock::Image {
                        source: ImageSource {
                            kind: "base64",
                            media_type: "image/jpeg",
                            data: "AAAA",
                        },
                    },
                    AnthropicBlock::Text { text: "read" },
                ],
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        let content = &value["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["type"], "base64");
        assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
        assert_eq!(content[1], json!({"type": "text", "text": "read"}));
        assert_eq!(value["max_tokens"], 2048);
    }

    #[test]
    fn test_openai_request_shape() {
        let part = OpenAiPart::ImageUrl {
            image_url: ImageUrl {
                url: "data:image/jpeg;base64,AAAA".into(),
            },
        };
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["type"], "image_url");
        assert_eq!(value["image_url"]["url"], "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_parse_anthropic_response() {
        let body = r#"{"content":[{"type":"text","text":"Kodak\n1972"}],"stop_reason":"end_turn"}"#;
        let response: AnthropicResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.content[0].text.as_deref(), Some("Kodak\n1972"));
    }

    #[test]
    fn test_parse_openai_response() {
        let body = r##"{"choices":[{"index":0,"message":{"role":"assistant","content":"#12"}}]}"##;
        let response: OpenAiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("#12"));
    }
}
