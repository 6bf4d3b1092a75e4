//! Field extraction: normalized recognition text to an order fragment.
//!
//! The language model is an opaque, fallible, latency-bearing collaborator
//! behind the `FieldExtractor` trait so the pipeline can be tested with a
//! deterministic stub. The shipped implementation calls any
//! OpenAI-compatible `/chat/completions` endpoint.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::ServerConfig;
use crate::core::order::ExtractionFragment;

const EXTRACTION_SYSTEM_PROMPT: &str = "\
你是一个订单信息提取助手。从用户的语音识别文本中快速提取关键订单信息。\n\
只提取以下字段：客户姓名、产品名称和数量、司机姓名。\n\
以JSON格式返回，不要输出任何其他内容：\n\
{\n\
  \"customer\": {\"name\": \"客户姓名\"},\n\
  \"product\": {\"name\": \"产品名称\", \"quantity\": 数量},\n\
  \"driver\": {\"name\": \"司机姓名\"}\n\
}\n\
未提供的信息对应字段返回null。数量必须是数字类型。\n\
即使输入不完整也要返回完整的JSON结构，不要过度分析。\n\
示例输入：\"客户张三要买5个苹果\"\n\
示例输出：{\"customer\":{\"name\":\"张三\"},\"product\":{\"name\":\"苹果\",\"quantity\":5},\"driver\":{\"name\":null}}";

/// Errors from the extraction collaborator. The pipeline absorbs these and
/// degrades to an empty fragment; they never reach the transport layer.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("extraction request failed: {0}")]
    Request(String),

    #[error("extraction response unusable: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ExtractError {
    fn from(e: reqwest::Error) -> Self {
        ExtractError::Request(e.to_string())
    }
}

/// Opaque text-to-fields capability.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<ExtractionFragment, ExtractError>;
}

/// Calls an OpenAI-compatible chat-completions endpoint and parses the
/// model's JSON answer into a fragment.
pub struct OpenAiExtractor {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiExtractor {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
        }
    }
}

/// Models wrap JSON in a fenced code block often enough that both bare and
/// fenced answers must parse.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Fence tags vary ("json", "JSON", none at all); drop whatever word
    // follows the opening fence.
    let inner = inner.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_fragment(content: &str) -> Result<ExtractionFragment, ExtractError> {
    serde_json::from_str(strip_code_fence(content)).map_err(|e| ExtractError::Parse(e.to_string()))
}

#[async_trait]
impl FieldExtractor for OpenAiExtractor {
    async fn extract(&self, text: &str) -> Result<ExtractionFragment, ExtractError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": EXTRACTION_SYSTEM_PROMPT },
                { "role": "user", "content": text }
            ],
            "stream": false,
            "temperature": 0.0,
        });

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?.error_for_status()?;
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ExtractError::Parse(e.to_string()))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ExtractError::Parse("no message content in response".to_string()))?;

        debug!("extractor raw answer: {}", content);
        parse_fragment(content)
    }
}
