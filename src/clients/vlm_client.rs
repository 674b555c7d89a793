//! 视觉 VLM 客户端
//!
//! 走 Ollama 原生的 /api/generate 格式：请求体携带 base64 图片列表，
//! 响应体可能把生成文本放在 response / text / content / output
//! 任意一个字段里，按顺序探测

use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::clients::VisionModel;
use crate::config::Config;
use crate::error::{AppError, LlmError, Result};

/// 视觉模型客户端
pub struct VlmClient {
    http: reqwest::Client,
    base_url: String,
    generate_endpoint: String,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: usize,
    retry_delay_secs: u64,
}

impl VlmClient {
    /// 创建新的视觉模型客户端
    ///
    /// 超时直接配置在 HTTP 客户端上
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.vlm_timeout_secs))
            .build()
            .map_err(|e| AppError::Other(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.vlm_base_url.clone(),
            generate_endpoint: config.vlm_generate_endpoint.clone(),
            model_name: config.vlm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            // VLM 更慢，重试间隔比文本端多 1 秒
            max_retries: config.max_transport_retries,
            retry_delay_secs: config.retry_delay_secs + 1,
        })
    }

    /// 单次 API 调用，不含重试
    async fn call_once(&self, prompt: &str, images_base64: &[String]) -> Result<String> {
        let url = format!("{}{}", self.base_url, self.generate_endpoint);

        debug!("调用 VLM API，模型: {}", self.model_name);
        debug!(
            "提示词长度: {} 字符，图片数量: {}",
            prompt.chars().count(),
            images_base64.len()
        );

        let payload = json!({
            "model": self.model_name,
            "prompt": prompt,
            "images": images_base64,
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_tokens,
            }
        });

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                endpoint: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::BadStatus {
                endpoint: url,
                status: status.as_u16(),
            }
            .into());
        }

        let data: Value = response.json().await.map_err(|e| LlmError::RequestFailed {
            endpoint: url.clone(),
            source: e,
        })?;

        debug!("VLM API 调用成功");

        extract_generated_text(&data, &self.model_name)
    }
}

/// 从响应体中提取生成文本
///
/// 不同的 VLM 服务把文本放在不同字段里，按顺序探测
fn extract_generated_text(data: &Value, model: &str) -> Result<String> {
    for key in ["response", "text", "content", "output"] {
        if let Some(text) = data.get(key).and_then(|v| v.as_str()) {
            let text = text.trim();
            if text.is_empty() {
                return Err(LlmError::EmptyContent {
                    model: model.to_string(),
                }
                .into());
            }
            return Ok(text.to_string());
        }
    }

    let keys = data
        .as_object()
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();
    Err(LlmError::UnexpectedFormat { keys }.into())
}

impl VisionModel for VlmClient {
    /// 带固定间隔重试的多模态生成
    async fn generate_multimodal(&self, prompt: &str, images_base64: &[String]) -> Result<String> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_retries {
            match self.call_once(prompt, images_base64).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(
                        "VLM 调用失败 (尝试 {}/{}): {}",
                        attempt, self.max_retries, e
                    );
                    last_error = e.to_string();
                    if attempt < self.max_retries {
                        debug!("{} 秒后重试...", self.retry_delay_secs);
                        sleep(Duration::from_secs(self.retry_delay_secs)).await;
                    }
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.max_retries,
            last_error,
        }
        .into())
    }
}

/// 桩 VLM 客户端
///
/// 返回一道固定格式正确的图表题，供没有真实 VLM 时跑通整条流水线
pub struct MockVlmClient;

impl VisionModel for MockVlmClient {
    async fn generate_multimodal(&self, prompt: &str, images_base64: &[String]) -> Result<String> {
        debug!(
            "MockVLM: 提示词 {} 字符，图片 {} 张",
            prompt.chars().count(),
            images_base64.len()
        );

        Ok(r#"[
  {
    "question_text_en": "Based on the diagram shown, what is the primary transformation occurring at the eutectoid point?",
    "option_a_en": "Liquid to solid transformation",
    "option_b_en": "Austenite transforms to pearlite (ferrite + cementite)",
    "option_c_en": "Ferrite transforms to austenite",
    "option_d_en": "Cementite decomposes into graphite",
    "correct_answer": "B",
    "explanation": "The diagram shows the Fe-C phase diagram where the eutectoid point at 727°C marks the transformation of austenite into a lamellar structure of ferrite and cementite known as pearlite. This is a solid-state transformation occurring at a fixed composition (0.8% C) and temperature.",
    "references": [
      "https://en.wikipedia.org/wiki/Iron-carbon_phase_diagram",
      "Phase Transformations in Metals and Alloys by Porter & Easterling, Chapter 5"
    ]
  }
]"#
        .to_string())
    }
}
