//! 文本 LLM 客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的本地服务（如 Ollama 的 /v1 端点）
//! - 传输层失败按固定间隔重试，次数有上限

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::clients::TextModel;
use crate::config::Config;
use crate::error::{LlmError, Result};

/// 文本模型客户端
///
/// 职责：
/// - 调用 OpenAI 兼容端点生成文本
/// - 处理超时与传输层重试
/// - 不理解提示词内容，不解析返回的题目
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    timeout_secs: u64,
    max_retries: usize,
    retry_delay_secs: u64,
}

impl LlmClient {
    /// 创建新的文本模型客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout_secs: config.llm_timeout_secs,
            max_retries: config.max_transport_retries,
            retry_delay_secs: config.retry_delay_secs,
        }
    }

    /// 单次 API 调用，不含重试
    async fn call_once(&self, prompt: &str) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.chars().count());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| LlmError::ApiCallFailed {
                model: self.model_name.clone(),
                source: Box::new(e),
            })?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| LlmError::ApiCallFailed {
                model: self.model_name.clone(),
                source: Box::new(e),
            })?;

        // 端点挂起时靠这里的超时解除阻塞
        let response = match tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            self.client.chat().create(request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err(LlmError::ApiCallFailed {
                    model: self.model_name.clone(),
                    source: Box::new(e),
                }
                .into());
            }
            Err(_) => {
                return Err(LlmError::Timeout {
                    model: self.model_name.clone(),
                    timeout_secs: self.timeout_secs,
                }
                .into());
            }
        };

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

impl TextModel for LlmClient {
    /// 带固定间隔重试的文本生成
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_retries {
            match self.call_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(
                        "LLM 调用失败 (尝试 {}/{}): {}",
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
