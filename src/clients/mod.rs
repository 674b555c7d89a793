//! 模型客户端 - 基础设施层
//!
//! 持有与本地模型端点的连接，只对外暴露"调用一次模型"的能力。
//! 生成循环通过 `TextModel` / `VisionModel` 两个接口拿到这份能力，
//! 测试里可以直接用桩实现替换

pub mod llm_client;
pub mod vlm_client;

pub use llm_client::LlmClient;
pub use vlm_client::{MockVlmClient, VlmClient};

use crate::error::Result;

/// 文本模型调用能力
///
/// `prompt` 是上游拼好的完整提示词，返回模型的原始文本输出。
/// 传输层失败（网络 / 超时 / 非 2xx）以 `LlmError` 形式返回
#[allow(async_fn_in_trait)]
pub trait TextModel {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// 视觉模型调用能力
///
/// 在文本提示词之外附带一组 base64 编码的图片
#[allow(async_fn_in_trait)]
pub trait VisionModel {
    async fn generate_multimodal(&self, prompt: &str, images_base64: &[String]) -> Result<String>;
}
