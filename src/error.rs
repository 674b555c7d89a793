//! 应用程序错误类型
//!
//! 错误分类：
//! - `LlmError` - 模型调用的传输层错误（网络 / HTTP / 超时）
//! - `ParseError` - 模型输出无法解析为结构化数据
//! - `GenerationError` - 重试预算耗尽后没有任何有效题目
//! - `FileError` - 题库 / 试卷存储的文件读写错误（总是致命）
//! - `ConfigError` - 配置解析错误

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 模型调用错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 模型输出解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 题目生成错误
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装零散的失败场景）
    #[error("错误: {0}")]
    Other(String),
}

/// 模型调用的传输层错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 网络请求失败
    #[error("HTTP请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 返回了非 2xx 状态码
    #[error("API返回错误状态 ({endpoint}): {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 请求超时
    #[error("模型调用超时 (模型: {model}, {timeout_secs}秒)")]
    Timeout { model: String, timeout_secs: u64 },
    /// 返回内容为空
    #[error("模型返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 响应体不是已知的格式
    #[error("无法识别的响应格式，字段: {keys:?}")]
    UnexpectedFormat { keys: Vec<String> },
    /// 重试耗尽
    #[error("重试 {attempts} 次后仍然失败: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },
}

/// 模型输出解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    /// 响应中没有 JSON 数组或对象
    #[error("响应中没有找到结构化数据")]
    NoStructuredData,
    /// JSON 解码失败（修复后重试仍失败）
    #[error("响应JSON无效: {message}")]
    InvalidJson { message: String },
    /// 解码出的值既不是数组也不是对象
    #[error("期望JSON数组或对象，得到 {found}")]
    UnexpectedShape { found: String },
}

/// 题目生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 预算内没有产出任何通过校验的题目
    #[error("尝试 {attempts} 次后未能生成任何有效题目")]
    NoValidQuestions { attempts: usize },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// JSON 序列化失败
    #[error("JSON序列化失败: {source}")]
    JsonEncodeFailed {
        #[source]
        source: serde_json::Error,
    },
    /// 找不到记录
    #[error("记录不存在: {id}")]
    NotFound { id: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 难度标签不在封闭枚举内
    #[error("无法识别的难度标签: {label}")]
    InvalidDifficulty { label: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建模型 API 调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type Result<T> = std::result::Result<T, AppError>;
