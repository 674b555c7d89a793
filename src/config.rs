/// 程序配置
///
/// 所有字段都可以通过环境变量覆盖，未设置时使用默认值
#[derive(Clone, Debug)]
pub struct Config {
    // --- 文本 LLM 配置（OpenAI 兼容端点，如 Ollama 的 /v1） ---
    pub llm_api_base_url: String,
    pub llm_api_key: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// 单次文本模型调用的超时（秒）
    pub llm_timeout_secs: u64,
    // --- 视觉 VLM 配置（Ollama 原生 /api/generate 端点） ---
    pub vlm_base_url: String,
    pub vlm_generate_endpoint: String,
    pub vlm_model_name: String,
    /// 单次多模态调用的超时（秒），VLM 明显更慢
    pub vlm_timeout_secs: u64,
    // --- 传输层重试 ---
    pub max_transport_retries: usize,
    pub retry_delay_secs: u64,
    // --- 生成行为 ---
    pub generation: GenerationConfig,
    // --- 持久化路径 ---
    /// 题库状态文件（已使用题目 ID 的集合）
    pub bank_state_file: String,
    /// 试卷规格 TOML 文件存放目录
    pub spec_folder: String,
    /// 生成的试卷 JSON 记录目录
    pub papers_dir: String,
    /// CSV 导出目录
    pub export_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

/// 题目生成与校验行为的配置
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    /// 解析字段的最小长度（字符数）
    pub min_explanation_length: usize,
    /// 是否要求参考资料
    pub require_references: bool,
    /// 参考资料的最少条数
    pub min_references: usize,
    /// 每道题校验失败后的重试次数（预算 = n × (1 + 该值)）
    pub max_validation_retries: usize,
    /// 提示词中是否包含 few-shot 示例
    pub use_few_shot: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_explanation_length: 20,
            require_references: true,
            min_references: 1,
            max_validation_retries: 2,
            use_few_shot: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_base_url: "http://localhost:11434/v1".to_string(),
            llm_api_key: "ollama".to_string(),
            llm_model_name: "mistral".to_string(),
            llm_temperature: 0.7,
            llm_max_tokens: 2048,
            llm_timeout_secs: 120,
            vlm_base_url: "http://localhost:11434".to_string(),
            vlm_generate_endpoint: "/api/generate".to_string(),
            vlm_model_name: "llava".to_string(),
            vlm_timeout_secs: 180,
            max_transport_retries: 3,
            retry_delay_secs: 2,
            generation: GenerationConfig::default(),
            bank_state_file: "question_bank_state.json".to_string(),
            spec_folder: "paper_specs".to_string(),
            papers_dir: "generated_papers".to_string(),
            export_dir: "exports".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_base_url: std::env::var("LLM_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_model_name: std::env::var("LLM_MODEL").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_timeout_secs),
            vlm_base_url: std::env::var("VLM_BASE_URL").unwrap_or(default.vlm_base_url),
            vlm_generate_endpoint: std::env::var("VLM_GENERATE_ENDPOINT").unwrap_or(default.vlm_generate_endpoint),
            vlm_model_name: std::env::var("VLM_MODEL").unwrap_or(default.vlm_model_name),
            vlm_timeout_secs: std::env::var("VLM_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.vlm_timeout_secs),
            max_transport_retries: std::env::var("MAX_TRANSPORT_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_transport_retries),
            retry_delay_secs: std::env::var("RETRY_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry_delay_secs),
            generation: GenerationConfig {
                min_explanation_length: std::env::var("MIN_EXPLANATION_LENGTH").ok().and_then(|v| v.parse().ok()).unwrap_or(default.generation.min_explanation_length),
                require_references: std::env::var("REQUIRE_REFERENCES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.generation.require_references),
                min_references: std::env::var("MIN_REFERENCES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.generation.min_references),
                max_validation_retries: std::env::var("MAX_VALIDATION_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.generation.max_validation_retries),
                use_few_shot: std::env::var("USE_FEW_SHOT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.generation.use_few_shot),
            },
            bank_state_file: std::env::var("BANK_STATE_FILE").unwrap_or(default.bank_state_file),
            spec_folder: std::env::var("SPEC_FOLDER").unwrap_or(default.spec_folder),
            papers_dir: std::env::var("PAPERS_DIR").unwrap_or(default.papers_dir),
            export_dir: std::env::var("EXPORT_DIR").unwrap_or(default.export_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}
