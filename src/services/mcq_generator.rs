//! 文本题目生成 - 业务能力层
//!
//! 核心是一个有界重试的生成循环：模型输出不可靠（JSON 畸形、字段缺失、
//! 内容不达标）时一律"跳过并继续"，只有整个预算耗尽且一道题都没攒到
//! 才算失败。攒到一部分但没到目标只记警告，由上层决定要不要在意

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clients::TextModel;
use crate::config::GenerationConfig;
use crate::error::{AppError, GenerationError, Result};
use crate::models::question::{Difficulty, Question};
use crate::services::prompt_builder::build_mcq_generation_prompt;
use crate::services::response_parser::parse_question_records;

/// 原始记录里必须出现的字段
const REQUIRED_FIELDS: [&str; 7] = [
    "question_text_en",
    "option_a_en",
    "option_b_en",
    "option_c_en",
    "option_d_en",
    "correct_answer",
    "explanation",
];

/// 文本题目生成器
///
/// 职责：
/// - 驱动"调用 → 解析 → 转换 → 校验"的重试循环
/// - 只处理单个 (主题, 难度) 单元
/// - 不关心版块如何拆分题量
pub struct McqGenerator<M: TextModel> {
    model: M,
    config: GenerationConfig,
}

impl<M: TextModel> McqGenerator<M> {
    /// 创建新的生成器
    pub fn new(model: M, config: GenerationConfig) -> Self {
        Self { model, config }
    }

    /// 为指定主题和难度生成 n 道已校验的题目
    ///
    /// # 参数
    /// - `test_section`: 版块名，不传时用主题名占位（版块构建器之后会统一覆盖）
    ///
    /// # 返回
    /// 成功时返回题目列表；可能少于 n（记警告）；
    /// 预算耗尽且一道都没有时返回 `GenerationError`
    pub async fn generate_mcqs(
        &self,
        subject: &str,
        main_topic: &str,
        subtopic: &str,
        difficulty: Difficulty,
        n: usize,
        test_section: Option<&str>,
    ) -> Result<Vec<Question>> {
        let test_section = test_section.unwrap_or(main_topic);

        info!(
            "开始生成 {} 道 {} 题目: {} → {} → {}",
            n, difficulty, subject, main_topic, subtopic
        );

        let mut questions: Vec<Question> = Vec::new();
        let mut attempts = 0;
        let max_attempts = n * (1 + self.config.max_validation_retries);

        while questions.len() < n && attempts < max_attempts {
            let remaining = n - questions.len();
            attempts += 1;

            debug!("📝 第 {} 次尝试: 生成 {} 道题目...", attempts, remaining);

            let prompt = build_mcq_generation_prompt(
                subject,
                main_topic,
                subtopic,
                difficulty,
                remaining,
                self.config.use_few_shot,
            );

            // 传输层失败只作废本次尝试
            let response_text = match self.model.generate(&prompt).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("第 {} 次生成尝试失败: {}", attempts, e);
                    continue;
                }
            };

            // 解析失败同样只作废本次尝试
            let records = match parse_question_records(&response_text) {
                Ok(records) => records,
                Err(e) => {
                    warn!("第 {} 次响应解析失败: {}", attempts, e);
                    continue;
                }
            };

            debug!("📋 解析出 {} 条记录", records.len());

            for (i, record) in records.iter().enumerate() {
                if questions.len() >= n {
                    break;
                }

                // 字段缺失只跳过这一条，不作废整批
                let question = match record_to_question(
                    record,
                    test_section,
                    main_topic,
                    subtopic,
                    difficulty,
                ) {
                    Ok(q) => q,
                    Err(e) => {
                        warn!("第 {} 条记录转换失败: {}", i + 1, e);
                        continue;
                    }
                };

                let errors = question.validate();
                if !errors.is_empty() {
                    warn!("第 {} 条记录校验失败: {}", i + 1, errors.join("; "));
                    continue;
                }

                if !self.passes_generation_checks(&question) {
                    continue;
                }

                debug!("✅ 第 {} 条记录有效: {}", i + 1, question);
                questions.push(question);
            }
        }

        if questions.len() < n {
            warn!(
                "⚠️ 尝试 {} 次后只生成了 {}/{} 道有效题目",
                attempts,
                questions.len(),
                n
            );
        }

        if questions.is_empty() {
            return Err(GenerationError::NoValidQuestions { attempts }.into());
        }

        info!("✅ 成功生成 {} 道题目", questions.len());
        Ok(questions)
    }

    /// 生成层的加严校验，在基础校验门之后执行
    ///
    /// 阈值来自 `GenerationConfig`，和基础门的结构性下限是两层
    fn passes_generation_checks(&self, question: &Question) -> bool {
        if question.explanation.chars().count() < self.config.min_explanation_length {
            warn!(
                "解析太短 ({} < {} 字符)",
                question.explanation.chars().count(),
                self.config.min_explanation_length
            );
            return false;
        }

        if self.config.require_references
            && question.references.len() < self.config.min_references
        {
            warn!(
                "参考资料不足 ({} < {})",
                question.references.len(),
                self.config.min_references
            );
            return false;
        }

        // 过短的选项多半是模型偷懒
        if question
            .options()
            .iter()
            .any(|(_, text)| text.chars().count() < 2)
        {
            warn!("存在过短的选项");
            return false;
        }

        true
    }
}

/// 把一条原始记录转换为候选题目
///
/// 元数据从调用上下文盖章；答案标记去空格并转大写；
/// references 字段可能是字符串或数组，统一收成字符串列表
pub(crate) fn record_to_question(
    record: &Value,
    test_section: &str,
    main_topic: &str,
    subtopic: &str,
    difficulty: Difficulty,
) -> Result<Question> {
    let obj = record
        .as_object()
        .ok_or_else(|| AppError::Other("记录不是 JSON 对象".to_string()))?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !obj.contains_key(**field))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Other(format!("缺少必需字段: {:?}", missing)));
    }

    let text_field = |key: &str| -> String {
        match &obj[key] {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        }
    };

    let references = match obj.get("references") {
        Some(Value::String(s)) => vec![s.trim().to_string()],
        Some(Value::Array(items)) => items
            .iter()
            .map(|r| match r {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(Question {
        test_section: test_section.to_string(),
        main_topic: main_topic.to_string(),
        subtopic: subtopic.to_string(),
        difficulty,
        question_text_en: text_field("question_text_en"),
        option_a_en: text_field("option_a_en"),
        option_b_en: text_field("option_b_en"),
        option_c_en: text_field("option_c_en"),
        option_d_en: text_field("option_d_en"),
        correct_answer: text_field("correct_answer").to_uppercase(),
        explanation: text_field("explanation"),
        references,
        ..Default::default()
    })
}
