//! 多模态题目生成 - 业务能力层
//!
//! 和文本生成共用同一个重试循环结构，差异在于：
//! - 模型调用附带图片（base64）
//! - 额外要求题干真的引用了图表，防止模型无视图片出纯文字题
//! - 产出的题目带 has_diagram 标记和来源 PDF

use tracing::{debug, info, warn};

use crate::clients::VisionModel;
use crate::config::GenerationConfig;
use crate::error::{GenerationError, Result};
use crate::models::multimodal::TextImagePair;
use crate::models::question::{Difficulty, Question};
use crate::services::mcq_generator::record_to_question;
use crate::services::prompt_builder::build_multimodal_prompt;
use crate::services::response_parser::parse_question_records;

/// 题干里至少要出现一个这样的词，才认为题目真的依赖图表
const DIAGRAM_KEYWORDS: [&str; 14] = [
    "shown",
    "diagram",
    "figure",
    "graph",
    "image",
    "above",
    "below",
    "illustrated",
    "depicted",
    "displayed",
    "curve",
    "plot",
    "chart",
    "table",
];

/// 多模态题目生成器
pub struct MultimodalGenerator<V: VisionModel> {
    model: V,
    config: GenerationConfig,
}

impl<V: VisionModel> MultimodalGenerator<V> {
    /// 创建新的多模态生成器
    pub fn new(model: V, config: GenerationConfig) -> Self {
        Self { model, config }
    }

    /// 基于一个文本-图片配对生成 n 道图表题
    pub async fn generate_from_pair(
        &self,
        pair: &TextImagePair,
        subject: &str,
        main_topic: &str,
        subtopic: &str,
        difficulty: Difficulty,
        n: usize,
        test_section: Option<&str>,
    ) -> Result<Vec<Question>> {
        let test_section = test_section.unwrap_or(main_topic);

        info!(
            "开始生成 {} 道 {} 图表题目: {} → {} → {} (图片 {} 张)",
            n,
            difficulty,
            subject,
            main_topic,
            subtopic,
            pair.images.len()
        );

        let images_base64 = pair.image_base64_list();

        let mut questions: Vec<Question> = Vec::new();
        let mut attempts = 0;
        let max_attempts = n * (1 + self.config.max_validation_retries);

        while questions.len() < n && attempts < max_attempts {
            let remaining = n - questions.len();
            attempts += 1;

            debug!("📝 第 {} 次尝试: 生成 {} 道图表题...", attempts, remaining);

            let prompt = build_multimodal_prompt(
                &pair.text,
                pair.images.len(),
                difficulty,
                subject,
                main_topic,
                subtopic,
                remaining,
            );

            let response_text = match self.model.generate_multimodal(&prompt, &images_base64).await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!("第 {} 次多模态生成尝试失败: {}", attempts, e);
                    continue;
                }
            };

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

                let mut question = match record_to_question(
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

                question.has_diagram = true;
                question.source_pdf = pair.source_pdf.clone();

                let errors = question.validate();
                if !errors.is_empty() {
                    warn!("第 {} 条记录校验失败: {}", i + 1, errors.join("; "));
                    continue;
                }

                if !self.passes_multimodal_checks(&question) {
                    continue;
                }

                debug!("✅ 第 {} 条记录有效: {}", i + 1, question);
                questions.push(question);
            }
        }

        if questions.len() < n {
            warn!(
                "⚠️ 尝试 {} 次后只生成了 {}/{} 道有效图表题",
                attempts,
                questions.len(),
                n
            );
        }

        if questions.is_empty() {
            return Err(GenerationError::NoValidQuestions { attempts }.into());
        }

        info!("✅ 成功生成 {} 道图表题目", questions.len());
        Ok(questions)
    }

    /// 多模态专属的加严校验
    fn passes_multimodal_checks(&self, question: &Question) -> bool {
        if question.explanation.chars().count() < self.config.min_explanation_length {
            warn!("解析太短");
            return false;
        }

        if self.config.require_references
            && question.references.len() < self.config.min_references
        {
            warn!("参考资料不足");
            return false;
        }

        // 题干必须引用图表，否则这道题不需要图片也能做
        let question_lower = question.question_text_en.to_lowercase();
        if !DIAGRAM_KEYWORDS
            .iter()
            .any(|kw| question_lower.contains(kw))
        {
            warn!("题干没有引用图表/图片");
            return false;
        }

        true
    }
}
