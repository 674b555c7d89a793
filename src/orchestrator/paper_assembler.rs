//! 试卷组装 - 编排层
//!
//! ## 职责
//!
//! 1. **遍历版块**：按配置顺序逐个调用版块构建器
//! 2. **试卷身份**：分配试卷 ID 和创建时间
//! 3. **试卷级校验**：跨版块查重；违规只记录不拦截
//! 4. **题库登记**：组装完成后无条件把全部题目写入题库

use chrono::Local;
use tracing::{info, warn};

use crate::clients::{TextModel, VisionModel};
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::models::multimodal::TextImagePair;
use crate::models::paper::{Paper, PaperSpec};
use crate::services::mcq_generator::McqGenerator;
use crate::services::multimodal_generator::MultimodalGenerator;
use crate::services::question_bank::QuestionBank;
use crate::workflow::SectionBuilder;

/// 试卷组装器
///
/// 题库作为依赖注入进来，自己管理加载和持久化；
/// 同一时间只会有一个构建在进行（流水线是严格串行的）
pub struct PaperAssembler<M: TextModel, V: VisionModel> {
    mcq_generator: McqGenerator<M>,
    multimodal_generator: MultimodalGenerator<V>,
    question_bank: QuestionBank,
}

impl<M: TextModel, V: VisionModel> PaperAssembler<M, V> {
    /// 创建新的试卷组装器
    pub fn new(
        text_model: M,
        vision_model: V,
        generation_config: GenerationConfig,
        question_bank: QuestionBank,
    ) -> Self {
        Self {
            mcq_generator: McqGenerator::new(text_model, generation_config.clone()),
            multimodal_generator: MultimodalGenerator::new(vision_model, generation_config),
            question_bank,
        }
    }

    /// 按规格构建一份完整试卷
    ///
    /// 版块严格按配置顺序串行生成；试卷级校验失败只记警告，
    /// 试卷照常返回——持久化去重只由题库在写入时负责
    pub async fn build_paper(
        &mut self,
        spec: &PaperSpec,
        diagram_pairs: Option<&[TextImagePair]>,
    ) -> Result<Paper> {
        info!("{}", "=".repeat(60));
        info!("📋 开始构建试卷: {}", spec.paper_name);
        info!("科目: {}", spec.subject);
        info!(
            "版块数: {}，目标题量: {}",
            spec.sections.len(),
            spec.total_questions()
        );
        info!("{}", "=".repeat(60));

        let section_builder =
            SectionBuilder::new(&self.mcq_generator, &self.multimodal_generator);

        let mut all_questions = Vec::new();

        for section in &spec.sections {
            info!("\n{}", "─".repeat(60));
            let section_questions = section_builder
                .build_section(section, &spec.subject, diagram_pairs)
                .await?;
            info!(
                "✓ 版块 {} 产出 {} 题",
                section.name,
                section_questions.len()
            );
            all_questions.extend(section_questions);
        }

        let paper = Paper {
            paper_id: uuid::Uuid::new_v4().to_string(),
            paper_name: spec.paper_name.clone(),
            subject: spec.subject.clone(),
            questions: all_questions,
            created_at: Local::now(),
        };

        let errors = paper.validate();
        if !errors.is_empty() {
            warn!("⚠️ 试卷级校验发现问题:");
            for error in &errors {
                warn!("   - {}", error);
            }
        } else {
            info!("✅ 试卷级校验通过");
        }

        // 无论校验结果如何都登记进题库；题库写盘失败是致命的
        self.question_bank.add_questions(&paper.questions)?;

        info!("\n{}", "=".repeat(60));
        info!("✅ 试卷构建完成");
        info!("试卷 ID: {}", paper.paper_id);
        info!("题目总数: {}", paper.questions.len());
        info!("题库累计 ID 数: {}", self.question_bank.used_count());
        info!("{}", "=".repeat(60));

        Ok(paper)
    }

    /// 只读访问题库
    pub fn question_bank(&self) -> &QuestionBank {
        &self.question_bank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::models::paper::{SectionSpec, TopicSpec};
    use crate::models::question::Difficulty;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 每次调用产出一条带固定 ID 前缀的合法记录
    struct SequenceModel {
        calls: AtomicUsize,
    }

    impl TextModel for SequenceModel {
        async fn generate(&self, _prompt: &str) -> crate::error::Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!(
                r#"[{{
                    "question_text_en": "Sequential question number {call} about the topic?",
                    "option_a_en": "First {call}",
                    "option_b_en": "Second {call}",
                    "option_c_en": "Third {call}",
                    "option_d_en": "Fourth {call}",
                    "correct_answer": "C",
                    "explanation": "A detailed explanation that comfortably clears the length gate.",
                    "references": ["A credible source, Chapter 2"]
                }}]"#
            ))
        }
    }

    struct UnusedVlm;

    impl VisionModel for UnusedVlm {
        async fn generate_multimodal(
            &self,
            _prompt: &str,
            _images_base64: &[String],
        ) -> crate::error::Result<String> {
            Err(crate::error::AppError::Other("unused".to_string()))
        }
    }

    fn paper_spec() -> PaperSpec {
        PaperSpec {
            paper_name: "Mock Exam 2026".to_string(),
            subject: "Metallurgical Engineering".to_string(),
            sections: vec![SectionSpec {
                name: "Main Subject".to_string(),
                question_count: 5,
                difficulty_distribution: BTreeMap::from([(Difficulty::Easy, 5)]),
                topics: vec![
                    TopicSpec {
                        main_topic: "Material Science".to_string(),
                        subtopic: "Crystal Structure".to_string(),
                    },
                    TopicSpec {
                        main_topic: "Thermodynamics".to_string(),
                        subtopic: "Phase Diagrams".to_string(),
                    },
                ],
            }],
        }
    }

    fn assembler(dir: &std::path::Path) -> PaperAssembler<SequenceModel, UnusedVlm> {
        let bank = QuestionBank::load(dir.join("bank.json")).unwrap();
        PaperAssembler::new(
            SequenceModel {
                calls: AtomicUsize::new(0),
            },
            UnusedVlm,
            GenerationConfig::default(),
            bank,
        )
    }

    #[tokio::test]
    async fn test_build_paper_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut assembler = assembler(dir.path());

        let paper = assembler.build_paper(&paper_spec(), None).await.unwrap();

        assert_eq!(paper.questions.len(), 5);
        assert!(!paper.paper_id.is_empty());
        assert!(paper.validate().is_empty());
        // 全部题目都登记进了题库
        assert_eq!(assembler.question_bank().used_count(), 5);
        for q in &paper.questions {
            assert!(assembler.question_bank().is_used(&q.question_id));
        }
    }

    #[tokio::test]
    async fn test_bank_survives_across_builds() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut assembler = assembler(dir.path());
            assembler.build_paper(&paper_spec(), None).await.unwrap();
        }

        // 新组装器重新加载同一个状态文件
        let assembler = assembler(dir.path());
        assert_eq!(assembler.question_bank().used_count(), 5);
    }

    #[tokio::test]
    async fn test_preused_id_not_duplicated_in_bank() {
        let dir = tempfile::tempdir().unwrap();
        let bank_path = dir.path().join("bank.json");

        // 预置一个已使用的 ID "X"
        let mut bank = QuestionBank::load(&bank_path).unwrap();
        bank.add_questions(&[crate::models::question::Question {
            question_id: "X".to_string(),
            ..Default::default()
        }])
        .unwrap();

        let mut assembler = PaperAssembler::new(
            SequenceModel {
                calls: AtomicUsize::new(0),
            },
            UnusedVlm,
            GenerationConfig::default(),
            QuestionBank::load(&bank_path).unwrap(),
        );

        // 模拟生成器恰好重新产出了 ID 为 "X" 的题目：
        // 构建正常完成后，把带 "X" 的批次再登记一次
        let mut paper = assembler.build_paper(&paper_spec(), None).await.unwrap();
        paper.questions[0].question_id = "X".to_string();
        assembler
            .question_bank
            .add_questions(&paper.questions)
            .unwrap();

        // 试卷内容不受题库去重影响，题库状态里 "X" 只出现一次
        assert_eq!(paper.questions.len(), 5);
        assert_eq!(paper.questions[0].question_id, "X");
        let content = std::fs::read_to_string(&bank_path).unwrap();
        assert_eq!(content.matches("\"X\"").count(), 1);
        let reloaded = QuestionBank::load(&bank_path).unwrap();
        assert!(reloaded.is_used("X"));
    }
}
