//! 版块构建 - 流程层
//!
//! 核心职责：把一个版块的题量拆到 (主题, 难度) 单元上，
//! 再逐个单元调用生成循环
//!
//! 流程顺序：
//! 1. 按难度段遍历（Easy → Medium → Hard，跳过题量为 0 的段）
//! 2. 段内题量按主题均分，余数从排在前面的主题开始补
//! 3. 有图片配对时先试多模态生成，失败就退回纯文本生成
//! 4. 全部生成完后用版块名统一覆盖题目的 test_section

use tracing::{info, warn};

use crate::clients::{TextModel, VisionModel};
use crate::error::Result;
use crate::models::multimodal::TextImagePair;
use crate::models::paper::SectionSpec;
use crate::models::question::{Difficulty, Question};
use crate::services::mcq_generator::McqGenerator;
use crate::services::multimodal_generator::MultimodalGenerator;

/// 版块构建器
///
/// - 编排单个版块的完整生成流程
/// - 不持有题库，不关心试卷级别的事情
pub struct SectionBuilder<'a, M: TextModel, V: VisionModel> {
    mcq_generator: &'a McqGenerator<M>,
    multimodal_generator: &'a MultimodalGenerator<V>,
}

impl<'a, M: TextModel, V: VisionModel> SectionBuilder<'a, M, V> {
    /// 创建新的版块构建器
    pub fn new(
        mcq_generator: &'a McqGenerator<M>,
        multimodal_generator: &'a MultimodalGenerator<V>,
    ) -> Self {
        Self {
            mcq_generator,
            multimodal_generator,
        }
    }

    /// 生成一个版块的全部题目
    ///
    /// 目标题量是 `section.question_count`，生成不顺时可能偏少（§生成循环
    /// 的短缺语义），这里不把短缺当错误
    pub async fn build_section(
        &self,
        section: &SectionSpec,
        subject: &str,
        diagram_pairs: Option<&[TextImagePair]>,
    ) -> Result<Vec<Question>> {
        info!(
            "开始构建版块: {} ({} 题)",
            section.name, section.question_count
        );

        // 没配主题的版块整个跳过
        if section.topics.is_empty() {
            warn!("⚠️ 版块 {} 没有配置主题，跳过", section.name);
            return Ok(Vec::new());
        }

        let mut questions: Vec<Question> = Vec::new();

        for (&difficulty, &count) in &section.difficulty_distribution {
            if count == 0 {
                info!("难度 {} 题量为 0，跳过", difficulty);
                continue;
            }

            info!("生成 {} 道 {} 题目...", count, difficulty);

            let allocations = allocate_topic_counts(count, section.topics.len());

            for (topic, &topic_count) in section.topics.iter().zip(allocations.iter()) {
                if topic_count == 0 {
                    continue;
                }

                info!(
                    "  - {} → {}: {} 题",
                    topic.main_topic, topic.subtopic, topic_count
                );

                let cell_questions = self
                    .build_cell(
                        subject,
                        &topic.main_topic,
                        &topic.subtopic,
                        difficulty,
                        topic_count,
                        diagram_pairs,
                    )
                    .await?;

                questions.extend(cell_questions);
            }
        }

        // 生成是按主题进行的，一个版块可能聚合多个主题，
        // 最后统一盖上版块的显示名
        for q in &mut questions {
            q.test_section = section.name.clone();
        }

        info!(
            "✅ 版块 {} 构建完成: {} 题",
            section.name,
            questions.len()
        );

        Ok(questions)
    }

    /// 生成单个 (主题, 难度) 单元
    ///
    /// 多模态生成的任何失败都退回纯文本生成，目标题量不变
    async fn build_cell(
        &self,
        subject: &str,
        main_topic: &str,
        subtopic: &str,
        difficulty: Difficulty,
        count: usize,
        diagram_pairs: Option<&[TextImagePair]>,
    ) -> Result<Vec<Question>> {
        if let Some(pairs) = diagram_pairs {
            if let Some(pair) = pairs.first() {
                match self
                    .multimodal_generator
                    .generate_from_pair(pair, subject, main_topic, subtopic, difficulty, count, None)
                    .await
                {
                    Ok(questions) => return Ok(questions),
                    Err(e) => {
                        warn!("⚠️ 多模态生成失败: {}", e);
                        info!("退回纯文本生成...");
                    }
                }
            }
        }

        self.mcq_generator
            .generate_mcqs(subject, main_topic, subtopic, difficulty, count, None)
            .await
    }
}

/// 把一个难度段的题量拆分到各主题
///
/// base = count / topics，余数补给排在前面的主题；
/// 总和恰好等于 count，任意两个主题的配额差不超过 1
pub fn allocate_topic_counts(count: usize, topics: usize) -> Vec<usize> {
    let base = count / topics;
    let remainder = count % topics;

    (0..topics)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}
