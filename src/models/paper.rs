use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::question::{Difficulty, Question};

/// 一个 (主题, 子题) 配对
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSpec {
    pub main_topic: String,
    pub subtopic: String,
}

/// 试卷中单个版块的配置
///
/// 难度分布用 `BTreeMap<Difficulty, usize>` 而不是字符串键：
/// 不认识的难度标签在反序列化时直接报错，遍历顺序恒定为
/// Easy → Medium → Hard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSpec {
    /// 版块显示名，如 "Main Subject"、"Aptitude"
    pub name: String,
    /// 本版块题目总数
    pub question_count: usize,
    /// 每个难度段的题目数
    pub difficulty_distribution: BTreeMap<Difficulty, usize>,
    /// 本版块覆盖的主题列表
    #[serde(default)]
    pub topics: Vec<TopicSpec>,
}

/// 一份试卷的完整生成规格（TOML 文档），构造后不再修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperSpec {
    pub paper_name: String,
    pub subject: String,
    pub sections: Vec<SectionSpec>,
}

impl PaperSpec {
    /// 所有版块配置的题目总数
    pub fn total_questions(&self) -> usize {
        self.sections.iter().map(|s| s.question_count).sum()
    }
}

/// 组装完成的试卷，一次构建生成一条记录，之后不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    pub paper_id: String,
    pub paper_name: String,
    pub subject: String,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Local>,
}

impl Paper {
    /// 试卷级校验
    ///
    /// 收集所有违规描述；跨版块的 ID 重复必须在这里兜底检查，
    /// 不能假设上游的 ID 生成一定没问题
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.questions.is_empty() {
            errors.push("试卷没有任何题目".to_string());
        }

        let ids: Vec<&String> = self.questions.iter().map(|q| &q.question_id).collect();
        let unique: std::collections::HashSet<&&String> = ids.iter().collect();
        if unique.len() != ids.len() {
            errors.push("试卷包含重复的题目 ID".to_string());
        }

        for (i, q) in self.questions.iter().enumerate() {
            let q_errors = q.validate();
            if !q_errors.is_empty() {
                errors.push(format!("第 {} 题无效: {}", i + 1, q_errors.join(", ")));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question(id: &str) -> Question {
        Question {
            question_id: id.to_string(),
            test_section: "Main Subject".to_string(),
            main_topic: "Thermodynamics".to_string(),
            subtopic: "Phase Diagrams".to_string(),
            difficulty: Difficulty::Medium,
            question_text_en: "At what temperature does the eutectoid transformation occur?"
                .to_string(),
            option_a_en: "727°C".to_string(),
            option_b_en: "912°C".to_string(),
            option_c_en: "1147°C".to_string(),
            option_d_en: "1538°C".to_string(),
            correct_answer: "A".to_string(),
            explanation: "The eutectoid transformation in the Fe-C system occurs at 727°C, where \
                          austenite transforms to pearlite."
                .to_string(),
            references: vec!["ASM Handbook, Volume 3".to_string()],
            ..Default::default()
        }
    }

    fn sample_paper(questions: Vec<Question>) -> Paper {
        Paper {
            paper_id: uuid::Uuid::new_v4().to_string(),
            paper_name: "Sample Exam 2026".to_string(),
            subject: "Metallurgical Engineering".to_string(),
            questions,
            created_at: Local::now(),
        }
    }

    #[test]
    fn test_valid_paper() {
        let paper = sample_paper(vec![sample_question("q1"), sample_question("q2")]);
        assert!(paper.validate().is_empty());
    }

    #[test]
    fn test_empty_paper_reported() {
        let paper = sample_paper(Vec::new());
        let errors = paper.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("没有任何题目"));
    }

    #[test]
    fn test_duplicate_ids_reported() {
        let paper = sample_paper(vec![sample_question("dup"), sample_question("dup")]);
        let errors = paper.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("重复"));
    }

    #[test]
    fn test_invalid_question_reported_with_index() {
        let mut bad = sample_question("q2");
        bad.correct_answer = "Z".to_string();
        let paper = sample_paper(vec![sample_question("q1"), bad]);
        let errors = paper.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("第 2 题"));
    }

    #[test]
    fn test_spec_total_questions() {
        let spec = PaperSpec {
            paper_name: "Mock Test".to_string(),
            subject: "Physics".to_string(),
            sections: vec![
                SectionSpec {
                    name: "Main Subject".to_string(),
                    question_count: 60,
                    difficulty_distribution: BTreeMap::new(),
                    topics: Vec::new(),
                },
                SectionSpec {
                    name: "Aptitude".to_string(),
                    question_count: 20,
                    difficulty_distribution: BTreeMap::new(),
                    topics: Vec::new(),
                },
            ],
        };
        assert_eq!(spec.total_questions(), 80);
    }

    #[test]
    fn test_difficulty_distribution_iterates_in_band_order() {
        let mut dist = BTreeMap::new();
        dist.insert(Difficulty::Hard, 5);
        dist.insert(Difficulty::Easy, 40);
        dist.insert(Difficulty::Medium, 15);
        let order: Vec<Difficulty> = dist.keys().copied().collect();
        assert_eq!(
            order,
            vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
        );
    }
}
