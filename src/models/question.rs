use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;

/// 合法的正确答案标记
pub const VALID_ANSWERS: [&str; 4] = ["A", "B", "C", "D"];

/// 解析字段的结构性最低长度（字符数）
///
/// 基础校验门槛固定为 20；生成层可以通过 `GenerationConfig` 单独收紧
pub const MIN_EXPLANATION_LEN: usize = 20;

/// 题目难度，封闭枚举
///
/// 排序即配置里难度段的遍历顺序（Easy < Medium < Hard）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Difficulty {
    /// 直接回忆定义、公式、基础事实
    Easy,
    /// 概念应用，1-2 步推理
    #[default]
    Medium,
    /// 多步推理、多概念综合
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    /// 不认识的标签在配置加载阶段就被拒绝，不留到查表时
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Easy" | "easy" | "EASY" => Ok(Difficulty::Easy),
            "Medium" | "medium" | "MEDIUM" => Ok(Difficulty::Medium),
            "Hard" | "hard" | "HARD" => Ok(Difficulty::Hard),
            other => Err(ConfigError::InvalidDifficulty {
                label: other.to_string(),
            }),
        }
    }
}

/// 一道完整的选择题
///
/// 元数据（所属版块 / 主题 / 子题 / 难度）在生成时由调用上下文盖章；
/// 题目被接受进试卷后不再修改，唯一的例外是版块名会由 SectionBuilder
/// 在生成完成后统一覆盖
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Question {
    pub question_id: String,
    pub test_section: String,
    pub main_topic: String,
    pub subtopic: String,
    pub difficulty: Difficulty,

    pub question_text_en: String,
    pub option_a_en: String,
    pub option_b_en: String,
    pub option_c_en: String,
    pub option_d_en: String,
    /// 必须是 "A" / "B" / "C" / "D" 之一
    pub correct_answer: String,
    pub explanation: String,
    pub references: Vec<String>,

    pub created_at: DateTime<Local>,
    /// 如果题目来自某个 PDF 的图表，这里记录来源文件
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_pdf: Option<String>,
    /// 题目是否依赖图表 / 图片才能作答
    pub has_diagram: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Default for Question {
    fn default() -> Self {
        Self {
            question_id: uuid::Uuid::new_v4().to_string(),
            test_section: String::new(),
            main_topic: String::new(),
            subtopic: String::new(),
            difficulty: Difficulty::default(),
            question_text_en: String::new(),
            option_a_en: String::new(),
            option_b_en: String::new(),
            option_c_en: String::new(),
            option_d_en: String::new(),
            correct_answer: String::new(),
            explanation: String::new(),
            references: Vec::new(),
            created_at: Local::now(),
            source_pdf: None,
            has_diagram: false,
            tags: Vec::new(),
        }
    }
}

impl Question {
    /// 四个选项（带字母标记），方便遍历
    pub fn options(&self) -> [(&'static str, &str); 4] {
        [
            ("A", self.option_a_en.as_str()),
            ("B", self.option_b_en.as_str()),
            ("C", self.option_c_en.as_str()),
            ("D", self.option_d_en.as_str()),
        ]
    }

    /// 基础校验门（结构性不变量）
    ///
    /// 收集所有违规描述，空列表即合法。各项检查互相独立，不短路；
    /// 纯函数，永不失败
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.question_text_en.trim().is_empty() {
            errors.push("题干为空".to_string());
        }

        for (letter, text) in self.options() {
            if text.trim().is_empty() {
                errors.push(format!("选项 {} 为空", letter));
            }
        }

        if !VALID_ANSWERS.contains(&self.correct_answer.as_str()) {
            errors.push(format!(
                "正确答案必须是 A、B、C、D 之一 (得到 '{}')",
                self.correct_answer
            ));
        }

        if self.explanation.trim().is_empty() {
            errors.push("解析为空".to_string());
        } else if self.explanation.trim().chars().count() < MIN_EXPLANATION_LEN {
            errors.push(format!("解析太短 (< {} 字符)", MIN_EXPLANATION_LEN));
        }

        // 选项去重按去空格 + 小写比较
        let normalized: Vec<String> = self
            .options()
            .iter()
            .map(|(_, text)| text.trim().to_lowercase())
            .collect();
        let unique: std::collections::HashSet<&String> = normalized.iter().collect();
        if unique.len() != normalized.len() {
            errors.push("选项存在重复".to_string());
        }

        if self.test_section.trim().is_empty() {
            errors.push("版块名为空".to_string());
        }
        if self.main_topic.trim().is_empty() {
            errors.push("主题名为空".to_string());
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview = if self.question_text_en.chars().count() > 60 {
            self.question_text_en.chars().take(60).collect::<String>() + "..."
        } else {
            self.question_text_en.clone()
        };
        write!(f, "[{}] {} ({})", self.difficulty, preview, self.main_topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造一道完全合法的题目
    fn valid_question() -> Question {
        Question {
            test_section: "Main Subject".to_string(),
            main_topic: "Material Science".to_string(),
            subtopic: "Crystal Structure".to_string(),
            difficulty: Difficulty::Easy,
            question_text_en: "What is the coordination number in an FCC crystal structure?"
                .to_string(),
            option_a_en: "12".to_string(),
            option_b_en: "8".to_string(),
            option_c_en: "6".to_string(),
            option_d_en: "4".to_string(),
            correct_answer: "A".to_string(),
            explanation: "In FCC each atom is surrounded by 12 nearest neighbors, giving a \
                          coordination number of 12."
                .to_string(),
            references: vec!["Callister, Materials Science and Engineering, Chapter 3".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_question_has_no_violations() {
        assert!(valid_question().validate().is_empty());
    }

    #[test]
    fn test_empty_option_single_violation() {
        let mut q = valid_question();
        q.option_b_en = "   ".to_string();
        let errors = q.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("选项 B"));
    }

    #[test]
    fn test_invalid_answer_marker_single_violation() {
        let mut q = valid_question();
        q.correct_answer = "E".to_string();
        let errors = q.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("正确答案"));
    }

    #[test]
    fn test_lowercase_marker_rejected() {
        let mut q = valid_question();
        q.correct_answer = "a".to_string();
        assert_eq!(q.validate().len(), 1);
    }

    #[test]
    fn test_short_explanation_single_violation() {
        let mut q = valid_question();
        q.explanation = "Too short.".to_string();
        let errors = q.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("解析太短"));
    }

    #[test]
    fn test_duplicate_options_case_insensitive() {
        let mut q = valid_question();
        q.option_c_en = " 12 ".to_string(); // 与选项 A 去空格后相同
        let errors = q.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("重复"));
    }

    #[test]
    fn test_empty_section_single_violation() {
        let mut q = valid_question();
        q.test_section = String::new();
        let errors = q.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("版块"));
    }

    #[test]
    fn test_multiple_violations_all_collected() {
        let mut q = valid_question();
        q.option_a_en = String::new();
        q.correct_answer = "X".to_string();
        q.main_topic = String::new();
        assert_eq!(q.validate().len(), 3);
    }

    #[test]
    fn test_fresh_questions_get_distinct_ids() {
        let a = Question::default();
        let b = Question::default();
        assert_ne!(a.question_id, b.question_id);
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("Extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_difficulty_order_is_band_order() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Medium < Difficulty::Hard);
    }
}
