//! CSV 导出 - 业务能力层
//!
//! 按客户模板导出固定 19 列的表格。印地语列和翻译标记列是模板
//! 占位，导出时留空

use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::{FileError, Result};
use crate::models::paper::Paper;
use crate::models::question::Question;

/// 客户模板的列头，顺序不能动
pub const CSV_HEADERS: [&str; 19] = [
    "Test Section",
    "Main Topic",
    "Sub-topic",
    "Difficulty Level",
    "Translation for options required?",
    "Question ID",
    "Question- English",
    "Question- Hindi",
    "Option A- English",
    "Option A- Hindi",
    "Option B- English",
    "Option B- Hindi",
    "Option C- English",
    "Option C- Hindi",
    "Option D- English",
    "Option D- Hindi",
    "Correct Answer",
    "Solution/Workout/Explanation",
    "Reference(s)",
];

/// 导出一份试卷到 CSV
pub fn export_paper_to_csv(paper: &Paper, output_path: &Path) -> Result<()> {
    export_questions_to_csv(&paper.questions, output_path)
}

/// 导出题目列表到 CSV
pub fn export_questions_to_csv(questions: &[Question], output_path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(output_path).map_err(|e| FileError::WriteFailed {
        path: output_path.display().to_string(),
        source: e,
    })?;

    let mut write_row = |fields: &[String]| -> Result<()> {
        let line = fields
            .iter()
            .map(|f| csv_escape(f))
            .collect::<Vec<String>>()
            .join(",");
        writeln!(file, "{}", line).map_err(|e| {
            FileError::WriteFailed {
                path: output_path.display().to_string(),
                source: e,
            }
            .into()
        })
    };

    write_row(&CSV_HEADERS.map(String::from))?;

    for q in questions {
        let row = [
            q.test_section.clone(),
            q.main_topic.clone(),
            q.subtopic.clone(),
            q.difficulty.to_string(),
            String::new(), // 翻译标记占位
            q.question_id.clone(),
            q.question_text_en.clone(),
            String::new(), // 印地语题干占位
            q.option_a_en.clone(),
            String::new(),
            q.option_b_en.clone(),
            String::new(),
            q.option_c_en.clone(),
            String::new(),
            q.option_d_en.clone(),
            String::new(),
            format_correct_answer(&q.correct_answer),
            q.explanation.clone(),
            format_references(&q.references),
        ];
        write_row(&row)?;
    }

    info!(
        "✅ 已导出 {} 道题目到: {}",
        questions.len(),
        output_path.display()
    );

    Ok(())
}

/// 正确答案格式化为 "Option X"
fn format_correct_answer(marker: &str) -> String {
    format!("Option {}", marker)
}

/// 参考资料编号后用换行拼接
fn format_references(references: &[String]) -> String {
    references
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r))
        .collect::<Vec<String>>()
        .join("\n")
}

/// RFC 4180 风格的字段转义
///
/// 含逗号、引号或换行的字段加引号包裹，内部引号翻倍
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;
    use chrono::Local;

    fn sample_question() -> Question {
        Question {
            question_id: "qid-123".to_string(),
            test_section: "Main Subject".to_string(),
            main_topic: "Material Science".to_string(),
            subtopic: "Crystal Structure".to_string(),
            difficulty: Difficulty::Easy,
            question_text_en: "What is the coordination number in an FCC structure?".to_string(),
            option_a_en: "12".to_string(),
            option_b_en: "8".to_string(),
            option_c_en: "6".to_string(),
            option_d_en: "4".to_string(),
            correct_answer: "A".to_string(),
            explanation: "Each atom in FCC has 12 nearest neighbors, hence 12.".to_string(),
            references: vec![
                "https://en.wikipedia.org/wiki/Cubic_crystal_system".to_string(),
                "Callister, Chapter 3".to_string(),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_header_line_matches_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export_questions_to_csv(&[sample_question()], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header.split(',').count(), 19);
        assert!(header.starts_with("Test Section,Main Topic,Sub-topic,Difficulty Level"));
        assert!(header.contains("Translation for options required?"));
        assert!(header.ends_with("Correct Answer,Solution/Workout/Explanation,Reference(s)"));
    }

    #[test]
    fn test_row_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export_questions_to_csv(&[sample_question()], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert!(row.contains("qid-123"));
        assert!(row.contains("Option A"));
        assert!(row.contains("Easy"));
    }

    #[test]
    fn test_references_numbered_and_newline_joined() {
        let refs = vec!["First source".to_string(), "Second source".to_string()];
        assert_eq!(
            format_references(&refs),
            "1. First source\n2. Second source"
        );
        assert_eq!(format_references(&[]), "");
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_comma_in_question_preserved() {
        let mut q = sample_question();
        q.question_text_en = "In FCC, BCC and HCP, which has the highest packing?".to_string();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export_questions_to_csv(&[q], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"In FCC, BCC and HCP, which has the highest packing?\""));
    }

    #[test]
    fn test_export_paper_writes_all_questions() {
        let paper = Paper {
            paper_id: "p1".to_string(),
            paper_name: "Mock".to_string(),
            subject: "Metallurgy".to_string(),
            questions: vec![sample_question(), sample_question()],
            created_at: Local::now(),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.csv");
        export_paper_to_csv(&paper, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        // 表头 1 行 + 每题 2 行（参考资料字段带一个内嵌换行）
        assert_eq!(content.lines().count(), 5);
    }
}
