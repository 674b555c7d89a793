//! 模型响应解析 - 业务能力层
//!
//! 模型的输出经常混着客套话和格式问题，这里只做两件事：
//! 1. 从自由文本里抠出第一段括号配平的 JSON 数组（或单个对象）
//! 2. 严格解码失败时做一次有界修复（去掉收尾括号前的逗号）再试一次
//!
//! 解析是全有或全无的：要么返回记录列表，要么报 `ParseError`，
//! 不会静默丢掉一半记录。单条记录的字段校验是下游的事

use regex::Regex;
use serde_json::Value;

use crate::error::{ParseError, Result};

/// 从模型的原始输出中提取题目记录列表
pub fn parse_question_records(raw_text: &str) -> Result<Vec<Value>> {
    // 贪婪匹配：第一个 [ 到最后一个 ]，跨行
    let array_re = Regex::new(r"(?s)\[.*\]").expect("数组正则不合法");
    let object_re = Regex::new(r"(?s)\{.*\}").expect("对象正则不合法");

    let json_str = if let Some(m) = array_re.find(raw_text) {
        m.as_str().to_string()
    } else if let Some(m) = object_re.find(raw_text) {
        // 只有单个对象时包成数组
        format!("[{}]", m.as_str())
    } else {
        return Err(ParseError::NoStructuredData.into());
    };

    let data = decode_with_repair(&json_str)?;

    match data {
        Value::Array(items) => Ok(items),
        obj @ Value::Object(_) => Ok(vec![obj]),
        other => Err(ParseError::UnexpectedShape {
            found: json_type_name(&other).to_string(),
        }
        .into()),
    }
}

/// 严格解码，失败后做一次修复重试
fn decode_with_repair(json_str: &str) -> Result<Value> {
    match serde_json::from_str(json_str) {
        Ok(value) => Ok(value),
        Err(original_err) => {
            let cleaned = strip_trailing_commas(json_str);
            serde_json::from_str(&cleaned).map_err(|_| {
                ParseError::InvalidJson {
                    message: original_err.to_string(),
                }
                .into()
            })
        }
    }
}

/// 去掉 ] 或 } 前面的多余逗号
///
/// 修复范围就到这里为止，再复杂的畸形 JSON 一律按解析失败处理
fn strip_trailing_commas(json_str: &str) -> String {
    let re = Regex::new(r",(\s*[\]\}])").expect("修复正则不合法");
    re.replace_all(json_str, "$1").into_owned()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    const WELL_FORMED: &str = r#"[
        {"question_text_en": "Q1?", "correct_answer": "A"},
        {"question_text_en": "Q2?", "correct_answer": "B"}
    ]"#;

    #[test]
    fn test_plain_array() {
        let records = parse_question_records(WELL_FORMED).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["question_text_en"], "Q1?");
    }

    #[test]
    fn test_array_embedded_in_prose() {
        let raw = format!(
            "Sure! Here are the questions you asked for:\n\n{}\n\nLet me know if you need more.",
            WELL_FORMED
        );
        let records = parse_question_records(&raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["correct_answer"], "B");
    }

    #[test]
    fn test_trailing_comma_repaired() {
        let raw = r#"[
            {"question_text_en": "Q1?", "correct_answer": "A",},
        ]"#;
        let records = parse_question_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["correct_answer"], "A");
    }

    #[test]
    fn test_single_object_wrapped() {
        let raw = r#"Here it is: {"question_text_en": "Only one?", "correct_answer": "C"}"#;
        let records = parse_question_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["question_text_en"], "Only one?");
    }

    #[test]
    fn test_no_structured_data() {
        let err = parse_question_records("I could not generate any questions, sorry.").unwrap_err();
        assert!(matches!(err, AppError::Parse(ParseError::NoStructuredData)));
    }

    #[test]
    fn test_irreparable_json() {
        let err = parse_question_records(r#"["unterminated string]"#).unwrap_err();
        assert!(matches!(err, AppError::Parse(ParseError::InvalidJson { .. })));
    }

    #[test]
    fn test_empty_array_allowed() {
        // 空数组是合法解析结果，要不要重试由生成循环决定
        let records = parse_question_records("[]").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_strip_trailing_commas() {
        assert_eq!(
            strip_trailing_commas(r#"{"a": 1, }"#),
            r#"{"a": 1 }"#
        );
        assert_eq!(strip_trailing_commas("[1, 2,\n]"), "[1, 2\n]");
    }
}
