//! 题库 - 业务能力层
//!
//! 跨试卷去重的唯一持久化状态：已使用题目 ID 的集合。
//! 构造时从磁盘加载一次，之后每次变更都整文件重写（不做增量追加）。
//! 读写失败直接向上传播，不做静默降级

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{FileError, Result};
use crate::models::question::Question;

/// 持久化的状态文件格式
#[derive(Debug, Default, Serialize, Deserialize)]
struct BankState {
    used_question_ids: Vec<String>,
}

/// 题库
///
/// 职责：
/// - 维护已使用题目 ID 的集合并保持与磁盘同步
/// - 阻止同一 ID 被重复登记
/// - 不参与生成流程，只在试卷组装完成后被动接收
pub struct QuestionBank {
    state_file: PathBuf,
    used_question_ids: HashSet<String>,
    all_questions: Vec<Question>,
}

impl QuestionBank {
    /// 从状态文件加载题库
    ///
    /// 文件不存在视为空题库；文件存在但读不了 / 解析不了是致命错误。
    /// 重复加载同一份状态得到同一个集合（幂等）
    pub fn load(state_file: impl Into<PathBuf>) -> Result<Self> {
        let state_file = state_file.into();

        let used_question_ids = if state_file.exists() {
            let content = std::fs::read_to_string(&state_file).map_err(|e| {
                FileError::ReadFailed {
                    path: state_file.display().to_string(),
                    source: e,
                }
            })?;
            let state: BankState =
                serde_json::from_str(&content).map_err(|e| FileError::JsonParseFailed {
                    path: state_file.display().to_string(),
                    source: e,
                })?;
            state.used_question_ids.into_iter().collect()
        } else {
            HashSet::new()
        };

        debug!(
            "题库已加载: {} 个已使用的题目 ID",
            used_question_ids.len()
        );

        Ok(Self {
            state_file,
            used_question_ids,
            all_questions: Vec::new(),
        })
    }

    /// 检查某个题目 ID 是否已被使用
    pub fn is_used(&self, question_id: &str) -> bool {
        self.used_question_ids.contains(question_id)
    }

    /// 已使用 ID 的数量
    pub fn used_count(&self) -> usize {
        self.used_question_ids.len()
    }

    /// 本进程内累积的题目列表
    pub fn all_questions(&self) -> &[Question] {
        &self.all_questions
    }

    /// 登记一批题目并标记为已使用
    ///
    /// 整批处理完后做一次全量持久化；已存在的 ID 不重复登记
    pub fn add_questions(&mut self, questions: &[Question]) -> Result<()> {
        for q in questions {
            if !self.used_question_ids.contains(&q.question_id) {
                self.used_question_ids.insert(q.question_id.clone());
                self.all_questions.push(q.clone());
            }
        }

        self.save_state()?;
        info!("题库已更新: 共 {} 个已使用的题目 ID", self.used_count());
        Ok(())
    }

    /// 清空题库（慎用）
    pub fn clear(&mut self) -> Result<()> {
        self.used_question_ids.clear();
        self.all_questions.clear();
        self.save_state()
    }

    /// 全量重写状态文件
    ///
    /// ID 列表排序后写出，同一集合的多次保存字节级一致
    fn save_state(&self) -> Result<()> {
        let mut ids: Vec<String> = self.used_question_ids.iter().cloned().collect();
        ids.sort();

        let state = BankState {
            used_question_ids: ids,
        };
        let content = serde_json::to_string_pretty(&state)
            .map_err(|e| FileError::JsonEncodeFailed { source: e })?;

        std::fs::write(&self.state_file, content).map_err(|e| FileError::WriteFailed {
            path: self.state_file.display().to_string(),
            source: e,
        })?;

        Ok(())
    }
}
