//! 试卷存储 - 业务能力层
//!
//! 每份试卷一条 JSON 记录（按 ID 命名），外加一个汇总索引文件。
//! 整文件读写，不做追加

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{FileError, Result};
use crate::models::paper::Paper;

/// 索引文件名
const INDEX_FILE: &str = "papers_index.json";

/// 索引中的试卷摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperSummary {
    pub paper_id: String,
    pub paper_name: String,
    pub subject: String,
    pub total_questions: usize,
    pub created_at: String,
    /// 导出 CSV 后回填
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_path: Option<String>,
}

/// 试卷存储
pub struct PaperStore {
    papers_dir: PathBuf,
}

impl PaperStore {
    /// 打开（必要时创建）存储目录
    pub fn new(papers_dir: impl Into<PathBuf>) -> Result<Self> {
        let papers_dir = papers_dir.into();
        std::fs::create_dir_all(&papers_dir).map_err(|e| FileError::WriteFailed {
            path: papers_dir.display().to_string(),
            source: e,
        })?;
        Ok(Self { papers_dir })
    }

    fn paper_path(&self, paper_id: &str) -> PathBuf {
        self.papers_dir.join(format!("{}.json", paper_id))
    }

    fn index_path(&self) -> PathBuf {
        self.papers_dir.join(INDEX_FILE)
    }

    /// 保存一份试卷并更新索引
    pub fn save_paper(&self, paper: &Paper) -> Result<PathBuf> {
        let path = self.paper_path(&paper.paper_id);
        write_json(&path, paper)?;

        let mut index = self.load_index()?;
        index.insert(
            paper.paper_id.clone(),
            PaperSummary {
                paper_id: paper.paper_id.clone(),
                paper_name: paper.paper_name.clone(),
                subject: paper.subject.clone(),
                total_questions: paper.questions.len(),
                created_at: paper.created_at.to_rfc3339(),
                csv_path: None,
            },
        );
        write_json(&self.index_path(), &index)?;

        info!("试卷已保存: {}", path.display());
        Ok(path)
    }

    /// 按 ID 读取一份试卷
    pub fn load_paper(&self, paper_id: &str) -> Result<Paper> {
        let path = self.paper_path(paper_id);
        if !path.exists() {
            return Err(FileError::NotFound {
                id: paper_id.to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| FileError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        let paper = serde_json::from_str(&content).map_err(|e| FileError::JsonParseFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(paper)
    }

    /// 列出所有已保存试卷的摘要
    pub fn list_papers(&self) -> Result<Vec<PaperSummary>> {
        Ok(self.load_index()?.into_values().collect())
    }

    /// 把导出 CSV 的路径回填进索引
    pub fn record_csv_path(&self, paper_id: &str, csv_path: &Path) -> Result<()> {
        let mut index = self.load_index()?;
        if let Some(summary) = index.get_mut(paper_id) {
            summary.csv_path = Some(csv_path.display().to_string());
            write_json(&self.index_path(), &index)?;
        }
        Ok(())
    }

    fn load_index(&self) -> Result<BTreeMap<String, PaperSummary>> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| FileError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        let index = serde_json::from_str(&content).map_err(|e| FileError::JsonParseFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(index)
    }
}

/// 序列化后整文件写出
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content =
        serde_json::to_string_pretty(value).map_err(|e| FileError::JsonEncodeFailed { source: e })?;
    std::fs::write(path, content).map_err(|e| FileError::WriteFailed {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
