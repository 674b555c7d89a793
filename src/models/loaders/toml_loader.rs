use crate::models::paper::PaperSpec;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载试卷规格
pub async fn load_toml_to_paper_spec(spec_file_path: &Path) -> Result<PaperSpec> {
    let content = fs::read_to_string(spec_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", spec_file_path.display()))?;

    let spec: PaperSpec = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", spec_file_path.display()))?;

    Ok(spec)
}

/// 从文件夹中加载所有试卷规格
///
/// 单个文件解析失败只记录警告并跳过，不影响其他文件
pub async fn load_all_paper_specs(folder_path: &str) -> Result<Vec<PaperSpec>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut specs = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_toml_to_paper_spec(&path).await {
                Ok(spec) => {
                    tracing::info!(
                        "成功加载试卷规格: {} ({} 题)",
                        spec.paper_name,
                        spec.total_questions()
                    );
                    specs.push(spec);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;
    use std::io::Write;

    const SAMPLE_SPEC: &str = r#"
paper_name = "Sample Exam 2026"
subject = "Metallurgical Engineering"

[[sections]]
name = "Main Subject"
question_count = 5
topics = [
    { main_topic = "Material Science", subtopic = "Crystal Structure" },
    { main_topic = "Thermodynamics", subtopic = "Phase Diagrams" },
]

[sections.difficulty_distribution]
Easy = 3
Medium = 2
"#;

    #[tokio::test]
    async fn test_load_paper_spec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.toml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(SAMPLE_SPEC.as_bytes())
            .unwrap();

        let spec = load_toml_to_paper_spec(&path).await.unwrap();
        assert_eq!(spec.paper_name, "Sample Exam 2026");
        assert_eq!(spec.sections.len(), 1);
        assert_eq!(spec.sections[0].topics.len(), 2);
        assert_eq!(
            spec.sections[0].difficulty_distribution[&Difficulty::Easy],
            3
        );
        assert_eq!(spec.total_questions(), 5);
    }

    #[tokio::test]
    async fn test_unknown_difficulty_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        let content = SAMPLE_SPEC.replace("Easy = 3", "Extreme = 3");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();

        assert!(load_toml_to_paper_spec(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_load_all_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::File::create(dir.path().join("good.toml"))
            .unwrap()
            .write_all(SAMPLE_SPEC.as_bytes())
            .unwrap();
        std::fs::File::create(dir.path().join("broken.toml"))
            .unwrap()
            .write_all(b"paper_name = ")
            .unwrap();

        let specs = load_all_paper_specs(dir.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(specs.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_folder_is_error() {
        assert!(load_all_paper_specs("/no/such/folder").await.is_err());
    }
}
