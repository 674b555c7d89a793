//! 应用主流程 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：加载配置、创建模型客户端、加载题库
//! 2. **批量加载**：扫描规格目录下的全部试卷规格（`Vec<PaperSpec>`）
//! 3. **串行处理**：一份接一份地构建试卷（模型端点只有一个，没有并发）
//! 4. **持久化**：每份试卷写入存储并导出 CSV
//! 5. **全局统计**：汇总成功 / 失败数量

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::clients::{LlmClient, VlmClient};
use crate::config::Config;
use crate::models::load_all_paper_specs;
use crate::models::paper::PaperSpec;
use crate::orchestrator::paper_assembler::PaperAssembler;
use crate::services::csv_exporter::export_paper_to_csv;
use crate::services::paper_store::PaperStore;
use crate::services::question_bank::QuestionBank;

/// 处理统计
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

/// 应用主结构
pub struct App {
    config: Config,
    assembler: PaperAssembler<LlmClient, VlmClient>,
    store: PaperStore,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let text_model = LlmClient::new(&config);
        let vision_model = VlmClient::new(&config).context("初始化 VLM 客户端失败")?;
        let question_bank =
            QuestionBank::load(&config.bank_state_file).context("加载题库状态失败")?;
        let store = PaperStore::new(&config.papers_dir).context("打开试卷存储失败")?;

        let assembler = PaperAssembler::new(
            text_model,
            vision_model,
            config.generation.clone(),
            question_bank,
        );

        Ok(Self {
            config,
            assembler,
            store,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<()> {
        info!("\n📁 正在扫描试卷规格目录...");
        let specs = load_all_paper_specs(&self.config.spec_folder).await?;

        if specs.is_empty() {
            warn!("⚠️ 没有找到试卷规格文件，程序结束");
            return Ok(());
        }

        info!("✓ 找到 {} 份试卷规格，逐份串行处理\n", specs.len());

        std::fs::create_dir_all(&self.config.export_dir)
            .with_context(|| format!("无法创建导出目录: {}", self.config.export_dir))?;

        let mut stats = ProcessingStats {
            total: specs.len(),
            ..Default::default()
        };

        for (index, spec) in specs.iter().enumerate() {
            info!("\n{}", "=".repeat(60));
            info!("📦 处理第 {}/{} 份试卷规格", index + 1, stats.total);

            match self.process_spec(spec).await {
                Ok(_) => stats.success += 1,
                Err(e) => {
                    error!("试卷 {} 构建失败: {}", spec.paper_name, e);
                    stats.failed += 1;
                }
            }
        }

        print_final_stats(&stats);
        Ok(())
    }

    /// 构建一份试卷并落盘
    async fn process_spec(&mut self, spec: &PaperSpec) -> Result<()> {
        // 图表配对由 PDF 提取协作方提供；纯规格驱动的运行没有图片
        let paper = self.assembler.build_paper(spec, None).await?;

        self.store.save_paper(&paper)?;

        let csv_path = self.csv_export_path(&paper.paper_name, &paper.paper_id);
        export_paper_to_csv(&paper, &csv_path)?;
        self.store.record_csv_path(&paper.paper_id, &csv_path)?;

        Ok(())
    }

    fn csv_export_path(&self, paper_name: &str, paper_id: &str) -> PathBuf {
        // 文件名里只保留安全字符，碰撞靠 ID 前缀避免
        let safe_name: String = paper_name
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        let short_id: String = paper_id.chars().take(8).collect();
        PathBuf::from(&self.config.export_dir).join(format!("{}_{}.csv", safe_name, short_id))
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 试卷生成流水线");
    info!("📊 文本模型: {} @ {}", config.llm_model_name, config.llm_api_base_url);
    info!("📊 视觉模型: {} @ {}", config.vlm_model_name, config.vlm_base_url);
    info!("📁 规格目录: {}", config.spec_folder);
    info!("{}", "=".repeat(60));
}

fn print_final_stats(stats: &ProcessingStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    info!("❌ 失败: {}", stats.failed);
    info!("{}", "=".repeat(60));
}
