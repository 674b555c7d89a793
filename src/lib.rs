//! # MCQ Paper Gen
//!
//! 一个调用本地 LLM / VLM 生成选择题试卷的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 持有模型端点连接，只暴露"调用一次模型"的能力
//! - `LlmClient` - 文本模型调用（OpenAI 兼容端点）
//! - `VlmClient` - 视觉模型调用（Ollama 原生端点，base64 图片）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `McqGenerator` / `MultimodalGenerator` - 有界重试的生成循环
//! - `QuestionBank` - 跨试卷去重的持久化题库
//! - `PaperStore` / `csv_exporter` - 试卷落盘与导出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个版块"的完整生成流程
//! - `SectionBuilder` - 题量拆分 → 逐单元生成 → 版块名盖章
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/paper_assembler` - 单份试卷组装，题库登记
//! - `orchestrator/app` - 批量规格处理，持久化与统计
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{LlmClient, MockVlmClient, TextModel, VisionModel, VlmClient};
pub use config::{Config, GenerationConfig};
pub use error::{AppError, Result};
pub use models::{Difficulty, Paper, PaperSpec, Question, SectionSpec, TextImagePair, TopicSpec};
pub use orchestrator::{App, PaperAssembler};
pub use services::{McqGenerator, MultimodalGenerator, PaperStore, QuestionBank};
pub use workflow::SectionBuilder;
