//! 流程层（Workflow）
//!
//! 定义"一个版块"的完整生成流程：题量拆分 → 逐单元生成 → 版块名盖章。
//! 不持有题库和存储，只依赖业务能力（services）

pub mod section_builder;

pub use section_builder::{allocate_topic_counts, SectionBuilder};
