//! 业务能力层（Services）
//!
//! 每个模块描述一种单一能力，不关心流程顺序：
//! - `prompt_builder` - 拼装模型提示词（纯函数）
//! - `response_parser` - 从模型输出中提取结构化记录（纯函数）
//! - `mcq_generator` - 文本题目生成循环
//! - `multimodal_generator` - 图表题目生成循环
//! - `question_bank` - 跨试卷去重的持久化题库
//! - `paper_store` - 试卷 JSON 记录与索引
//! - `csv_exporter` - 客户模板格式的 CSV 导出

pub mod csv_exporter;
pub mod mcq_generator;
pub mod multimodal_generator;
pub mod paper_store;
pub mod prompt_builder;
pub mod question_bank;
pub mod response_parser;

pub use csv_exporter::{export_paper_to_csv, export_questions_to_csv};
pub use mcq_generator::McqGenerator;
pub use multimodal_generator::MultimodalGenerator;
pub use paper_store::{PaperStore, PaperSummary};
pub use question_bank::QuestionBank;
pub use response_parser::parse_question_records;
