//! 业务能力层（Services）
//!
//! 描述"我能做什么"，每个模块只处理一种数据：
//! - `bbox_parser`：解析模型返回的 `<bbox>` 文本
//! - `region_classifier`：区域 / 元素分类与过滤
//! - `block_assembler`：按固定槽位拼装完整文档
//! - `layout_parser`：一次模型调用划分区域
//! - `block_synthesizer`：逐区块生成标记
//! - `component_service`：经典检测器结果转换

pub mod bbox_parser;
pub mod block_assembler;
pub mod block_synthesizer;
pub mod component_service;
pub mod layout_parser;
pub mod region_classifier;

pub use block_assembler::AssembleOptions;
pub use block_synthesizer::BlockSynthesizer;
pub use layout_parser::LayoutParser;
pub use region_classifier::LabelClass;
