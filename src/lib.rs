//! # ScreenCoder Service
//!
//! 一个把界面截图转换为 UI 元素列表或 HTML 布局的后端服务
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `infrastructure/` - 下载图片、请求级临时目录、图片编解码
//! - `clients/` - 视觉模型（`VisionModel`）与经典检测器（`ComponentDetector`）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单一数据
//! - `bbox_parser` - 解析模型返回的 `<bbox>` 文本
//! - `region_classifier` - 元素类别与区域分类
//! - `block_synthesizer` / `block_assembler` - 逐区块生成与固定槽位组装
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个请求"的完整处理流程
//! - `RequestCtx` - 上下文封装（请求 ID + 接口名）
//! - `LayoutFlow` - 下载 → 区域划分 → 并发生成 → 组装
//! - `ClassicalDetectionFlow` / `ComponentsFlow` - 两条组件检测路径
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/server` - 应用初始化、依赖注入、启动服务
//! - `orchestrator/handlers` - 请求校验与后端检查
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ComponentDetector, RawComponent, VisionModel};
pub use config::{BlockPromptStrategy, Config};
pub use error::{AppError, AppResult, ErrorKind};
pub use models::{DetectedElement, ElementCategory, GeneratedDocument, PixelBox, RegionLabel};
pub use orchestrator::{create_router, App, AppState};
pub use workflow::{LayoutFlow, RequestCtx};
