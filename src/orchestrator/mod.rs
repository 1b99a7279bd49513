//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责 HTTP 接入和依赖装配，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `server` - 应用与共享状态
//! - 管理应用生命周期（初始化、运行）
//! - 构造视觉模型与检测器客户端，装入 `AppState`
//!
//! ### `routes` - 路由与中间件
//! - 五个接口、CORS、请求追踪
//!
//! ### `handlers` - 处理函数
//! - 校验请求、检查后端、委托给流程层
//!
//! ## 层次关系
//!
//! ```text
//! server / routes (HTTP 接入)
//!     ↓
//! handlers (校验 + 后端检查)
//!     ↓
//! workflow::{LayoutFlow, ComponentsFlow, ClassicalDetectionFlow}
//!     ↓
//! services (能力层：解析 / 分类 / 生成 / 组装)
//!     ↓
//! clients + infrastructure (视觉模型、检测器、下载、临时目录)
//! ```

pub mod handlers;
pub mod routes;
pub mod server;

// 重新导出主要类型
pub use routes::create_router;
pub use server::{App, AppState};
