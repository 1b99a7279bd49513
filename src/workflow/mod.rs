//! 流程层（Workflow）
//!
//! 定义"一个请求"的完整处理流程，只依赖业务能力（services）和基础设施。

pub mod detection_flow;
pub mod layout_flow;
pub mod request_ctx;
pub mod stage;

pub use detection_flow::{ClassicalDetectionFlow, ComponentsFlow};
pub use layout_flow::LayoutFlow;
pub use request_ctx::RequestCtx;
pub use stage::Stage;
