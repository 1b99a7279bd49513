//! 外部后端客户端
//!
//! - `vision_client`：视觉语言模型（OpenAI 兼容 API）
//! - `detector_client`：经典组件检测器（外部程序）

pub mod detector_client;
pub mod vision_client;

pub use detector_client::{ComponentDetector, DetectorParams, RawComponent, UiedCommandDetector};
pub use vision_client::{OpenAiVisionClient, VisionModel};
