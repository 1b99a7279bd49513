//! 基础设施层
//!
//! 只暴露能力，不认识区域、元素等业务概念：
//! - `image_fetcher`：下载图片
//! - `workspace`：请求级临时目录
//! - `image_codec`：解码、裁剪、PNG / data URL 编码

pub mod image_codec;
pub mod image_fetcher;
pub mod workspace;

pub use image_fetcher::{FetchedImage, ImageFetcher};
pub use workspace::RequestWorkspace;
