//! 区块解析 - 业务能力层
//!
//! 一次视觉模型调用把整张截图划分为互不重叠的区域：
//! 构造提示词 → 调用模型 → 解析 `<bbox>` 行 → 空结果报错。

use image::DynamicImage;
use std::sync::Arc;
use tracing::{debug, info};

use crate::clients::VisionModel;
use crate::config::BlockPromptStrategy;
use crate::error::{AppError, AppResult};
use crate::infrastructure::image_codec;
use crate::models::{PixelBox, RegionMap};
use crate::services::bbox_parser;
use crate::utils::truncate_text;

/// 自由标签的区块解析提示词
pub fn free_block_prompt(width: u32, height: u32) -> String {
    format!(
        r#"You are a UI layout analyzer. Analyze this screenshot and identify major UI regions.

For EACH distinct region you identify, provide:
1. A label (header, navigation, sidebar, main content, footer, or other descriptive name)
2. Its bounding box coordinates in the format: <bbox>x1 y1 x2 y2</bbox>

Coordinates are in pixels. Image dimensions: {w}x{h} pixels.

Rules:
- x1,y1 = top-left corner coordinates
- x2,y2 = bottom-right corner coordinates
- Regions should NOT overlap
- Include ALL visible content within regions
- Be precise with coordinates

Example format:
header <bbox>0 0 {w} 100</bbox>
main content <bbox>0 100 {w} 800</bbox>

Now analyze this UI screenshot and provide labeled bounding boxes:"#,
        w = width,
        h = height
    )
}

/// 固定四类区域的区块解析提示词
pub fn canonical_block_prompt(width: u32, height: u32) -> String {
    format!(
        r#"Return the bounding boxes of the header, sidebar, navigation and main content of this web page screenshot.

Image dimensions: {w}x{h} pixels. Use pixel coordinates, one region per line, in exactly this format:
header <bbox>x1 y1 x2 y2</bbox>
sidebar <bbox>x1 y1 x2 y2</bbox>
navigation <bbox>x1 y1 x2 y2</bbox>
main content <bbox>x1 y1 x2 y2</bbox>

Rules:
- x1,y1 = top-left corner, x2,y2 = bottom-right corner
- Regions must NOT overlap
- Omit a region entirely if the page does not have it
- Output nothing except these lines"#,
        w = width,
        h = height
    )
}

/// 组件快速检测的提示词：区域与元素一起给出
pub fn component_prompt(width: u32, height: u32) -> String {
    format!(
        r#"You are a UI component detector. Identify the page regions and the interactive UI elements in this screenshot.

Regions use these labels: header, navigation, sidebar, main content, footer.
Elements use a short descriptive label that names their type, for example "login button", "search input", "settings icon", "pricing card", "docs link", "profile tab", "hero image".
Every label must be unique; add a distinguishing word when the same type appears more than once (e.g. "primary button", "secondary button").

Image dimensions: {w}x{h} pixels. One item per line, in exactly this format:
<label> <bbox>x1 y1 x2 y2</bbox>

x1,y1 = top-left corner, x2,y2 = bottom-right corner, in pixels. Output nothing except these lines."#,
        w = width,
        h = height
    )
}

/// 按策略选择区块解析提示词
pub fn block_parsing_prompt(strategy: BlockPromptStrategy, width: u32, height: u32) -> String {
    match strategy {
        BlockPromptStrategy::Free => free_block_prompt(width, height),
        BlockPromptStrategy::Canonical => canonical_block_prompt(width, height),
    }
}

/// 区块解析器
pub struct LayoutParser {
    vision: Arc<dyn VisionModel>,
    model: String,
    strategy: BlockPromptStrategy,
}

impl LayoutParser {
    pub fn new(vision: Arc<dyn VisionModel>, model: impl Into<String>, strategy: BlockPromptStrategy) -> Self {
        Self {
            vision,
            model: model.into(),
            strategy,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 布局区块解析
    ///
    /// # 返回
    /// 按检测顺序排列的 区域名 → 像素框；一个区域都没有时返回 `EmptyResult`
    pub async fn parse_blocks(&self, image: &DynamicImage) -> AppResult<RegionMap<PixelBox>> {
        let prompt = block_parsing_prompt(self.strategy, image.width(), image.height());
        self.parse(image, &prompt, self.strategy, "布局区块").await
    }

    /// 组件快速检测：区域和元素使用同一种行格式
    pub async fn parse_components(&self, image: &DynamicImage) -> AppResult<RegionMap<PixelBox>> {
        let prompt = component_prompt(image.width(), image.height());
        self.parse(image, &prompt, BlockPromptStrategy::Free, "界面组件")
            .await
    }

    async fn parse(
        &self,
        image: &DynamicImage,
        prompt: &str,
        strategy: BlockPromptStrategy,
        what: &str,
    ) -> AppResult<RegionMap<PixelBox>> {
        let (width, height) = (image.width(), image.height());
        let data_url = image_codec::to_data_url(image)?;

        let response = self.vision.complete(&self.model, &data_url, prompt).await?;
        debug!("🤖 模型响应: {}", truncate_text(&response, 500));

        let boxes = bbox_parser::parse_with_strategy(strategy, &response, width, height);
        if boxes.is_empty() {
            return Err(AppError::empty_result(what));
        }

        info!(
            "✓ 解析出 {} 个{}: {:?}",
            boxes.len(),
            what,
            boxes.keys().map(String::as_str).collect::<Vec<_>>()
        );

        Ok(boxes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::RgbaImage;
    use std::sync::Mutex;

    /// 固定返回同一段文本，并记录收到的提示词
    struct ScriptedModel {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl VisionModel for ScriptedModel {
        async fn complete(&self, _model: &str, image_data_url: &str, prompt: &str) -> AppResult<String> {
            assert!(image_data_url.starts_with("data:image/png;base64,"));
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn screenshot() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::new(800, 600))
    }

    #[test]
    fn test_prompts_carry_dimensions() {
        assert!(free_block_prompt(800, 600).contains("Image dimensions: 800x600 pixels."));
        assert!(free_block_prompt(800, 600).contains("header <bbox>0 0 800 100</bbox>"));
        assert!(canonical_block_prompt(1280, 720).contains("1280x720"));
        assert!(component_prompt(640, 480).contains("640x480"));
    }

    #[tokio::test]
    async fn test_parse_blocks_free() {
        let model = ScriptedModel::new(
            "Header <bbox>0 0 800 100</bbox>\nmain content <bbox>0 100 800 600</bbox>\nfooter <bbox>0 600 800 700</bbox>",
        );
        let parser = LayoutParser::new(model.clone(), "gpt-4o", BlockPromptStrategy::Free);

        let boxes = parser.parse_blocks(&screenshot()).await.unwrap();
        // footer 截断后高度为 0，被丢弃
        assert_eq!(boxes.keys().map(String::as_str).collect::<Vec<_>>(), vec!["header", "main content"]);
        assert_eq!(boxes.get("main content"), Some(&PixelBox::new(0, 100, 800, 600)));

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("You are a UI layout analyzer."));
    }

    #[tokio::test]
    async fn test_parse_blocks_canonical() {
        let model = ScriptedModel::new(
            "The top nav bar <bbox>0 0 800 60</bbox>\nleft sidebar <bbox>0 60 200 600</bbox>\nhero <bbox>200 60 800 300</bbox>",
        );
        let parser = LayoutParser::new(model, "gpt-4o", BlockPromptStrategy::Canonical);

        let boxes = parser.parse_blocks(&screenshot()).await.unwrap();
        assert_eq!(boxes.keys().map(String::as_str).collect::<Vec<_>>(), vec!["navigation", "sidebar"]);
    }

    #[tokio::test]
    async fn test_empty_result_is_error() {
        let model = ScriptedModel::new("I cannot see any regions in this image.");
        let parser = LayoutParser::new(model, "gpt-4o", BlockPromptStrategy::Free);

        let err = parser.parse_blocks(&screenshot()).await.unwrap_err();
        assert!(err.is_empty_result());
    }

    #[tokio::test]
    async fn test_parse_components_uses_component_prompt() {
        let model = ScriptedModel::new("login button <bbox>10 10 110 50</bbox>");
        let parser = LayoutParser::new(model.clone(), "gpt-4o-mini", BlockPromptStrategy::Canonical);

        let boxes = parser.parse_components(&screenshot()).await.unwrap();
        // 组件检测始终使用自由标签解析
        assert_eq!(boxes.get("login button"), Some(&PixelBox::new(10, 10, 110, 50)));
        assert!(model.prompts.lock().unwrap()[0].starts_with("You are a UI component detector."));
    }
}
