//! 区块标记生成 - 业务能力层
//!
//! 对每个区域单独裁剪截图，让视觉模型复刻这一块的 HTML + Tailwind。
//! 任何失败都只影响当前区块：结果记为 `BlockOutcome::Failed`，不向上传播。

use image::DynamicImage;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::clients::VisionModel;
use crate::error::AppResult;
use crate::infrastructure::image_codec;
use crate::models::{BlockOutcome, LayoutBlock, PixelBox, RegionLabel};
use crate::utils::truncate_text;

/// 单个区块的生成提示词
pub fn block_prompt(name: &str) -> String {
    format!(
        r#"This is a screenshot of a {name} container.
Please fill in complete HTML and Tailwind CSS code to accurately reproduce this container.
Ensure all elements' positions, layout, text, and colors match the original screenshot.

<div>
your code here
</div>

Only return the code within the <div> and </div> tags."#,
        name = name
    )
}

/// 代码块匹配顺序：先 html，再任意语言
const FENCE_PATTERNS: [&str; 2] = [
    r"(?is)```html[ \t]*\r?\n?(.*?)(?:```|\z)",
    r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)(?:```|\z)",
];

fn fences() -> &'static [Regex] {
    static FENCES: OnceLock<Vec<Regex>> = OnceLock::new();
    FENCES.get_or_init(|| {
        FENCE_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

/// 从模型回复中提取标记
///
/// 优先取 ```` ```html ```` 代码块，其次取第一个任意代码块，都没有时使用整段回复。
pub fn extract_html(response: &str) -> String {
    let captured = fences()
        .iter()
        .find_map(|re| re.captures(response))
        .and_then(|caps| caps.get(1));

    match captured {
        Some(m) => m.as_str().trim().to_string(),
        None => response.trim().to_string(),
    }
}

/// 区块标记生成器
pub struct BlockSynthesizer {
    vision: Arc<dyn VisionModel>,
    model: String,
}

impl BlockSynthesizer {
    pub fn new(vision: Arc<dyn VisionModel>, model: impl Into<String>) -> Self {
        Self {
            vision,
            model: model.into(),
        }
    }

    /// 生成一个区块，永不失败
    pub async fn synthesize(
        &self,
        image: &DynamicImage,
        label: RegionLabel,
        bbox: PixelBox,
    ) -> LayoutBlock {
        let outcome = match self.generate(image, label.as_str(), &bbox).await {
            Ok(html) if !html.trim().is_empty() => BlockOutcome::Generated(html),
            Ok(_) => {
                warn!("⚠️ 区块 '{}' 生成结果为空", label);
                BlockOutcome::Failed {
                    reason: "empty markup".to_string(),
                }
            }
            Err(e) => {
                warn!("⚠️ 区块 '{}' 生成失败: {}", label, e);
                BlockOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        LayoutBlock::new(label, bbox, outcome)
    }

    async fn generate(&self, image: &DynamicImage, name: &str, bbox: &PixelBox) -> AppResult<String> {
        let cropped = image_codec::crop(image, bbox);
        let data_url = image_codec::to_data_url(&cropped)?;

        debug!(
            "🎨 生成区块 '{}' ({}x{})",
            name,
            cropped.width(),
            cropped.height()
        );

        let response = self
            .vision
            .complete(&self.model, &data_url, &block_prompt(name))
            .await?;
        debug!("区块 '{}' 模型响应: {}", name, truncate_text(&response, 200));

        Ok(extract_html(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use image::RgbaImage;

    /// `None` 表示模型调用失败
    struct FixedModel(Option<&'static str>);

    #[async_trait]
    impl VisionModel for FixedModel {
        async fn complete(&self, _model: &str, _image: &str, prompt: &str) -> AppResult<String> {
            assert!(prompt.starts_with("This is a screenshot of a "));
            match self.0 {
                Some(text) => Ok(text.to_string()),
                None => Err(AppError::vision_call_failed(
                    "gpt-4o",
                    std::io::Error::new(std::io::ErrorKind::Other, "model offline"),
                )),
            }
        }
    }

    fn screenshot() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::new(800, 600))
    }

    #[test]
    fn test_block_prompt() {
        let prompt = block_prompt("main content");
        assert!(prompt.starts_with("This is a screenshot of a main content container."));
        assert!(prompt.ends_with("Only return the code within the <div> and </div> tags."));
    }

    #[test]
    fn test_extract_html_fence() {
        let response = "Here you go:\n```html\n<div class=\"p-4\">Hi</div>\n```\nEnjoy!";
        assert_eq!(extract_html(response), "<div class=\"p-4\">Hi</div>");
    }

    #[test]
    fn test_extract_html_prefers_html_fence() {
        let response = "```css\n.a{}\n```\n```HTML\n<nav>x</nav>\n```";
        assert_eq!(extract_html(response), "<nav>x</nav>");
    }

    #[test]
    fn test_extract_generic_fence() {
        let response = "```\n<div>plain</div>\n```";
        assert_eq!(extract_html(response), "<div>plain</div>");
    }

    #[test]
    fn test_extract_unclosed_fence_and_raw() {
        assert_eq!(extract_html("```html\n<div>cut off"), "<div>cut off");
        assert_eq!(extract_html("  <div>raw</div>  "), "<div>raw</div>");
    }

    #[tokio::test]
    async fn test_synthesize_generated() {
        let synth = BlockSynthesizer::new(
            Arc::new(FixedModel(Some("```html\n<header>Logo</header>\n```"))),
            "gpt-4o",
        );
        let block = synth
            .synthesize(
                &screenshot(),
                RegionLabel::from_label("header"),
                PixelBox::new(0, 0, 800, 100),
            )
            .await;

        assert_eq!(block.outcome, BlockOutcome::Generated("<header>Logo</header>".to_string()));
    }

    #[tokio::test]
    async fn test_synthesize_failure_is_captured() {
        let synth = BlockSynthesizer::new(Arc::new(FixedModel(None)), "gpt-4o");
        let block = synth
            .synthesize(
                &screenshot(),
                RegionLabel::from_label("sidebar"),
                PixelBox::new(0, 100, 200, 600),
            )
            .await;

        assert!(block.is_failed());
        assert_eq!(block.html(), "<div><!-- sidebar: generation failed --></div>");
    }

    #[tokio::test]
    async fn test_synthesize_empty_markup_is_failure() {
        let synth = BlockSynthesizer::new(Arc::new(FixedModel(Some("```html\n\n```"))), "gpt-4o");
        let block = synth
            .synthesize(
                &screenshot(),
                RegionLabel::from_label("footer"),
                PixelBox::new(0, 500, 800, 600),
            )
            .await;

        assert!(block.is_failed());
    }
}
