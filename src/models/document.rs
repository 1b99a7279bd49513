use serde::Serialize;

use super::geometry::PixelBox;
use super::region::{RegionLabel, RegionMap};

/// 单个区块的生成结果
///
/// 区块生成失败不会中断整个请求，而是以 `Failed` 交给组装器统一处理。
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    Generated(String),
    Failed { reason: String },
}

/// 区块生成失败时使用的占位标记
pub fn placeholder(name: &str) -> String {
    // 注释里不能出现 `--`
    format!(
        "<div><!-- {}: generation failed --></div>",
        name.replace("--", "- -")
    )
}

/// 布局区块
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBlock {
    pub label: RegionLabel,
    pub bbox: PixelBox,
    pub outcome: BlockOutcome,
}

impl LayoutBlock {
    pub fn new(label: RegionLabel, bbox: PixelBox, outcome: BlockOutcome) -> Self {
        Self {
            label,
            bbox,
            outcome,
        }
    }

    pub fn name(&self) -> &str {
        self.label.as_str()
    }

    /// 生成的标记，失败时为占位标记
    pub fn html(&self) -> String {
        match &self.outcome {
            BlockOutcome::Generated(html) => html.clone(),
            BlockOutcome::Failed { .. } => placeholder(self.name()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, BlockOutcome::Failed { .. })
    }
}

/// 布局生成的元数据
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetadata {
    pub image_width: u32,
    pub image_height: u32,
    pub method: &'static str,
    pub model: String,
    /// 按检测顺序排列的区域名
    pub blocks_detected: Vec<String>,
    pub failed_blocks: Vec<String>,
    pub generated_at: String,
}

/// 最终返回给调用方的文档
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocument {
    pub html: String,
    pub blocks: RegionMap<String>,
    pub bboxes: RegionMap<PixelBox>,
    pub metadata: LayoutMetadata,
}
