//! 组件检测流程 - 流程层
//!
//! 两条互相独立的路径：
//! - `ClassicalDetectionFlow`：下载 → 落盘 → 外部检测器 → 分类过滤
//! - `ComponentsFlow`：下载 → 快速视觉模型 → 区域 / 元素分类

use reqwest::Url;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::request_ctx::RequestCtx;
use super::stage::Stage;
use crate::clients::{ComponentDetector, VisionModel};
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{image_codec, ImageFetcher, RequestWorkspace};
use crate::models::api::{ComponentsMetadata, ComponentsResponse, DetectResponse};
use crate::models::DetectedElement;
use crate::services::region_classifier::{self, LabelClass};
use crate::services::{component_service, LayoutParser};

/// 经典检测流程
pub struct ClassicalDetectionFlow {
    fetcher: ImageFetcher,
    detector: Arc<dyn ComponentDetector>,
    temp_root: Option<PathBuf>,
}

impl ClassicalDetectionFlow {
    pub fn new(config: &Config, detector: Arc<dyn ComponentDetector>) -> AppResult<Self> {
        Ok(Self {
            fetcher: ImageFetcher::from_config(config)?,
            detector,
            temp_root: config.temp_dir.clone(),
        })
    }

    pub async fn run(
        &self,
        url: &Url,
        include_labels: bool,
        min_confidence: f64,
        ctx: &RequestCtx,
    ) -> AppResult<DetectResponse> {
        Stage::Downloading.enter(ctx);
        let fetched = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| Stage::Downloading.fail(ctx, e))?;
        let workspace = RequestWorkspace::create(self.temp_root.as_deref(), url, &fetched)
            .map_err(|e| Stage::Downloading.fail(ctx, e))?;
        let (width, height) = workspace.dimensions();

        if include_labels {
            info!("{} ℹ️ 不做文字识别，标签取自检测器自带的文字内容", ctx);
        }

        Stage::DetectingComponents.enter(ctx);
        let compos = self
            .detector
            .detect(workspace.image_path(), workspace.dir())
            .await
            .map_err(|e| Stage::DetectingComponents.fail(ctx, e))?;

        let elements = component_service::to_elements(&compos, width, height);
        let elements = component_service::filter_by_confidence(elements, min_confidence);

        Stage::Done.enter(ctx);
        info!(
            "{} 检测完成: {} 个原始组件 → {} 个元素",
            ctx,
            compos.len(),
            elements.len()
        );

        Ok(DetectResponse {
            count: elements.len(),
            elements,
            image_width: width,
            image_height: height,
            method: "classical-detection",
        })
        // workspace 在此 drop，临时目录随之删除
    }
}

/// 快速视觉模型检测流程
pub struct ComponentsFlow {
    fetcher: ImageFetcher,
    parser: LayoutParser,
}

impl ComponentsFlow {
    pub fn new(config: &Config, vision: Arc<dyn VisionModel>) -> AppResult<Self> {
        Ok(Self {
            fetcher: ImageFetcher::from_config(config)?,
            parser: LayoutParser::new(
                vision,
                config.fast_vision_model.clone(),
                config.block_prompt_strategy,
            ),
        })
    }

    pub async fn run(&self, url: &Url, ctx: &RequestCtx) -> AppResult<ComponentsResponse> {
        Stage::Downloading.enter(ctx);
        let fetched = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| Stage::Downloading.fail(ctx, e))?;
        let image = image_codec::decode(&fetched.bytes).map_err(|e| Stage::Downloading.fail(ctx, e))?;
        let (width, height) = (image.width(), image.height());

        Stage::Detecting.enter(ctx);
        let bboxes = self.parser.parse_components(&image).await.map_err(|e| {
            let stage = if e.is_empty_result() {
                Stage::ParsingRegions
            } else {
                Stage::Detecting
            };
            stage.fail(ctx, e)
        })?;

        let mut regions_detected = Vec::new();
        let mut elements = Vec::new();
        for (idx, (name, bbox)) in bboxes.iter().enumerate() {
            match region_classifier::classify_label(name) {
                LabelClass::Region(label) => regions_detected.push(label.as_str().to_string()),
                LabelClass::Element(category) => elements.push(DetectedElement::detected(
                    category,
                    name,
                    bbox.to_percentage(width, height),
                    idx,
                )),
            }
        }

        Stage::Done.enter(ctx);
        info!(
            "{} 快速检测完成: {} 个区域，{} 个元素",
            ctx,
            regions_detected.len(),
            elements.len()
        );

        Ok(ComponentsResponse {
            count: elements.len(),
            elements,
            bboxes,
            metadata: ComponentsMetadata {
                image_width: width,
                image_height: height,
                model: self.parser.model().to_string(),
                regions_detected,
            },
            method: "fast-vision-model",
        })
    }
}
