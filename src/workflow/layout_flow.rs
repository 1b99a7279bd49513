//! 布局生成流程 - 流程层
//!
//! 核心职责：定义"一张截图 → 一份 HTML 文档"的完整流程
//!
//! 流程顺序：
//! 1. 下载并解码截图
//! 2. 一次模型调用划分区域（空结果即失败）
//! 3. 各区域并发生成标记，单个区域失败只产生占位标记
//! 4. 按固定槽位组装文档

use chrono::Utc;
use futures::future::join_all;
use reqwest::Url;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::request_ctx::RequestCtx;
use super::stage::Stage;
use crate::clients::VisionModel;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{image_codec, ImageFetcher};
use crate::models::{
    GeneratedDocument, LayoutBlock, LayoutMetadata, PixelBox, RegionLabel, RegionMap,
};
use crate::services::{block_assembler, AssembleOptions, BlockSynthesizer, LayoutParser};

/// 布局生成流程
///
/// - 持有下载器、区块解析器、区块生成器
/// - 不持有任何请求级资源
pub struct LayoutFlow {
    fetcher: ImageFetcher,
    parser: LayoutParser,
    synthesizer: BlockSynthesizer,
    max_concurrent_blocks: usize,
    place_extra_regions: bool,
}

impl LayoutFlow {
    pub fn new(config: &Config, vision: Arc<dyn VisionModel>) -> AppResult<Self> {
        Ok(Self {
            fetcher: ImageFetcher::from_config(config)?,
            parser: LayoutParser::new(
                vision.clone(),
                config.vision_model.clone(),
                config.block_prompt_strategy,
            ),
            synthesizer: BlockSynthesizer::new(vision, config.vision_model.clone()),
            max_concurrent_blocks: config.max_concurrent_blocks.max(1),
            place_extra_regions: config.place_extra_regions,
        })
    }

    pub async fn run(
        &self,
        url: &Url,
        include_full_page: bool,
        ctx: &RequestCtx,
    ) -> AppResult<GeneratedDocument> {
        let started = Instant::now();

        // ========== 下载 ==========
        Stage::Downloading.enter(ctx);
        let fetched = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| Stage::Downloading.fail(ctx, e))?;
        let image = image_codec::decode(&fetched.bytes).map_err(|e| Stage::Downloading.fail(ctx, e))?;
        let (width, height) = (image.width(), image.height());
        info!("{} 截图尺寸: {}x{}", ctx, width, height);

        // ========== 区域划分 ==========
        Stage::Detecting.enter(ctx);
        let bboxes = self
            .parser
            .parse_blocks(&image)
            .await
            .map_err(|e| {
                let stage = if e.is_empty_result() {
                    Stage::ParsingRegions
                } else {
                    Stage::Detecting
                };
                stage.fail(ctx, e)
            })?;
        Stage::ParsingRegions.enter(ctx);
        info!(
            "{} 检测到 {} 个区域: {:?}",
            ctx,
            bboxes.len(),
            bboxes.keys().map(String::as_str).collect::<Vec<_>>()
        );

        // ========== 逐区块生成 ==========
        Stage::Synthesizing.enter(ctx);
        let blocks = self.synthesize_all(&image, &bboxes).await;

        let failed_blocks: Vec<String> = blocks
            .iter()
            .filter(|b| b.is_failed())
            .map(|b| b.name().to_string())
            .collect();
        if !failed_blocks.is_empty() {
            warn!(
                "{} ⚠️ {} 个区块生成失败，使用占位标记: {:?}",
                ctx,
                failed_blocks.len(),
                failed_blocks
            );
        }

        // ========== 组装 ==========
        Stage::Assembling.enter(ctx);
        let options = AssembleOptions {
            include_full_page,
            place_extra_regions: self.place_extra_regions,
        };
        let html = block_assembler::assemble_blocks(&blocks, width, height, options);

        let document = GeneratedDocument {
            html,
            blocks: blocks
                .iter()
                .map(|b| (b.name().to_string(), b.html()))
                .collect(),
            bboxes: bboxes.clone(),
            metadata: LayoutMetadata {
                image_width: width,
                image_height: height,
                method: "screencoder",
                model: self.parser.model().to_string(),
                blocks_detected: bboxes.keys().cloned().collect(),
                failed_blocks,
                generated_at: Utc::now().to_rfc3339(),
            },
        };

        Stage::Done.enter(ctx);
        info!(
            "{} 布局生成完成: {} 个区块，耗时 {:.1}s",
            ctx,
            blocks.len(),
            started.elapsed().as_secs_f64()
        );

        Ok(document)
    }

    /// 并发生成所有区块，结果保持检测顺序
    async fn synthesize_all(
        &self,
        image: &image::DynamicImage,
        bboxes: &RegionMap<PixelBox>,
    ) -> Vec<LayoutBlock> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_blocks));

        let tasks = bboxes.iter().map(|(name, bbox)| {
            let semaphore = semaphore.clone();
            let label = RegionLabel::from_label(name);
            let bbox = *bbox;
            async move {
                let _permit = semaphore.acquire().await;
                self.synthesizer.synthesize(image, label, bbox).await
            }
        });

        join_all(tasks).await
    }
}
