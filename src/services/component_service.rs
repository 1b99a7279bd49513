//! 经典组件检测结果处理 - 业务能力层
//!
//! 检测器原始组件 → 分类 → 过滤 → 百分比坐标的 `DetectedElement`。

use tracing::debug;

use crate::clients::RawComponent;
use crate::models::{BoundingBox, DetectedElement};
use crate::services::region_classifier;

/// 把检测器输出转换为元素列表
///
/// - 宽或高不为正的组件直接跳过
/// - 没有文字的 `other` 组件视为噪声丢弃
/// - `order_index` 保留组件在检测器输出中的原始位置
pub fn to_elements(
    compos: &[RawComponent],
    image_width: u32,
    image_height: u32,
) -> Vec<DetectedElement> {
    let mut elements = Vec::with_capacity(compos.len());
    let mut skipped = 0usize;

    for (idx, compo) in compos.iter().enumerate() {
        if compo.width <= 0.0 || compo.height <= 0.0 {
            skipped += 1;
            continue;
        }

        let Some(category) =
            region_classifier::classify_and_filter(&compo.class, &compo.text_content)
        else {
            skipped += 1;
            continue;
        };

        let bbox = BoundingBox::from_pixels(
            compo.column_min,
            compo.row_min,
            compo.width,
            compo.height,
            image_width,
            image_height,
        );

        elements.push(DetectedElement::detected(
            category,
            &compo.text_content,
            bbox,
            idx,
        ));
    }

    debug!(
        "组件转换完成: 保留 {} 个，跳过 {} 个",
        elements.len(),
        skipped
    );

    elements
}

/// 丢弃置信度低于阈值的元素
pub fn filter_by_confidence(elements: Vec<DetectedElement>, min_confidence: f64) -> Vec<DetectedElement> {
    elements
        .into_iter()
        .filter(|e| e.confidence >= min_confidence)
        .collect()
}
