//! 区域 / 元素分类 - 业务能力层
//!
//! 规则按固定顺序匹配，先匹配先得，全部是大小写无关的子串判断。

use crate::models::{ElementCategory, RegionLabel};

/// 文字内容中出现这些词时视为按钮
const BUTTON_TEXT_KEYWORDS: [&str; 6] = ["sign in", "log in", "submit", "continue", "next", "back"];

/// 经典检测器的类别 + 文字 → 元素类别
pub fn classify_component(class: &str, text: &str) -> ElementCategory {
    let class = class.to_lowercase();
    let text = text.to_lowercase();

    if class.contains("button") || class.contains("btn") {
        return ElementCategory::Button;
    }
    if BUTTON_TEXT_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        return ElementCategory::Button;
    }
    if class.contains("input") || class.contains("text_input") {
        return ElementCategory::Input;
    }
    if class.contains("icon") {
        return ElementCategory::Icon;
    }
    if class.contains("link") {
        return ElementCategory::Link;
    }
    if class.contains("tab") {
        return ElementCategory::Tab;
    }
    if class.contains("card") {
        return ElementCategory::Card;
    }

    ElementCategory::Other
}

/// 是否保留该元素：没有文字的 `other` 视为装饰噪声，直接丢弃
pub fn retain_component(category: ElementCategory, text: &str) -> bool {
    !(category == ElementCategory::Other && text.trim().is_empty())
}

/// 分类并过滤，被丢弃时返回 `None`
pub fn classify_and_filter(class: &str, text: &str) -> Option<ElementCategory> {
    let category = classify_component(class, text);
    retain_component(category, text).then_some(category)
}

/// 视觉模型给出的标签分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelClass {
    Region(RegionLabel),
    Element(ElementCategory),
}

/// 模型标签分类
///
/// 优先级：已知区域名 → 精确的元素类别名 → 元素规则（标签同时作为类别和文字）
pub fn classify_label(label: &str) -> LabelClass {
    if let Some(slot) = RegionLabel::slot_for(label) {
        return LabelClass::Region(RegionLabel::Slot(slot));
    }
    if let Some(category) = ElementCategory::from_name(label) {
        return LabelClass::Element(category);
    }
    LabelClass::Element(classify_component(label, label))
}
