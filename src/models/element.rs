use phf::phf_map;
use serde::Serialize;
use std::fmt;

use super::geometry::BoundingBox;

/// 元素类别（小型交互控件）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementCategory {
    Button,
    Input,
    Icon,
    Link,
    Tab,
    Card,
    Text,
    Image,
    Other,
}

static CATEGORY_NAMES: phf::Map<&'static str, ElementCategory> = phf_map! {
    "button" => ElementCategory::Button,
    "input" => ElementCategory::Input,
    "icon" => ElementCategory::Icon,
    "link" => ElementCategory::Link,
    "tab" => ElementCategory::Tab,
    "card" => ElementCategory::Card,
    "text" => ElementCategory::Text,
    "image" => ElementCategory::Image,
    "other" => ElementCategory::Other,
};

impl ElementCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementCategory::Button => "button",
            ElementCategory::Input => "input",
            ElementCategory::Icon => "icon",
            ElementCategory::Link => "link",
            ElementCategory::Tab => "tab",
            ElementCategory::Card => "card",
            ElementCategory::Text => "text",
            ElementCategory::Image => "image",
            ElementCategory::Other => "other",
        }
    }

    /// 精确解析类别名（忽略大小写）
    pub fn from_name(name: &str) -> Option<Self> {
        CATEGORY_NAMES.get(name.trim().to_lowercase().as_str()).copied()
    }
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 检测到的 UI 元素，返回后不再修改
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedElement {
    #[serde(rename = "type")]
    pub element_type: ElementCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub bounding_box: BoundingBox,
    pub confidence: f64,
    pub is_synthetic: bool,
    /// 检测器原始枚举顺序
    pub order_index: usize,
}

impl DetectedElement {
    /// 机器检测产生的元素；空标签记为 `None`
    pub fn detected(
        element_type: ElementCategory,
        label: &str,
        bounding_box: BoundingBox,
        order_index: usize,
    ) -> Self {
        let label = label.trim();
        Self {
            element_type,
            label: (!label.is_empty()).then(|| label.to_string()),
            description: Some(format!("Detected {}", element_type)),
            bounding_box,
            confidence: 1.0,
            is_synthetic: true,
            order_index,
        }
    }
}
