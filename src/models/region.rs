//! 页面级区域标签
//!
//! 与 `ElementCategory` 是两套独立的枚举：区域描述页面结构槽位，
//! 元素描述小型交互控件，二者不能混用。

use indexmap::IndexMap;
use phf::phf_map;
use std::fmt;

/// 组装器认识的结构槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Header,
    Navigation,
    Sidebar,
    MainContent,
    Footer,
}

static SLOT_NAMES: phf::Map<&'static str, Slot> = phf_map! {
    "header" => Slot::Header,
    "navigation" => Slot::Navigation,
    "sidebar" => Slot::Sidebar,
    "main content" => Slot::MainContent,
    "footer" => Slot::Footer,
};

impl Slot {
    /// 标准名称（也是结果映射中的 key）
    pub fn name(self) -> &'static str {
        match self {
            Slot::Header => "header",
            Slot::Navigation => "navigation",
            Slot::Sidebar => "sidebar",
            Slot::MainContent => "main content",
            Slot::Footer => "footer",
        }
    }
}

/// 区域标签：已知槽位，或原样保留的自由名称
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegionLabel {
    Slot(Slot),
    Freeform(String),
}

impl RegionLabel {
    /// 精确匹配（忽略大小写与首尾空白），不做模糊匹配
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match SLOT_NAMES.get(normalized.as_str()) {
            Some(slot) => RegionLabel::Slot(*slot),
            None => RegionLabel::Freeform(normalized),
        }
    }

    /// 只匹配已知槽位
    pub fn slot_for(label: &str) -> Option<Slot> {
        SLOT_NAMES.get(label.trim().to_lowercase().as_str()).copied()
    }

    pub fn as_str(&self) -> &str {
        match self {
            RegionLabel::Slot(slot) => slot.name(),
            RegionLabel::Freeform(name) => name,
        }
    }

    pub fn slot(&self) -> Option<Slot> {
        match self {
            RegionLabel::Slot(slot) => Some(*slot),
            RegionLabel::Freeform(_) => None,
        }
    }
}

impl fmt::Display for RegionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 按首次出现顺序保存的 name → value 映射
///
/// 同名后写覆盖先写，但位置保持首次出现的位置；序列化为 JSON 对象时保持顺序。
pub type RegionMap<V> = IndexMap<String, V>;
