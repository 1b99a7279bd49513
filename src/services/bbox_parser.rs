//! 边界框响应解析 - 业务能力层
//!
//! 视觉模型返回的是不可信的自由文本，约定的语法为每行一条：
//!
//! ```text
//! <label> <bbox>x1 y1 x2 y2</bbox>
//! ```
//!
//! 解析采取宽容模式：坏行只记录日志并跳过，不会让整个解析失败。
//! 结果为空时由调用方决定是否报错。

use std::fmt;
use tracing::{debug, warn};

use crate::config::BlockPromptStrategy;
use crate::models::{PixelBox, RegionMap, Slot};
use crate::utils::truncate_text;

const OPEN_TAG: &str = "<bbox>";
const CLOSE_TAG: &str = "</bbox>";

/// 单行解析失败的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// 没有 `<bbox>` 标签
    NoTag,
    /// 标签前没有文字
    EmptyLabel,
    /// 缺少 `</bbox>`
    Unclosed,
    /// 坐标个数不是 4
    WrongTokenCount(usize),
    /// 坐标不是整数
    NotInteger(String),
    /// 截断后框为空
    Degenerate,
    /// 不属于四个标准区域
    NotCanonical,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::NoTag => write!(f, "没有 bbox 标签"),
            LineError::EmptyLabel => write!(f, "标签为空"),
            LineError::Unclosed => write!(f, "缺少 </bbox>"),
            LineError::WrongTokenCount(n) => write!(f, "需要 4 个坐标，实际 {} 个", n),
            LineError::NotInteger(token) => write!(f, "坐标 '{}' 不是整数", token),
            LineError::Degenerate => write!(f, "截断后面积为 0"),
            LineError::NotCanonical => write!(f, "不是标准区域"),
        }
    }
}

/// 按提示词策略选择解析方式
pub fn parse_with_strategy(
    strategy: BlockPromptStrategy,
    text: &str,
    width: u32,
    height: u32,
) -> RegionMap<PixelBox> {
    match strategy {
        BlockPromptStrategy::Free => parse_bbox_response(text, width, height),
        BlockPromptStrategy::Canonical => parse_canonical_response(text, width, height),
    }
}

/// 自由标签解析：label（小写）→ 截断后的像素框
///
/// 同名标签后出现的覆盖先出现的。
pub fn parse_bbox_response(text: &str, width: u32, height: u32) -> RegionMap<PixelBox> {
    parse_lines(text, width, height, |_line, label| Ok(label.to_string()))
}

/// 标准四区域解析：按 header → sidebar → navigation → main content 的顺序做子串匹配
pub fn parse_canonical_response(text: &str, width: u32, height: u32) -> RegionMap<PixelBox> {
    parse_lines(text, width, height, |line, _label| {
        canonical_slot(line)
            .map(|slot| slot.name().to_string())
            .ok_or(LineError::NotCanonical)
    })
}

/// 子串匹配标准区域，先匹配先得
pub fn canonical_slot(line: &str) -> Option<Slot> {
    let line = line.to_lowercase();
    if line.contains("header") {
        Some(Slot::Header)
    } else if line.contains("sidebar") {
        Some(Slot::Sidebar)
    } else if line.contains("navigation") || line.contains("nav") {
        Some(Slot::Navigation)
    } else if line.contains("main content") || line.contains("main") {
        Some(Slot::MainContent)
    } else {
        None
    }
}

fn parse_lines<F>(text: &str, width: u32, height: u32, key_for: F) -> RegionMap<PixelBox>
where
    F: Fn(&str, &str) -> Result<String, LineError>,
{
    let mut boxes = RegionMap::new();

    for raw_line in text.lines() {
        let line = raw_line.trim().to_lowercase();
        if line.is_empty() {
            continue;
        }

        let parsed = parse_line(&line).and_then(|(label, coords)| {
            let key = key_for(&line, &label)?;
            let [x1, y1, x2, y2] = coords;
            let bbox = PixelBox::clamped(x1, y1, x2, y2, width, height)
                .ok_or(LineError::Degenerate)?;
            Ok((key, bbox))
        });

        match parsed {
            Ok((key, bbox)) => {
                debug!("  - {}: {:?}", key, bbox.to_array());
                if boxes.insert(key.clone(), bbox).is_some() {
                    debug!("区域 '{}' 重复出现，使用后一次的坐标", key);
                }
            }
            Err(LineError::NoTag) => {}
            Err(e) => {
                warn!("⚠️ 跳过无法解析的行 '{}': {}", truncate_text(raw_line.trim(), 120), e);
            }
        }
    }

    boxes
}

/// 解析一行（已转小写）：返回 (label, [x1, y1, x2, y2])
pub fn parse_line(line: &str) -> Result<(String, [i64; 4]), LineError> {
    let open = line.find(OPEN_TAG).ok_or(LineError::NoTag)?;

    let label = line[..open].trim();
    if label.is_empty() {
        return Err(LineError::EmptyLabel);
    }

    let inner_start = open + OPEN_TAG.len();
    let close = line[inner_start..]
        .find(CLOSE_TAG)
        .ok_or(LineError::Unclosed)?;
    let inner = &line[inner_start..inner_start + close];

    let tokens: Vec<&str> = inner.split_whitespace().collect();
    if tokens.len() != 4 {
        return Err(LineError::WrongTokenCount(tokens.len()));
    }

    let mut coords = [0i64; 4];
    for (slot, token) in coords.iter_mut().zip(&tokens) {
        *slot = parse_coordinate(token).ok_or_else(|| LineError::NotInteger(token.to_string()))?;
    }

    Ok((label.to_string(), coords))
}

/// 解析一个整数坐标；超出 i64 范围的整数饱和到边界值，之后由截断处理
fn parse_coordinate(token: &str) -> Option<i64> {
    if let Ok(value) = token.parse::<i64>() {
        return Some(value);
    }
    let (negative, digits) = match token.as_bytes().first()? {
        b'-' => (true, &token[1..]),
        b'+' => (false, &token[1..]),
        _ => (false, token),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}
