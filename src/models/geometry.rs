//! 坐标模型与坐标归一化
//!
//! - `PixelBox`：像素坐标 `(x1, y1, x2, y2)`，检测器与模型的原生输出
//! - `BoundingBox`：百分比坐标 `(x, y, width, height)`，对外 API 使用
//!
//! 归一化时做截断而不是拒绝：保证 `x + width ≤ 100`、`y + height ≤ 100`。

use serde::{Deserialize, Serialize, Serializer};

/// 像素坐标框（左上角 + 右下角）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelBox {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// 把任意整数坐标截断到 `[0, width] × [0, height]`
    ///
    /// 截断后宽或高为 0 时返回 `None`。
    pub fn clamped(x1: i64, y1: i64, x2: i64, y2: i64, width: u32, height: u32) -> Option<Self> {
        let clamp = |v: i64, max: u32| v.clamp(0, i64::from(max)) as u32;

        let (x1, x2) = (clamp(x1, width), clamp(x2, width));
        let (y1, y2) = (clamp(y1, height), clamp(y2, height));

        if x2 > x1 && y2 > y1 {
            Some(Self { x1, y1, x2, y2 })
        } else {
            None
        }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    pub fn to_array(&self) -> [u32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// 转换为百分比坐标
    pub fn to_percentage(&self, image_width: u32, image_height: u32) -> BoundingBox {
        BoundingBox::from_pixels(
            f64::from(self.x1),
            f64::from(self.y1),
            f64::from(self.width()),
            f64::from(self.height()),
            image_width,
            image_height,
        )
    }
}

impl Serialize for PixelBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

/// 百分比坐标框，各分量位于 `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// 像素坐标 → 百分比坐标（保留两位小数）
    ///
    /// 图片尺寸为 0 时返回全零框。
    pub fn from_pixels(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        if image_width == 0 || image_height == 0 {
            return Self {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
            };
        }

        let (x, width) = normalize_axis(x, width, f64::from(image_width));
        let (y, height) = normalize_axis(y, height, f64::from(image_height));

        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// 单轴归一化：先截断起点，再把长度限制在剩余空间内
fn normalize_axis(start: f64, length: f64, extent: f64) -> (f64, f64) {
    let start = round2(percent(start, extent).clamp(0.0, 100.0));
    let remaining = round2(100.0 - start);
    let length = round2(percent(length, extent).clamp(0.0, 100.0)).min(remaining);
    (start, length)
}

fn percent(value: f64, extent: f64) -> f64 {
    if value.is_finite() {
        value / extent * 100.0
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
