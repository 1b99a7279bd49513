//! HTTP 请求 / 响应结构（JSON，camelCase）

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::element::DetectedElement;
use super::geometry::PixelBox;
use super::region::RegionMap;
use crate::error::{AppError, AppResult};

fn default_true() -> bool {
    true
}

/// `POST /detect`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    pub image_url: Option<String>,
    /// 是否提取文字标签（当前不做文字识别，只记录日志）
    #[serde(default = "default_true")]
    pub include_labels: bool,
    #[serde(default)]
    pub min_confidence: f64,
}

/// `POST /detect-components`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentsRequest {
    pub image_url: Option<String>,
}

/// `POST /generate-layout`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub include_full_page: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    pub elements: Vec<DetectedElement>,
    pub count: usize,
    pub image_width: u32,
    pub image_height: u32,
    pub method: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentsMetadata {
    pub image_width: u32,
    pub image_height: u32,
    pub model: String,
    pub regions_detected: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentsResponse {
    pub elements: Vec<DetectedElement>,
    pub count: usize,
    /// 所有解析出的像素框（区域 + 元素）
    pub bboxes: RegionMap<PixelBox>,
    pub metadata: ComponentsMetadata,
    pub method: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub detector_available: bool,
    pub layout_backend_available: bool,
    pub model_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// 校验 `imageUrl`：必填，且必须是 http/https 绝对地址
pub fn require_image_url(raw: Option<&str>) -> AppResult<Url> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::missing_field("imageUrl"))?;

    let url = Url::parse(raw).map_err(|e| AppError::invalid_url(raw, e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::invalid_url(
            raw,
            format!("不支持的协议: {}", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_require_image_url() {
        let url = require_image_url(Some(" https://cdn.example.com/shot.png ")).unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.com"));
    }

    #[test]
    fn test_require_image_url_rejects_bad_input() {
        for raw in [None, Some(""), Some("   "), Some("not a url"), Some("ftp://x/y.png")] {
            let err = require_image_url(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadInput, "{raw:?}");
        }
    }

    #[test]
    fn test_request_defaults() {
        let req: DetectRequest =
            serde_json::from_str(r#"{"imageUrl":"https://x/y.png"}"#).unwrap();
        assert!(req.include_labels);
        assert_eq!(req.min_confidence, 0.0);

        let req: LayoutRequest = serde_json::from_str(r#"{"imageUrl":"https://x/y.png"}"#).unwrap();
        assert!(req.include_full_page);

        let req: LayoutRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(req.image_url.is_none());
    }
}
