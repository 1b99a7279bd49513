//! HTTP 处理函数
//!
//! 只做三件事：校验请求 → 检查后端是否就绪 → 把请求交给对应流程。
//! 错误统一经 `AppError` 的 `IntoResponse` 映射为状态码。

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::server::AppState;
use crate::error::{AppResult, BackendError, InputError};
use crate::models::api::{
    require_image_url, ComponentsRequest, ComponentsResponse, DetectRequest, DetectResponse,
    HealthResponse, LayoutRequest, RootResponse,
};
use crate::models::GeneratedDocument;
use crate::workflow::RequestCtx;

/// 请求体必须是合法 JSON
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        InputError::MalformedBody {
            message: rejection.body_text(),
        }
        .into()
    })
}

/// 视觉模型相关接口：凭证和客户端都要就绪
fn require_model(state: &AppState) -> AppResult<()> {
    if !state.model_configured() {
        return Err(BackendError::MissingCredential.into());
    }
    Ok(())
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        detector_available: state.detector_available(),
        layout_backend_available: state.layout_backend_available(),
        model_configured: state.model_configured(),
    })
}

/// `POST /detect`：经典检测器
pub async fn detect(
    State(state): State<AppState>,
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> AppResult<Json<DetectResponse>> {
    let request = json_body(payload)?;
    let flow = state
        .classical
        .clone()
        .ok_or(BackendError::DetectorNotLoaded)?;
    let url = require_image_url(request.image_url.as_deref())?;

    let ctx = RequestCtx::new("detect");
    info!("{} 📨 {}", ctx, url);

    let response = flow
        .run(&url, request.include_labels, request.min_confidence, &ctx)
        .await?;
    Ok(Json(response))
}

/// `POST /detect-components`：快速视觉模型
pub async fn detect_components(
    State(state): State<AppState>,
    payload: Result<Json<ComponentsRequest>, JsonRejection>,
) -> AppResult<Json<ComponentsResponse>> {
    let request = json_body(payload)?;
    require_model(&state)?;
    let flow = state
        .components
        .clone()
        .ok_or(BackendError::VisionModelNotLoaded)?;
    let url = require_image_url(request.image_url.as_deref())?;

    let ctx = RequestCtx::new("detect-components");
    info!("{} 📨 {}", ctx, url);

    let response = flow.run(&url, &ctx).await?;
    Ok(Json(response))
}

/// `POST /generate-layout`：区块解析 + 逐区块生成 + 组装
pub async fn generate_layout(
    State(state): State<AppState>,
    payload: Result<Json<LayoutRequest>, JsonRejection>,
) -> AppResult<Json<GeneratedDocument>> {
    let request = json_body(payload)?;
    require_model(&state)?;
    let flow = state
        .layout
        .clone()
        .ok_or(BackendError::VisionModelNotLoaded)?;
    let url = require_image_url(request.image_url.as_deref())?;

    let ctx = RequestCtx::new("generate-layout");
    info!("{} 📨 {} (includeFullPage={})", ctx, url, request.include_full_page);

    let document = flow.run(&url, request.include_full_page, &ctx).await?;
    Ok(Json(document))
}
