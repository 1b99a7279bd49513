use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// 应用程序错误类型
///
/// 顶层只有四类，分别对应 HTTP 层的不同状态码：
/// - `Input`：请求参数有误（400）
/// - `Backend`：检测器或视觉模型未就绪（503）
/// - `Upstream`：下载、检测、模型调用失败，或解析结果为空（500）
/// - `Config`：启动时的配置问题
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求参数错误
    #[error("请求参数错误: {0}")]
    Input(#[from] InputError),
    /// 后端不可用
    #[error("后端不可用: {0}")]
    Backend(#[from] BackendError),
    /// 上游调用失败
    #[error("上游调用失败: {0}")]
    Upstream(#[from] UpstreamError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 请求参数错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 缺少必填字段
    #[error("缺少必填字段: {field}")]
    MissingField { field: String },
    /// URL 无法解析或协议不受支持
    #[error("无效的图片地址 '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// 请求体不是合法 JSON
    #[error("请求体解析失败: {message}")]
    MalformedBody { message: String },
}

/// 后端不可用错误
#[derive(Debug, Error)]
pub enum BackendError {
    /// 经典检测器未加载
    #[error("经典组件检测器未加载")]
    DetectorNotLoaded,
    /// 视觉模型客户端未初始化
    #[error("视觉模型客户端未初始化")]
    VisionModelNotLoaded,
    /// 未配置 API 凭证
    #[error("未配置视觉模型 API 密钥")]
    MissingCredential,
}

/// 上游调用错误
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// 图片下载失败
    #[error("图片下载失败 ({url}): {source}")]
    DownloadFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 图片下载超时
    #[error("图片下载超时 ({url})，超过 {secs} 秒")]
    DownloadTimeout { url: String, secs: u64 },
    /// 图片服务器返回错误状态码
    #[error("图片服务器返回状态码 {status} ({url})")]
    BadStatus { url: String, status: u16 },
    /// 图片超过大小限制
    #[error("图片大小超过限制 {limit} 字节 ({url})")]
    ImageTooLarge { url: String, limit: usize },
    /// 图片解码失败
    #[error("图片解码失败: {source}")]
    ImageDecodeFailed {
        #[source]
        source: image::ImageError,
    },
    /// 临时目录或文件操作失败
    #[error("临时文件操作失败 ({path}): {source}")]
    Workspace {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 检测器执行失败
    #[error("组件检测失败: {message}")]
    DetectorFailed { message: String },
    /// 检测器输出无法解析
    #[error("检测器输出解析失败 ({path}): {source}")]
    DetectorOutputInvalid {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 视觉模型调用失败
    #[error("视觉模型调用失败 (模型: {model}): {source}")]
    VisionCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 视觉模型返回内容为空
    #[error("视觉模型返回内容为空 (模型: {model})")]
    EmptyCompletion { model: String },
    /// 解析结果为空
    #[error("未能解析出任何{what}")]
    EmptyResult { what: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 监听地址无效
    #[error("无效的监听地址: {addr}")]
    InvalidListenAddr { addr: String },
    /// HTTP 客户端构造失败
    #[error("HTTP 客户端构造失败: {source}")]
    HttpClientBuildFailed {
        #[source]
        source: reqwest::Error,
    },
}

/// 错误分类，对外暴露在响应体的 `kind` 字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadInput,
    BackendUnavailable,
    UpstreamFailure,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::BadInput => "BadInput",
            ErrorKind::BackendUnavailable => "BackendUnavailable",
            ErrorKind::UpstreamFailure => "UpstreamFailure",
            ErrorKind::Internal => "Internal",
        }
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::BadInput => StatusCode::BAD_REQUEST,
            ErrorKind::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::UpstreamFailure | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl AppError {
    /// 错误分类；空结果归入上游失败
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Input(_) => ErrorKind::BadInput,
            AppError::Backend(_) => ErrorKind::BackendUnavailable,
            AppError::Upstream(_) => ErrorKind::UpstreamFailure,
            AppError::Config(_) => ErrorKind::Internal,
        }
    }

    /// 是否为"解析结果为空"
    pub fn is_empty_result(&self) -> bool {
        matches!(self, AppError::Upstream(UpstreamError::EmptyResult { .. }))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建缺少字段错误
    pub fn missing_field(field: impl Into<String>) -> Self {
        AppError::Input(InputError::MissingField {
            field: field.into(),
        })
    }

    /// 创建无效 URL 错误
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Input(InputError::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        })
    }

    /// 创建检测器执行失败错误
    pub fn detector_failed(message: impl Into<String>) -> Self {
        AppError::Upstream(UpstreamError::DetectorFailed {
            message: message.into(),
        })
    }

    /// 创建视觉模型调用失败错误
    pub fn vision_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Upstream(UpstreamError::VisionCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建空结果错误
    pub fn empty_result(what: impl Into<String>) -> Self {
        AppError::Upstream(UpstreamError::EmptyResult { what: what.into() })
    }

    /// 创建临时文件操作错误
    pub fn workspace(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Upstream(UpstreamError::Workspace {
            path: path.into(),
            source,
        })
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Upstream(UpstreamError::ImageDecodeFailed { source: err })
    }
}

// ========== HTTP 响应映射 ==========

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let body = json!({
            "detail": self.to_string(),
            "kind": kind.as_str(),
        });
        (kind.status_code(), Json(body)).into_response()
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
