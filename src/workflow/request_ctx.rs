//! 请求处理上下文
//!
//! 封装"我正在处理哪个请求"这一信息，用作日志前缀

use std::fmt::Display;
use uuid::Uuid;

/// 请求处理上下文
#[derive(Debug, Clone)]
pub struct RequestCtx {
    /// 请求 ID（uuid 前 8 位）
    pub request_id: String,

    /// 接口名，如 `generate-layout`
    pub endpoint: &'static str,
}

impl RequestCtx {
    /// 创建新的请求上下文
    pub fn new(endpoint: &'static str) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self {
            request_id: id[..8].to_string(),
            endpoint,
        }
    }
}

impl Display for RequestCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[请求 {} {}]", self.request_id, self.endpoint)
    }
}
