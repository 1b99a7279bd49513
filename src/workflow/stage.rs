//! 请求处理阶段
//!
//! 布局生成：`Downloading → Detecting → ParsingRegions → Synthesizing → Assembling → Done`
//!
//! 经典检测：`Downloading → DetectingComponents → Done`
//!
//! 任何顶层阶段失败都直接结束请求，不做重试。

use std::fmt;
use tracing::{error, info};

use super::request_ctx::RequestCtx;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Downloading,
    Detecting,
    ParsingRegions,
    DetectingComponents,
    Synthesizing,
    Assembling,
    Done,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Downloading => "Downloading",
            Stage::Detecting => "Detecting",
            Stage::ParsingRegions => "ParsingRegions",
            Stage::DetectingComponents => "DetectingComponents",
            Stage::Synthesizing => "Synthesizing",
            Stage::Assembling => "Assembling",
            Stage::Done => "Done",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Stage::Downloading => "📥",
            Stage::Detecting | Stage::DetectingComponents => "🔍",
            Stage::ParsingRegions => "🧩",
            Stage::Synthesizing => "🎨",
            Stage::Assembling => "🔧",
            Stage::Done => "✅",
        }
    }

    /// 记录进入该阶段
    pub fn enter(self, ctx: &RequestCtx) {
        info!("{} {} {}", ctx, self.icon(), self);
    }

    /// 记录该阶段失败，返回原错误便于 `map_err` 链式使用
    pub fn fail(self, ctx: &RequestCtx, err: AppError) -> AppError {
        error!("{} ❌ Failed({}): {}", ctx, self, err);
        err
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_returns_same_error() {
        let ctx = RequestCtx::new("generate-layout");
        let err = Stage::ParsingRegions.fail(&ctx, AppError::empty_result("布局区块"));
        assert!(err.is_empty_result());
    }

    #[test]
    fn test_display() {
        assert_eq!(Stage::DetectingComponents.to_string(), "DetectingComponents");
    }
}
