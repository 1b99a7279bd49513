//! HTTP 服务 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：构造视觉模型客户端、检测器客户端（进程内只构造一次）
//! 2. **依赖注入**：所有客户端通过 `AppState` 传给处理函数，没有全局单例
//! 3. **服务运行**：绑定监听地址，启动 axum 服务

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use super::routes::create_router;
use crate::clients::{ComponentDetector, OpenAiVisionClient, UiedCommandDetector, VisionModel};
use crate::config::Config;
use crate::error::{AppResult, ConfigError};
use crate::utils::logging;
use crate::workflow::{ClassicalDetectionFlow, ComponentsFlow, LayoutFlow};

/// 处理函数共享的状态，构造后只读
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// 经典检测流程；未配置检测器时为 `None`
    pub classical: Option<Arc<ClassicalDetectionFlow>>,
    /// 快速视觉检测流程；视觉模型不可用时为 `None`
    pub components: Option<Arc<ComponentsFlow>>,
    /// 布局生成流程；视觉模型不可用时为 `None`
    pub layout: Option<Arc<LayoutFlow>>,
}

impl AppState {
    /// 由已构造好的客户端组装状态
    pub fn new(
        config: Config,
        vision: Option<Arc<dyn VisionModel>>,
        detector: Option<Arc<dyn ComponentDetector>>,
    ) -> AppResult<Self> {
        let classical = detector
            .map(|d| ClassicalDetectionFlow::new(&config, d).map(Arc::new))
            .transpose()?;
        let components = vision
            .clone()
            .map(|v| ComponentsFlow::new(&config, v).map(Arc::new))
            .transpose()?;
        let layout = vision
            .map(|v| LayoutFlow::new(&config, v).map(Arc::new))
            .transpose()?;

        Ok(Self {
            config: Arc::new(config),
            classical,
            components,
            layout,
        })
    }

    pub fn detector_available(&self) -> bool {
        self.classical.is_some()
    }

    pub fn layout_backend_available(&self) -> bool {
        self.layout.is_some()
    }

    pub fn model_configured(&self) -> bool {
        self.config.model_configured()
    }
}

/// 应用主结构
pub struct App {
    state: AppState,
}

impl App {
    /// 初始化应用：按配置构造客户端
    pub async fn initialize(config: Config) -> Result<Self> {
        let vision: Option<Arc<dyn VisionModel>> = match OpenAiVisionClient::from_config(&config) {
            Some(client) => Some(Arc::new(client)),
            None => {
                warn!("⚠️ 未配置 OPENAI_API_KEY，/generate-layout 与 /detect-components 不可用");
                None
            }
        };

        let detector: Option<Arc<dyn ComponentDetector>> =
            match UiedCommandDetector::from_config(&config) {
                Some(detector) => Some(Arc::new(detector)),
                None => {
                    warn!("⚠️ 未配置 DETECTOR_COMMAND，/detect 不可用");
                    None
                }
            };

        let state = AppState::new(config, vision, detector).context("构造请求流程失败")?;
        logging::log_startup(
            &state.config,
            state.detector_available(),
            state.model_configured(),
        );

        Ok(Self { state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// 运行服务，直到进程退出
    pub async fn run(self) -> Result<()> {
        let listen_addr = self.state.config.listen_addr();
        let addr: SocketAddr = listen_addr
            .parse()
            .map_err(|_| ConfigError::InvalidListenAddr { addr: listen_addr })?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("无法绑定监听地址 {}", addr))?;
        info!("🌐 服务已启动: http://{}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
