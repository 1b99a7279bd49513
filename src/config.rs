use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{AppResult, ConfigError};

/// 区块解析提示词策略
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockPromptStrategy {
    /// 自由标签：模型可以给出任意区域名
    Free,
    /// 固定四类：header / sidebar / navigation / main content
    Canonical,
}

impl BlockPromptStrategy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "free" => Some(Self::Free),
            "canonical" => Some(Self::Canonical),
            _ => None,
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 允许跨域的来源，`*` 表示全部
    pub allowed_origins: Vec<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 视觉模型配置 ---
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    /// 布局生成使用的模型
    pub vision_model: String,
    /// 组件快速检测使用的模型
    pub fast_vision_model: String,
    pub max_tokens: u32,
    pub seed: i64,
    pub block_prompt_strategy: BlockPromptStrategy,
    /// 非标准区域是否放入组装后的页面
    pub place_extra_regions: bool,
    /// 同时生成的区块数量
    pub max_concurrent_blocks: usize,
    // --- 图片下载配置 ---
    pub download_timeout_secs: u64,
    pub max_image_bytes: usize,
    /// 临时目录根路径，为空时使用系统临时目录
    pub temp_dir: Option<PathBuf>,
    // --- 经典检测器配置 ---
    /// 外部检测程序，为空时 /detect 不可用
    pub detector_command: Option<String>,
    pub min_grad: u32,
    pub ffl_block: u32,
    pub min_ele_area: u32,
    pub merge_contained_ele: bool,
    pub merge_line_to_paragraph: bool,
    pub remove_bar: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
            ],
            verbose_logging: false,
            openai_api_key: None,
            openai_api_base: "https://api.openai.com/v1".to_string(),
            vision_model: "gpt-4o".to_string(),
            fast_vision_model: "gpt-4o-mini".to_string(),
            max_tokens: 4096,
            seed: 42,
            block_prompt_strategy: BlockPromptStrategy::Free,
            place_extra_regions: false,
            max_concurrent_blocks: 4,
            download_timeout_secs: 30,
            max_image_bytes: 20 * 1024 * 1024,
            temp_dir: None,
            detector_command: None,
            min_grad: 10,
            ffl_block: 5,
            min_ele_area: 50,
            merge_contained_ele: true,
            merge_line_to_paragraph: false,
            remove_bar: true,
        }
    }
}

impl Config {
    /// 加载配置：`.env` → TOML 文件（`SCREENCODER_CONFIG`）→ 环境变量
    pub fn load() -> AppResult<Self> {
        let _ = dotenvy::dotenv();

        let base = match std::env::var("SCREENCODER_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };

        base.apply_env()
    }

    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source,
            })?;

        let config = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;

        Ok(config)
    }

    /// 用环境变量覆盖已有配置
    pub fn apply_env(self) -> AppResult<Self> {
        let mut config = self;

        if let Some(v) = env_string("HOST") {
            config.host = v;
        }
        config.port = env_parse("PORT", "u16")?.unwrap_or(config.port);
        if let Some(v) = env_string("ALLOWED_ORIGINS") {
            config.allowed_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        config.verbose_logging =
            env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(config.verbose_logging);

        if let Some(v) = env_string("OPENAI_API_KEY") {
            config.openai_api_key = Some(v);
        }
        if let Some(v) = env_string("OPENAI_API_BASE") {
            config.openai_api_base = v;
        }
        if let Some(v) = env_string("VISION_MODEL") {
            config.vision_model = v;
        }
        if let Some(v) = env_string("FAST_VISION_MODEL") {
            config.fast_vision_model = v;
        }
        config.max_tokens = env_parse("VISION_MAX_TOKENS", "u32")?.unwrap_or(config.max_tokens);
        config.seed = env_parse("VISION_SEED", "i64")?.unwrap_or(config.seed);
        if let Some(v) = env_string("BLOCK_PROMPT_STRATEGY") {
            config.block_prompt_strategy =
                BlockPromptStrategy::parse(&v).ok_or_else(|| ConfigError::EnvVarParseFailed {
                    var_name: "BLOCK_PROMPT_STRATEGY".to_string(),
                    value: v.clone(),
                    expected_type: "free | canonical".to_string(),
                })?;
        }
        config.place_extra_regions =
            env_parse("PLACE_EXTRA_REGIONS", "bool")?.unwrap_or(config.place_extra_regions);
        config.max_concurrent_blocks = env_parse("MAX_CONCURRENT_BLOCKS", "usize")?
            .unwrap_or(config.max_concurrent_blocks);

        config.download_timeout_secs = env_parse("DOWNLOAD_TIMEOUT_SECS", "u64")?
            .unwrap_or(config.download_timeout_secs);
        config.max_image_bytes =
            env_parse("MAX_IMAGE_BYTES", "usize")?.unwrap_or(config.max_image_bytes);
        if let Some(v) = env_string("TEMP_DIR") {
            config.temp_dir = Some(PathBuf::from(v));
        }

        if let Some(v) = env_string("DETECTOR_COMMAND") {
            config.detector_command = Some(v);
        }
        config.min_grad = env_parse("UIED_MIN_GRAD", "u32")?.unwrap_or(config.min_grad);
        config.min_ele_area = env_parse("UIED_MIN_ELE_AREA", "u32")?.unwrap_or(config.min_ele_area);

        Ok(config)
    }

    /// 视觉模型是否配置了凭证
    pub fn model_configured(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match env_string(var_name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.download_timeout_secs, 30);
        assert_eq!(config.min_grad, 10);
        assert_eq!(config.min_ele_area, 50);
        assert!(!config.model_configured());
        assert!(config.detector_command.is_none());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
port = 8080
vision_model = "gpt-4.1"
block_prompt_strategy = "canonical"
place_extra_regions = true
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.vision_model, "gpt-4.1");
        assert_eq!(config.block_prompt_strategy, BlockPromptStrategy::Canonical);
        assert!(config.place_extra_regions);
        // 未写的字段保持默认
        assert_eq!(config.max_concurrent_blocks, 4);
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let config = Config {
            openai_api_key: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(!config.model_configured());
    }

    #[test]
    fn test_prompt_strategy_parse() {
        assert_eq!(
            BlockPromptStrategy::parse(" Canonical "),
            Some(BlockPromptStrategy::Canonical)
        );
        assert_eq!(BlockPromptStrategy::parse("free"), Some(BlockPromptStrategy::Free));
        assert_eq!(BlockPromptStrategy::parse("other"), None);
    }
}
