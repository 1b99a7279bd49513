//! 经典组件检测器客户端 - 基础设施层
//!
//! 检测算法本身在外部程序里（UIED 风格），这里只负责：
//! 1. 以固定参数调用外部程序：`<program> <image> <output_dir> <params-json>`
//! 2. 读取 `<output_dir>/ip/<image-stem>.json` 中的 `compos`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, UpstreamError};
use crate::utils::truncate_text;

/// 检测器输出的原始组件（像素坐标）
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawComponent {
    #[serde(default)]
    pub column_min: f64,
    #[serde(default)]
    pub row_min: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default = "default_class")]
    pub class: String,
    #[serde(default)]
    pub text_content: String,
}

fn default_class() -> String {
    "other".to_string()
}

#[derive(Debug, Deserialize)]
struct DetectorOutput {
    #[serde(default)]
    compos: Vec<RawComponent>,
}

/// 检测参数，原样传给外部程序
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectorParams {
    #[serde(rename = "min-grad")]
    pub min_grad: u32,
    #[serde(rename = "ffl-block")]
    pub ffl_block: u32,
    #[serde(rename = "min-ele-area")]
    pub min_ele_area: u32,
    #[serde(rename = "merge-contained-ele")]
    pub merge_contained_ele: bool,
    #[serde(rename = "merge-line-to-paragraph")]
    pub merge_line_to_paragraph: bool,
    #[serde(rename = "remove-bar")]
    pub remove_bar: bool,
}

impl DetectorParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_grad: config.min_grad,
            ffl_block: config.ffl_block,
            min_ele_area: config.min_ele_area,
            merge_contained_ele: config.merge_contained_ele,
            merge_line_to_paragraph: config.merge_line_to_paragraph,
            remove_bar: config.remove_bar,
        }
    }
}

/// 经典组件检测器
#[async_trait]
pub trait ComponentDetector: Send + Sync {
    /// 对一张已落盘的图片做组件检测，`output_dir` 由调用方负责清理
    async fn detect(&self, image_path: &Path, output_dir: &Path) -> AppResult<Vec<RawComponent>>;
}

/// 调用外部 UIED 程序的检测器
pub struct UiedCommandDetector {
    program: String,
    args: Vec<String>,
    params: DetectorParams,
}

impl UiedCommandDetector {
    /// 未配置 `detector_command` 时返回 `None`
    pub fn from_config(config: &Config) -> Option<Self> {
        let mut parts = config.detector_command.as_deref()?.split_whitespace();
        let program = parts.next()?.to_string();
        let args = parts.map(str::to_string).collect();

        info!("✅ 经典检测器已配置: {}", program);

        Some(Self {
            program,
            args,
            params: DetectorParams::from_config(config),
        })
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// 检测结果文件路径：`<output_dir>/ip/<stem>.json`
    pub fn output_path(image_path: &Path, output_dir: &Path) -> PathBuf {
        let stem = image_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "screenshot".to_string());
        output_dir.join("ip").join(format!("{}.json", stem))
    }

    /// 读取并解析检测结果文件
    pub async fn read_output(path: &Path) -> AppResult<Vec<RawComponent>> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| UpstreamError::DetectorOutputInvalid {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;

        let output: DetectorOutput =
            serde_json::from_str(&content).map_err(|e| UpstreamError::DetectorOutputInvalid {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;

        Ok(output.compos)
    }
}

#[async_trait]
impl ComponentDetector for UiedCommandDetector {
    async fn detect(&self, image_path: &Path, output_dir: &Path) -> AppResult<Vec<RawComponent>> {
        let ip_dir = output_dir.join("ip");
        tokio::fs::create_dir_all(&ip_dir)
            .await
            .map_err(|e| AppError::workspace(ip_dir.display().to_string(), e))?;

        let params_json = serde_json::to_string(&self.params)
            .map_err(|e| AppError::detector_failed(format!("参数序列化失败: {}", e)))?;

        debug!(
            "运行检测器: {} {:?} {} {}",
            self.program,
            self.args,
            image_path.display(),
            output_dir.display()
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(image_path)
            .arg(output_dir)
            .arg(&params_json)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::detector_failed(format!("无法启动 {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::detector_failed(format!(
                "{} 退出状态 {}: {}",
                self.program,
                output.status,
                truncate_text(stderr.trim(), 500)
            )));
        }

        let result_path = Self::output_path(image_path, output_dir);
        let compos = Self::read_output(&result_path).await?;
        debug!("检测器返回 {} 个组件", compos.len());

        Ok(compos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        assert!(UiedCommandDetector::from_config(&Config::default()).is_none());

        let config = Config {
            detector_command: Some("python3 run_uied.py --quiet".to_string()),
            ..Config::default()
        };
        let detector = UiedCommandDetector::from_config(&config).unwrap();
        assert_eq!(detector.program, "python3");
        assert_eq!(detector.args, vec!["run_uied.py", "--quiet"]);
        assert_eq!(detector.params().min_grad, 10);
    }

    #[test]
    fn test_params_use_detector_keys() {
        let params = DetectorParams::from_config(&Config::default());
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["min-grad"], 10);
        assert_eq!(json["ffl-block"], 5);
        assert_eq!(json["min-ele-area"], 50);
        assert_eq!(json["merge-contained-ele"], true);
        assert_eq!(json["merge-line-to-paragraph"], false);
        assert_eq!(json["remove-bar"], true);
    }

    #[test]
    fn test_output_path() {
        let path = UiedCommandDetector::output_path(
            Path::new("/tmp/work/screenshot.png"),
            Path::new("/tmp/work"),
        );
        assert_eq!(path, PathBuf::from("/tmp/work/ip/screenshot.json"));
    }

    #[tokio::test]
    async fn test_read_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.json");
        tokio::fs::write(
            &path,
            r#"{"compos":[
                {"column_min":10,"row_min":20,"width":100,"height":40,"class":"Compo"},
                {"column_min":0,"row_min":0,"width":5,"height":5,"class":"Text","text_content":"Sign in"},
                {"id":3}
            ]}"#,
        )
        .await
        .unwrap();

        let compos = UiedCommandDetector::read_output(&path).await.unwrap();
        assert_eq!(compos.len(), 3);
        assert_eq!(compos[0].class, "Compo");
        assert_eq!(compos[0].width, 100.0);
        assert_eq!(compos[1].text_content, "Sign in");
        assert_eq!(compos[2].class, "other");
        assert_eq!(compos[2].width, 0.0);
    }

    #[tokio::test]
    async fn test_read_output_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let err = UiedCommandDetector::read_output(&path).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Upstream(UpstreamError::DetectorOutputInvalid { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_program_is_upstream_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            detector_command: Some("false".to_string()),
            ..Config::default()
        };
        let detector = UiedCommandDetector::from_config(&config).unwrap();

        let err = detector
            .detect(&dir.path().join("shot.png"), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Upstream(UpstreamError::DetectorFailed { .. })
        ));
    }
}
