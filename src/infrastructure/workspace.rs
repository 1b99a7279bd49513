//! 请求级工作区
//!
//! 每个请求一个临时目录，保存下载的截图和检测器输出。
//! `RequestWorkspace` 被 drop 时目录随之删除，无论请求成功还是失败。

use image::DynamicImage;
use reqwest::Url;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::image_codec;
use crate::infrastructure::image_fetcher::FetchedImage;

/// 检测器能直接读取的扩展名
const KNOWN_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".bmp"];

/// 请求级工作区
pub struct RequestWorkspace {
    dir: TempDir,
    image_path: PathBuf,
    image: DynamicImage,
}

impl RequestWorkspace {
    /// 解码图片并写入临时目录
    ///
    /// # 参数
    /// - `root`: 临时目录的父目录，`None` 时使用系统临时目录
    /// - `url`: 图片地址，用于推导文件名
    /// - `fetched`: 已下载的图片
    pub fn create(root: Option<&Path>, url: &Url, fetched: &FetchedImage) -> AppResult<Self> {
        let image = image_codec::decode(&fetched.bytes)?;

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)
                    .map_err(|e| AppError::workspace(root.display().to_string(), e))?;
                tempfile::Builder::new()
                    .prefix("screencoder-")
                    .tempdir_in(root)
            }
            None => tempfile::Builder::new().prefix("screencoder-").tempdir(),
        }
        .map_err(|e| AppError::workspace("<temp>", e))?;

        let file_name = image_file_name(url);
        let image_path = dir.path().join(&file_name);

        if has_known_extension(&file_name) {
            std::fs::write(&image_path, &fetched.bytes)
                .map_err(|e| AppError::workspace(image_path.display().to_string(), e))?;
        } else {
            // 扩展名不可识别时统一转成 PNG
            let png = image_codec::encode_png(&image)?;
            std::fs::write(&image_path, png)
                .map_err(|e| AppError::workspace(image_path.display().to_string(), e))?;
        }

        debug!(
            "工作区已创建: {} ({}x{})",
            image_path.display(),
            image.width(),
            image.height()
        );

        Ok(Self {
            dir,
            image_path,
            image,
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// 由 URL 推导图片文件名
///
/// 取路径最后一段，去掉查询参数；没有可识别的扩展名时补 `.png`。
pub fn image_file_name(url: &Url) -> String {
    let raw = url
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or("");

    let sanitized: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let name = match sanitized.trim_matches('.') {
        "" => "screenshot".to_string(),
        name => name.to_string(),
    };

    if has_known_extension(&name) {
        name
    } else {
        format!("{}.png", name)
    }
}

fn has_known_extension(name: &str) -> bool {
    let lower = name.to_lowercase();
    KNOWN_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
