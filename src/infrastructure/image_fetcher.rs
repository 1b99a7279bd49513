//! 图片下载 - 基础设施层
//!
//! 一次请求只下载一次，有超时和大小上限，不做重试。

use reqwest::{Client, ClientBuilder, Url};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, UpstreamError};

/// 下载到内存中的图片
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
}

/// 图片下载器
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
    timeout_secs: u64,
    max_bytes: usize,
}

impl ImageFetcher {
    /// 构造下载器；客户端构造失败时返回错误，不退回到没有超时的默认客户端
    pub fn new(timeout_secs: u64, max_bytes: usize) -> AppResult<Self> {
        let client = build_client(Client::builder(), timeout_secs)?;

        Ok(Self {
            client,
            timeout_secs,
            max_bytes,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(config.download_timeout_secs, config.max_image_bytes)
    }

    /// 下载图片
    ///
    /// # 错误
    /// - 超时：`DownloadTimeout`
    /// - 非 2xx：`BadStatus`
    /// - 超过大小上限：`ImageTooLarge`
    pub async fn fetch(&self, url: &Url) -> AppResult<FetchedImage> {
        debug!("下载图片: {}", url);

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(self.too_large(url));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_reqwest_error(url, e))?
        {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large(url));
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!("图片下载完成: {} 字节", bytes.len());

        Ok(FetchedImage { bytes })
    }

    fn map_reqwest_error(&self, url: &Url, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            UpstreamError::DownloadTimeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
            .into()
        } else {
            UpstreamError::DownloadFailed {
                url: url.to_string(),
                source: err,
            }
            .into()
        }
    }

    fn too_large(&self, url: &Url) -> AppError {
        UpstreamError::ImageTooLarge {
            url: url.to_string(),
            limit: self.max_bytes,
        }
        .into()
    }
}

fn build_client(builder: ClientBuilder, timeout_secs: u64) -> AppResult<Client> {
    builder
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|source| ConfigError::HttpClientBuildFailed { source }.into())
}
