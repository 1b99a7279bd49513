//! 视觉模型客户端 - 基础设施层
//!
//! 只负责"图片 + 提示词 → 文本"这一个能力，不关心提示词内容和返回格式。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点，兼容 OpenAI API 的服务均可使用
//! - 固定 temperature / seed，保证区块解析结果可复现

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, UpstreamError};

/// 视觉语言模型
///
/// 进程启动时构造一次，之后只读共享。
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// 发送一张图片（data URL）和提示词，返回模型的原始文本
    async fn complete(&self, model: &str, image_data_url: &str, prompt: &str) -> AppResult<String>;
}

/// OpenAI 兼容的视觉模型客户端
pub struct OpenAiVisionClient {
    client: Client<OpenAIConfig>,
    max_tokens: u32,
    seed: i64,
}

impl OpenAiVisionClient {
    /// 根据配置创建客户端；未配置 API 密钥时返回 `None`
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.openai_api_base);

        Some(Self {
            client: Client::with_config(openai_config),
            max_tokens: config.max_tokens,
            seed: config.seed,
        })
    }
}

#[async_trait]
impl VisionModel for OpenAiVisionClient {
    async fn complete(&self, model: &str, image_data_url: &str, prompt: &str) -> AppResult<String> {
        debug!("调用视觉模型 API，模型: {}", model);
        debug!("提示词长度: {} 字符", prompt.len());

        let content_parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: prompt.to_string(),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: image_data_url.to_string(),
                        detail: Some(ImageDetail::High),
                    },
                },
            ),
        ];

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()
            .map_err(|e| AppError::vision_call_failed(model, e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(0.0)
            .seed(self.seed)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| AppError::vision_call_failed(model, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("视觉模型 API 调用失败: {}", e);
            AppError::vision_call_failed(model, e)
        })?;

        debug!("视觉模型 API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| UpstreamError::EmptyCompletion {
                model: model.to_string(),
            })?;

        Ok(content.trim().to_string())
    }
}
