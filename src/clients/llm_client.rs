//! LLM API 客户端
//!
//! 封装与文本生成服务的单次交互，并在传输层把错误归类为
//! [`RemoteErrorKind`]，上层的重试策略只依赖这个分类。
//!
//! async-openai 自带的退避重试被关闭，每次 `complete` 只发出一个 HTTP 请求，
//! 重试次数和等待时间全部由 `RetryingCaller` 决定。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（Gemini 兼容端点、Azure、Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{RemoteCallError, RemoteErrorKind};

/// 结构化输出约束（JSON Schema）
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

/// 一次远程生成请求
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub system: Option<String>,
    pub response_schema: Option<ResponseSchema>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            response_schema: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// 文本生成服务
///
/// 真实实现是 [`LlmClient`]；测试与离线运行使用 `ScriptedBackend`。
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// 发送一次请求，返回原始文本
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RemoteCallError>;
}

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config).with_backoff(single_attempt()),
        }
    }

    fn build_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let mut messages = Vec::new();

        if let Some(sys_msg) = &request.system {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg.as_str())
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.as_str())
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&request.model).messages(messages);

        if let Some(schema) = &request.response_schema {
            builder.response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    name: schema.name.clone(),
                    description: None,
                    schema: Some(schema.schema.clone()),
                    strict: Some(true),
                },
            });
        }

        builder.build()
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RemoteCallError> {
        debug!("调用 LLM API，模型: {}", request.model);
        debug!("用户消息长度: {} 字符", request.prompt.chars().count());

        let chat_request =
            self.build_request(request)
                .map_err(|e| RemoteCallError::InvalidRequest {
                    message: e.to_string(),
                })?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            let kind = classify_openai_error(&e);
            warn!("LLM API 调用失败 ({}): {}", kind, e);
            RemoteCallError::failed(&request.model, kind, e.to_string())
        })?;

        debug!("LLM API 调用成功");

        // 内容原样返回；只有完全没有内容时才算失败
        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| RemoteCallError::EmptyContent {
                model: request.model.clone(),
            })
    }
}

/// 第一次失败后立即放弃的退避策略
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..Default::default()
    }
}

/// 把 async-openai 的错误归类
fn classify_openai_error(err: &OpenAIError) -> RemoteErrorKind {
    match err {
        OpenAIError::Reqwest(e) => {
            if e.is_timeout() || e.is_connect() || e.is_request() {
                RemoteErrorKind::NetworkFailure
            } else {
                classify_message(&e.to_string())
            }
        }
        // 429 和 5xx 都以服务端错误体的形式到达这里
        OpenAIError::ApiError(api) => classify_api_error(api),
        other => classify_message(&other.to_string()),
    }
}

fn classify_api_error(api: &ApiError) -> RemoteErrorKind {
    let fields = [
        api.r#type.as_deref().unwrap_or_default(),
        api.code.as_deref().unwrap_or_default(),
        api.message.as_str(),
    ];
    classify_message(&fields.join(" "))
}

/// 根据服务商返回的错误文本归类
///
/// 只在传输层使用；不同服务商对限流的描述不同（429、quota、RESOURCE_EXHAUSTED）。
pub fn classify_message(message: &str) -> RemoteErrorKind {
    let lower = message.to_lowercase();

    const RATE_LIMIT_MARKERS: [&str; 5] = [
        "429",
        "quota",
        "rate limit",
        "rate_limit",
        "resource_exhausted",
    ];
    const NETWORK_MARKERS: [&str; 7] = [
        "enotfound",
        "etimedout",
        "econnreset",
        "network",
        "timeout",
        "timed out",
        "dns",
    ];

    if RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m)) {
        RemoteErrorKind::RateLimited
    } else if NETWORK_MARKERS.iter().any(|m| lower.contains(m)) {
        RemoteErrorKind::NetworkFailure
    } else {
        RemoteErrorKind::Other
    }
}
