//! 脚本化的生成服务
//!
//! 按预设脚本返回结果并记录收到的请求，用于测试和离线演练。

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::llm_client::{CompletionBackend, CompletionRequest};
use crate::error::RemoteCallError;

type Responder = Box<dyn Fn(&CompletionRequest) -> Result<String, RemoteCallError> + Send + Sync>;

/// 脚本化的生成服务
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, RemoteCallError>>>,
    fallback: Responder,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    /// 每次调用都交给 `responder` 生成结果
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, RemoteCallError> + Send + Sync + 'static,
    {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 依次返回 `responses`，用完后返回空内容错误
    pub fn from_responses(responses: Vec<Result<String, RemoteCallError>>) -> Self {
        let backend = Self::from_fn(|request| {
            Err(RemoteCallError::EmptyContent {
                model: request.model.clone(),
            })
        });
        *backend.script.lock().unwrap_or_else(|e| e.into_inner()) = responses.into();
        backend
    }

    /// 已收到的请求数
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// 已收到的请求副本
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RemoteCallError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match scripted {
            Some(result) => result,
            None => (self.fallback)(request),
        }
    }
}
