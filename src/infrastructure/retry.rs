//! 带指数退避的远程调用
//!
//! 只对传输层标记为可重试的错误（限流、网络）进行重试，其余错误立即返回。
//! 第 i 次（从 0 开始）失败后等待 `initial_delay * 2^i`，最后一次失败后不再等待。

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clients::{CompletionBackend, CompletionRequest};
use crate::config::Config;
use crate::error::RemoteCallError;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` 至少为 1
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_attempts, config.initial_retry_delay())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 第 `attempt` 次（从 0 开始）失败后的等待时间
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(3000))
    }
}

/// 带重试的远程调用器
#[derive(Clone)]
pub struct RetryingCaller {
    backend: Arc<dyn CompletionBackend>,
    policy: RetryPolicy,
}

impl RetryingCaller {
    pub fn new(backend: Arc<dyn CompletionBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// 调用远程服务
    ///
    /// 不可重试的错误原样返回；可重试错误耗尽次数后包装为
    /// [`RemoteCallError::RetriesExhausted`]。
    pub async fn call(&self, request: &CompletionRequest) -> Result<String, RemoteCallError> {
        let max_attempts = self.policy.max_attempts;

        for attempt in 0..max_attempts {
            debug!("第 {}/{} 次调用，模型: {}", attempt + 1, max_attempts, request.model);

            let error = match self.backend.complete(request).await {
                Ok(text) => return Ok(text),
                Err(e) => e,
            };

            warn!("第 {} 次调用失败: {}", attempt + 1, error);

            if !error.is_retryable() {
                debug!("错误不可重试 ({})，直接返回", error.kind());
                return Err(error);
            }

            if attempt + 1 == max_attempts {
                return Err(RemoteCallError::RetriesExhausted {
                    attempts: max_attempts,
                    last: Box::new(error),
                });
            }

            let delay = self.policy.delay_for(attempt);
            info!("⏳ {} 毫秒后重试...", delay.as_millis());
            tokio::time::sleep(delay).await;
        }

        unreachable!("max_attempts is at least 1")
    }
}
