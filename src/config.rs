use crate::error::{ConfigError, FileError};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 程序配置
///
/// 启动时构建一次，显式传给各个服务；核心逻辑不直接读取环境变量。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 重试与节奏 ---
    /// 单次远程调用的最大尝试次数
    pub max_attempts: u32,
    /// 首次重试前的等待时间（毫秒），之后每次翻倍
    pub initial_retry_delay_ms: u64,
    /// 批量生成时相邻两次调用之间的间隔（毫秒）
    pub pacing_delay_ms: u64,
    // --- 输出 ---
    /// 生成文档的输出目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-pro".to_string(),
            max_attempts: 3,
            initial_retry_delay_ms: 3000,
            pacing_delay_ms: 1500,
            output_dir: "output".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从默认值 + 环境变量构建配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 依次合并默认值、TOML 配置文件（可选）和环境变量
    pub fn load(path: Option<&Path>) -> Result<Self, crate::error::AppError> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides()?)
    }

    /// 读取 TOML 配置文件，未出现的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, FileError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| FileError::read_failed(display.clone(), e))?;
        Self::from_toml_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: display,
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .unwrap_or(self.llm_api_key);

        Ok(Self {
            llm_api_key: api_key,
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            max_attempts: env_parse("MAX_ATTEMPTS", self.max_attempts)?,
            initial_retry_delay_ms: env_parse("INITIAL_RETRY_DELAY_MS", self.initial_retry_delay_ms)?,
            pacing_delay_ms: env_parse("PACING_DELAY_MS", self.pacing_delay_ms)?,
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
            verbose_logging: env_parse("VERBOSE_LOGGING", self.verbose_logging)?,
        })
    }

    /// 检查调用远程服务前必须满足的配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts".to_string(),
                reason: "至少需要尝试 1 次".to_string(),
            });
        }
        Ok(())
    }

    pub fn initial_retry_delay(&self) -> Duration {
        Duration::from_millis(self.initial_retry_delay_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }
}

fn env_parse<T: FromStr>(var_name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: std::any::type_name::<T>().to_string(),
        }),
        Err(_) => Ok(default),
    }
}
