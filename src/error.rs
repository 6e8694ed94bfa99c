use std::fmt;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 远程生成服务调用错误
    #[error("远程调用错误: {0}")]
    Remote(#[from] RemoteCallError),
    /// 课程解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 课程内容生成错误
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 批量生成中断
    #[error("批量生成错误: {0}")]
    Batch(#[from] BatchError),
    /// 输入校验错误
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 文本提取错误
    #[error("提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 传输层给出的错误分类
///
/// 重试策略只看这个分类，不再去匹配错误消息文本。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    /// 请求频率限制或配额耗尽
    RateLimited,
    /// DNS、连接、超时等网络层失败
    NetworkFailure,
    /// 其他错误，不重试
    Other,
}

impl RemoteErrorKind {
    /// 是否属于可重试的瞬时错误
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            RemoteErrorKind::RateLimited | RemoteErrorKind::NetworkFailure
        )
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErrorKind::RateLimited => write!(f, "频率限制"),
            RemoteErrorKind::NetworkFailure => write!(f, "网络错误"),
            RemoteErrorKind::Other => write!(f, "其他错误"),
        }
    }
}

/// 远程生成服务调用错误
#[derive(Debug, Error)]
pub enum RemoteCallError {
    /// 单次调用失败
    #[error("模型 {model} 调用失败 ({kind}): {message}")]
    Failed {
        model: String,
        kind: RemoteErrorKind,
        message: String,
    },
    /// 返回内容为空
    #[error("模型 {model} 返回内容为空")]
    EmptyContent { model: String },
    /// 构建请求失败
    #[error("构建请求失败: {message}")]
    InvalidRequest { message: String },
    /// 重试次数耗尽
    #[error("已尝试 {attempts} 次仍失败: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<RemoteCallError>,
    },
}

impl RemoteCallError {
    /// 创建单次调用失败错误
    pub fn failed(
        model: impl Into<String>,
        kind: RemoteErrorKind,
        message: impl Into<String>,
    ) -> Self {
        RemoteCallError::Failed {
            model: model.into(),
            kind,
            message: message.into(),
        }
    }

    /// 错误分类；重试耗尽后沿用最后一次的分类
    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            RemoteCallError::Failed { kind, .. } => *kind,
            RemoteCallError::RetriesExhausted { last, .. } => last.kind(),
            RemoteCallError::EmptyContent { .. } | RemoteCallError::InvalidRequest { .. } => {
                RemoteErrorKind::Other
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// 课程解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    /// 远程调用失败（已重试）
    #[error("解析请求失败: {0}")]
    Remote(#[from] RemoteCallError),
    /// 返回内容不是合法的课程 JSON 数组
    #[error("无法解析返回的 JSON (响应: {response}): {source}")]
    MalformedJson {
        response: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 课程内容生成错误
#[derive(Debug, Error)]
#[error("课程「{skill}」({age_group}) 生成失败: {source}")]
pub struct GenerationError {
    pub skill: String,
    pub age_group: String,
    #[source]
    pub source: RemoteCallError,
}

/// 批量生成中断错误
///
/// 已经生成的课程不受影响，`completed` 记录中断前成功的数量。
#[derive(Debug, Error)]
#[error("第 {position}/{total} 个课程「{skill}」失败，已完成 {completed} 个: {source}")]
pub struct BatchError {
    pub position: usize,
    pub total: usize,
    pub skill: String,
    pub completed: usize,
    #[source]
    pub source: GenerationError,
}

/// 输入校验错误
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 没有可生成的课程
    #[error("请至少添加一个有效的课程进行生成")]
    NoEligibleCourses,
    /// 批量导入文件格式不支持
    #[error("请上传 .txt 或 .csv 格式的批量导入文件 (收到: {file_name})")]
    UnsupportedBatchFile { file_name: String },
    /// 课程参数格式错误
    #[error("无法识别的课程参数 '{input}'，应为 技能点:年龄段")]
    MalformedCourseArg { input: String },
}

/// 文本提取错误
///
/// 只作为单个文件的状态出现，不会中断其他文件或批量生成。
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 文本不是合法的 UTF-8
    #[error("文本解码失败: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    /// PDF 解析失败
    #[error("PDF 解析失败: {0}")]
    Pdf(String),
    /// Word 文档解析失败
    #[error("Word 文档解析失败: {0}")]
    Word(String),
    /// 提取任务异常退出
    #[error("提取任务异常退出: {0}")]
    TaskFailed(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 缺少 API 密钥
    #[error("未设置 API 密钥，请设置环境变量 LLM_API_KEY 或 GEMINI_API_KEY")]
    MissingApiKey,
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl FileError {
    pub fn read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        FileError::ReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        FileError::WriteFailed {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
