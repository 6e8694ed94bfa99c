//! # SEL Course Generator
//!
//! 根据 (技能点, 年龄段) 批量生成儿童 SEL（社交情感学习）家长课程，并导出为 Word 可打开的文档。
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 远程生成服务的接口与实现
//! - `CompletionBackend` - 单次请求 → 文本，错误在这一层完成分类
//! - `LlmClient` - OpenAI 兼容接口的实现
//!
//! ### ② 基础设施层（Infrastructure）
//! - `RetryingCaller` - 对限流和网络错误做指数退避重试
//!
//! ### ③ 业务能力层（Services）
//! - `CourseParser` - 自由文本 → 课程列表
//! - `CourseContentGenerator` - 一个课程 → 课程文本
//!
//! ### ④ 编排层（Orchestration）
//! - `BatchPipeline` - 顺序、节流、失败即停的批量生成
//! - `App` - 课程来源、知识库、生成和导出的串联
//!
//! ### 其他
//! - `extraction/` - 知识库文件的文本提取
//! - `export/` - 课程文本 → `.doc`
//! - `cli/` - 命令行
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{CompletionBackend, CompletionRequest, LlmClient, ScriptedBackend};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{RetryPolicy, RetryingCaller};
pub use models::{CourseList, CourseRequest, GeneratedDocument, KnowledgeBase, ParsedCourse};
pub use orchestrator::{App, BatchEvent, BatchPipeline, CancelHandle, PipelineState};
pub use services::{CourseContentGenerator, CourseParser};
