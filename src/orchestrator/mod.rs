//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_pipeline` - 批量生成流水线
//! - 按顺序逐个生成课程，跳过不完整的课程
//! - 课程之间节流，失败即停，可取消
//! - 以事件流产出进度和生成结果
//!
//! ### `app` - 应用入口
//! - 从配置构建生成服务、重试调用器和各个业务服务
//! - 汇总课程来源、加载知识库
//! - 运行流水线并导出文档
//!
//! ## 层次关系
//!
//! ```text
//! app (课程来源 + 知识库 + 导出)
//!     ↓
//! batch_pipeline (处理 Vec<CourseRequest>)
//!     ↓
//! services (能力层：parser / generator)
//!     ↓
//! infrastructure (RetryingCaller)
//!     ↓
//! clients (CompletionBackend)
//! ```

pub mod app;
pub mod batch_pipeline;

// 重新导出主要类型
pub use app::{write_documents, App, CourseSource, GenerationOutcome};
pub use batch_pipeline::{
    BatchEvent, BatchPipeline, BatchProgress, BatchReport, CancelHandle, PipelineState,
};
