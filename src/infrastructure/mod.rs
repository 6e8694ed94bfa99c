//! 基础设施层
//!
//! 持有远程服务连接，只暴露"带重试的调用"能力，不认识课程。

pub mod retry;

pub use retry::{RetryPolicy, RetryingCaller};
