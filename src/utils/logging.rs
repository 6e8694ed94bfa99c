/// 日志工具模块
///
/// 初始化 tracing，并提供批量生成过程中的日志格式化辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug 或 info 级别。
/// 重复调用不会报错（测试中可能多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `model`: 使用的模型名称
/// - `pacing_ms`: 调用间隔
pub fn log_startup(model: &str, pacing_ms: u64) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 SEL 课程生成器启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 模型: {}", model);
    info!("⏱️ 调用间隔: {} 毫秒", pacing_ms);
    info!("{}", "=".repeat(60));
}

/// 记录课程加载信息
///
/// # 参数
/// - `total`: 课程总数
/// - `eligible`: 可生成的课程数
/// - `knowledge_chars`: 知识上下文字数
pub fn log_courses_loaded(total: usize, eligible: usize, knowledge_chars: usize) {
    info!("✓ 共 {} 个课程，其中 {} 个可生成", total, eligible);
    if total > eligible {
        info!("💡 {} 个课程缺少技能点或年龄段，将被跳过", total - eligible);
    }
    if knowledge_chars > 0 {
        info!("📚 知识库参考内容: {} 字", knowledge_chars);
    } else {
        info!("📚 未使用知识库");
    }
}

/// 记录单个课程的进度
pub fn log_course_progress(position: usize, total: usize, skill: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📦 正在生成 {} / {}: {}...", position, total, skill);
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `total`: 可生成的课程总数
/// - `output_dir`: 输出目录
pub fn print_final_stats(success: usize, total: usize, output_dir: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 未完成: {}", total.saturating_sub(success));
    info!("{}", "=".repeat(60));
    info!("\n文档已保存至: {}", output_dir);
}
