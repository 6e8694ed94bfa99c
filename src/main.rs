use anyhow::Result;
use clap::Parser;
use sel_course_generator::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // 日志在 Cli::run 加载配置之后初始化
    Cli::parse().run().await
}
