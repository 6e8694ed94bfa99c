//! 命令行入口
//!
//! 只负责解析参数、加载配置和分派子命令，具体逻辑都在 [`App`] 和导出模块中。

pub mod commands;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::export;
use crate::models::loaders::to_manifest_string;
use crate::models::read_batch_text;
use crate::orchestrator::App;
use crate::utils::logging;
use commands::{Commands, ExportArgs, GenerateArgs, ParseArgs};

/// SEL 课程批量生成工具
#[derive(Parser, Debug)]
#[command(
    name = "sel-course-generator",
    version,
    about = "根据技能点和年龄段批量生成 SEL 家长课程，并导出为 Word 文档"
)]
pub struct Cli {
    /// TOML 配置文件，环境变量优先于文件中的值
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 显示调试日志
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// 加载配置、初始化日志并执行子命令
    pub async fn run(self) -> Result<()> {
        let config = Config::load(self.config.as_deref()).context("加载配置失败")?;
        logging::init(self.verbose || config.verbose_logging);

        match self.command {
            Commands::Generate(args) => run_generate(config, args).await,
            Commands::Parse(args) => run_parse(config, args).await,
            Commands::Export(args) => run_export(config, args).await,
        }
    }
}

async fn run_generate(config: Config, args: GenerateArgs) -> Result<()> {
    let sources = args.sources()?;
    if sources.is_empty() {
        bail!("请通过 --course、--courses 或 --text 提供至少一个课程");
    }

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_dir));

    let app = App::initialize(config)?;
    let courses = app.load_courses(&sources).await?;
    let knowledge = app.load_knowledge(&args.knowledge).await;

    let outcome = app.generate(&courses, &knowledge, &output_dir).await?;
    info!("🎉 共写入 {} 个文件", outcome.written.len());
    Ok(())
}

async fn run_parse(config: Config, args: ParseArgs) -> Result<()> {
    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => read_batch_text(&path).await?,
        (None, None) => bail!("请通过 --text 或 --file 提供课程描述"),
    };

    let app = App::initialize(config)?;
    let parsed = app.parse_text(&text).await?;
    info!("✓ 解析出 {} 个课程", parsed.len());

    let manifest = to_manifest_string(&parsed).context("生成课程清单失败")?;
    println!("{}", manifest);
    Ok(())
}

async fn run_export(config: Config, args: ExportArgs) -> Result<()> {
    let mut bodies = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let body = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("读取文件失败: {}", path.display()))?;
        bodies.push(body);
    }

    let refs: Vec<&str> = bodies.iter().map(String::as_str).collect();
    let document = export::export_many(&refs, &args.title);

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(&config.output_dir).join(export::combined_file_name())
    });
    let (dir, file_name) = match (output.parent(), output.file_name()) {
        (Some(dir), Some(name)) => (dir.to_path_buf(), name.to_string_lossy().to_string()),
        _ => bail!("无效的输出路径: {}", output.display()),
    };

    export::write_document(&document, &dir, &file_name).await?;
    Ok(())
}
