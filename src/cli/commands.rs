//! 子命令和参数定义

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::error::ValidationError;
use crate::models::ParsedCourse;
use crate::orchestrator::CourseSource;

/// 子命令
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 批量生成课程并导出为 .doc
    Generate(GenerateArgs),

    /// 解析课程描述文本，以 TOML 输出课程清单
    Parse(ParseArgs),

    /// 把已有的课程文本文件合并导出为一个 .doc
    Export(ExportArgs),
}

/// `generate` 的参数
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// 单个课程，格式为 技能点:年龄段，可重复
    #[arg(long = "course", value_name = "SKILL:AGE")]
    pub courses: Vec<String>,

    /// 课程文件：.toml 课程清单，或交给解析服务的 .txt / .csv
    #[arg(long = "courses", value_name = "FILE")]
    pub course_files: Vec<PathBuf>,

    /// 交给解析服务的课程描述文本
    #[arg(long)]
    pub text: Option<String>,

    /// 知识库文件（.txt / .md / .pdf / .doc / .docx），可重复
    #[arg(long, value_name = "FILE")]
    pub knowledge: Vec<PathBuf>,

    /// 输出目录，默认使用配置中的 output_dir
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl GenerateArgs {
    /// 按 `--course`、`--courses`、`--text` 的顺序汇总课程来源
    pub fn sources(&self) -> Result<Vec<CourseSource>, ValidationError> {
        let mut sources = Vec::new();

        if !self.courses.is_empty() {
            let pairs = self
                .courses
                .iter()
                .map(|arg| parse_course_arg(arg))
                .collect::<Result<Vec<_>, _>>()?;
            sources.push(CourseSource::Pairs(pairs));
        }

        sources.extend(self.course_files.iter().cloned().map(CourseSource::from_file));

        if let Some(text) = &self.text {
            sources.push(CourseSource::Text(text.clone()));
        }

        Ok(sources)
    }
}

/// `parse` 的参数
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// 课程描述文本
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// 课程描述文件（.txt / .csv）
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// `export` 的参数
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// 课程文本文件，按顺序合并
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// 输出文件路径
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// 文档标题
    #[arg(long, default_value = "SEL 课程")]
    pub title: String,
}

/// 解析 `技能点:年龄段`，半角和全角冒号都可以，以最后一个冒号为界
pub fn parse_course_arg(input: &str) -> Result<ParsedCourse, ValidationError> {
    let malformed = || ValidationError::MalformedCourseArg {
        input: input.to_string(),
    };

    let (skill, age_group) = input
        .rsplit_once([':', '：'])
        .ok_or_else(malformed)?;
    let (skill, age_group) = (skill.trim(), age_group.trim());

    if skill.is_empty() || age_group.is_empty() {
        return Err(malformed());
    }

    Ok(ParsedCourse::new(skill, age_group))
}
