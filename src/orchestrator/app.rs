//! 应用入口 - 编排层
//!
//! 持有配置和各个服务，负责把课程来源、知识库文件、批量生成和导出串起来。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::clients::{CompletionBackend, LlmClient};
use crate::config::Config;
use crate::error::{AppResult, ValidationError};
use crate::export;
use crate::extraction::load_knowledge_file;
use crate::infrastructure::{RetryPolicy, RetryingCaller};
use crate::models::{
    load_course_manifest, read_batch_text, CourseList, GeneratedDocument, KnowledgeBase,
    ParsedCourse,
};
use crate::orchestrator::batch_pipeline::{BatchEvent, BatchPipeline, BatchReport};
use crate::services::{CourseContentGenerator, CourseParser};
use crate::utils::logging;

/// 课程来源
#[derive(Debug, Clone)]
pub enum CourseSource {
    /// 直接给出的 (技能点, 年龄段)
    Pairs(Vec<ParsedCourse>),
    /// `.toml` 课程清单，不经过解析服务
    Manifest(PathBuf),
    /// `.txt` / `.csv` 文本，交给解析服务
    BatchFile(PathBuf),
    /// 自由文本，交给解析服务
    Text(String),
}

impl CourseSource {
    /// 按扩展名判断文件来源
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        if is_toml {
            CourseSource::Manifest(path)
        } else {
            CourseSource::BatchFile(path)
        }
    }
}

/// 生成并导出的结果
#[derive(Debug)]
pub struct GenerationOutcome {
    pub report: BatchReport,
    pub written: Vec<PathBuf>,
}

/// 应用主结构
pub struct App {
    config: Config,
    parser: CourseParser,
    pipeline: BatchPipeline,
}

impl App {
    /// 使用真实的生成服务初始化
    pub fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        let backend: Arc<dyn CompletionBackend> = Arc::new(LlmClient::new(&config));
        Ok(Self::with_backend(config, backend))
    }

    /// 使用指定的生成服务初始化
    pub fn with_backend(config: Config, backend: Arc<dyn CompletionBackend>) -> Self {
        let caller = RetryingCaller::new(backend, RetryPolicy::from_config(&config));
        let parser = CourseParser::new(caller.clone(), &config);
        let generator = CourseContentGenerator::new(caller, &config);
        let pipeline = BatchPipeline::from_config(generator, &config);

        Self {
            config,
            parser,
            pipeline,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pipeline(&self) -> &BatchPipeline {
        &self.pipeline
    }

    /// 解析自由文本
    pub async fn parse_text(&self, text: &str) -> AppResult<Vec<ParsedCourse>> {
        Ok(self.parser.parse(text).await?)
    }

    /// 从多个来源汇总课程列表，保持来源顺序
    pub async fn load_courses(&self, sources: &[CourseSource]) -> AppResult<CourseList> {
        let mut courses = CourseList::new();

        for source in sources {
            let parsed = match source {
                CourseSource::Pairs(pairs) => pairs.clone(),
                CourseSource::Manifest(path) => {
                    info!("📁 读取课程清单: {}", path.display());
                    load_course_manifest(path).await?.courses
                }
                CourseSource::BatchFile(path) => {
                    info!("📁 读取批量文件: {}", path.display());
                    let text = read_batch_text(path).await?;
                    self.parse_text(&text).await?
                }
                CourseSource::Text(text) => self.parse_text(text).await?,
            };

            let added = courses.append_parsed(parsed);
            info!("✓ 新增 {} 个课程", added);
        }

        Ok(courses)
    }

    /// 读取知识库文件，成功加载的文件默认全部选中
    pub async fn load_knowledge(&self, paths: &[PathBuf]) -> KnowledgeBase {
        let mut knowledge = KnowledgeBase::new();
        for path in paths {
            let id = load_knowledge_file(&mut knowledge, path).await;
            knowledge.select(id);
        }
        knowledge
    }

    /// 批量生成并导出
    ///
    /// 每个课程单独保存一份，全部结束后再保存合并文档。
    /// 中途失败时已生成的课程照常导出，然后返回批量错误。
    pub async fn generate(
        &self,
        courses: &CourseList,
        knowledge: &KnowledgeBase,
        output_dir: &Path,
    ) -> AppResult<GenerationOutcome> {
        let eligible = courses.eligible().count();
        if eligible == 0 {
            return Err(ValidationError::NoEligibleCourses.into());
        }

        let context = knowledge.context();
        logging::log_startup(&self.config.llm_model_name, self.config.pacing_delay_ms);
        logging::log_courses_loaded(courses.len(), eligible, context.chars().count());

        let mut report = self
            .pipeline
            .run_to_end(courses.as_slice(), &context, log_event)
            .await?;

        let written = write_documents(&report.documents, output_dir).await?;
        logging::print_final_stats(
            report.documents.len(),
            eligible,
            &output_dir.display().to_string(),
        );

        if let Some(e) = report.error.take() {
            error!("❌ {}", e);
            return Err(e.into());
        }

        Ok(GenerationOutcome { report, written })
    }
}

fn log_event(event: &BatchEvent) {
    match event {
        BatchEvent::Progress(p) => logging::log_course_progress(p.position, p.total, &p.skill),
        BatchEvent::Generated(doc) => {
            info!("✅ {} ({}) 生成完成，{} 字", doc.skill, doc.age_group, doc.body.chars().count())
        }
        BatchEvent::Failed(e) => warn!("⚠️ 第 {} 个课程失败: {}", e.position, e.source),
        BatchEvent::Cancelled { completed } => warn!("⚠️ 已取消，完成 {} 个", completed),
    }
}

/// 保存单个课程文档和合并文档
pub async fn write_documents(
    documents: &[GeneratedDocument],
    output_dir: &Path,
) -> AppResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(documents.len() + 1);
    if documents.is_empty() {
        return Ok(written);
    }

    let file_names = export::unique_course_file_names(
        documents
            .iter()
            .map(|d| (d.skill.as_str(), d.age_group.as_str())),
    );

    for (doc, file_name) in documents.iter().zip(&file_names) {
        let exported = export::export(&doc.body, &doc.skill);
        let path = export::write_document(&exported, output_dir, file_name).await?;
        written.push(path);
    }

    let bodies: Vec<&str> = documents.iter().map(|d| d.body.as_str()).collect();
    let combined = export::export_many(&bodies, "SEL 课程批量生成");
    let path = export::write_document(&combined, output_dir, export::combined_file_name()).await?;
    written.push(path);

    Ok(written)
}
