//! 批量生成流水线 - 编排层
//!
//! ## 职责
//!
//! 按输入顺序逐个生成课程，每完成一个就立即产出，供调用方实时展示或保存。
//!
//! ## 行为
//!
//! 1. **顺序执行**：同一时间只有一个生成请求在进行
//! 2. **跳过空行**：技能点或年龄段为空的课程不计入进度，也不调用服务
//! 3. **节流**：除第一个课程外，每个课程开始前等待固定间隔
//! 4. **失败即停**：某个课程重试耗尽后整批停止，已产出的文档仍然有效
//! 5. **可取消**：通过 [`CancelHandle`] 在两个课程之间停止，不会打断进行中的请求
//!
//! ## 状态
//!
//! ```text
//! Idle → Running → Completed
//!                → Failed
//!                → Cancelled
//! ```

use futures::stream::{self, BoxStream, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{BatchError, ValidationError};
use crate::models::{CourseRequest, GeneratedDocument};
use crate::services::CourseContentGenerator;

/// 流水线状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// 进度：第 `position` 个（从 1 开始），共 `total` 个可生成课程
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub position: usize,
    pub total: usize,
    pub skill: String,
}

/// 流水线产出的事件
#[derive(Debug)]
pub enum BatchEvent {
    /// 即将开始生成某个课程
    Progress(BatchProgress),
    /// 一个课程生成完成
    Generated(GeneratedDocument),
    /// 生成失败，批量到此结束
    Failed(BatchError),
    /// 被取消，`completed` 为已完成的课程数
    Cancelled { completed: usize },
}

/// 取消句柄，可以在其他任务中调用
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 一次批量生成的汇总
#[derive(Debug)]
pub struct BatchReport {
    pub state: PipelineState,
    pub documents: Vec<GeneratedDocument>,
    pub error: Option<BatchError>,
}

impl BatchReport {
    fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            documents: Vec::new(),
            error: None,
        }
    }
}

/// 批量生成流水线
pub struct BatchPipeline {
    generator: CourseContentGenerator,
    pacing: Duration,
    cancel: CancelHandle,
}

impl BatchPipeline {
    pub fn new(generator: CourseContentGenerator, pacing: Duration) -> Self {
        Self {
            generator,
            pacing,
            cancel: CancelHandle::new(),
        }
    }

    pub fn from_config(generator: CourseContentGenerator, config: &Config) -> Self {
        Self::new(generator, config.pacing_delay())
    }

    /// 获取取消句柄
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// 开始批量生成
    ///
    /// 没有可生成的课程时直接返回错误，不调用服务。
    /// 返回的事件流是惰性的，只有被轮询时才会发起请求。
    pub fn run<'a>(
        &'a self,
        requests: &[CourseRequest],
        knowledge_context: &str,
    ) -> Result<BoxStream<'a, BatchEvent>, ValidationError> {
        let eligible: Vec<CourseRequest> = requests
            .iter()
            .filter(|r| r.is_eligible())
            .cloned()
            .collect();

        if eligible.is_empty() {
            return Err(ValidationError::NoEligibleCourses);
        }

        debug!(
            "批量生成: 共 {} 个课程，{} 个可生成",
            requests.len(),
            eligible.len()
        );

        let run = PipelineRun {
            pipeline: self,
            items: eligible,
            knowledge_context: knowledge_context.to_string(),
            next: 0,
            step: Step::Announce,
        };

        Ok(stream::unfold(run, |mut run| async move {
            let event = run.advance().await?;
            Some((event, run))
        })
        .boxed())
    }

    /// 运行到结束，每个事件先交给 `observer`
    pub async fn run_to_end<F>(
        &self,
        requests: &[CourseRequest],
        knowledge_context: &str,
        mut observer: F,
    ) -> Result<BatchReport, ValidationError>
    where
        F: FnMut(&BatchEvent),
    {
        let mut events = self.run(requests, knowledge_context)?;
        let mut report = BatchReport::new();
        report.state = PipelineState::Running;

        while let Some(event) = events.next().await {
            observer(&event);
            match event {
                BatchEvent::Progress(_) => {}
                BatchEvent::Generated(doc) => report.documents.push(doc),
                BatchEvent::Failed(e) => {
                    report.state = PipelineState::Failed;
                    report.error = Some(e);
                }
                BatchEvent::Cancelled { .. } => report.state = PipelineState::Cancelled,
            }
        }

        if report.state == PipelineState::Running {
            report.state = PipelineState::Completed;
        }

        info!(
            "批量生成结束: {:?}，完成 {} 个",
            report.state,
            report.documents.len()
        );
        Ok(report)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Announce,
    Generate,
    Finished,
}

/// 一次运行的内部状态，每次 `advance` 产出一个事件
struct PipelineRun<'a> {
    pipeline: &'a BatchPipeline,
    items: Vec<CourseRequest>,
    knowledge_context: String,
    next: usize,
    step: Step,
}

impl PipelineRun<'_> {
    fn take_cancellation(&mut self) -> Option<BatchEvent> {
        if !self.pipeline.cancel.is_cancelled() {
            return None;
        }
        warn!("⚠️ 批量生成已取消，已完成 {} 个", self.next);
        self.step = Step::Finished;
        Some(BatchEvent::Cancelled {
            completed: self.next,
        })
    }

    async fn advance(&mut self) -> Option<BatchEvent> {
        match self.step {
            Step::Finished => None,
            Step::Announce => {
                if self.next >= self.items.len() {
                    self.step = Step::Finished;
                    return None;
                }

                // 节流前后各检查一次，取消后不再等待
                if let Some(event) = self.take_cancellation() {
                    return Some(event);
                }

                if self.next > 0 {
                    tokio::time::sleep(self.pipeline.pacing).await;
                    if let Some(event) = self.take_cancellation() {
                        return Some(event);
                    }
                }

                self.step = Step::Generate;
                Some(BatchEvent::Progress(BatchProgress {
                    position: self.next + 1,
                    total: self.items.len(),
                    skill: self.items[self.next].skill.clone(),
                }))
            }
            Step::Generate => {
                let request = &self.items[self.next];
                let result = self
                    .pipeline
                    .generator
                    .generate(&request.skill, &request.age_group, &self.knowledge_context)
                    .await;

                match result {
                    Ok(body) => {
                        let doc = GeneratedDocument::new(request, body);
                        self.next += 1;
                        self.step = Step::Announce;
                        Some(BatchEvent::Generated(doc))
                    }
                    Err(source) => {
                        self.step = Step::Finished;
                        Some(BatchEvent::Failed(BatchError {
                            position: self.next + 1,
                            total: self.items.len(),
                            skill: request.skill.clone(),
                            completed: self.next,
                            source,
                        }))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ScriptedBackend;
    use crate::error::{RemoteCallError, RemoteErrorKind};
    use crate::infrastructure::{RetryPolicy, RetryingCaller};
    use tokio::time::Instant;

    const PACING: Duration = Duration::from_millis(1500);

    fn pipeline(backend: Arc<ScriptedBackend>) -> BatchPipeline {
        let caller = RetryingCaller::new(backend, RetryPolicy::new(3, Duration::from_millis(3000)));
        let config = Config::default();
        BatchPipeline::new(CourseContentGenerator::new(caller, &config), PACING)
    }

    fn echo_backend() -> Arc<ScriptedBackend> {
        Arc::new(ScriptedBackend::from_fn(|request| {
            let skill = request
                .prompt
                .lines()
                .find_map(|l| l.strip_prefix("技能点: "))
                .unwrap_or_default()
                .to_string();
            Ok(format!("1. 本堂课标题：{}", skill))
        }))
    }

    fn rate_limited() -> RemoteCallError {
        RemoteCallError::failed("m", RemoteErrorKind::RateLimited, "429")
    }

    #[tokio::test(start_paused = true)]
    async fn test_generates_in_order_with_pacing() {
        let backend = echo_backend();
        let pipeline = pipeline(backend.clone());
        let requests = vec![
            CourseRequest::new("情绪识别", "3-5岁"),
            CourseRequest::new("同理心", "6-8岁"),
            CourseRequest::new("合作", "6-8岁"),
        ];

        let start = Instant::now();
        let mut events = Vec::new();
        let report = pipeline
            .run_to_end(&requests, "", |e| events.push(format!("{:?}", e)))
            .await
            .unwrap();

        assert_eq!(report.state, PipelineState::Completed);
        assert!(report.error.is_none());
        let skills: Vec<_> = report.documents.iter().map(|d| d.skill.as_str()).collect();
        assert_eq!(skills, vec!["情绪识别", "同理心", "合作"]);
        assert_eq!(report.documents[1].body, "1. 本堂课标题：同理心");
        assert_eq!(report.documents[0].request_id, requests[0].id);
        assert_eq!(events.len(), 6);
        assert_eq!(backend.calls(), 3);
        // 三个课程之间两次间隔
        assert_eq!(start.elapsed(), PACING * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_requests_skipped_and_progress_counts_eligible() {
        let backend = echo_backend();
        let pipeline = pipeline(backend.clone());
        let requests = vec![
            CourseRequest::new("", "3-5岁"),
            CourseRequest::new("情绪识别", "3-5岁"),
            CourseRequest::new("同理心", "  "),
            CourseRequest::new("合作", "6-8岁"),
        ];

        let mut progress = Vec::new();
        let report = pipeline
            .run_to_end(&requests, "", |e| {
                if let BatchEvent::Progress(p) = e {
                    progress.push((p.position, p.total, p.skill.clone()));
                }
            })
            .await
            .unwrap();

        assert_eq!(report.documents.len(), 2);
        assert_eq!(backend.calls(), 2);
        assert_eq!(
            progress,
            vec![(1, 2, "情绪识别".to_string()), (2, 2, "合作".to_string())]
        );
    }

    #[tokio::test]
    async fn test_no_eligible_courses_is_error_without_calls() {
        let backend = echo_backend();
        let pipeline = pipeline(backend.clone());
        let requests = vec![CourseRequest::new("", ""), CourseRequest::new("技能", "")];

        let err = pipeline.run(&requests, "").err().unwrap();
        assert!(matches!(err, ValidationError::NoEligibleCourses));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_earlier_documents() {
        let backend = Arc::new(ScriptedBackend::from_responses(vec![
            Ok("第一课".to_string()),
            Err(rate_limited()),
            Err(rate_limited()),
            Err(rate_limited()),
        ]));
        let pipeline = pipeline(backend.clone());
        let requests = vec![
            CourseRequest::new("A", "3-5岁"),
            CourseRequest::new("B", "3-5岁"),
            CourseRequest::new("C", "3-5岁"),
        ];

        let report = pipeline.run_to_end(&requests, "", |_| {}).await.unwrap();

        assert_eq!(report.state, PipelineState::Failed);
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].body, "第一课");
        let err = report.error.unwrap();
        assert_eq!(err.position, 2);
        assert_eq!(err.total, 3);
        assert_eq!(err.skill, "B");
        assert_eq!(err.completed, 1);
        assert!(matches!(
            err.source.source,
            RemoteCallError::RetriesExhausted { attempts: 3, .. }
        ));
        // C 没有被请求
        assert_eq!(backend.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_documents_are_yielded_before_next_item_starts() {
        let backend = echo_backend();
        let pipeline = pipeline(backend.clone());
        let requests = vec![CourseRequest::new("A", "x"), CourseRequest::new("B", "x")];

        let mut events = pipeline.run(&requests, "").unwrap();
        assert!(matches!(events.next().await, Some(BatchEvent::Progress(_))));
        assert!(matches!(events.next().await, Some(BatchEvent::Generated(_))));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_between_items() {
        let backend = echo_backend();
        let pipeline = pipeline(backend.clone());
        let cancel = pipeline.cancel_handle();
        let requests = vec![CourseRequest::new("A", "x"), CourseRequest::new("B", "x")];

        let start = Instant::now();
        let report = pipeline
            .run_to_end(&requests, "", |e| {
                if matches!(e, BatchEvent::Generated(_)) {
                    cancel.cancel();
                }
            })
            .await
            .unwrap();

        assert_eq!(report.state, PipelineState::Cancelled);
        assert_eq!(report.documents.len(), 1);
        assert_eq!(backend.calls(), 1);
        // 已取消时不再等待节流
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_pacing_stops_before_next_call() {
        let backend = echo_backend();
        let pipeline = pipeline(backend.clone());
        let cancel = pipeline.cancel_handle();
        let requests = vec![CourseRequest::new("A", "x"), CourseRequest::new("B", "x")];

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            cancel.cancel();
        });

        let start = Instant::now();
        let report = pipeline.run_to_end(&requests, "", |_| {}).await.unwrap();

        assert_eq!(report.state, PipelineState::Cancelled);
        assert_eq!(report.documents.len(), 1);
        assert_eq!(backend.calls(), 1);
        assert_eq!(start.elapsed(), PACING);
    }

    #[tokio::test]
    async fn test_knowledge_context_reaches_prompt() {
        let backend = echo_backend();
        let pipeline = pipeline(backend.clone());
        let requests = vec![CourseRequest::new("A", "x")];

        pipeline
            .run_to_end(&requests, "--- 内容来源: a.txt ---\n要点", |_| {})
            .await
            .unwrap();

        assert!(backend.requests()[0].prompt.contains("知识库参考内容:\n--- 内容来源: a.txt ---\n要点"));
    }
}
