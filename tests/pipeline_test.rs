use sel_course_generator::error::{AppError, RemoteCallError, RemoteErrorKind};
use sel_course_generator::export;
use sel_course_generator::orchestrator::CourseSource;
use sel_course_generator::{App, Config, CourseList, CourseRequest, KnowledgeBase, ScriptedBackend};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn test_config() -> Config {
    Config {
        llm_api_key: "test".to_string(),
        ..Config::default()
    }
}

fn lesson(skill: &str) -> String {
    format!(
        "1. 本堂课标题：SEL家长同行课程 - 第1堂：{}\n2. 为什么重要：原因\n* **要点**一\n* 要点二\n\n总结",
        skill
    )
}

#[tokio::test(start_paused = true)]
async fn test_generate_writes_every_course_and_combined_document() {
    let backend = Arc::new(ScriptedBackend::from_responses(vec![
        Ok(lesson("认识情绪")),
        Ok(lesson("学会分享")),
    ]));
    let app = App::with_backend(test_config(), backend.clone());
    let dir = tempfile::tempdir().unwrap();

    let courses: CourseList = vec![
        CourseRequest::new("认识 情绪", "3-5岁"),
        CourseRequest::new("", ""),
        CourseRequest::new("学会分享", "6-8岁"),
    ]
    .into_iter()
    .collect();

    let start = Instant::now();
    let outcome = app
        .generate(&courses, &KnowledgeBase::new(), dir.path())
        .await
        .unwrap();

    // 两个可生成课程之间一次节流
    assert_eq!(start.elapsed(), Duration::from_millis(1500));
    assert_eq!(backend.calls(), 2);
    assert_eq!(outcome.report.documents.len(), 2);
    assert_eq!(outcome.written.len(), 3);

    let combined = std::fs::read(dir.path().join("SEL-课程-批量生成.doc")).unwrap();
    let html = String::from_utf8(combined).unwrap();
    assert!(html.starts_with('\u{feff}'));
    assert_eq!(html.matches(export::PAGE_BREAK_MARKUP).count(), 1);
    assert!(html.contains("<li><strong>要点</strong>一</li>"));
    assert!(dir.path().join("SEL-课程-认识_情绪.doc").exists());
}

#[tokio::test(start_paused = true)]
async fn test_generate_exports_completed_courses_before_reporting_failure() {
    let rate_limited = || RemoteCallError::failed("m", RemoteErrorKind::RateLimited, "429");
    let backend = Arc::new(ScriptedBackend::from_responses(vec![
        Ok(lesson("A")),
        Err(rate_limited()),
        Err(rate_limited()),
        Err(rate_limited()),
    ]));
    let app = App::with_backend(test_config(), backend.clone());
    let dir = tempfile::tempdir().unwrap();

    let courses: CourseList = vec![
        CourseRequest::new("A", "3-5岁"),
        CourseRequest::new("B", "3-5岁"),
        CourseRequest::new("C", "3-5岁"),
    ]
    .into_iter()
    .collect();

    let start = Instant::now();
    let err = app
        .generate(&courses, &KnowledgeBase::new(), dir.path())
        .await
        .unwrap_err();

    // 节流 1500 + 重试 3000 + 6000
    assert_eq!(start.elapsed(), Duration::from_millis(10500));
    assert_eq!(backend.calls(), 4);
    match err {
        AppError::Batch(e) => {
            assert_eq!(e.skill, "B");
            assert_eq!(e.completed, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(dir.path().join("SEL-课程-A.doc").exists());
    assert!(!dir.path().join("SEL-课程-B.doc").exists());
}

#[tokio::test]
async fn test_manifest_and_knowledge_flow_into_prompts() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("courses.toml");
    std::fs::write(
        &manifest,
        "[[courses]]\nskill = \"情绪识别\"\nage_group = \"3-5岁\"\n",
    )
    .unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::File::create(&notes)
        .unwrap()
        .write_all("情绪温度计".as_bytes())
        .unwrap();
    let image = dir.path().join("diagram.png");
    std::fs::write(&image, b"\x89PNG").unwrap();

    let backend = Arc::new(ScriptedBackend::from_fn(|_| Ok(lesson("x"))));
    let app = App::with_backend(test_config(), backend.clone());

    let courses = app
        .load_courses(&[CourseSource::from_file(&manifest)])
        .await
        .unwrap();
    let knowledge = app.load_knowledge(&[notes, image]).await;
    app.generate(&courses, &knowledge, &dir.path().join("out"))
        .await
        .unwrap();

    // 清单不经过解析服务，只有一次生成请求
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("技能点: 情绪识别"));
    assert!(requests[0]
        .prompt
        .contains("--- 内容来源: notes.txt ---\n情绪温度计"));
    assert!(!requests[0].prompt.contains("diagram.png"));
}

#[tokio::test]
#[ignore] // 需要真实的 API Key：cargo test -- --ignored
async fn test_live_single_course() {
    let config = Config::from_env().expect("加载配置失败");
    let app = App::initialize(config).expect("初始化失败");
    let dir = tempfile::tempdir().unwrap();

    let courses: CourseList = vec![CourseRequest::new("情绪识别", "3-5岁")]
        .into_iter()
        .collect();
    let outcome = app
        .generate(&courses, &KnowledgeBase::new(), dir.path())
        .await
        .expect("生成失败");

    assert!(outcome.report.documents[0].body.contains("本堂课标题"));
}
