//! 课程解析服务 - 业务能力层
//!
//! 只负责"从自由文本中提取 (技能点, 年龄段)"能力，不关心后续生成

use tracing::{debug, info};

use crate::clients::{CompletionRequest, ResponseSchema};
use crate::config::Config;
use crate::error::ParseError;
use crate::infrastructure::RetryingCaller;
use crate::models::ParsedCourse;

/// 课程解析服务
///
/// 职责：
/// - 构建提取课程的 prompt，并要求返回 JSON 数组
/// - 严格解析返回的 JSON
/// - 不去重，不校验内容是否合理
pub struct CourseParser {
    caller: RetryingCaller,
    model_name: String,
}

impl CourseParser {
    pub fn new(caller: RetryingCaller, config: &Config) -> Self {
        Self {
            caller,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 从自由文本中解析课程列表
    ///
    /// 文本中没有课程时返回空列表而不是错误；空白输入不会发起远程调用。
    pub async fn parse(&self, text: &str) -> Result<Vec<ParsedCourse>, ParseError> {
        if text.trim().is_empty() {
            debug!("输入为空，跳过解析");
            return Ok(Vec::new());
        }

        let request = CompletionRequest::new(&self.model_name, build_parse_prompt(text))
            .with_schema(course_list_schema());

        let response = self.caller.call(&request).await?;
        let courses = parse_course_json(&response)?;

        info!("✓ 从文本中解析出 {} 个课程", courses.len());
        Ok(courses)
    }
}

/// 课程数组的 JSON Schema
fn course_list_schema() -> ResponseSchema {
    ResponseSchema {
        name: "course_requests".to_string(),
        schema: serde_json::json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "skill": { "type": "string" },
                    "ageGroup": { "type": "string" }
                },
                "required": ["skill", "ageGroup"],
                "additionalProperties": false
            }
        }),
    }
}

fn parse_course_json(response: &str) -> Result<Vec<ParsedCourse>, ParseError> {
    let trimmed = response.trim();
    serde_json::from_str(trimmed).map_err(|source| ParseError::MalformedJson {
        response: crate::utils::truncate_text(trimmed, 200),
        source,
    })
}

fn build_parse_prompt(text: &str) -> String {
    format!(
        r#"
您是一位专业的数据提取助理。请从以下用户提供的文本中，识别并提取出所有关于SEL课程的请求。
对于每一个课程请求，您需要明确地找出两个关键信息：
1.  **具体技能点 (skill)**: 这是课程的核心主题，例如 "情绪识别", "自我管理", "同理心" 等。
2.  **年龄段 (ageGroup)**: 这是课程的目标学员年龄，例如 "3-5岁", "6-8岁", "9-12岁" 等。

请将提取出的信息以一个JSON数组的格式返回，数组中的每个对象都包含 "skill" 和 "ageGroup" 两个字段。如果文本中没有明确的课程请求，请返回一个空数组。

例如，如果用户输入:
"我想为3到5岁的孩子设计一个关于认识情绪的课程，再来一个给大一点的9-12岁孩子的情绪管理课。"

您应该返回:
[
  {{ "skill": "认识情绪", "ageGroup": "3-5岁" }},
  {{ "skill": "情绪管理", "ageGroup": "9-12岁" }}
]

这是需要您处理的文本:
---
{}
---
"#,
        text
    )
}
