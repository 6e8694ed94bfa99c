//! 课程内容生成服务 - 业务能力层
//!
//! 只负责"为一个 (技能点, 年龄段) 生成一堂课"能力，不关心批量顺序
//!
//! 输出模版的编号标题（`1. 本堂课标题：`、`2. 为什么重要：`……）、
//! `* ` / `- ` 列表和 `**加粗**` 是与导出模块之间的约定，导出按这些标记解析。

use tracing::debug;

use crate::clients::CompletionRequest;
use crate::config::Config;
use crate::error::GenerationError;
use crate::infrastructure::RetryingCaller;

/// 课程内容生成服务
pub struct CourseContentGenerator {
    caller: RetryingCaller,
    model_name: String,
}

impl CourseContentGenerator {
    pub fn new(caller: RetryingCaller, config: &Config) -> Self {
        Self {
            caller,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 生成一堂课的文本，原样返回服务的输出
    ///
    /// # 参数
    /// - `skill`: 技能点
    /// - `age_group`: 年龄段
    /// - `knowledge_context`: 知识库参考内容，可以为空
    pub async fn generate(
        &self,
        skill: &str,
        age_group: &str,
        knowledge_context: &str,
    ) -> Result<String, GenerationError> {
        debug!(
            "生成课程: {} ({}), 知识库 {} 字",
            skill,
            age_group,
            knowledge_context.chars().count()
        );

        let prompt = build_lesson_prompt(skill, age_group, knowledge_context);
        let request = CompletionRequest::new(&self.model_name, prompt);

        self.caller
            .call(&request)
            .await
            .map_err(|source| GenerationError {
                skill: skill.to_string(),
                age_group: age_group.to_string(),
                source,
            })
    }
}

fn build_lesson_prompt(skill: &str, age_group: &str, knowledge_context: &str) -> String {
    let knowledge_block = if knowledge_context.is_empty() {
        String::new()
    } else {
        format!("\n---\n知识库参考内容:\n{}\n---\n", knowledge_context)
    };

    format!(
        r#"
您是一位专业的儿童SEL（社交情感学习）课程设计专家。请基于以下知识库内容（如果提供）和SEL技能点，为家长生成一堂结构完整、内容科学、易于实践的课程文本内容。请严格按照给定的markdown格式和模版进行输出。

{knowledge_block}

输入：
技能点: {skill}
年龄段: {age_group}

输出模版 (请务必遵循此结构和编号):
1. 本堂课标题：SEL家长同行课程 - 第n堂：XX (请根据技能点填充n和XX，n可以是一个合适的数字)
2. 为什么重要：深入浅出地解释为什么这个技能对孩子很重要，并提供1个源于真实生活的实际例子来说明。
3. 核心知识：提供2-3个关于此技能的核心科学观念，帮助家长建立正确的认知。内容需专业、精炼。
4. 家庭活动：设计3个富有创意且易于操作的家庭游戏活动，以训练孩子的该项技能。每个活动都必须包括活动名称、活动目的、活动规则或步骤、以及活动所需的材料（尽量使用家庭常见物品）。
5. 日常强化技巧：提供具体的指导，当孩子在日常生活中表现出相关行为时（说什么/做什么），家长应该如何反馈（正面引导），以及不应该如何反馈（错误示范）。
6. 关于该话题的常见问题及解答：列出2-3个家长关于此话题的常见问题，并提供专业、可行的解答。
7. 资料包：提供活动可能需要的物料和资料的简要说明，并在此处放置一个统一的助教联系方式占位符，例如：“如有任何疑问或需要活动资料，请联系助教：[在此插入助教联系方式]”。
"#
    )
}
