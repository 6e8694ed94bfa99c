//! 课程请求与生成结果

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 课程请求ID（只保证唯一，不含业务含义）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseId(Uuid);

impl CourseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CourseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 解析服务返回的 (技能点, 年龄段)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCourse {
    pub skill: String,
    #[serde(rename = "ageGroup", alias = "age_group")]
    pub age_group: String,
}

impl ParsedCourse {
    pub fn new(skill: impl Into<String>, age_group: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            age_group: age_group.into(),
        }
    }
}

/// 课程请求：驱动一次生成调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRequest {
    pub id: CourseId,
    pub skill: String,
    pub age_group: String,
}

impl CourseRequest {
    pub fn new(skill: impl Into<String>, age_group: impl Into<String>) -> Self {
        Self {
            id: CourseId::new(),
            skill: skill.into(),
            age_group: age_group.into(),
        }
    }

    /// 技能点和年龄段都不为空才会参与生成
    pub fn is_eligible(&self) -> bool {
        !self.skill.trim().is_empty() && !self.age_group.trim().is_empty()
    }

    /// 两个字段都为空（手动添加后未填写的空行）
    pub fn is_blank(&self) -> bool {
        self.skill.trim().is_empty() && self.age_group.trim().is_empty()
    }
}

impl From<ParsedCourse> for CourseRequest {
    fn from(parsed: ParsedCourse) -> Self {
        Self::new(parsed.skill, parsed.age_group)
    }
}

/// 有序的课程请求列表
#[derive(Debug, Clone, Default)]
pub struct CourseList {
    courses: Vec<CourseRequest>,
}

impl CourseList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, course: CourseRequest) -> CourseId {
        let id = course.id;
        self.courses.push(course);
        id
    }

    /// 添加一个待填写的空课程
    pub fn push_blank(&mut self) -> CourseId {
        self.push(CourseRequest::new("", ""))
    }

    /// 整体替换某个课程的字段，返回是否找到
    pub fn replace(&mut self, id: CourseId, skill: impl Into<String>, age_group: impl Into<String>) -> bool {
        match self.courses.iter_mut().find(|c| c.id == id) {
            Some(course) => {
                course.skill = skill.into();
                course.age_group = age_group.into();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: CourseId) -> Option<CourseRequest> {
        let index = self.courses.iter().position(|c| c.id == id)?;
        Some(self.courses.remove(index))
    }

    pub fn clear(&mut self) {
        self.courses.clear();
    }

    /// 追加批量导入的课程
    ///
    /// 先去掉两个字段都为空的占位行，再按顺序追加，每条分配新的ID。
    pub fn append_parsed(&mut self, parsed: Vec<ParsedCourse>) -> usize {
        self.courses.retain(|c| !c.is_blank());
        let added = parsed.len();
        self.courses
            .extend(parsed.into_iter().map(CourseRequest::from));
        added
    }

    pub fn eligible(&self) -> impl Iterator<Item = &CourseRequest> {
        self.courses.iter().filter(|c| c.is_eligible())
    }

    pub fn as_slice(&self) -> &[CourseRequest] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

impl FromIterator<CourseRequest> for CourseList {
    fn from_iter<I: IntoIterator<Item = CourseRequest>>(iter: I) -> Self {
        Self {
            courses: iter.into_iter().collect(),
        }
    }
}

/// 一次成功生成的课程文档（创建后不可变）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    /// 对应的课程请求（仅引用，不持有）
    pub request_id: CourseId,
    pub skill: String,
    pub age_group: String,
    pub body: String,
}

impl GeneratedDocument {
    pub fn new(request: &CourseRequest, body: String) -> Self {
        Self {
            request_id: request.id,
            skill: request.skill.clone(),
            age_group: request.age_group.clone(),
            body,
        }
    }
}
