//! 知识库文档
//!
//! 每个文档的状态是一个和类型：只有 `Loaded` 才带内容，
//! 不存在"已加载但内容为空指针"这样的状态。

use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use crate::utils::text::strip_markup;

/// 知识库文档ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KnowledgeId(Uuid);

impl KnowledgeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KnowledgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for KnowledgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// 纯文本
    Plain,
    /// 简化的 HTML 标记（来自 Word 文档）
    Markup,
}

/// 文档状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeStatus {
    /// 刚上传，等待提取
    Pending,
    /// 提取成功
    Loaded { content: String, kind: ContentKind },
    /// 提取失败
    Error { reason: String },
    /// 不支持的文件类型
    Unsupported,
}

impl KnowledgeStatus {
    /// 状态徽标文字
    pub fn label(&self) -> &'static str {
        match self {
            KnowledgeStatus::Pending => "处理中",
            KnowledgeStatus::Loaded { .. } => "已加载",
            KnowledgeStatus::Error { .. } => "错误",
            KnowledgeStatus::Unsupported => "不支持",
        }
    }
}

/// 知识库文档
#[derive(Debug, Clone)]
pub struct KnowledgeDocument {
    pub id: KnowledgeId,
    pub source_name: String,
    status: KnowledgeStatus,
}

impl KnowledgeDocument {
    pub fn pending(source_name: impl Into<String>) -> Self {
        Self {
            id: KnowledgeId::new(),
            source_name: source_name.into(),
            status: KnowledgeStatus::Pending,
        }
    }

    pub fn status(&self) -> &KnowledgeStatus {
        &self.status
    }

    /// 结束提取；只能从 `Pending` 转换一次，返回是否生效
    pub fn resolve(&mut self, outcome: KnowledgeStatus) -> bool {
        if self.status != KnowledgeStatus::Pending || outcome == KnowledgeStatus::Pending {
            return false;
        }
        self.status = outcome;
        true
    }

    /// 编辑已加载的内容，其他状态下不允许
    pub fn update_content(&mut self, new_content: impl Into<String>) -> bool {
        match &mut self.status {
            KnowledgeStatus::Loaded { content, .. } => {
                *content = new_content.into();
                true
            }
            _ => false,
        }
    }

    /// 用于拼接知识上下文的纯文本；未加载或内容为空时返回 None
    pub fn plain_text(&self) -> Option<String> {
        match &self.status {
            KnowledgeStatus::Loaded { content, .. } if content.is_empty() => None,
            KnowledgeStatus::Loaded {
                content,
                kind: ContentKind::Plain,
            } => Some(content.clone()),
            KnowledgeStatus::Loaded {
                content,
                kind: ContentKind::Markup,
            } => Some(strip_markup(content)),
            _ => None,
        }
    }
}

/// 知识库：文档列表 + 当前选中的文档
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    documents: Vec<KnowledgeDocument>,
    selected: HashSet<KnowledgeId>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个待提取的文档
    pub fn add_pending(&mut self, source_name: impl Into<String>) -> KnowledgeId {
        let document = KnowledgeDocument::pending(source_name);
        let id = document.id;
        self.documents.push(document);
        id
    }

    pub fn resolve(&mut self, id: KnowledgeId, outcome: KnowledgeStatus) -> bool {
        self.get_mut(id).is_some_and(|doc| doc.resolve(outcome))
    }

    pub fn update_content(&mut self, id: KnowledgeId, content: impl Into<String>) -> bool {
        self.get_mut(id).is_some_and(|doc| doc.update_content(content))
    }

    /// 删除文档，同时取消选中
    pub fn remove(&mut self, id: KnowledgeId) -> Option<KnowledgeDocument> {
        self.selected.remove(&id);
        let index = self.documents.iter().position(|d| d.id == id)?;
        Some(self.documents.remove(index))
    }

    pub fn toggle_selection(&mut self, id: KnowledgeId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub fn select(&mut self, id: KnowledgeId) {
        self.selected.insert(id);
    }

    pub fn is_selected(&self, id: KnowledgeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn documents(&self) -> &[KnowledgeDocument] {
        &self.documents
    }

    pub fn get(&self, id: KnowledgeId) -> Option<&KnowledgeDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    fn get_mut(&mut self, id: KnowledgeId) -> Option<&mut KnowledgeDocument> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    /// 拼接知识上下文
    ///
    /// 只包含已选中且已加载的文档，按上传顺序，每段以来源标注开头，段间空一行。
    pub fn context(&self) -> String {
        self.documents
            .iter()
            .filter(|doc| self.selected.contains(&doc.id))
            .filter_map(|doc| {
                doc.plain_text()
                    .map(|text| format!("--- 内容来源: {} ---\n{}", doc.source_name, text))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
