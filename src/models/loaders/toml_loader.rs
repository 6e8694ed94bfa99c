use crate::error::FileError;
use crate::models::course::{CourseList, ParsedCourse};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// TOML 课程清单
///
/// ```toml
/// [[courses]]
/// skill = "情绪识别"
/// age_group = "3-5岁"
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CourseManifest {
    #[serde(default)]
    pub courses: Vec<ParsedCourse>,
}

impl CourseManifest {
    pub fn into_course_list(self) -> CourseList {
        let mut list = CourseList::new();
        list.append_parsed(self.courses);
        list
    }
}

/// 从 TOML 文件加载课程清单
pub async fn load_course_manifest(toml_file_path: &Path) -> Result<CourseManifest, FileError> {
    let path = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| FileError::read_failed(path.clone(), e))?;

    let manifest: CourseManifest =
        toml::from_str(&content).map_err(|source| FileError::TomlParseFailed { path, source })?;

    tracing::info!(
        "成功从 {} 加载 {} 个课程",
        toml_file_path.display(),
        manifest.courses.len()
    );

    Ok(manifest)
}

/// 把课程列表写成 TOML 文本（用于保存解析结果）
pub fn to_manifest_string(courses: &[ParsedCourse]) -> Result<String, toml::ser::Error> {
    let manifest = CourseManifest {
        courses: courses.to_vec(),
    };
    toml::to_string(&manifest)
}
