pub mod course;
pub mod knowledge;
pub mod loaders;

pub use course::{CourseId, CourseList, CourseRequest, GeneratedDocument, ParsedCourse};
pub use knowledge::{ContentKind, KnowledgeBase, KnowledgeDocument, KnowledgeId, KnowledgeStatus};
pub use loaders::{load_course_manifest, read_batch_text, validate_batch_file, CourseManifest};
