pub mod batch_loader;
pub mod toml_loader;

pub use batch_loader::{read_batch_text, validate_batch_file};
pub use toml_loader::{load_course_manifest, to_manifest_string, CourseManifest};
