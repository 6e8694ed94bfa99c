pub mod content_generator;
pub mod course_parser;

pub use content_generator::CourseContentGenerator;
pub use course_parser::CourseParser;
