pub mod logging;
pub mod text;

pub use text::{strip_markup, truncate_text};
