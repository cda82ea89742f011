pub mod blog;
pub mod import;

pub use blog::BlogService;
pub use import::{ContentImporter, ImportReport};
