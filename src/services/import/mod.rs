pub mod importer;
pub mod manifest;

pub use importer::{ContentImporter, ImportReport};
