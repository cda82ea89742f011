pub mod page;
pub mod restriction;
pub mod tree_path;

pub use page::{BlogPost, Page, PageDraft, PageKind};
pub use restriction::{Viewer, ViewRestriction};
