use crate::domain::{Page, ViewRestriction};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

pub mod memory;
pub mod sqlite;

// a tree store can be shared between request handlers (sqlx::Pool and the in-memory map
// are both thread safe)
// generic tree operations live here, backend specific implementations in "memory.rs" and
// "sqlite.rs"
#[async_trait]
pub trait TreeStore: Send + Sync {
    async fn get_page(&self, path: &str) -> Result<Option<Page>>;
    async fn get_page_by_url_path(&self, url_path: &str) -> Result<Option<Page>>;
    async fn get_all_pages(&self) -> Result<Vec<Page>>;

    // the first top-level page, which is where request routing starts
    async fn root(&self) -> Result<Option<Page>>;

    // direct children, in path order. an empty path lists the top-level pages
    async fn children_of(&self, path: &str) -> Result<Vec<Page>>;
    async fn descendants_of(&self, path: &str, inclusive: bool) -> Result<Vec<Page>>;

    // every page lying inside (or at) any of the given prefixes, in path order
    async fn ancestors_matching(&self, prefixes: &BTreeSet<String>) -> Result<Vec<Page>>;

    // write operations
    async fn save(&self, page: &Page) -> Result<()>;
    // saves every page in one atomic write (used when a url_path change cascades)
    async fn save_subtree(&self, pages: &[Page]) -> Result<()>;
    // deletes the page and its descendants, clearing category references to them
    async fn delete(&self, path: &str) -> Result<()>;

    // access control
    async fn view_restrictions(&self) -> Result<Vec<ViewRestriction>>;
    async fn save_view_restriction(&self, restriction: &ViewRestriction) -> Result<()>;
    async fn groups_for(&self, username: &str) -> Result<BTreeSet<String>>;
    async fn add_user_to_group(&self, username: &str, group: &str) -> Result<()>;
}
