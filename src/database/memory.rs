use crate::database::TreeStore;
use crate::domain::tree_path::{self, collapse_prefixes};
use crate::domain::{Page, ViewRestriction};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use tokio::sync::RwLock;

// pages keyed by materialized path in a sorted map, so every subtree is one contiguous
// range of keys
#[derive(Default)]
struct TreeState {
    pages: BTreeMap<String, Page>,
    restrictions: Vec<ViewRestriction>,
    memberships: BTreeMap<String, BTreeSet<String>>,
}

impl TreeState {
    fn subtree<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Page> + 'a {
        self.pages
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(path, _)| path.starts_with(prefix))
            .map(|(_, page)| page)
    }
}

#[derive(Default)]
pub struct MemoryTreeStore {
    state: RwLock<TreeState>,
}

impl MemoryTreeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TreeStore for MemoryTreeStore {
    async fn get_page(&self, path: &str) -> Result<Option<Page>> {
        let state = self.state.read().await;
        Ok(state.pages.get(path).cloned())
    }

    async fn get_page_by_url_path(&self, url_path: &str) -> Result<Option<Page>> {
        let state = self.state.read().await;
        Ok(state
            .pages
            .values()
            .find(|page| page.url_path == url_path)
            .cloned())
    }

    async fn get_all_pages(&self) -> Result<Vec<Page>> {
        let state = self.state.read().await;
        Ok(state.pages.values().cloned().collect())
    }

    async fn root(&self) -> Result<Option<Page>> {
        let state = self.state.read().await;
        Ok(state
            .pages
            .values()
            .find(|page| page.depth() == 1)
            .cloned())
    }

    async fn children_of(&self, path: &str) -> Result<Vec<Page>> {
        let state = self.state.read().await;
        Ok(state
            .subtree(path)
            .filter(|page| tree_path::is_child_of(&page.path, path))
            .cloned()
            .collect())
    }

    async fn descendants_of(&self, path: &str, inclusive: bool) -> Result<Vec<Page>> {
        let state = self.state.read().await;
        Ok(state
            .subtree(path)
            .filter(|page| inclusive || tree_path::is_descendant_of(&page.path, path))
            .cloned()
            .collect())
    }

    async fn ancestors_matching(&self, prefixes: &BTreeSet<String>) -> Result<Vec<Page>> {
        let state = self.state.read().await;
        let mut matched = Vec::new();
        for prefix in collapse_prefixes(prefixes) {
            matched.extend(state.subtree(prefix).cloned());
        }
        Ok(matched)
    }

    async fn save(&self, page: &Page) -> Result<()> {
        let mut state = self.state.write().await;
        state.pages.insert(page.path.clone(), page.clone());
        Ok(())
    }

    async fn save_subtree(&self, pages: &[Page]) -> Result<()> {
        // one write guard for the whole batch, readers never observe half of it
        let mut state = self.state.write().await;
        for page in pages {
            state.pages.insert(page.path.clone(), page.clone());
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let mut state = self.state.write().await;

        let doomed: BTreeSet<String> = state.subtree(path).map(|p| p.path.clone()).collect();
        for doomed_path in &doomed {
            state.pages.remove(doomed_path);
        }

        // dangling category references become "no category"
        for page in state.pages.values_mut() {
            if let Some(post) = page.as_post_mut() {
                if post
                    .category
                    .as_ref()
                    .map_or(false, |category| doomed.contains(category))
                {
                    post.category = None;
                }
            }
        }

        state
            .restrictions
            .retain(|restriction| !doomed.contains(&restriction.page_path));

        Ok(())
    }

    async fn view_restrictions(&self) -> Result<Vec<ViewRestriction>> {
        let state = self.state.read().await;
        Ok(state.restrictions.clone())
    }

    async fn save_view_restriction(&self, restriction: &ViewRestriction) -> Result<()> {
        let mut state = self.state.write().await;
        // one restriction per (page, group), the latest save wins
        state.restrictions.retain(|existing| {
            existing.page_path != restriction.page_path
                || existing.permitted_group != restriction.permitted_group
        });
        state.restrictions.push(restriction.clone());
        Ok(())
    }

    async fn groups_for(&self, username: &str) -> Result<BTreeSet<String>> {
        let state = self.state.read().await;
        Ok(state.memberships.get(username).cloned().unwrap_or_default())
    }

    async fn add_user_to_group(&self, username: &str, group: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .memberships
            .entry(username.to_string())
            .or_default()
            .insert(group.to_string());
        Ok(())
    }
}
