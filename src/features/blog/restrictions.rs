use crate::database::TreeStore;
use crate::domain::tree_path::ancestor_prefixes;
use crate::domain::{Page, ViewRestriction, Viewer};
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};

/// How a single page looks to a particular viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Open,
    // listed, but the page itself is blocked
    Restricted,
    // neither listed nor reachable
    Hidden,
}

/// Per-viewer restriction roots. Each root stands for its whole subtree, so membership
/// of a page is a walk over its own ancestor prefixes rather than a scan of the store.
#[derive(Debug, Clone, Default)]
pub struct RestrictionIndex {
    unlistable: BTreeSet<String>,
    unviewable: BTreeSet<String>,
}

impl RestrictionIndex {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn build(restrictions: &[ViewRestriction], viewer: &Viewer) -> Self {
        let mut by_page: BTreeMap<&str, Vec<&ViewRestriction>> = BTreeMap::new();
        for restriction in restrictions {
            by_page
                .entry(restriction.page_path.as_str())
                .or_default()
                .push(restriction);
        }

        let mut index = Self::default();
        for (page_path, page_restrictions) in by_page {
            // belonging to any permitted group opens the page (and its subtree)
            if page_restrictions
                .iter()
                .any(|restriction| viewer.is_member(&restriction.permitted_group))
            {
                continue;
            }

            index.unviewable.insert(page_path.to_string());
            if page_restrictions
                .iter()
                .any(|restriction| restriction.completely_hidden)
            {
                index.unlistable.insert(page_path.to_string());
            }
        }

        index
    }

    pub fn unlistable_roots(&self) -> &BTreeSet<String> {
        &self.unlistable
    }

    pub fn unviewable_roots(&self) -> &BTreeSet<String> {
        &self.unviewable
    }

    pub fn is_listable(&self, path: &str) -> bool {
        !covers(&self.unlistable, path)
    }

    pub fn is_viewable(&self, path: &str) -> bool {
        !covers(&self.unviewable, path)
    }

    pub fn access(&self, path: &str) -> Access {
        if !self.is_listable(path) {
            Access::Hidden
        } else if !self.is_viewable(path) {
            Access::Restricted
        } else {
            Access::Open
        }
    }

    /// Every page in the store the viewer may see in listings.
    pub async fn listable(&self, store: &dyn TreeStore) -> Result<Vec<Page>> {
        subtract(store, &self.unlistable).await
    }

    /// Every page in the store the viewer may open directly.
    pub async fn viewable(&self, store: &dyn TreeStore) -> Result<Vec<Page>> {
        subtract(store, &self.unviewable).await
    }
}

fn covers(roots: &BTreeSet<String>, path: &str) -> bool {
    !roots.is_empty() && ancestor_prefixes(path).any(|prefix| roots.contains(prefix))
}

async fn subtract(store: &dyn TreeStore, roots: &BTreeSet<String>) -> Result<Vec<Page>> {
    let all_pages = store.get_all_pages().await?;
    if roots.is_empty() {
        return Ok(all_pages);
    }

    let excluded: BTreeSet<String> = store
        .ancestors_matching(roots)
        .await?
        .into_iter()
        .map(|page| page.path)
        .collect();

    Ok(all_pages
        .into_iter()
        .filter(|page| !excluded.contains(&page.path))
        .collect())
}
