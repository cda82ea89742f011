use crate::database::TreeStore;
use crate::domain::tree_path::ancestor_prefixes;
use crate::domain::{Page, PageKind};
use crate::features::blog::restrictions::RestrictionIndex;
use anyhow::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilters {
    // exact, case-sensitive tag label
    pub tag: Option<String>,
    // path of a category page. a path no post refers to (e.g. one left behind by a
    // deleted category) simply selects nothing
    pub category: Option<String>,
}

impl PostFilters {
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            category: None,
        }
    }

    pub fn in_category(category: impl Into<String>) -> Self {
        Self {
            tag: None,
            category: Some(category.into()),
        }
    }
}

/// Live posts below `container` that pass the filters and the viewer's listing rules,
/// newest first. A category lists the posts of its blog that reference it.
pub async fn get_posts(
    store: &dyn TreeStore,
    container: &Page,
    filters: &PostFilters,
    index: &RestrictionIndex,
) -> Result<Vec<Page>> {
    let mut filters = filters.clone();

    let source = match container.kind {
        PageKind::BlogCategory => {
            filters.category = Some(container.path.clone());
            post_source_for_category(store, container).await?
        }
        _ => container.clone(),
    };

    let candidates = store.descendants_of(&source.path, false).await?;
    Ok(select_posts(candidates, &filters, index))
}

// posts never live under a category, they live under the blog root it belongs to
async fn post_source_for_category(store: &dyn TreeStore, category: &Page) -> Result<Page> {
    let parent_path = match category.parent_path() {
        Some(path) => path,
        None => return Ok(category.clone()),
    };

    let ancestors: Vec<&str> = ancestor_prefixes(parent_path).collect();
    for path in ancestors.iter().rev() {
        if let Some(page) = store.get_page(path).await? {
            if matches!(page.kind, PageKind::BlogType) {
                return Ok(page);
            }
        }
    }

    Ok(store
        .get_page(parent_path)
        .await?
        .unwrap_or_else(|| category.clone()))
}

/// The in-memory half of the query: filtering and ordering over candidates already in
/// path order. The sort is stable, so posts sharing a date keep their path order.
pub fn select_posts(
    candidates: Vec<Page>,
    filters: &PostFilters,
    index: &RestrictionIndex,
) -> Vec<Page> {
    let mut posts: Vec<Page> = candidates
        .into_iter()
        .filter(|page| page.live)
        .filter(|page| {
            let Some(post) = page.as_post() else {
                return false;
            };
            if let Some(tag) = &filters.tag {
                if !post.tags.contains(tag) {
                    return false;
                }
            }
            if let Some(category) = &filters.category {
                if post.category.as_ref() != Some(category) {
                    return false;
                }
            }
            true
        })
        .filter(|page| index.is_listable(&page.path))
        .collect();

    posts.sort_by(|a, b| post_date(b).cmp(&post_date(a)));
    posts
}

fn post_date(page: &Page) -> Option<chrono::NaiveDate> {
    page.as_post().map(|post| post.date)
}
