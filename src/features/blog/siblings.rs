use crate::database::TreeStore;
use crate::domain::Page;
use crate::features::blog::query::{PostFilters, select_posts};
use crate::features::blog::restrictions::RestrictionIndex;
use anyhow::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiblingLinks {
    // newer post
    pub next: Option<Page>,
    // older post
    pub previous: Option<Page>,
}

/// Positions `post_path` inside a newest-first sequence. A post that is not part of the
/// sequence gets no neighbours at all.
pub fn navigate(ordered: &[Page], post_path: &str) -> SiblingLinks {
    let Some(index) = ordered.iter().position(|page| page.path == post_path) else {
        return SiblingLinks::default();
    };

    SiblingLinks {
        next: index
            .checked_sub(1)
            .and_then(|newer| ordered.get(newer))
            .cloned(),
        previous: ordered.get(index + 1).cloned(),
    }
}

// the sibling list is rebuilt on every call so a freshly published or unpublished post
// shows up immediately
pub async fn sibling_links(
    store: &dyn TreeStore,
    post: &Page,
    filters: &PostFilters,
    index: &RestrictionIndex,
) -> Result<SiblingLinks> {
    let Some(parent_path) = post.parent_path() else {
        return Ok(SiblingLinks::default());
    };

    let siblings = store.children_of(parent_path).await?;
    let ordered = select_posts(siblings, filters, index);
    Ok(navigate(&ordered, &post.path))
}
