use crate::database::TreeStore;
use crate::domain::{Page, PageKind};
use crate::error::BlogError;

pub fn split_segments(request_path: &str) -> Vec<&str> {
    request_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Walks the tree from `start` through `segments` and returns the page to serve.
///
/// A blog root first tries to match the whole remaining path against the `url_path` of
/// its direct children (posts carry date segments in their url_path, e.g.
/// `/blog/2024/Mar/hello/`). Everything else, including a blog root without such a child,
/// falls back to plain slug-by-slug descent. A page is only served when it is live.
pub async fn resolve(
    store: &dyn TreeStore,
    start: Page,
    segments: &[&str],
) -> Result<Page, BlogError> {
    let mut current = start;
    let mut remaining = segments;

    loop {
        let Some((head, rest)) = remaining.split_first() else {
            return if current.live {
                Ok(current)
            } else {
                Err(BlogError::NotFound)
            };
        };

        let children = store.children_of(&current.path).await?;

        if matches!(current.kind, PageKind::BlogType) {
            let target = format!("{}{}/", current.url_path, remaining.join("/"));
            if let Some(child) = children.iter().find(|child| child.url_path == target) {
                current = child.clone();
                remaining = &[];
                continue;
            }
        }

        // generic tree routing: descend by slug
        let Some(child) = children.into_iter().find(|child| child.slug == *head) else {
            return Err(BlogError::NotFound);
        };
        current = child;
        remaining = rest;
    }
}
