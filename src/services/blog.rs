use crate::config::BlogConfig;
use crate::database::TreeStore;
use crate::domain::tree_path::{ancestor_prefixes, child_path, last_step_index};
use crate::domain::{Page, PageDraft, PageKind, ViewRestriction, Viewer};
use crate::error::BlogError;
use crate::features::blog::model::{JsonPage, JsonPost};
use crate::features::blog::pagination::{PaginationMeta, paginate};
use crate::features::blog::query::{self, PostFilters};
use crate::features::blog::query_string::QueryParams;
use crate::features::blog::render::{Rendered, Renderer};
use crate::features::blog::resolver::{self, split_segments};
use crate::features::blog::restrictions::{Access, RestrictionIndex};
use crate::features::blog::siblings::{self, SiblingLinks};
use crate::features::blog::url_path::{compute_url_path, rebase_url_path, title_case};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

const JSON_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Serialize)]
struct IndexContext {
    page: JsonPage,
    posts: Vec<JsonPost>,
    pagination: PaginationMeta,
    next_url: Option<String>,
    previous_url: Option<String>,
    tag: Option<String>,
    category: Option<String>,
    // active filters without the page number, e.g. "?tag=rust" or ""
    filter_query: String,
    // "?tag=rust&" or "?", ready for "page=N" to be appended
    page_link_prefix: String,
}

#[derive(Serialize)]
struct PostContext {
    page: JsonPage,
    post: JsonPost,
    next_post: Option<JsonPost>,
    previous_post: Option<JsonPost>,
    tag: Option<String>,
    category: Option<String>,
    filter_query: String,
}

#[derive(Serialize)]
struct PlainContext {
    page: JsonPage,
    children: Vec<JsonPage>,
}

// the request-time orchestrator: one instance is shared by every handler
pub struct BlogService {
    store: Box<dyn TreeStore>,
    config: Arc<BlogConfig>,
}

impl BlogService {
    pub fn new(store: Box<dyn TreeStore>, config: Arc<BlogConfig>) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &dyn TreeStore {
        self.store.as_ref()
    }

    pub fn config(&self) -> &BlogConfig {
        &self.config
    }

    // ---- access control ----

    /// A missing username is the anonymous viewer, never an error.
    pub async fn viewer(&self, username: Option<&str>) -> Result<Viewer> {
        match username.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => {
                let groups = self.store.groups_for(name).await?;
                Ok(Viewer::new(name, groups))
            }
            None => Ok(Viewer::anonymous()),
        }
    }

    pub async fn restriction_index(&self, viewer: &Viewer) -> Result<RestrictionIndex> {
        let restrictions = self.store.view_restrictions().await?;
        Ok(RestrictionIndex::build(&restrictions, viewer))
    }

    pub async fn restrict(
        &self,
        page: &Page,
        permitted_group: &str,
        completely_hidden: bool,
    ) -> Result<()> {
        self.store
            .save_view_restriction(&ViewRestriction {
                page_path: page.path.clone(),
                permitted_group: permitted_group.to_string(),
                completely_hidden,
            })
            .await?;
        info!(page = %page.url_path, group = permitted_group, completely_hidden, "Restricted page");
        Ok(())
    }

    pub async fn add_user_to_group(&self, username: &str, group: &str) -> Result<()> {
        self.store.add_user_to_group(username, group).await
    }

    // ---- routing ----

    /// Resolves a request path from the site root and applies the viewer's restrictions.
    /// Hidden pages are indistinguishable from missing ones.
    pub async fn route(
        &self,
        request_path: &str,
        index: &RestrictionIndex,
    ) -> Result<Page, BlogError> {
        let root = self.store.root().await?.ok_or(BlogError::NotFound)?;
        let segments = split_segments(request_path);
        let page = resolver::resolve(self.store.as_ref(), root, &segments).await?;

        match index.access(&page.path) {
            Access::Open => Ok(page),
            Access::Restricted => Err(BlogError::Forbidden(page.url_path)),
            Access::Hidden => Err(BlogError::NotFound),
        }
    }

    pub async fn render_path(
        &self,
        request_path: &str,
        viewer: &Viewer,
        params: &QueryParams,
        renderer: &dyn Renderer,
    ) -> Result<Rendered, BlogError> {
        let index = self.restriction_index(viewer).await?;
        let page = self.route(request_path, &index).await?;
        debug!(url_path = %page.url_path, kind = page.kind.name(), "Resolved page");

        let context = match &page.kind {
            PageKind::BlogType | PageKind::BlogCategory => {
                self.index_context(&page, params, &index).await?
            }
            PageKind::BlogPost(_) => self.post_context(&page, params, &index).await?,
            PageKind::Plain => self.plain_context(&page, &index).await?,
        };

        Ok(renderer.render(page.template(), &context)?)
    }

    // ---- queries ----

    pub async fn get_posts(
        &self,
        container: &Page,
        filters: &PostFilters,
        index: &RestrictionIndex,
    ) -> Result<Vec<Page>> {
        query::get_posts(self.store.as_ref(), container, filters, index).await
    }

    pub async fn sibling_links(
        &self,
        post: &Page,
        filters: &PostFilters,
        index: &RestrictionIndex,
    ) -> Result<SiblingLinks> {
        siblings::sibling_links(self.store.as_ref(), post, filters, index).await
    }

    /// Nearest blog root at or above `page`.
    pub async fn blog_root_of(&self, page: &Page) -> Result<Option<Page>> {
        if matches!(page.kind, PageKind::BlogType) {
            return Ok(Some(page.clone()));
        }
        let ancestors: Vec<&str> = ancestor_prefixes(&page.path).collect();
        for path in ancestors.iter().rev().skip(1) {
            if let Some(ancestor) = self.store.get_page(path).await? {
                if matches!(ancestor.kind, PageKind::BlogType) {
                    return Ok(Some(ancestor));
                }
            }
        }
        Ok(None)
    }

    pub async fn find_category(&self, blog_root: &Page, slug: &str) -> Result<Option<Page>> {
        let descendants = self.store.descendants_of(&blog_root.path, false).await?;
        Ok(descendants
            .into_iter()
            .find(|page| matches!(page.kind, PageKind::BlogCategory) && page.slug == slug))
    }

    /// Reads `tag` and `category` (a category slug) from the query string. Features that
    /// are switched off in the config are ignored.
    pub async fn filters_from_query(&self, page: &Page, params: &QueryParams) -> Result<PostFilters> {
        let tag = if self.config.use_tags {
            params.get_non_empty("tag").map(str::to_string)
        } else {
            None
        };

        let category = match params.get_non_empty("category") {
            Some(slug) if self.config.use_categories => {
                let found = match self.blog_root_of(page).await? {
                    Some(blog_root) => self.find_category(&blog_root, slug).await?,
                    None => None,
                };
                // an unknown slug still filters, it just matches no post
                Some(found.map(|category| category.path).unwrap_or_default())
            }
            _ => None,
        };

        Ok(PostFilters { tag, category })
    }

    async fn categories_for(&self, posts: &[&Page]) -> Result<HashMap<String, Page>> {
        let mut categories = HashMap::new();
        for post in posts {
            let Some(path) = post.as_post().and_then(|p| p.category.as_ref()) else {
                continue;
            };
            if categories.contains_key(path) {
                continue;
            }
            // a dangling reference just leaves the post without a category
            if let Some(category) = self.store.get_page(path).await? {
                categories.insert(path.clone(), category);
            }
        }
        Ok(categories)
    }

    fn json_post(&self, page: &Page, categories: &HashMap<String, Page>) -> Option<JsonPost> {
        let category = page
            .as_post()
            .and_then(|post| post.category.as_ref())
            .filter(|_| self.config.use_categories)
            .and_then(|path| categories.get(path));

        let mut post = JsonPost::from_page(page, category, JSON_DATE_FORMAT)?;
        if !self.config.use_featured_images {
            post.featured_image = None;
        }
        if !self.config.use_tags {
            post.tags.clear();
        }
        Some(post)
    }

    // ---- contexts ----

    pub async fn index_context(
        &self,
        container: &Page,
        params: &QueryParams,
        index: &RestrictionIndex,
    ) -> Result<Value> {
        let filters = self.filters_from_query(container, params).await?;
        let posts = self.get_posts(container, &filters, index).await?;

        let page = paginate(posts, self.config.posts_per_page, params.get("page"));
        let refs: Vec<&Page> = page.items.iter().collect();
        let categories = self.categories_for(&refs).await?;

        let filter_params = params.without("page");
        let next_url = page
            .next_page_number()
            .map(|n| filter_params.with("page", &n.to_string()).to_query_string());
        let previous_url = page
            .previous_page_number()
            .map(|n| filter_params.with("page", &n.to_string()).to_query_string());

        let context = IndexContext {
            page: JsonPage::from(container),
            posts: page
                .items
                .iter()
                .filter_map(|post| self.json_post(post, &categories))
                .collect(),
            pagination: page.meta(),
            next_url,
            previous_url,
            tag: filters.tag.clone(),
            category: params.get_non_empty("category").map(str::to_string),
            filter_query: filter_params.to_query_string(),
            page_link_prefix: filter_params.link_prefix(),
        };

        Ok(serde_json::to_value(context)?)
    }

    pub async fn post_context(
        &self,
        post: &Page,
        params: &QueryParams,
        index: &RestrictionIndex,
    ) -> Result<Value> {
        let filters = self.filters_from_query(post, params).await?;
        let links = self.sibling_links(post, &filters, index).await?;

        let mut refs: Vec<&Page> = vec![post];
        refs.extend(links.next.iter());
        refs.extend(links.previous.iter());
        let categories = self.categories_for(&refs).await?;

        let json_post = self
            .json_post(post, &categories)
            .with_context(|| format!("{} is not a blog post", post.url_path))?;

        let context = PostContext {
            page: JsonPage::from(post),
            post: json_post,
            next_post: links
                .next
                .as_ref()
                .and_then(|page| self.json_post(page, &categories)),
            previous_post: links
                .previous
                .as_ref()
                .and_then(|page| self.json_post(page, &categories)),
            tag: filters.tag.clone(),
            category: params.get_non_empty("category").map(str::to_string),
            filter_query: params.without("page").to_query_string(),
        };

        Ok(serde_json::to_value(context)?)
    }

    pub async fn plain_context(&self, page: &Page, index: &RestrictionIndex) -> Result<Value> {
        let children = self
            .store
            .children_of(&page.path)
            .await?
            .into_iter()
            .filter(|child| child.live && index.is_listable(&child.path))
            .map(|child| JsonPage::from(&child))
            .collect();

        Ok(serde_json::to_value(PlainContext {
            page: JsonPage::from(page),
            children,
        })?)
    }

    // ---- editing ----

    /// Recomputes the url_path from the parent (and date, for posts) and saves the page.
    /// When the url_path moved, every descendant moves with it in the same write.
    pub async fn save_page(&self, mut page: Page) -> Result<Page> {
        let parent = match page.parent_path() {
            Some(parent_path) => Some(
                self.store
                    .get_page(parent_path)
                    .await?
                    .with_context(|| format!("Parent of {} does not exist", page.path))?,
            ),
            None => None,
        };

        page.url_path = compute_url_path(&page, parent.as_ref(), &self.config.url_settings());

        let mut batch = vec![page.clone()];
        if let Some(previous) = self.store.get_page(&page.path).await? {
            if previous.url_path != page.url_path {
                for mut descendant in self.store.descendants_of(&page.path, false).await? {
                    if let Some(rebased) =
                        rebase_url_path(&descendant.url_path, &previous.url_path, &page.url_path)
                    {
                        descendant.url_path = rebased;
                        batch.push(descendant);
                    }
                }
                info!(
                    from = %previous.url_path,
                    to = %page.url_path,
                    descendants = batch.len() - 1,
                    "Moved url_path"
                );
            }
        }

        self.store.save_subtree(&batch).await?;
        debug!(path = %page.path, url_path = %page.url_path, "Saved page");
        Ok(page)
    }

    pub async fn add_root(&self, draft: PageDraft) -> Result<Page> {
        self.insert_under("", draft).await
    }

    pub async fn add_child(&self, parent: &Page, draft: PageDraft) -> Result<Page> {
        self.insert_under(&parent.path, draft).await
    }

    async fn insert_under(&self, parent_path: &str, draft: PageDraft) -> Result<Page> {
        if draft.slug.is_empty() || draft.slug.contains('/') {
            bail!("Invalid slug '{}'", draft.slug);
        }

        let siblings = self.store.children_of(parent_path).await?;
        if siblings.iter().any(|sibling| sibling.slug == draft.slug) {
            bail!(
                "Slug '{}' is already in use by a sibling under '{}'",
                draft.slug,
                parent_path
            );
        }

        let next_index = siblings
            .iter()
            .filter_map(|sibling| last_step_index(&sibling.path))
            .max()
            .unwrap_or(0)
            + 1;

        let page = draft.into_page(child_path(parent_path, next_index)?);
        let page = self.save_page(page).await?;
        info!(url_path = %page.url_path, kind = page.kind.name(), "Created page");
        Ok(page)
    }

    pub async fn delete_page(&self, page: &Page) -> Result<()> {
        self.store.delete(&page.path).await?;
        info!(url_path = %page.url_path, "Deleted page and its descendants");
        Ok(())
    }

    /// Makes sure the configured blog root exists, creating the site root and any missing
    /// intermediate pages on the way.
    pub async fn ensure_blog_root(&self) -> Result<Page> {
        let blog_root_url = self.config.blog_root.clone();

        if let Some(page) = self.store.get_page_by_url_path(&blog_root_url).await? {
            if !matches!(page.kind, PageKind::BlogType) {
                bail!("{} exists but is not a blog root", blog_root_url);
            }
            return Ok(page);
        }

        let mut current = match self.store.root().await? {
            Some(root) => root,
            None => {
                self.add_root(PageDraft {
                    slug: "home".to_string(),
                    title: "Home".to_string(),
                    live: true,
                    kind: PageKind::Plain,
                })
                .await?
            }
        };

        let segments = split_segments(&blog_root_url);
        if segments.is_empty() {
            bail!("The site root cannot double as the blog root");
        }

        for (position, segment) in segments.iter().enumerate() {
            let is_last = position + 1 == segments.len();
            let existing = self
                .store
                .children_of(&current.path)
                .await?
                .into_iter()
                .find(|child| child.slug == *segment);

            current = match existing {
                Some(child) => child,
                None => {
                    self.add_child(
                        &current,
                        PageDraft {
                            slug: segment.to_string(),
                            title: title_case(segment),
                            live: true,
                            kind: if is_last {
                                PageKind::BlogType
                            } else {
                                PageKind::Plain
                            },
                        },
                    )
                    .await?
                }
            };
        }

        if !matches!(current.kind, PageKind::BlogType) {
            bail!("{} exists but is not a blog root", blog_root_url);
        }
        Ok(current)
    }
}
