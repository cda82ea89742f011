use crate::domain::{BlogPost, Page, PageDraft, PageKind};
use crate::features::blog::model::DbOperationReport;
use crate::features::blog::url_path::{post_url_path, title_case};
use crate::io::ContentReader;
use crate::parser::markdown::{
    compile_markdown_to_html, extract_frontmatter, parse_post_date, resolve_post_date,
};
use crate::services::blog::BlogService;
use crate::services::import::manifest::Manifest;
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

// a markdown file after the discovery pass: parsed, hashed, not yet compiled
#[derive(Debug, Clone)]
pub struct PostSource {
    pub filename: String,
    pub slug: String,
    pub title: String,
    pub date: NaiveDate,
    pub tags: BTreeSet<String>,
    pub category: Option<String>,
    pub featured_image: Option<String>,
    pub live: bool,
    pub body: String,
    pub md_content_hash: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    // slug collisions
    pub rejected: usize,
    // unreadable files, bad front matter, failed writes
    pub failed: usize,
}

impl ImportReport {
    fn record(&mut self, operation: DbOperationReport) {
        match operation {
            DbOperationReport::Insert => self.inserted += 1,
            DbOperationReport::Update => self.updated += 1,
            DbOperationReport::NoChange => self.unchanged += 1,
        }
    }
}

/// Synchronises a directory of markdown posts into the blog root. Posts are matched to
/// files by slug; posts without a file are left alone.
pub struct ContentImporter {
    reader: Box<dyn ContentReader>,
    blog: Arc<BlogService>,
    content_dir: PathBuf,
}

impl ContentImporter {
    pub fn new(reader: Box<dyn ContentReader>, blog: Arc<BlogService>, content_dir: PathBuf) -> Self {
        Self {
            reader,
            blog,
            content_dir,
        }
    }

    pub async fn import_all(&self) -> Result<ImportReport> {
        info!(dir = %self.content_dir.display(), "Importing markdown posts");

        let blog_root = self.blog.ensure_blog_root().await?;
        let files = self
            .reader
            .list_markdown_files(&self.content_dir)
            .await
            .context("Failed to list markdown files for import")?;

        let mut report = ImportReport::default();

        // 1. discovery: read and parse every file once
        let mut sources = Vec::with_capacity(files.len());
        for path in &files {
            match self.discover(path).await {
                Ok(source) => sources.push(source),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping post");
                    report.failed += 1;
                }
            }
        }

        // 2. validation: collision policy
        let existing = self.blog.store().children_of(&blog_root.path).await?;
        let (accepted, rejected) = validate_collisions(sources, &existing);
        report.rejected = rejected;

        // 3. manifest: every post's final url, so bodies can link to each other
        let settings = self.blog.config().url_settings();
        let mut manifest = Manifest::new();
        for page in existing.iter().filter(|page| page.as_post().is_some()) {
            manifest.insert_post(page.slug.clone(), page.url_path.clone());
        }
        for source in &accepted {
            let url_path = post_url_path(
                Some(&blog_root.url_path),
                source.date,
                &source.slug,
                &settings,
            );
            manifest.insert_file(source.filename.clone(), source.slug.clone(), url_path);
        }

        // 4. ingestion: compile and write
        for source in accepted {
            let filename = source.filename.clone();
            match self.ingest(&blog_root, source, &manifest).await {
                Ok(operation) => {
                    debug!(file = %filename, ?operation, "Imported post");
                    report.record(operation);
                }
                Err(e) => {
                    warn!(file = %filename, error = %e, "Failed to import post");
                    report.failed += 1;
                }
            }
        }

        info!(
            inserted = report.inserted,
            updated = report.updated,
            unchanged = report.unchanged,
            rejected = report.rejected,
            failed = report.failed,
            "Import finished"
        );
        Ok(report)
    }

    async fn discover(&self, path: &Path) -> Result<PostSource> {
        let relative_path = path
            .strip_prefix(&self.content_dir)
            .with_context(|| format!("File {} is outside of content dir", path.display()))?;
        let filename = relative_path.to_string_lossy().replace('\\', "/");

        let raw_markdown = self.reader.read_to_string(path).await?;
        let metadata = self.reader.get_metadata(path).await?;
        let (frontmatter, body) = extract_frontmatter(&raw_markdown, &filename)?;

        let slug = frontmatter
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_slug(relative_path));
        if slug.is_empty() || slug.contains('/') {
            bail!("Invalid slug '{}' in {}", slug, filename);
        }

        // a date that is present but unreadable is an authoring mistake, not a fallback
        if let Some(date) = frontmatter.date.as_deref() {
            if parse_post_date(date).is_none() {
                bail!("Unreadable date '{}' in {}", date, filename);
            }
        }
        let date = resolve_post_date(
            frontmatter.date.as_deref(),
            metadata.modified,
            metadata.created,
        )
        .ok_or_else(|| anyhow!("No date for {}", filename))?;

        let title = frontmatter
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| title_case(&slug.replace('-', " ")));

        let tags = frontmatter
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        let md_content_hash = format!(
            "{:016x}",
            xxhash_rust::xxh3::xxh3_64(raw_markdown.as_bytes())
        );

        Ok(PostSource {
            filename,
            slug,
            title,
            date,
            tags,
            category: frontmatter
                .category
                .map(|category| category.trim().to_string())
                .filter(|category| !category.is_empty()),
            featured_image: frontmatter.featured_image,
            live: frontmatter.live.unwrap_or(true),
            body,
            md_content_hash,
        })
    }

    async fn ingest(
        &self,
        blog_root: &Page,
        source: PostSource,
        manifest: &Manifest,
    ) -> Result<DbOperationReport> {
        let existing = self
            .blog
            .store()
            .children_of(&blog_root.path)
            .await?
            .into_iter()
            .find(|child| child.slug == source.slug);

        match existing.as_ref().map(|page| page.as_post()) {
            Some(Some(post)) if post.md_content_hash == source.md_content_hash => {
                return Ok(DbOperationReport::NoChange);
            }
            Some(None) => bail!(
                "Slug '{}' belongs to a page that is not a post",
                source.slug
            ),
            _ => {}
        }

        let category = match &source.category {
            Some(slug) => Some(self.category_path(blog_root, slug).await?),
            None => None,
        };

        let html_content = compile_markdown_to_html(&source.body, |link| {
            manifest.resolve_link(link, &source.filename)
        })?;

        let post = BlogPost {
            date: source.date,
            category,
            tags: source.tags,
            featured_image: source.featured_image,
            md_content: source.body,
            html_content,
            md_content_hash: source.md_content_hash,
        };

        match existing {
            Some(mut page) => {
                page.title = source.title;
                page.live = source.live;
                page.kind = PageKind::BlogPost(post);
                self.blog.save_page(page).await?;
                Ok(DbOperationReport::Update)
            }
            None => {
                self.blog
                    .add_child(
                        blog_root,
                        PageDraft {
                            slug: source.slug,
                            title: source.title,
                            live: source.live,
                            kind: PageKind::BlogPost(post),
                        },
                    )
                    .await?;
                Ok(DbOperationReport::Insert)
            }
        }
    }

    // categories named in front matter are created under the blog root on first use
    async fn category_path(&self, blog_root: &Page, slug: &str) -> Result<String> {
        if let Some(category) = self.blog.find_category(blog_root, slug).await? {
            return Ok(category.path);
        }
        let category = self
            .blog
            .add_child(
                blog_root,
                PageDraft {
                    slug: slug.to_string(),
                    title: title_case(&slug.replace('-', " ")),
                    live: true,
                    kind: PageKind::BlogCategory,
                },
            )
            .await?;
        Ok(category.path)
    }
}

/// Drops every source whose slug is claimed by more than one file, by an existing page
/// under the blog root that is not a post, or by a category some file in the batch
/// asks for. A source whose category slug is held by an existing page that is not a
/// category is dropped as well. Categories are created during ingestion, so these
/// clashes have to be settled before anything is written. Returns the survivors and
/// how many were dropped.
pub fn validate_collisions(sources: Vec<PostSource>, existing: &[Page]) -> (Vec<PostSource>, usize) {
    let mut claims: HashMap<&str, usize> = HashMap::new();
    for source in &sources {
        *claims.entry(source.slug.as_str()).or_default() += 1;
    }
    let contested: BTreeSet<String> = claims
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(slug, _)| slug.to_string())
        .collect();

    let requested_categories: BTreeSet<String> = sources
        .iter()
        .filter_map(|source| source.category.clone())
        .collect();

    let total = sources.len();
    let accepted: Vec<PostSource> = sources
        .into_iter()
        .filter(|source| {
            if contested.contains(&source.slug) {
                warn!(slug = %source.slug, file = %source.filename, "Slug claimed by several files");
                return false;
            }
            let taken = existing
                .iter()
                .any(|page| page.slug == source.slug && page.as_post().is_none());
            if taken {
                warn!(slug = %source.slug, file = %source.filename, "Slug already used by a non-post page");
                return false;
            }
            if requested_categories.contains(&source.slug) {
                warn!(slug = %source.slug, file = %source.filename, "Slug is also requested as a category");
                return false;
            }
            if let Some(category) = &source.category {
                let blocked = existing.iter().any(|page| {
                    page.slug == *category && !matches!(page.kind, PageKind::BlogCategory)
                });
                if blocked {
                    warn!(category = %category, file = %source.filename, "Category slug already used by another page");
                    return false;
                }
            }
            true
        })
        .collect();

    let rejected = total - accepted.len();
    (accepted, rejected)
}

fn default_slug(relative_path: &Path) -> String {
    relative_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().trim().to_lowercase().replace(' ', "-"))
        .unwrap_or_default()
}
