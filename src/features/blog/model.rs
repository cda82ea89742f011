use crate::domain::{BlogPost, Page, PageKind, ViewRestriction};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use derive_more::derive::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(sqlx::FromRow, Debug, Eq, PartialEq, Clone, Display)]
#[display("{}", url_path)]
pub struct DbPage {
    pub path: String,
    pub depth: i64,
    pub slug: String,
    pub title: String,
    pub url_path: String,
    pub live: bool,
    pub kind: String,
    pub post_date: Option<NaiveDate>,
    pub category_path: Option<String>,
    pub tags: Option<String>,
    pub featured_image: Option<String>,
    pub md_content: Option<String>,
    pub html_content: Option<String>,
    pub md_content_hash: Option<String>,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct DbViewRestriction {
    pub page_path: String,
    pub permitted_group: String,
    pub completely_hidden: bool,
}

// translate the pure Page down into a row. tags become a JSON string for sqlite, an empty
// set is stored as NULL
impl From<&Page> for DbPage {
    fn from(page: &Page) -> Self {
        let mut row = DbPage {
            path: page.path.clone(),
            depth: page.depth() as i64,
            slug: page.slug.clone(),
            title: page.title.clone(),
            url_path: page.url_path.clone(),
            live: page.live,
            kind: page.kind.name().to_string(),
            post_date: None,
            category_path: None,
            tags: None,
            featured_image: None,
            md_content: None,
            html_content: None,
            md_content_hash: None,
        };

        if let PageKind::BlogPost(post) = &page.kind {
            row.post_date = Some(post.date);
            row.category_path = post.category.clone();
            row.tags = if post.tags.is_empty() {
                None
            } else {
                serde_json::to_string(&post.tags).ok()
            };
            row.featured_image = post.featured_image.clone();
            row.md_content = Some(post.md_content.clone());
            row.html_content = Some(post.html_content.clone());
            row.md_content_hash = Some(post.md_content_hash.clone());
        }

        row
    }
}

impl TryFrom<DbPage> for Page {
    type Error = anyhow::Error;

    fn try_from(row: DbPage) -> Result<Self> {
        let kind = match row.kind.as_str() {
            "plain" => PageKind::Plain,
            "blog_type" => PageKind::BlogType,
            "blog_category" => PageKind::BlogCategory,
            "blog_post" => {
                let date = row
                    .post_date
                    .ok_or_else(|| anyhow!("Blog post {} has no date", row.path))?;
                let tags: BTreeSet<String> = match &row.tags {
                    Some(raw) => serde_json::from_str(raw)
                        .with_context(|| format!("Malformed tags on page {}", row.path))?,
                    None => BTreeSet::new(),
                };
                PageKind::BlogPost(BlogPost {
                    date,
                    category: row.category_path,
                    tags,
                    featured_image: row.featured_image,
                    md_content: row.md_content.unwrap_or_default(),
                    html_content: row.html_content.unwrap_or_default(),
                    md_content_hash: row.md_content_hash.unwrap_or_default(),
                })
            }
            other => return Err(anyhow!("Unknown page kind '{}' on {}", other, row.path)),
        };

        Ok(Page {
            path: row.path,
            slug: row.slug,
            title: row.title,
            url_path: row.url_path,
            live: row.live,
            kind,
        })
    }
}

impl From<DbViewRestriction> for ViewRestriction {
    fn from(row: DbViewRestriction) -> Self {
        ViewRestriction {
            page_path: row.page_path,
            permitted_group: row.permitted_group,
            completely_hidden: row.completely_hidden,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonPage {
    pub url_path: String,
    pub slug: String,
    pub title: String,
    pub kind: String,
    pub live: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonCategory {
    pub url_path: String,
    pub slug: String,
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonPost {
    pub url_path: String,
    pub slug: String,
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub category: Option<JsonCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub html_content: String,
}

impl From<&Page> for JsonPage {
    fn from(page: &Page) -> Self {
        JsonPage {
            url_path: page.url_path.clone(),
            slug: page.slug.clone(),
            title: page.title.clone(),
            kind: page.kind.name().to_string(),
            live: page.live,
        }
    }
}

impl From<&Page> for JsonCategory {
    fn from(page: &Page) -> Self {
        JsonCategory {
            url_path: page.url_path.clone(),
            slug: page.slug.clone(),
            title: page.title.clone(),
        }
    }
}

impl JsonPost {
    // None when the page is not a blog post. the category is resolved by the caller since
    // the post only carries a reference to it
    pub fn from_page(page: &Page, category: Option<&Page>, date_format: &str) -> Option<Self> {
        let post = page.as_post()?;
        Some(JsonPost {
            url_path: page.url_path.clone(),
            slug: page.slug.clone(),
            title: page.title.clone(),
            date: post.date.format(date_format).to_string(),
            tags: post.tags.iter().cloned().collect(),
            category: category.map(JsonCategory::from),
            featured_image: post.featured_image.clone(),
            html_content: post.html_content.clone(),
        })
    }
}

// what the importer decided to do with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbOperationReport {
    NoChange,
    Update,
    Insert,
}
