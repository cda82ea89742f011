use crate::domain::tree_path;
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub path: String,
    pub slug: String,
    pub title: String,
    pub url_path: String,
    pub live: bool,
    pub kind: PageKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    Plain,
    BlogType,
    BlogCategory,
    BlogPost(BlogPost),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPost {
    pub date: NaiveDate,
    // path of a BlogCategory page, cleared when that page is deleted
    pub category: Option<String>,
    pub tags: BTreeSet<String>,
    pub featured_image: Option<String>,
    pub md_content: String,
    pub html_content: String,
    pub md_content_hash: String,
}

// what an editor hands over when creating a page; the tree position and url_path are
// assigned on save
#[derive(Debug, Clone)]
pub struct PageDraft {
    pub slug: String,
    pub title: String,
    pub live: bool,
    pub kind: PageKind,
}

impl Page {
    pub fn depth(&self) -> usize {
        tree_path::depth_of(&self.path)
    }

    pub fn parent_path(&self) -> Option<&str> {
        tree_path::parent_path(&self.path)
    }

    pub fn as_post(&self) -> Option<&BlogPost> {
        match &self.kind {
            PageKind::BlogPost(post) => Some(post),
            _ => None,
        }
    }

    pub fn as_post_mut(&mut self) -> Option<&mut BlogPost> {
        match &mut self.kind {
            PageKind::BlogPost(post) => Some(post),
            _ => None,
        }
    }

    /// Abstract template identifier handed to the renderer.
    pub fn template(&self) -> &'static str {
        match self.kind {
            PageKind::BlogType | PageKind::BlogCategory => "blog/blog_index.html",
            PageKind::BlogPost(_) => "blog/blog_post.html",
            PageKind::Plain => "blog/page.html",
        }
    }
}

impl PageKind {
    pub fn name(&self) -> &'static str {
        match self {
            PageKind::Plain => "plain",
            PageKind::BlogType => "blog_type",
            PageKind::BlogCategory => "blog_category",
            PageKind::BlogPost(_) => "blog_post",
        }
    }
}

impl PageDraft {
    pub fn into_page(self, path: String) -> Page {
        Page {
            path,
            slug: self.slug,
            title: self.title,
            url_path: String::new(),
            live: self.live,
            kind: self.kind,
        }
    }
}
