use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

// the importer's map of the content directory: which file became which post, and where
// that post lives. built before any body is compiled so links between posts resolve
// regardless of import order
#[derive(Default)]
pub struct Manifest {
    filename_to_slug: HashMap<String, String>,
    slug_to_url_path: HashMap<String, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    // posts that exist without a backing file are still valid link targets by slug
    pub fn insert_post(&mut self, slug: String, url_path: String) {
        self.slug_to_url_path.insert(slug, url_path);
    }

    pub fn insert_file(&mut self, filename: String, slug: String, url_path: String) {
        self.filename_to_slug.insert(filename, slug.clone());
        self.slug_to_url_path.insert(slug, url_path);
    }

    pub fn slug_for_filename(&self, filename: &str) -> Option<&str> {
        self.filename_to_slug.get(filename).map(String::as_str)
    }

    pub fn url_path_for_slug(&self, slug: &str) -> Option<&str> {
        self.slug_to_url_path.get(slug).map(String::as_str)
    }

    /// Rewrites a link found in `current_filename` so it points at the post it names.
    /// External links, in-page anchors and anything unknown are returned untouched.
    pub fn resolve_link(&self, link: &str, current_filename: &str) -> String {
        if link.starts_with("http://")
            || link.starts_with("https://")
            || link.starts_with("mailto:")
            || link.starts_with('#')
        {
            return link.to_string();
        }

        let (target, fragment) = match link.split_once('#') {
            Some((target, fragment)) => (target, format!("#{}", fragment)),
            None => (link, String::new()),
        };

        let lookup = if target.starts_with("./") || target.starts_with("../") {
            let mut base = PathBuf::from(current_filename);
            base.pop();
            normalize_path_string(&base.join(target))
        } else {
            target.trim_start_matches('/').to_string()
        };

        // "other.md" by filename, or "other" by slug
        let url_path = self
            .slug_for_filename(&lookup)
            .and_then(|slug| self.url_path_for_slug(slug))
            .or_else(|| self.url_path_for_slug(lookup.trim_end_matches('/')));

        match url_path {
            Some(url_path) => format!("{}{}", url_path, fragment),
            None => link.to_string(),
        }
    }
}

pub fn normalize_path_string(path: &Path) -> String {
    let mut components: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                components.pop();
            }
            Component::Normal(part) => components.push(part.to_string_lossy().into_owned()),
            _ => {}
        }
    }
    components.join("/")
}
