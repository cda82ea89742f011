use crate::features::blog::url_path::{DateFunction, UrlSettings, validate_date_format};
use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct BlogConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: String,
    // markdown posts are imported from here on startup when set
    pub content_dir: Option<PathBuf>,
    // url_path of the blog root that imported posts belong to
    pub blog_root: String,
    pub static_dir: Option<PathBuf>,
    // request header carrying the authenticated username
    pub user_header: String,
    pub date_format: String,
    pub date_function: DateFunction,
    pub posts_per_page: usize,
    pub use_categories: bool,
    pub use_tags: bool,
    pub use_featured_images: bool,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 15,
            bind_addr: "0.0.0.0:3000".to_string(),
            content_dir: None,
            blog_root: "/blog/".to_string(),
            static_dir: None,
            user_header: "x-remote-user".to_string(),
            date_format: "%Y/%b/".to_string(),
            date_function: DateFunction::Title,
            posts_per_page: 10,
            use_categories: true,
            use_tags: true,
            use_featured_images: true,
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        Err(_) => default,
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

// "/blog", "blog/" and "/blog/" all name the same page
pub fn normalize_url_path(value: &str) -> String {
    let trimmed = value.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

impl BlogConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let database_url = std::env::var("DATABASE_URL")
            .context("Failed to determine DATABASE_URL from environment variables")?;

        let max_connections = std::env::var("MAX_CONNECTIONS")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(defaults.max_connections);

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let content_dir = match env_path("CONTENT_DIR") {
            Some(dir) => Some(std::fs::canonicalize(&dir).with_context(|| {
                format!(
                    "Failed to resolve CONTENT_DIR {} to an absolute path. Does the directory exist?",
                    dir.display()
                )
            })?),
            None => None,
        };

        let blog_root = std::env::var("BLOG_ROOT")
            .map(|value| normalize_url_path(&value))
            .unwrap_or(defaults.blog_root);

        let user_header = std::env::var("USER_HEADER")
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or(defaults.user_header);

        let date_format = std::env::var("DATE_FORMAT").unwrap_or(defaults.date_format);
        validate_date_format(&date_format)?;

        let date_function = match std::env::var("DATE_FUNCTION") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.date_function,
        };

        let posts_per_page = match std::env::var("POSTS_PER_PAGE") {
            Ok(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow!("POSTS_PER_PAGE must be a positive integer, got '{}'", value))?,
            Err(_) => defaults.posts_per_page,
        };

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            content_dir,
            blog_root,
            static_dir: env_path("STATIC_DIR"),
            user_header,
            date_format,
            date_function,
            posts_per_page,
            use_categories: env_flag("USE_CATEGORIES", defaults.use_categories),
            use_tags: env_flag("USE_TAGS", defaults.use_tags),
            use_featured_images: env_flag("USE_FEATURED_IMAGES", defaults.use_featured_images),
        })
    }

    pub fn url_settings(&self) -> UrlSettings {
        UrlSettings {
            date_format: self.date_format.clone(),
            date_function: self.date_function,
        }
    }
}
