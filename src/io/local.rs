use crate::io::{ContentMetadata, ContentReader, verify_within_root};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct LocalContentReader {
    pub root_path: PathBuf,
}

impl LocalContentReader {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }
}

#[async_trait]
impl ContentReader for LocalContentReader {
    async fn read_to_string(&self, path: &Path) -> Result<String> {
        let verified = verify_within_root(&self.root_path, path)?;
        tokio::fs::read_to_string(&verified)
            .await
            .with_context(|| format!("Failed to read {}", verified.display()))
    }

    async fn get_metadata(&self, path: &Path) -> Result<ContentMetadata> {
        let verified = verify_within_root(&self.root_path, path)?;
        let metadata = tokio::fs::metadata(&verified)
            .await
            .with_context(|| format!("Failed to read metadata of {}", verified.display()))?;

        let modified = metadata
            .modified()
            .ok()
            .map(|t| DateTime::<Utc>::from(t).naive_utc());
        let created = metadata
            .created()
            .ok()
            .map(|t| DateTime::<Utc>::from(t).naive_utc());

        Ok(ContentMetadata { modified, created })
    }

    async fn list_markdown_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let is_hidden = entry
                .file_name()
                .to_str()
                .map_or(false, |name| name.starts_with('.'));
            if entry.file_type().is_file()
                && !is_hidden
                && entry.path().extension().and_then(|s| s.to_str()) == Some("md")
            {
                entries.push(entry.into_path());
            }
        }
        entries.sort();
        Ok(entries)
    }
}
