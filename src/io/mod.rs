use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::path::{Component, Path, PathBuf};

pub mod local;

#[async_trait]
pub trait ContentReader: Send + Sync {
    async fn read_to_string(&self, path: &Path) -> Result<String>;
    async fn get_metadata(&self, path: &Path) -> Result<ContentMetadata>;
    async fn list_markdown_files(&self, root: &Path) -> Result<Vec<PathBuf>>;
}

#[derive(Clone, Debug, Default)]
pub struct ContentMetadata {
    pub modified: Option<NaiveDateTime>,
    pub created: Option<NaiveDateTime>,
}

// lexically resolves `path` against `root` and refuses anything that climbs out of it
// (symlinks are not followed, only the written path is judged)
pub fn verify_within_root(root: &Path, path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    let relative = joined
        .strip_prefix(root)
        .map_err(|_| anyhow!("{} is outside of {}", path.display(), root.display()))?;

    let mut depth: usize = 0;
    let mut normalized = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(anyhow!(
                        "{} escapes the content directory {}",
                        path.display(),
                        root.display()
                    ));
                }
                depth -= 1;
                normalized.pop();
            }
            Component::Normal(part) => {
                depth += 1;
                normalized.push(part);
            }
            _ => {
                return Err(anyhow!("Unsupported path component in {}", path.display()));
            }
        }
    }

    Ok(normalized)
}
