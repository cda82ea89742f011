use crate::io::local::LocalContentReader;
use crate::io::{ContentReader, verify_within_root};
use std::path::{Path, PathBuf};

#[test]
fn test_io_traversal_prevention() {
    let root = Path::new("/content");

    // straight traversal out of the root
    assert!(verify_within_root(root, Path::new("../outside.md")).is_err());

    // climbing out after entering a folder
    assert!(verify_within_root(root, Path::new("blog/../../outside.md")).is_err());

    // an absolute path somewhere else entirely
    assert!(verify_within_root(root, Path::new("/etc/passwd")).is_err());

    // wandering around but staying inside
    assert_eq!(
        verify_within_root(root, Path::new("blog/./drafts/../post.md")).unwrap(),
        PathBuf::from("/content/blog/post.md")
    );
    assert_eq!(
        verify_within_root(root, Path::new("/content/a/b/../c.md")).unwrap(),
        PathBuf::from("/content/a/c.md")
    );
}

// test that the local reader only lists visible markdown files, sorted
#[tokio::test]
async fn test_local_reader_lists_markdown_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    std::fs::create_dir_all(root.join("2024")).unwrap();
    std::fs::write(root.join("b.md"), "# B").unwrap();
    std::fs::write(root.join("2024/a.md"), "# A").unwrap();
    std::fs::write(root.join(".hidden.md"), "# hidden").unwrap();
    std::fs::write(root.join("notes.txt"), "not markdown").unwrap();

    let reader = LocalContentReader::new(root.clone());
    let files = reader.list_markdown_files(&root).await.unwrap();

    assert_eq!(files, vec![root.join("2024/a.md"), root.join("b.md")]);
}

#[tokio::test]
async fn test_local_reader_reads_inside_root_only() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("content");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("post.md"), "# Post").unwrap();
    std::fs::write(dir.path().join("secret.md"), "# Secret").unwrap();

    let reader = LocalContentReader::new(root.clone());
    assert_eq!(
        reader.read_to_string(&root.join("post.md")).await.unwrap(),
        "# Post"
    );
    assert!(reader.read_to_string(Path::new("../secret.md")).await.is_err());

    let metadata = reader.get_metadata(Path::new("post.md")).await.unwrap();
    assert!(metadata.modified.is_some());
}
