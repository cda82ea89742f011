use crate::database::TreeStore;
use crate::database::memory::MemoryTreeStore;
use crate::domain::{Page, PageKind};
use crate::error::BlogError;
use crate::features::blog::resolver::{resolve, split_segments};
use crate::tests::fixtures::{blog_post, page};

// home -> blog -> { hello (dated url), news (category) -> archive (plain) }, plus an
// unpublished draft and an about page under home
async fn setup_tree() -> (MemoryTreeStore, Page) {
    let store = MemoryTreeStore::new();
    let home = page("0001", "home", "/", PageKind::Plain);

    let mut draft = page(
        "000100010003",
        "draft",
        "/blog/2024/Mar/draft/",
        PageKind::BlogPost(blog_post("2024-03-05", &[])),
    );
    draft.live = false;

    let pages = vec![
        home.clone(),
        page("00010001", "blog", "/blog/", PageKind::BlogType),
        page(
            "000100010001",
            "hello",
            "/blog/2024/Mar/hello/",
            PageKind::BlogPost(blog_post("2024-03-01", &[])),
        ),
        page("000100010002", "news", "/blog/news/", PageKind::BlogCategory),
        page("0001000100020001", "archive", "/blog/news/archive/", PageKind::Plain),
        draft,
        page("00010002", "about", "/about/", PageKind::Plain),
    ];
    store.save_subtree(&pages).await.unwrap();

    (store, home)
}

async fn resolve_path(store: &MemoryTreeStore, home: &Page, path: &str) -> Result<Page, BlogError> {
    let segments = split_segments(path);
    resolve(store, home.clone(), &segments).await
}

#[test]
fn test_split_segments_ignores_empty_segments() {
    assert_eq!(split_segments("/blog//2024/Mar/"), vec!["blog", "2024", "Mar"]);
    assert!(split_segments("/").is_empty());
}

#[tokio::test]
async fn test_resolve_root_and_plain_pages() {
    let (store, home) = setup_tree().await;

    assert_eq!(resolve_path(&store, &home, "/").await.unwrap().slug, "home");
    assert_eq!(resolve_path(&store, &home, "/about/").await.unwrap().slug, "about");
    assert_eq!(resolve_path(&store, &home, "/blog").await.unwrap().slug, "blog");
}

// test that the blog root matches the whole remaining path against its children's url_path
#[tokio::test]
async fn test_resolve_post_by_dated_url_path() {
    let (store, home) = setup_tree().await;

    let post = resolve_path(&store, &home, "/blog/2024/Mar/hello/").await.unwrap();
    assert_eq!(post.path, "000100010001");
}

// test the slug-by-slug fallback below and through the blog root
#[tokio::test]
async fn test_resolve_falls_back_to_slug_descent() {
    let (store, home) = setup_tree().await;

    let archive = resolve_path(&store, &home, "/blog/news/archive/").await.unwrap();
    assert_eq!(archive.slug, "archive");

    // a post is also reachable by its bare slug
    let post = resolve_path(&store, &home, "/blog/hello/").await.unwrap();
    assert_eq!(post.slug, "hello");
}

#[tokio::test]
async fn test_resolve_missing_is_not_found() {
    let (store, home) = setup_tree().await;

    for path in ["/nope/", "/blog/2024/Apr/hello/", "/about/deeper/"] {
        let result = resolve_path(&store, &home, path).await;
        assert!(
            matches!(result, Err(BlogError::NotFound)),
            "{} should not resolve",
            path
        );
    }
}

// test that a page that is not live is never served, by either route
#[tokio::test]
async fn test_resolve_unpublished_is_not_found() {
    let (store, home) = setup_tree().await;

    assert!(matches!(
        resolve_path(&store, &home, "/blog/2024/Mar/draft/").await,
        Err(BlogError::NotFound)
    ));
    assert!(matches!(
        resolve_path(&store, &home, "/blog/draft/").await,
        Err(BlogError::NotFound)
    ));
}
