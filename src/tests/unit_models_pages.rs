use crate::domain::{Page, PageKind};
use crate::features::blog::model::{DbPage, JsonPost};
use crate::tests::fixtures::{page, post};

// test that a post row carries its body columns and an empty tag set is stored as NULL
#[test]
fn test_db_page_from_post() {
    let mut hello = post("00010001", "hello", "2024-03-01", &[]);
    if let Some(blog_post) = hello.as_post_mut() {
        blog_post.category = Some("00010002".to_string());
    }

    let row = DbPage::from(&hello);

    assert_eq!(row.depth, 2);
    assert_eq!(row.kind, "blog_post");
    assert_eq!(row.tags, None);
    assert_eq!(row.category_path.as_deref(), Some("00010002"));
    assert_eq!(row.md_content.as_deref(), Some("# Hello"));
    assert_eq!(row.to_string(), "/blog/hello/");

    let back = Page::try_from(row).unwrap();
    assert_eq!(back, hello);
}

#[test]
fn test_db_page_tags_as_json() {
    let tagged = post("00010001", "hello", "2024-03-01", &["web", "rust"]);
    let row = DbPage::from(&tagged);
    assert_eq!(row.tags.as_deref(), Some(r#"["rust","web"]"#));
}

// test that non-post rows leave every post column empty
#[test]
fn test_db_page_from_container() {
    let row = DbPage::from(&page("0001", "blog", "/blog/", PageKind::BlogType));
    assert_eq!(row.kind, "blog_type");
    assert!(row.post_date.is_none());
    assert!(row.md_content.is_none());
}

#[test]
fn test_page_from_bad_rows() {
    let mut unknown = DbPage::from(&page("0001", "blog", "/blog/", PageKind::BlogType));
    unknown.kind = "gallery".to_string();
    assert!(Page::try_from(unknown).is_err());

    let mut undated = DbPage::from(&post("00010001", "hello", "2024-03-01", &[]));
    undated.post_date = None;
    assert!(Page::try_from(undated).is_err());

    let mut bad_tags = DbPage::from(&post("00010001", "hello", "2024-03-01", &[]));
    bad_tags.tags = Some("not json".to_string());
    assert!(Page::try_from(bad_tags).is_err());
}

#[test]
fn test_json_post_from_page() {
    let category = page("00010002", "news", "/blog/news/", PageKind::BlogCategory);
    let hello = post("00010001", "hello", "2024-03-01", &["rust"]);

    let json = JsonPost::from_page(&hello, Some(&category), "%Y-%m-%d").unwrap();
    assert_eq!(json.date, "2024-03-01");
    assert_eq!(json.tags, vec!["rust".to_string()]);
    assert_eq!(json.category.unwrap().slug, "news");

    // featured_image is left out of the JSON entirely when absent
    let value = serde_json::to_value(JsonPost::from_page(&hello, None, "%Y-%m-%d").unwrap()).unwrap();
    assert!(value.get("featured_image").is_none());
    assert!(value["category"].is_null());

    assert!(JsonPost::from_page(&category, None, "%Y-%m-%d").is_none());
}
