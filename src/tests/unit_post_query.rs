use crate::database::TreeStore;
use crate::database::memory::MemoryTreeStore;
use crate::domain::{Page, PageKind, ViewRestriction, Viewer};
use crate::features::blog::query::{PostFilters, get_posts, select_posts};
use crate::features::blog::restrictions::RestrictionIndex;
use crate::tests::fixtures::{page, post};

fn slugs(pages: &[Page]) -> Vec<&str> {
    pages.iter().map(|page| page.slug.as_str()).collect()
}

fn with_category(mut page: Page, category_path: &str) -> Page {
    if let Some(post) = page.as_post_mut() {
        post.category = Some(category_path.to_string());
    }
    page
}

// test that posts come out newest first, and posts sharing a date keep their path order
#[test]
fn test_select_posts_sorts_by_date_descending_stable() {
    let candidates = vec![
        post("00010001", "a", "2024-01-01", &[]),
        post("00010002", "b", "2024-03-01", &[]),
        post("00010003", "c", "2024-02-01", &[]),
        post("00010004", "d", "2024-03-01", &[]),
    ];

    let posts = select_posts(candidates, &PostFilters::default(), &RestrictionIndex::unrestricted());
    assert_eq!(slugs(&posts), vec!["b", "d", "c", "a"]);
}

// test that only live blog posts are selected
#[test]
fn test_select_posts_skips_unpublished_and_non_posts() {
    let mut hidden = post("00010002", "unpublished", "2024-03-01", &[]);
    hidden.live = false;
    let candidates = vec![
        page("00010001", "category", "/blog/category/", PageKind::BlogCategory),
        hidden,
        post("00010003", "published", "2024-02-01", &[]),
    ];

    let posts = select_posts(candidates, &PostFilters::default(), &RestrictionIndex::unrestricted());
    assert_eq!(slugs(&posts), vec!["published"]);
}

// test that tag matching is exact and case-sensitive
#[test]
fn test_select_posts_tag_filter_is_case_sensitive() {
    let candidates = vec![
        post("00010001", "lower", "2024-01-01", &["rust"]),
        post("00010002", "upper", "2024-01-02", &["Rust"]),
        post("00010003", "none", "2024-01-03", &[]),
    ];

    let posts = select_posts(candidates, &PostFilters::tagged("rust"), &RestrictionIndex::unrestricted());
    assert_eq!(slugs(&posts), vec!["lower"]);
}

// test that the category filter matches by path, and an unknown path selects nothing
#[test]
fn test_select_posts_category_filter() {
    let candidates = vec![
        with_category(post("000100020001", "in", "2024-01-01", &[]), "00010001"),
        post("000100020002", "out", "2024-01-02", &[]),
    ];

    let posts = select_posts(
        candidates.clone(),
        &PostFilters::in_category("00010001"),
        &RestrictionIndex::unrestricted(),
    );
    assert_eq!(slugs(&posts), vec!["in"]);

    let posts = select_posts(candidates, &PostFilters::in_category(""), &RestrictionIndex::unrestricted());
    assert!(posts.is_empty());
}

// test that only completely hidden restrictions remove posts from listings
#[test]
fn test_select_posts_respects_listing_rules() {
    let candidates = vec![
        post("000100010001", "listed", "2024-01-01", &[]),
        post("000100010002", "restricted", "2024-01-02", &[]),
        post("000100010003", "hidden", "2024-01-03", &[]),
    ];
    let index = RestrictionIndex::build(
        &[
            ViewRestriction {
                page_path: "000100010002".to_string(),
                permitted_group: "staff".to_string(),
                completely_hidden: false,
            },
            ViewRestriction {
                page_path: "000100010003".to_string(),
                permitted_group: "staff".to_string(),
                completely_hidden: true,
            },
        ],
        &Viewer::anonymous(),
    );

    let posts = select_posts(candidates, &PostFilters::default(), &index);
    assert_eq!(slugs(&posts), vec!["restricted", "listed"]);
}

// test that a category lists the posts of its blog root that reference it
#[tokio::test]
async fn test_get_posts_for_category_container() {
    let store = MemoryTreeStore::new();
    let blog = page("0001", "blog", "/blog/", PageKind::BlogType);
    let category = page("00010001", "news", "/blog/news/", PageKind::BlogCategory);
    store
        .save_subtree(&[
            blog.clone(),
            category.clone(),
            with_category(post("00010002", "first", "2024-01-01", &["rust"]), "00010001"),
            post("00010003", "uncategorised", "2024-01-02", &["rust"]),
            with_category(post("00010004", "second", "2024-01-03", &[]), "00010001"),
        ])
        .await
        .unwrap();

    let index = RestrictionIndex::unrestricted();

    let posts = get_posts(&store, &category, &PostFilters::default(), &index).await.unwrap();
    assert_eq!(slugs(&posts), vec!["second", "first"]);

    // the category container wins over a category filter passed in
    let posts = get_posts(&store, &category, &PostFilters::in_category("elsewhere"), &index)
        .await
        .unwrap();
    assert_eq!(slugs(&posts), vec!["second", "first"]);

    // extra filters still narrow it down
    let posts = get_posts(&store, &category, &PostFilters::tagged("rust"), &index)
        .await
        .unwrap();
    assert_eq!(slugs(&posts), vec!["first"]);

    let posts = get_posts(&store, &blog, &PostFilters::default(), &index).await.unwrap();
    assert_eq!(slugs(&posts), vec!["second", "uncategorised", "first"]);
}
