use crate::database::TreeStore;
use crate::database::memory::MemoryTreeStore;
use crate::domain::{Page, PageKind, ViewRestriction, Viewer};
use crate::features::blog::query::PostFilters;
use crate::features::blog::restrictions::RestrictionIndex;
use crate::features::blog::siblings::{navigate, sibling_links};
use crate::tests::fixtures::{page, post};

fn slug(page: &Option<Page>) -> Option<&str> {
    page.as_ref().map(|page| page.slug.as_str())
}

// newest first: march 3rd, 2nd, 1st
fn ordered() -> Vec<Page> {
    vec![
        post("00010003", "third", "2024-03-03", &[]),
        post("00010002", "second", "2024-03-02", &[]),
        post("00010001", "first", "2024-03-01", &[]),
    ]
}

// test that "next" is the newer neighbour and "previous" the older one
#[test]
fn test_navigate_middle_post() {
    let links = navigate(&ordered(), "00010002");
    assert_eq!(slug(&links.next), Some("third"));
    assert_eq!(slug(&links.previous), Some("first"));
}

#[test]
fn test_navigate_edges() {
    let newest = navigate(&ordered(), "00010003");
    assert_eq!(slug(&newest.next), None);
    assert_eq!(slug(&newest.previous), Some("second"));

    let oldest = navigate(&ordered(), "00010001");
    assert_eq!(slug(&oldest.next), Some("second"));
    assert_eq!(slug(&oldest.previous), None);
}

#[test]
fn test_navigate_absent_post_has_no_neighbours() {
    let links = navigate(&ordered(), "00019999");
    assert!(links.next.is_none());
    assert!(links.previous.is_none());
}

// test that siblings follow the active filters and skip unpublished posts
#[tokio::test]
async fn test_sibling_links_with_filters() {
    let store = MemoryTreeStore::new();
    let mut unpublished = post("00010004", "unpublished", "2024-03-04", &["rust"]);
    unpublished.live = false;
    store
        .save_subtree(&[
            page("0001", "blog", "/blog/", PageKind::BlogType),
            post("00010001", "first", "2024-03-01", &["rust"]),
            post("00010002", "second", "2024-03-02", &["web"]),
            post("00010003", "third", "2024-03-03", &["rust"]),
            unpublished,
        ])
        .await
        .unwrap();
    let first = store.get_page("00010001").await.unwrap().unwrap();
    let index = RestrictionIndex::unrestricted();

    let unfiltered = sibling_links(&store, &first, &PostFilters::default(), &index)
        .await
        .unwrap();
    assert_eq!(slug(&unfiltered.next), Some("second"));

    let tagged = sibling_links(&store, &first, &PostFilters::tagged("rust"), &index)
        .await
        .unwrap();
    assert_eq!(slug(&tagged.next), Some("third"));
    assert_eq!(slug(&tagged.previous), None);

    // the post itself does not match the filter
    let elsewhere = sibling_links(&store, &first, &PostFilters::tagged("web"), &index)
        .await
        .unwrap();
    assert!(elsewhere.next.is_none() && elsewhere.previous.is_none());
}

// test that a completely hidden sibling is stepped over for outsiders but not for members,
// while a merely restricted one stays in the chain
#[tokio::test]
async fn test_sibling_links_skip_hidden_posts() {
    let store = MemoryTreeStore::new();
    store
        .save_subtree(&[
            page("0001", "blog", "/blog/", PageKind::BlogType),
            post("00010001", "first", "2024-03-01", &[]),
            post("00010002", "second", "2024-03-02", &[]),
            post("00010003", "third", "2024-03-03", &[]),
        ])
        .await
        .unwrap();
    let first = store.get_page("00010001").await.unwrap().unwrap();
    let third = store.get_page("00010003").await.unwrap().unwrap();
    let hidden = [ViewRestriction {
        page_path: "00010002".to_string(),
        permitted_group: "staff".to_string(),
        completely_hidden: true,
    }];

    let anonymous = RestrictionIndex::build(&hidden, &Viewer::anonymous());
    let links = sibling_links(&store, &first, &PostFilters::default(), &anonymous)
        .await
        .unwrap();
    assert_eq!(slug(&links.next), Some("third"));
    let links = sibling_links(&store, &third, &PostFilters::default(), &anonymous)
        .await
        .unwrap();
    assert_eq!(slug(&links.previous), Some("first"));

    let staff = Viewer::new("alice", ["staff".to_string()].into_iter().collect());
    let member = RestrictionIndex::build(&hidden, &staff);
    let links = sibling_links(&store, &first, &PostFilters::default(), &member)
        .await
        .unwrap();
    assert_eq!(slug(&links.next), Some("second"));

    let restricted = [ViewRestriction {
        completely_hidden: false,
        ..hidden[0].clone()
    }];
    let listed = RestrictionIndex::build(&restricted, &Viewer::anonymous());
    let links = sibling_links(&store, &first, &PostFilters::default(), &listed)
        .await
        .unwrap();
    assert_eq!(slug(&links.next), Some("second"));
}
