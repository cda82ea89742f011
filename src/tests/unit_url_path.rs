use crate::domain::PageKind;
use crate::features::blog::url_path::{
    DateFunction, UrlSettings, compute_url_path, page_url_path, post_url_path, rebase_url_path,
    title_case, validate_date_format,
};
use crate::tests::fixtures::{blog_post, date, page};

fn settings(date_format: &str, date_function: DateFunction) -> UrlSettings {
    UrlSettings {
        date_format: date_format.to_string(),
        date_function,
    }
}

#[test]
fn test_post_url_path_defaults() {
    let url = post_url_path(Some("/blog/"), date("2024-03-01"), "hello", &UrlSettings::default());
    assert_eq!(url, "/blog/2024/Mar/hello/");
}

#[test]
fn test_post_url_path_date_functions() {
    let day = date("2024-03-01");
    assert_eq!(
        post_url_path(Some("/blog/"), day, "hello", &settings("%Y/%b/", DateFunction::Upper)),
        "/blog/2024/MAR/hello/"
    );
    assert_eq!(
        post_url_path(Some("/blog/"), day, "hello", &settings("%Y/%b/", DateFunction::Lower)),
        "/blog/2024/mar/hello/"
    );
    assert_eq!(
        post_url_path(Some("/blog/"), day, "hello", &settings("%Y/%m/%d/", DateFunction::Identity)),
        "/blog/2024/03/01/hello/"
    );
}

#[test]
fn test_url_path_without_parent_is_root() {
    assert_eq!(page_url_path(None, "home"), "/");
    assert_eq!(
        post_url_path(None, date("2024-03-01"), "hello", &UrlSettings::default()),
        "/"
    );
    assert_eq!(page_url_path(Some("/"), "about"), "/about/");
}

#[test]
fn test_compute_url_path_by_kind() {
    let parent = page("0001", "blog", "/blog/", PageKind::BlogType);
    let post = page(
        "00010001",
        "hello",
        "",
        PageKind::BlogPost(blog_post("2024-03-01", &[])),
    );
    let category = page("00010002", "news", "", PageKind::BlogCategory);

    let settings = UrlSettings::default();
    assert_eq!(compute_url_path(&post, Some(&parent), &settings), "/blog/2024/Mar/hello/");
    assert_eq!(compute_url_path(&category, Some(&parent), &settings), "/blog/news/");
}

#[test]
fn test_title_case() {
    assert_eq!(title_case("2024/mar/"), "2024/Mar/");
    assert_eq!(title_case("2024/MAR/"), "2024/Mar/");
    assert_eq!(title_case("hello world"), "Hello World");
}

#[test]
fn test_date_function_from_str() {
    assert_eq!("title".parse::<DateFunction>().unwrap(), DateFunction::Title);
    assert_eq!("UPPER".parse::<DateFunction>().unwrap(), DateFunction::Upper);
    assert_eq!("none".parse::<DateFunction>().unwrap(), DateFunction::Identity);
    assert_eq!("".parse::<DateFunction>().unwrap(), DateFunction::Identity);
    assert!("sideways".parse::<DateFunction>().is_err());
}

#[test]
fn test_validate_date_format() {
    assert!(validate_date_format("%Y/%b/").is_ok());
    assert!(validate_date_format("%Y/%J/").is_err());
}

#[test]
fn test_rebase_url_path() {
    assert_eq!(
        rebase_url_path("/blog/2024/Mar/hello/", "/blog/", "/journal/"),
        Some("/journal/2024/Mar/hello/".to_string())
    );
    assert_eq!(rebase_url_path("/about/", "/blog/", "/journal/"), None);
}
