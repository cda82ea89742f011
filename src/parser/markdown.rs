use crate::parser::model::PostFrontMatter;
use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use gray_matter::{Matter, engine::YAML};
use pulldown_cmark::{Event, Options as CmarkOptions, Parser, Tag, html};

// splits a post into its typed front matter and the markdown body below it
pub fn extract_frontmatter(md_content: &str, filename: &str) -> Result<(PostFrontMatter, String)> {
    let matter = Matter::<YAML>::new();

    let parsed = matter
        .parse::<PostFrontMatter>(md_content)
        .map_err(|e| anyhow!("Failed to parse front matter in {}: {}", filename, e))?;

    Ok((parsed.data.unwrap_or_default(), parsed.content))
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_post_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.naive_utc().date())
}

// front matter wins, then the file's own timestamps
pub fn resolve_post_date(
    frontmatter_date: Option<&str>,
    modified: Option<NaiveDateTime>,
    created: Option<NaiveDateTime>,
) -> Option<NaiveDate> {
    frontmatter_date
        .and_then(parse_post_date)
        .or_else(|| modified.map(|dt| dt.date()))
        .or_else(|| created.map(|dt| dt.date()))
}

/// Compiles a post body to HTML. Link and image destinations pass through `resolver`,
/// which may rewrite them (e.g. a link to another markdown file becomes that post's url).
pub fn compile_markdown_to_html<F>(markdown_content: &str, mut resolver: F) -> Result<String>
where
    F: FnMut(&str) -> String,
{
    let mut options = CmarkOptions::empty();
    options.insert(CmarkOptions::ENABLE_STRIKETHROUGH);
    options.insert(CmarkOptions::ENABLE_TABLES);

    let events = Parser::new_ext(markdown_content, options).map(|event| match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: resolver(&dest_url).into(),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: resolver(&dest_url).into(),
            title,
            id,
        }),
        other => other,
    });

    let mut html_content = String::with_capacity(markdown_content.len() * 3 / 2);
    html::push_html(&mut html_content, events);

    Ok(html_content)
}
