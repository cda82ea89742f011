use serde::Deserialize;

// everything is optional: a bare markdown file still imports, with defaults drawn from
// its filename and modification time
#[derive(Deserialize, Debug, Default, Clone)]
pub struct PostFrontMatter {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub date: Option<String>,
    pub tags: Option<Vec<String>>,
    // slug of a category under the blog root
    pub category: Option<String>,
    pub featured_image: Option<String>,
    pub live: Option<bool>,
}
