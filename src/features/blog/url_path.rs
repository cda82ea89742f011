use crate::domain::{Page, PageKind};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;
use std::str::FromStr;

/// Case transformation applied to the formatted date segment of a post url.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFunction {
    Title,
    Upper,
    Lower,
    Identity,
}

impl FromStr for DateFunction {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(DateFunction::Title),
            "upper" => Ok(DateFunction::Upper),
            "lower" => Ok(DateFunction::Lower),
            "" | "none" => Ok(DateFunction::Identity),
            other => Err(anyhow!("Unknown date function '{}'", other)),
        }
    }
}

impl DateFunction {
    pub fn apply(&self, value: &str) -> String {
        match self {
            DateFunction::Title => title_case(value),
            DateFunction::Upper => value.to_uppercase(),
            DateFunction::Lower => value.to_lowercase(),
            DateFunction::Identity => value.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UrlSettings {
    pub date_format: String,
    pub date_function: DateFunction,
}

impl Default for UrlSettings {
    fn default() -> Self {
        Self {
            date_format: "%Y/%b/".to_string(),
            date_function: DateFunction::Title,
        }
    }
}

// every run of letters starts upper case and continues lower case, so "2024/mar/" and
// "2024/MAR/" both become "2024/Mar/"
pub fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut in_word = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if in_word {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(ch);
            in_word = false;
        }
    }
    result
}

pub fn validate_date_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(anyhow!("Invalid date format '{}'", format));
    }
    Ok(())
}

pub fn page_url_path(parent_url_path: Option<&str>, slug: &str) -> String {
    match parent_url_path {
        Some(parent) => format!("{}{}/", parent, slug),
        None => "/".to_string(),
    }
}

pub fn post_url_path(
    parent_url_path: Option<&str>,
    date: NaiveDate,
    slug: &str,
    settings: &UrlSettings,
) -> String {
    let Some(parent) = parent_url_path else {
        return "/".to_string();
    };

    let mut formatted = String::new();
    // an invalid format is rejected at config load; should one slip through, drop the date
    if write!(formatted, "{}", date.format(&settings.date_format)).is_err() {
        formatted.clear();
    }

    format!(
        "{}{}{}/",
        parent,
        settings.date_function.apply(&formatted),
        slug
    )
}

pub fn compute_url_path(page: &Page, parent: Option<&Page>, settings: &UrlSettings) -> String {
    let parent_url_path = parent.map(|parent| parent.url_path.as_str());
    match &page.kind {
        PageKind::BlogPost(post) => post_url_path(parent_url_path, post.date, &page.slug, settings),
        _ => page_url_path(parent_url_path, &page.slug),
    }
}

/// Moves a descendant's url_path from under `old_prefix` to under `new_prefix`.
pub fn rebase_url_path(url_path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    url_path
        .strip_prefix(old_prefix)
        .map(|suffix| format!("{}{}", new_prefix, suffix))
}
