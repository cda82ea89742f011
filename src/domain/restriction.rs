use std::collections::BTreeSet;

// a group-based rule on a page; it is inherited by every descendant of that page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRestriction {
    pub page_path: String,
    pub permitted_group: String,
    pub completely_hidden: bool,
}

/// Whoever is making the request. No username means anonymous, which is simply a viewer
/// without any groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub username: Option<String>,
    pub groups: BTreeSet<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(username: impl Into<String>, groups: BTreeSet<String>) -> Self {
        Self {
            username: Some(username.into()),
            groups,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.username.is_none()
    }

    pub fn is_member(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}
