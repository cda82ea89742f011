use anyhow::{Result, anyhow};

// every level of the tree occupies a fixed-width step of the materialized path, so
// "0001" is a root, "00010003" its third child, and "is descendant" is a prefix test
pub const STEP_LEN: usize = 4;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const MAX_STEP: u32 = 36 * 36 * 36 * 36 - 1;

pub fn depth_of(path: &str) -> usize {
    path.len() / STEP_LEN
}

pub fn parent_path(path: &str) -> Option<&str> {
    if path.len() <= STEP_LEN {
        None
    } else {
        Some(&path[..path.len() - STEP_LEN])
    }
}

/// Strict descendant test: a path is never its own descendant.
pub fn is_descendant_of(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len() && path.starts_with(ancestor)
}

pub fn is_child_of(path: &str, parent: &str) -> bool {
    path.len() == parent.len() + STEP_LEN && path.starts_with(parent)
}

/// All prefixes of `path` from the root down to (and including) the path itself.
pub fn ancestor_prefixes(path: &str) -> impl Iterator<Item = &str> {
    (1..=depth_of(path)).map(move |depth| &path[..depth * STEP_LEN])
}

/// Decodes the last step of a path back into its sibling index.
pub fn last_step_index(path: &str) -> Option<u32> {
    if path.len() < STEP_LEN {
        return None;
    }
    let step = &path[path.len() - STEP_LEN..];
    u32::from_str_radix(step, 36).ok()
}

pub fn child_path(parent: &str, index: u32) -> Result<String> {
    if index == 0 || index > MAX_STEP {
        return Err(anyhow!(
            "Sibling index {} does not fit in a path step under '{}'",
            index,
            parent
        ));
    }

    let mut step = [b'0'; STEP_LEN];
    let mut remaining = index;
    for slot in step.iter_mut().rev() {
        *slot = ALPHABET[(remaining % 36) as usize];
        remaining /= 36;
    }

    let mut path = String::with_capacity(parent.len() + STEP_LEN);
    path.push_str(parent);
    path.extend(step.iter().map(|b| char::from(*b)));
    Ok(path)
}

/// Drops every prefix already covered by a shorter prefix in the same set.
/// The survivors are disjoint subtrees, still in path order.
pub fn collapse_prefixes<'a, I>(prefixes: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut sorted: Vec<&str> = prefixes.into_iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut collapsed: Vec<&str> = Vec::with_capacity(sorted.len());
    for prefix in sorted {
        match collapsed.last() {
            Some(last) if prefix.starts_with(last) => continue,
            _ => collapsed.push(prefix),
        }
    }
    collapsed
}
