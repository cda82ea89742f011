use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

// unreserved characters stay as they are, everything else is escaped
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Ordered query parameters of the current request. Links built from it keep every
/// parameter they do not explicitly replace, in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = raw.unwrap_or_default().trim_start_matches('?');
        let pairs = raw
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (decode(key), decode(value)),
                None => (decode(pair), String::new()),
            })
            .collect();
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    // like get, but an empty value counts as absent
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }

    /// Replaces the first occurrence of `key` in place (dropping any repeats) or appends it.
    pub fn with(&self, key: &str, value: &str) -> Self {
        let mut pairs = Vec::with_capacity(self.pairs.len() + 1);
        let mut replaced = false;
        for (k, v) in &self.pairs {
            if k == key {
                if !replaced {
                    pairs.push((k.clone(), value.to_string()));
                    replaced = true;
                }
            } else {
                pairs.push((k.clone(), v.clone()));
            }
        }
        if !replaced {
            pairs.push((key.to_string(), value.to_string()));
        }
        Self { pairs }
    }

    pub fn without(&self, key: &str) -> Self {
        Self {
            pairs: self
                .pairs
                .iter()
                .filter(|(k, _)| k != key)
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `?a=1&b=2`, or an empty string when there is nothing to serialize.
    pub fn to_query_string(&self) -> String {
        let mut query = String::new();
        for (k, v) in &self.pairs {
            query.push(if query.is_empty() { '?' } else { '&' });
            query.extend(utf8_percent_encode(k, QUERY_VALUE));
            query.push('=');
            query.extend(utf8_percent_encode(v, QUERY_VALUE));
        }
        query
    }

    // the serialized parameters followed by the separator for one more parameter, so a
    // template can append "page=N" directly
    pub fn link_prefix(&self) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            "?".to_string()
        } else {
            format!("{}&", query)
        }
    }
}
