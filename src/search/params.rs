//! Request parameters, page cursors and page links.

use super::query::Window;
use serde::Deserialize;
use url::form_urlencoded;

/// Incoming query parameters, in their original order.
///
/// Page links are built by cloning this list and changing a single cursor,
/// so every other parameter survives the round trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    /// Parses an `application/x-www-form-urlencoded` query string.
    /// A leading `?` is ignored.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First non-blank value for `key`, trimmed.
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Positive integer value for `key`; missing, zero or unparsable is `None`.
    pub fn positive(&self, key: &str) -> Option<u64> {
        self.get(key)?.trim().parse().ok().filter(|n| *n > 0)
    }

    /// Copy with `key` set to `value`: the first occurrence is replaced in
    /// place and later duplicates dropped, or the pair is appended.
    pub fn with_value(&self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        let mut pairs = Vec::with_capacity(self.pairs.len() + 1);
        let mut replaced = false;

        for (k, v) in &self.pairs {
            if k == key {
                if !replaced {
                    pairs.push((k.clone(), value.clone()));
                    replaced = true;
                }
            } else {
                pairs.push((k.clone(), v.clone()));
            }
        }
        if !replaced {
            pairs.push((key.to_string(), value));
        }

        Self { pairs }
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.pairs)
            .finish()
    }

    /// `path?query` for these parameters.
    pub fn link(&self, path: &str) -> String {
        format!("{}?{}", path, self.to_query_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Page size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub default_per_page: u64,
    pub max_per_page: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            default_per_page: 10,
            max_per_page: 100,
        }
    }
}

pub const PER_PAGE: &str = "perPage";

/// A 1-based page cursor and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Reads the cursor named `cursor` and the shared `perPage` parameter.
    pub fn from_params(params: &SearchParams, cursor: &str, limits: Pagination) -> Self {
        let per_page = params
            .positive(PER_PAGE)
            .unwrap_or(limits.default_per_page)
            .min(limits.max_per_page)
            .max(1);

        Self {
            page: params.positive(cursor).unwrap_or(1),
            per_page,
        }
    }

    pub const fn window(&self) -> Window {
        Window {
            from: self.page.saturating_sub(1).saturating_mul(self.per_page),
            size: self.per_page,
        }
    }

    /// True when hits remain after this page.
    pub const fn has_next(&self, total: u64) -> bool {
        self.page.saturating_mul(self.per_page) < total
    }
}

/// Previous/next links for one result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl PageLinks {
    /// Links that differ from the incoming request only in `cursor`.
    pub fn build(
        path: &str,
        params: &SearchParams,
        cursor: &str,
        page: PageRequest,
        total: u64,
    ) -> Self {
        Self {
            prev: (page.page > 1).then(|| params.with_value(cursor, page.page - 1).link(path)),
            next: page
                .has_next(total)
                .then(|| params.with_value(cursor, page.page + 1).link(path)),
        }
    }
}
