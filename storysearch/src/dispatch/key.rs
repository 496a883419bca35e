//! Request identity.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between query and page in the string form of a key.
pub const KEY_SEPARATOR: &str = "::";

/// Composite identity of one logical search request: query plus page.
///
/// The string form is `"<query>::<page>"`, e.g. `"cats::2"`. Queries may
/// themselves contain `::`; parsing splits on the last occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    query: String,
    page: u32,
}

impl RequestKey {
    /// Creates a key for `query` at `page`.
    pub fn new(query: impl Into<String>, page: u32) -> Self {
        Self {
            query: query.into(),
            page,
        }
    }

    /// The query string.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The page number.
    pub fn page(&self) -> u32 {
        self.page
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.query, KEY_SEPARATOR, self.page)
    }
}

/// A source string that is not of the form `"<query>::<page>"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    /// No `::` separator present.
    #[error("request key '{0}' has no '::' separator")]
    MissingSeparator(String),

    /// The part after the last separator is not a page number.
    #[error("request key '{source_key}' has invalid page '{page}'")]
    InvalidPage { source_key: String, page: String },
}

impl FromStr for RequestKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (query, page) = s
            .rsplit_once(KEY_SEPARATOR)
            .ok_or_else(|| KeyParseError::MissingSeparator(s.to_string()))?;
        let page = page.parse().map_err(|_| KeyParseError::InvalidPage {
            source_key: s.to_string(),
            page: page.to_string(),
        })?;
        Ok(Self::new(query, page))
    }
}
