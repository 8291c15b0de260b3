//! Cache key type shared by page cache adapters.
use thiserror::Error;

/// Key under which a rendered page is cached.
///
/// Keys are namespaced: a fixed prefix followed by the request target, so a
/// whole namespace can be flushed at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCacheKey {
    prefix: String,
    target: String,
}

impl PageCacheKey {
    /// Construct a key for `target` (path plus optional query) within `prefix`.
    pub fn new(
        prefix: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<Self, PageCacheKeyValidationError> {
        let prefix = prefix.into();
        let target = target.into();
        if prefix.trim().is_empty() {
            return Err(PageCacheKeyValidationError::EmptyPrefix);
        }
        if prefix.contains(char::is_whitespace) || target.contains(char::is_whitespace) {
            return Err(PageCacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self { prefix, target })
    }

    /// Namespace the key belongs to.
    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    /// Request target the page was rendered for.
    pub fn target(&self) -> &str {
        self.target.as_str()
    }
}

impl std::fmt::Display for PageCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.prefix, self.target)
    }
}

/// Validation errors returned when constructing [`PageCacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageCacheKeyValidationError {
    /// Prefix is empty after trimming whitespace.
    #[error("page cache key prefix must not be empty")]
    EmptyPrefix,
    /// Prefix or target contains whitespace.
    #[error("page cache key must not contain whitespace")]
    ContainsWhitespace,
}
