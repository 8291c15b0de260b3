//! Relative links to neighbouring pages.

use serde::Serialize;
use url::Url;

use crate::{PAGE_PARAM, PageWindow};

/// Placeholder origin used to parse relative request targets.
const LINK_BASE: &str = "http://localhost/";

/// Errors raised while deriving page links.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// The request target could not be parsed as a relative URL.
    #[error("invalid request target `{target}`: {source}")]
    InvalidTarget {
        /// The offending request target.
        target: String,
        /// Underlying parser failure.
        #[source]
        source: url::ParseError,
    },
}

/// Relative links (path and query) to the previous and next pages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PageLinks {
    /// Link to the previous page, if one exists.
    pub previous: Option<String>,
    /// Link to the next page, if one exists.
    pub next: Option<String>,
}

impl PageLinks {
    /// Links for a page without neighbours.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            previous: None,
            next: None,
        }
    }

    /// Derive links from the request target that produced `window`.
    ///
    /// Every query parameter other than `page` is preserved in order.
    ///
    /// # Errors
    /// Returns [`LinkError::InvalidTarget`] when `target` is not a valid
    /// relative reference.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroUsize;
    ///
    /// use pagination::{PageLinks, PageRequest, Paginator};
    ///
    /// let paginator = Paginator::new(NonZeroUsize::new(5).expect("non-zero"));
    /// let window = paginator.resolve(&PageRequest::Number(2), 13);
    /// let links = PageLinks::for_target("/group/cats/?page=2&sort=new", &window)
    ///     .expect("valid target");
    ///
    /// assert_eq!(links.previous.as_deref(), Some("/group/cats/?sort=new&page=1"));
    /// assert_eq!(links.next.as_deref(), Some("/group/cats/?sort=new&page=3"));
    /// ```
    pub fn for_target(target: &str, window: &PageWindow) -> Result<Self, LinkError> {
        let current = Url::parse(LINK_BASE)
            .and_then(|base| base.join(target))
            .map_err(|source| LinkError::InvalidTarget {
                target: target.to_owned(),
                source,
            })?;

        Ok(Self {
            previous: window
                .previous_page_number()
                .map(|number| link_to(&current, number)),
            next: window
                .next_page_number()
                .map(|number| link_to(&current, number)),
        })
    }
}

fn link_to(current: &Url, number: usize) -> String {
    let retained: Vec<(String, String)> = current
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut target = current.clone();
    {
        let mut pairs = target.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(retained);
        pairs.append_pair(PAGE_PARAM, &number.to_string());
    }

    match target.query() {
        Some(query) => format!("{}?{query}", target.path()),
        None => target.path().to_owned(),
    }
}
