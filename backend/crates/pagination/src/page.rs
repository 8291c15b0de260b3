//! Page envelope returned to clients.

use serde::{Serialize, Serializer};

use crate::{PageLinks, PageWindow};

/// Items of one page together with its navigation metadata.
///
/// Serialises as a camelCase envelope:
///
/// ```json
/// {
///   "items": [],
///   "number": 1,
///   "numPages": 1,
///   "count": 0,
///   "perPage": 5,
///   "hasNext": false,
///   "hasPrevious": false,
///   "nextPage": null,
///   "previousPage": null,
///   "startIndex": 0,
///   "endIndex": 0,
///   "links": { "previous": null, "next": null }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    window: PageWindow,
    links: PageLinks,
}

impl<T> Page<T> {
    /// Wrap the items loaded for `window`.
    #[must_use]
    pub const fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            window,
            links: PageLinks::none(),
        }
    }

    /// Attach navigation links.
    #[must_use]
    pub fn with_links(mut self, links: PageLinks) -> Self {
        self.links = links;
        self
    }

    /// Items on this page, in listing order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Window the page was loaded for.
    #[must_use]
    pub const fn window(&self) -> &PageWindow {
        &self.window
    }

    /// Navigation links for neighbouring pages.
    #[must_use]
    pub const fn links(&self) -> &PageLinks {
        &self.links
    }

    /// Transform every item while keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
            links: self.links,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T> {
    items: &'a [T],
    number: usize,
    num_pages: usize,
    count: usize,
    per_page: usize,
    has_next: bool,
    has_previous: bool,
    next_page: Option<usize>,
    previous_page: Option<usize>,
    start_index: usize,
    end_index: usize,
    links: &'a PageLinks,
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let window = &self.window;
        Envelope {
            items: &self.items,
            number: window.number(),
            num_pages: window.num_pages(),
            count: window.count(),
            per_page: window.per_page(),
            has_next: window.has_next(),
            has_previous: window.has_previous(),
            next_page: window.next_page_number(),
            previous_page: window.previous_page_number(),
            start_index: window.start_index(),
            end_index: window.end_index(),
            links: &self.links,
        }
        .serialize(serializer)
    }
}
