//! Resolution of page requests against a known item count.

use std::num::NonZeroUsize;

use crate::PageRequest;

/// Splits listings into pages of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: NonZeroUsize,
}

impl Paginator {
    /// Create a paginator producing pages of `per_page` items.
    #[must_use]
    pub const fn new(per_page: NonZeroUsize) -> Self {
        Self { per_page }
    }

    /// Maximum number of items on a page.
    #[must_use]
    pub const fn per_page(&self) -> usize {
        self.per_page.get()
    }

    /// Number of pages needed for `count` items.
    ///
    /// An empty listing still has a single, empty page.
    #[must_use]
    pub const fn num_pages(&self, count: usize) -> usize {
        if count == 0 {
            1
        } else {
            count.div_ceil(self.per_page.get())
        }
    }

    /// Resolve `request` into the page that should be served.
    ///
    /// - Unspecified or non-numeric requests select the first page.
    /// - Numbers outside `1..=num_pages`, including zero and negatives,
    ///   select the last page.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroUsize;
    ///
    /// use pagination::{PageRequest, Paginator};
    ///
    /// let paginator = Paginator::new(NonZeroUsize::new(5).expect("non-zero"));
    /// let window = paginator.resolve(&PageRequest::NotANumber, 13);
    /// assert_eq!(window.number(), 1);
    /// ```
    #[must_use]
    pub fn resolve(&self, request: &PageRequest, count: usize) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = match *request {
            PageRequest::Unspecified | PageRequest::NotANumber => 1,
            PageRequest::Number(value) if value < 1 => num_pages,
            PageRequest::Number(value) => {
                usize::try_from(value).map_or(num_pages, |requested| requested.min(num_pages))
            }
        };

        PageWindow {
            number,
            num_pages,
            count,
            per_page: self.per_page.get(),
        }
    }
}

/// A resolved page: which slice of the listing to load and where it sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    number: usize,
    num_pages: usize,
    count: usize,
    per_page: usize,
}

impl PageWindow {
    /// 1-based number of the page.
    #[must_use]
    pub const fn number(&self) -> usize {
        self.number
    }

    /// Total number of pages in the listing.
    #[must_use]
    pub const fn num_pages(&self) -> usize {
        self.num_pages
    }

    /// Total number of items in the listing.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Maximum number of items on a page.
    #[must_use]
    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    /// Number of items preceding this page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.number.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Number of items on this page.
    #[must_use]
    pub const fn limit(&self) -> usize {
        let remaining = self.count.saturating_sub(self.offset());
        if remaining < self.per_page {
            remaining
        } else {
            self.per_page
        }
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Number of the next page, if any.
    #[must_use]
    pub const fn next_page_number(&self) -> Option<usize> {
        if self.has_next() {
            Some(self.number + 1)
        } else {
            None
        }
    }

    /// Number of the previous page, if any.
    #[must_use]
    pub const fn previous_page_number(&self) -> Option<usize> {
        if self.has_previous() {
            Some(self.number - 1)
        } else {
            None
        }
    }

    /// 1-based position of the first item on the page, or 0 when empty.
    #[must_use]
    pub const fn start_index(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            self.offset() + 1
        }
    }

    /// 1-based position of the last item on the page, or 0 when empty.
    #[must_use]
    pub const fn end_index(&self) -> usize {
        self.offset() + self.limit()
    }
}
