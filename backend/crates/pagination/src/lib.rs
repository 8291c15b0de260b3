//! Page-number pagination shared by the blog feed endpoints.
//!
//! Listings are split into fixed-size pages addressed by a 1-based page
//! number taken from the `page` query parameter. Resolution is lenient: a
//! missing or malformed parameter selects the first page and an out-of-range
//! number, zero and negatives included, selects the last page, so a feed request never
//! fails because of its page parameter.
//!
//! The crate is split into three concerns:
//!
//! - [`PageRequest`] parses the raw parameter without judging its range.
//! - [`Paginator`] resolves a request against a total item count into a
//!   [`PageWindow`] describing the slice to load.
//! - [`Page`] wraps the loaded items with navigation metadata and serialises
//!   to the public envelope, while [`PageLinks`] derives previous/next links
//!   that preserve the remaining query parameters.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//!
//! use pagination::{PageRequest, Paginator};
//!
//! let paginator = Paginator::new(NonZeroUsize::new(5).expect("non-zero"));
//! let window = paginator.resolve(&PageRequest::parse(Some("999")), 13);
//!
//! assert_eq!(window.number(), 3);
//! assert_eq!(window.offset(), 10);
//! assert_eq!(window.limit(), 3);
//! ```

mod links;
mod page;
mod paginator;
mod request;

pub use links::{LinkError, PageLinks};
pub use page::Page;
pub use paginator::{PageWindow, Paginator};
pub use request::PageRequest;

/// Name of the query parameter carrying the requested page number.
pub const PAGE_PARAM: &str = "page";
