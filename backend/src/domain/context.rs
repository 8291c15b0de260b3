//! Per-request context passed explicitly to domain services.

use super::{Error, UserId};

/// Who is making the current request.
///
/// Inbound adapters build one context per request from their session layer
/// and hand it to services; nothing in the domain reads ambient state.
///
/// # Examples
/// ```
/// use blog::domain::{RequestContext, UserId};
///
/// let anonymous = RequestContext::anonymous();
/// assert!(anonymous.viewer().is_none());
///
/// let id = UserId::random();
/// let signed_in = RequestContext::authenticated(id);
/// assert_eq!(signed_in.require_viewer().ok(), Some(&id));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    viewer: Option<UserId>,
}

impl RequestContext {
    /// Context for a request without a session.
    pub const fn anonymous() -> Self {
        Self { viewer: None }
    }

    /// Context for a request made by `viewer`.
    pub const fn authenticated(viewer: UserId) -> Self {
        Self {
            viewer: Some(viewer),
        }
    }

    /// Authenticated user, if any.
    pub fn viewer(&self) -> Option<&UserId> {
        self.viewer.as_ref()
    }

    /// Authenticated user, or [`Error::unauthorized`].
    pub fn require_viewer(&self) -> Result<&UserId, Error> {
        self.viewer
            .as_ref()
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}
