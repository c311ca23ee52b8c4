//! View models handed to the rendering layer.
use serde::{Deserialize, Serialize};

/// Model of the error page.
///
/// `request_id` is accepted verbatim, escaping is left to whatever renders it.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct ErrorViewModel {
    /// Identifies the failed request for display and support purposes.
    pub request_id: Option<String>,
}

impl ErrorViewModel {
    /// Create new `ErrorViewModel` with no request id.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new `ErrorViewModel` for the given request id.
    #[inline]
    #[must_use]
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
        }
    }

    /// Whether the page should show the request id.
    ///
    /// True for any non-empty value. Whitespace-only ids count as present.
    #[inline]
    #[must_use]
    pub fn show_request_id(&self) -> bool {
        self.request_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}
