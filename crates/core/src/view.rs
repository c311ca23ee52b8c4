//! Render instructions produced by controller actions.
use std::borrow::Cow;

use serde::Serialize;

use crate::model::ErrorViewModel;

/// Data attached to a [`ViewResult`].
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum ViewModel {
    /// Model of the error page.
    Error(ErrorViewModel),
}

impl From<ErrorViewModel> for ViewModel {
    #[inline]
    fn from(model: ErrorViewModel) -> Self {
        Self::Error(model)
    }
}

/// A view name paired with an optional model.
///
/// `view_name` of `None` selects the default view of the action that produced it.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct ViewResult {
    /// Explicit view name, if any.
    pub view_name: Option<Cow<'static, str>>,
    /// Model passed to the view, if any.
    pub model: Option<ViewModel>,
}

impl ViewResult {
    /// Default view, no model.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default view with the given model.
    #[inline]
    #[must_use]
    pub fn with_model(model: impl Into<ViewModel>) -> Self {
        Self {
            view_name: None,
            model: Some(model.into()),
        }
    }

    /// Set an explicit view name.
    #[inline]
    #[must_use]
    pub fn view_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.view_name = Some(name.into());
        self
    }

    /// Returns the view name, falling back to `default` when none was set.
    #[inline]
    #[must_use]
    pub fn view_name_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.view_name.as_deref().unwrap_or(default)
    }

    /// Returns the attached [`ErrorViewModel`], if that is what the model is.
    #[inline]
    #[must_use]
    pub fn error_model(&self) -> Option<&ErrorViewModel> {
        match &self.model {
            Some(ViewModel::Error(model)) => Some(model),
            None => None,
        }
    }
}
