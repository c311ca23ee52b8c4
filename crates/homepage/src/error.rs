use crate::config::ConfigError;
use crate::route::RouteError;

/// Errors that can happen inside homepage.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Error raised by the page controller.
    #[error(transparent)]
    Core(#[from] homepage_core::Error),
    /// Invalid route template.
    #[error(transparent)]
    Route(#[from] RouteError),
    /// A template failed to render.
    #[error("failed to render view: {0}")]
    Render(#[from] askama::Error),
    /// No template exists for the requested view.
    #[error("view `{0}` not found")]
    ViewNotFound(String),
}
