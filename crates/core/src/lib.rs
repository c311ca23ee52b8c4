//! The protocol-free core of homepage.
//!
//! This crate knows nothing about HTTP. It holds the page controller and the values it
//! hands to the rendering layer:
//!
//! - [`HomeController`] turns an [`Action`] into a [`ViewResult`].
//! - [`ErrorViewModel`] carries the request id shown on the error page.
//! - [`ResponseCache`] describes how a caching layer may treat an action's response.
//! - [`HelloWorld`] is the greeting shown on the landing page.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cache;
pub mod controller;
mod error;
pub mod greeting;
pub mod model;
pub mod view;

pub use self::cache::{CacheLocation, ResponseCache};
pub use self::controller::{
    Action, HomeController, HomeControllerBuilder, Logger, resolve_request_id,
};
pub use self::error::Error;
pub use self::greeting::{Greeter, HelloWorld};
pub use self::model::ErrorViewModel;
pub use self::view::{ViewModel, ViewResult};

/// Result type which has [`Error`] as it's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// A list of things that automatically imports into code using homepage_core.
pub mod prelude {
    pub use crate::cache::{CacheLocation, ResponseCache};
    pub use crate::controller::{Action, HomeController, Logger};
    pub use crate::greeting::{Greeter, HelloWorld};
    pub use crate::model::ErrorViewModel;
    pub use crate::view::{ViewModel, ViewResult};
}
