//! The page controller.
//!
//! [`HomeController`] serves four actions. Three of them render their default view with no
//! model, [`HomeController::error`] attaches an [`ErrorViewModel`] carrying the id of the
//! failed request.
//!
//! # Example
//!
//! ```
//! use homepage_core::prelude::*;
//!
//! let controller = HomeController::new(Logger::for_type::<HomeController>());
//! let view = controller.error(None, "trace-123");
//! assert_eq!(view.error_model().and_then(|m| m.request_id.as_deref()), Some("trace-123"));
//! ```
use std::any::type_name;
use std::fmt::{self, Display, Formatter};

use tracing::Span;

use crate::cache::ResponseCache;
use crate::model::ErrorViewModel;
use crate::view::ViewResult;
use crate::{Error, Result};

/// Logging handle injected into controllers.
///
/// Events recorded through it land in a span whose `category` is the owner's type name.
#[derive(Clone, Debug)]
pub struct Logger {
    category: &'static str,
    span: Span,
}

impl Logger {
    /// Create new `Logger` for the given category.
    #[must_use]
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            span: tracing::info_span!("controller", category),
        }
    }

    /// Create new `Logger` categorised by the type `T`.
    #[inline]
    #[must_use]
    pub fn for_type<T: ?Sized>() -> Self {
        Self::new(type_name::<T>())
    }

    /// The category this logger was created with.
    #[inline]
    #[must_use]
    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Run `f` inside this logger's span.
    #[inline]
    pub fn in_scope<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.span.in_scope(f)
    }
}

/// Actions served by [`HomeController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// The landing page.
    Index,
    /// The privacy policy.
    Privacy,
    /// The contact page.
    ContactUs,
    /// The error page.
    Error,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Self; 4] = [Self::Index, Self::Privacy, Self::ContactUs, Self::Error];

    /// The action's name, which is also the name of its default view.
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Index => "Index",
            Self::Privacy => "Privacy",
            Self::ContactUs => "ContactUs",
            Self::Error => "Error",
        }
    }

    /// Look up an action by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(name))
    }

    /// Caching profile that must be applied to the action's response, if any.
    #[inline]
    #[must_use]
    pub fn response_cache(self) -> Option<ResponseCache> {
        match self {
            Self::Error => Some(ResponseCache::disabled()),
            Self::Index | Self::Privacy | Self::ContactUs => None,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the id shown on the error page.
///
/// The active trace id wins, otherwise the request's own correlation id is used.
#[inline]
#[must_use]
pub fn resolve_request_id<'a>(trace_id: Option<&'a str>, request_id: &'a str) -> &'a str {
    trace_id.unwrap_or(request_id)
}

/// Controller for the site's pages.
///
/// Holds no per-request state, one instance can be shared by any number of concurrent requests.
#[derive(Clone, Debug)]
pub struct HomeController {
    logger: Logger,
}

impl HomeController {
    /// Name under which the controller is routed.
    pub const NAME: &'static str = "Home";

    /// Create new `HomeController`.
    #[inline]
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Create a [`HomeControllerBuilder`].
    #[inline]
    #[must_use]
    pub fn builder() -> HomeControllerBuilder {
        HomeControllerBuilder::default()
    }

    /// The injected logger.
    #[inline]
    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The landing page.
    #[inline]
    #[must_use]
    pub fn index(&self) -> ViewResult {
        ViewResult::new()
    }

    /// The privacy policy page.
    #[inline]
    #[must_use]
    pub fn privacy(&self) -> ViewResult {
        ViewResult::new()
    }

    /// The contact page.
    #[inline]
    #[must_use]
    pub fn contact_us(&self) -> ViewResult {
        ViewResult::new()
    }

    /// The error page.
    ///
    /// `trace_id` is the id of the trace the current call runs under, if any, and
    /// `request_id` the correlation id the host assigned to the inbound request.
    /// Resolution happens on every call.
    #[must_use]
    pub fn error(&self, trace_id: Option<&str>, request_id: &str) -> ViewResult {
        let request_id = resolve_request_id(trace_id, request_id);
        self.logger.in_scope(|| {
            tracing::debug!(request_id, traced = trace_id.is_some(), "rendering error page");
        });
        ViewResult::with_model(ErrorViewModel::with_request_id(request_id))
    }

    /// Invoke `action`. Only [`Action::Error`] looks at the ids.
    #[must_use]
    pub fn dispatch(&self, action: Action, trace_id: Option<&str>, request_id: &str) -> ViewResult {
        match action {
            Action::Index => self.index(),
            Action::Privacy => self.privacy(),
            Action::ContactUs => self.contact_us(),
            Action::Error => self.error(trace_id, request_id),
        }
    }
}

/// Builder of [`HomeController`].
#[derive(Default, Debug)]
pub struct HomeControllerBuilder {
    logger: Option<Logger>,
}

impl HomeControllerBuilder {
    /// Set the logger.
    #[inline]
    #[must_use]
    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Build the controller.
    ///
    /// Fails with [`Error::MissingArgument`] naming `logger` when no logger was set.
    pub fn build(self) -> Result<HomeController> {
        let logger = self.logger.ok_or(Error::MissingArgument { name: "logger" })?;
        Ok(HomeController::new(logger))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tracing_test::traced_test;

    use super::*;
    use crate::view::ViewModel;

    fn controller() -> HomeController {
        HomeController::new(Logger::for_type::<HomeController>())
    }

    #[test]
    fn test_build_without_logger() {
        let err = HomeController::builder().build().unwrap_err();
        assert_eq!(err, Error::MissingArgument { name: "logger" });
        assert_eq!(err.param_name(), "logger");
    }

    #[test]
    fn test_build_with_logger() {
        let controller = HomeController::builder()
            .logger(Logger::new("pages"))
            .build()
            .unwrap();
        assert_eq!(controller.logger().category(), "pages");
    }

    #[test]
    fn test_logger_category() {
        let logger = Logger::for_type::<HomeController>();
        assert!(logger.category().ends_with("HomeController"));
    }

    #[test]
    fn test_plain_actions() {
        let controller = controller();
        for view in [controller.index(), controller.privacy(), controller.contact_us()] {
            assert_eq!(view.view_name, None);
            assert_eq!(view.model, None);
        }
    }

    #[test]
    fn test_error_with_trace() {
        let trace_id = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";
        let view = controller().error(Some(trace_id), "request-1");
        assert_eq!(view.view_name, None);
        let model = view.error_model().unwrap();
        assert_eq!(model.request_id.as_deref(), Some(trace_id));
        assert!(model.show_request_id());
    }

    #[test]
    fn test_error_without_trace() {
        let view = controller().error(None, "trace-123");
        assert_eq!(
            view.model,
            Some(ViewModel::Error(ErrorViewModel::with_request_id("trace-123")))
        );
        assert!(view.error_model().unwrap().show_request_id());
    }

    #[test]
    fn test_error_is_resolved_per_call() {
        let controller = controller();
        let first = controller.error(Some("trace-a"), "req-1");
        let second = controller.error(None, "req-2");
        let third = controller.error(Some("trace-b"), "req-3");
        let ids: Vec<_> = [first, second, third]
            .iter()
            .map(|v| v.error_model().unwrap().request_id.clone().unwrap())
            .collect();
        assert_eq!(ids, ["trace-a", "req-2", "trace-b"]);
    }

    #[test]
    fn test_resolve_request_id() {
        assert_eq!(resolve_request_id(Some("trace"), "req"), "trace");
        assert_eq!(resolve_request_id(None, "req"), "req");
        assert_eq!(resolve_request_id(Some(""), "req"), "");
    }

    #[test]
    fn test_dispatch() {
        let controller = controller();
        for action in Action::ALL {
            let view = controller.dispatch(action, None, "req");
            assert_eq!(view.error_model().is_some(), action == Action::Error, "{action}");
        }
    }

    #[test]
    fn test_action_names() {
        assert_eq!(Action::from_name("index"), Some(Action::Index));
        assert_eq!(Action::from_name("PRIVACY"), Some(Action::Privacy));
        assert_eq!(Action::from_name("contactus"), Some(Action::ContactUs));
        assert_eq!(Action::from_name("Error"), Some(Action::Error));
        assert_eq!(Action::from_name("contact-us"), None);
        assert_eq!(Action::from_name(""), None);
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
            assert_eq!(action.to_string(), action.name());
        }
    }

    #[test]
    fn test_error_response_is_never_cached() {
        let profile = Action::Error.response_cache().unwrap();
        assert_eq!(profile.duration, 0);
        assert_eq!(profile.location, crate::CacheLocation::None);
        assert!(profile.no_store);
        for action in [Action::Index, Action::Privacy, Action::ContactUs] {
            assert_eq!(action.response_cache(), None);
        }
    }

    #[test]
    #[traced_test]
    fn test_plain_actions_do_not_log() {
        let controller = controller();
        let _ = controller.index();
        let _ = controller.privacy();
        let _ = controller.contact_us();
        assert!(!logs_contain("rendering error page"));

        let _ = controller.error(None, "logged-request");
        assert!(logs_contain("rendering error page"));
        assert!(logs_contain("logged-request"));
    }

    #[test]
    fn test_multiple_instances() {
        let controllers: Vec<_> = (0..5).map(|_| controller()).collect();
        assert_eq!(controllers.len(), 5);
        for controller in &controllers {
            assert_eq!(controller.index(), ViewResult::new());
        }
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        let controller = Arc::new(controller());
        let mut tasks = Vec::new();
        for i in 0..10 {
            for action in [Action::Index, Action::Privacy, Action::ContactUs, Action::Error] {
                let controller = controller.clone();
                tasks.push(tokio::spawn(async move {
                    let request_id = format!("req-{i}");
                    (action, request_id.clone(), controller.dispatch(action, None, &request_id))
                }));
            }
        }
        assert_eq!(tasks.len(), 40);
        for task in tasks {
            let (action, request_id, view) = task.await.unwrap();
            match action {
                Action::Error => assert_eq!(
                    view.error_model().unwrap().request_id.as_deref(),
                    Some(request_id.as_str())
                ),
                _ => assert_eq!(view, ViewResult::new()),
            }
        }
    }
}
