//! The page handler, bridging salvo requests to [`HomeController`].
use std::sync::Arc;

use homepage_core::{Action, HelloWorld, HomeController, ResponseCache};
use salvo::http::header::{CACHE_CONTROL, HeaderValue, PRAGMA};
use salvo::http::{StatusCode, StatusError};
use salvo::prelude::Text;
use salvo::{Depot, FlowCtrl, Handler, Request, Response, async_trait};

use crate::request_tracing::current_context;
use crate::route::ConventionalRoute;
use crate::views;

/// Serves the controller's actions through a conventional route.
///
/// The route must capture `controller` and `action`. Paths that don't match, or name an
/// unknown controller or action, get `404 Not Found`.
#[derive(Clone, Debug)]
pub struct Pages {
    route: Arc<ConventionalRoute>,
    controller: Arc<HomeController>,
    greeter: HelloWorld,
}

impl Pages {
    /// Create new `Pages` handler.
    #[must_use]
    pub fn new(route: ConventionalRoute, controller: Arc<HomeController>) -> Self {
        Self {
            route: Arc::new(route),
            controller,
            greeter: HelloWorld::new(),
        }
    }

    /// Find the action a request path is routed to.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<Action> {
        let values = self.route.matches(path)?;
        let controller = values.get("controller")?;
        if !controller.eq_ignore_ascii_case(HomeController::NAME) {
            return None;
        }
        Action::from_name(values.get("action")?)
    }
}

#[async_trait]
impl Handler for Pages {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        _ctrl: &mut FlowCtrl,
    ) {
        let Some(action) = self.resolve(req.uri().path()) else {
            res.render(StatusError::not_found());
            return;
        };
        let context = current_context(depot);
        let view = self
            .controller
            .dispatch(action, context.trace_id(), &context.request_id);
        match views::render(action, &view, &self.greeter) {
            Ok(html) => {
                if let Some(profile) = action.response_cache() {
                    apply_response_cache(res, &profile);
                }
                res.status_code(StatusCode::OK);
                res.render(Text::Html(html));
            }
            Err(e) => {
                tracing::error!(error = %e, action = %action, "failed to render view");
                res.render(StatusError::internal_server_error().brief("Failed to render page."));
            }
        }
    }
}

/// Write the headers described by `profile` into `res`.
pub fn apply_response_cache(res: &mut Response, profile: &ResponseCache) {
    if let Ok(value) = HeaderValue::from_str(&profile.cache_control()) {
        res.headers_mut().insert(CACHE_CONTROL, value);
    }
    match profile.pragma() {
        Some(pragma) => {
            res.headers_mut().insert(PRAGMA, HeaderValue::from_static(pragma));
        }
        None => {
            res.headers_mut().remove(PRAGMA);
        }
    }
}
