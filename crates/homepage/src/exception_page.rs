//! Error page for unhandled failures.
//!
//! Outside development, a response that ends with a server error status and no body of its
//! own (a handler failure, or a panic caught by `CatchPanic`) is re-rendered through the
//! controller's error action. The failure status is kept.
use std::sync::Arc;

use homepage_core::{Action, ErrorViewModel, HelloWorld, HomeController};
use salvo::catcher::Catcher;
use salvo::http::ResBody;
use salvo::http::StatusCode;
use salvo::prelude::{Json, Text};
use salvo::{Depot, FlowCtrl, Handler, Request, Response, async_trait};

use crate::config::Environment;
use crate::pages::apply_response_cache;
use crate::request_tracing::current_context;
use crate::views;

/// Catcher middleware rendering the error page for server errors.
#[derive(Clone, Debug)]
pub struct ExceptionPage {
    controller: Arc<HomeController>,
}

impl ExceptionPage {
    /// Create new `ExceptionPage`.
    #[inline]
    #[must_use]
    pub fn new(controller: Arc<HomeController>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Handler for ExceptionPage {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        let status = res.status_code.unwrap_or(StatusCode::NOT_FOUND);
        if !status.is_server_error() || !(res.body.is_none() || res.body.is_error()) {
            return;
        }
        let context = current_context(depot);
        let view = self
            .controller
            .error(context.trace_id(), &context.request_id);
        tracing::warn!(status = %status, request_id = %context.request_id, "request failed");

        let prefers_json = req
            .first_accept()
            .is_some_and(|mime| mime.subtype().as_str() == "json");
        if prefers_json {
            res.replace_body(ResBody::None);
            match view.error_model() {
                Some(model) => res.render(Json(model)),
                None => res.render(Json(ErrorViewModel::default())),
            }
        } else {
            match views::render(Action::Error, &view, &HelloWorld) {
                Ok(html) => {
                    res.replace_body(ResBody::None);
                    res.render(Text::Html(html));
                }
                Err(e) => {
                    // Leave the response to the default catcher.
                    tracing::error!(error = %e, "failed to render error page");
                    return;
                }
            }
        }
        if let Some(profile) = Action::Error.response_cache() {
            apply_response_cache(res, &profile);
        }
        res.status_code(status);
        ctrl.skip_rest();
    }
}

/// Build the catcher for `environment`.
///
/// Development keeps salvo's diagnostic pages, every other environment renders the error page.
#[must_use]
pub fn catcher(environment: &Environment, controller: Arc<HomeController>) -> Catcher {
    if environment.is_development() {
        Catcher::default()
    } else {
        Catcher::default().hoop(ExceptionPage::new(controller))
    }
}
