//! Request logging middleware.
use std::time::Instant;

use salvo::http::StatusCode;
use salvo::{Depot, FlowCtrl, Handler, Request, Response, async_trait};
use tracing::{Instrument, Level};

use crate::request_tracing::RequestContextDepotExt;

/// Logs every request and the status it finished with.
///
/// Install after [`RequestTracing`](crate::request_tracing::RequestTracing) so the span carries
/// the request id.
#[derive(Default, Debug)]
pub struct RequestLogger;

impl RequestLogger {
    /// Create new `RequestLogger` middleware.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for RequestLogger {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        let request_id = depot
            .request_context()
            .map(|ctx| ctx.request_id.clone())
            .unwrap_or_default();
        let span = tracing::span!(
            Level::INFO,
            "Request",
            request_id = %request_id,
            remote_addr = %req.remote_addr().to_string(),
            version = ?req.version(),
            method = %req.method(),
            path = %req.uri(),
        );

        async move {
            let now = Instant::now();
            ctrl.call_next(req, depot, res).await;
            let duration = now.elapsed();

            let status = res.status_code.unwrap_or(if res.body.is_none() {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::OK
            });
            tracing::info!(
                status = %status,
                duration = ?duration,
                "Response"
            );
        }
        .instrument(span)
        .await;
    }
}
