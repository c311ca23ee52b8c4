//! Request correlation middleware.
//!
//! [`RequestTracing`] gives every request a correlation id and records the trace id of the
//! span the request runs under. Spans come from salvo's OpenTelemetry [`Tracing`] hoop,
//! which continues the caller's trace when a valid `traceparent` header was sent. Both ids
//! are stored in the [`Depot`] as a [`RequestContext`], so they stay available to catchers
//! running after the span has closed.
//!
//! # Example
//!
//! ```no_run
//! use homepage::request_tracing::{self, RequestContextDepotExt, RequestTracing};
//! use salvo::otel::Tracing;
//! use salvo::prelude::*;
//!
//! #[handler]
//! async fn hello(depot: &mut Depot) -> String {
//!     format!("Request id: {:?}", depot.request_context().map(|c| &c.request_id))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let acceptor = TcpListener::new("0.0.0.0:5800").bind().await;
//!     let router = Router::new()
//!         .hoop(Tracing::new(request_tracing::tracer()))
//!         .hoop(RequestTracing::new())
//!         .get(hello);
//!     Server::new(acceptor).serve(router).await;
//! }
//! ```
//!
//! [`Tracing`]: salvo::otel::Tracing
use opentelemetry::trace::{TraceContextExt, TracerProvider as _};
use opentelemetry::{Context, global};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use salvo::http::header::{HeaderName, HeaderValue};
use salvo::{Depot, FlowCtrl, Handler, Request, Response, async_trait};
use ulid::Ulid;

/// Default header carrying the correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Header carrying the caller's W3C trace context.
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Install the W3C trace context propagator and create the tracer used by
/// [`Tracing`](salvo::otel::Tracing).
#[must_use]
pub fn tracer() -> SdkTracer {
    global::set_text_map_propagator(TraceContextPropagator::new());
    SdkTracerProvider::builder().build().tracer("homepage")
}

/// Id of the span active on the current task, formatted as a `traceparent` value.
#[must_use]
pub fn active_trace_id() -> Option<String> {
    let cx = Context::current();
    let span = cx.span();
    let span_context = span.span_context();
    span_context.is_valid().then(|| {
        format!(
            "00-{}-{}-{:02x}",
            span_context.trace_id(),
            span_context.span_id(),
            span_context.trace_flags().to_u8()
        )
    })
}

/// Correlation data of one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlation id assigned by the host.
    pub request_id: String,
    /// Id of the span the request ran under, if any.
    pub trace_id: Option<String>,
}

impl RequestContext {
    /// Create new `RequestContext` with no trace.
    #[inline]
    #[must_use]
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            trace_id: None,
        }
    }

    /// Create new `RequestContext` with a fresh ULID and no trace.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self::new(Ulid::new().to_string())
    }

    /// Set the trace id.
    #[inline]
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Id of the span the request ran under.
    #[inline]
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }
}

/// Extension for Depot.
pub trait RequestContextDepotExt {
    /// Get the request context reference from depot.
    fn request_context(&self) -> Option<&RequestContext>;
}

impl RequestContextDepotExt for Depot {
    #[inline]
    fn request_context(&self) -> Option<&RequestContext> {
        self.obtain::<RequestContext>().ok()
    }
}

/// A trait for generate request id.
pub trait IdGenerator {
    /// Generate a new request id.
    fn generate(&self, req: &mut Request, depot: &mut Depot) -> String;
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self, _req: &mut Request, _depot: &mut Depot) -> String {
        self()
    }
}

/// A generator for generate request id with ulid.
#[derive(Default, Debug)]
pub struct UlidGenerator;

impl UlidGenerator {
    /// Create new `UlidGenerator`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UlidGenerator {
    fn generate(&self, _req: &mut Request, _depot: &mut Depot) -> String {
        Ulid::new().to_string()
    }
}

/// Middleware assigning the [`RequestContext`].
///
/// Install after [`Tracing`](salvo::otel::Tracing), otherwise no trace id is recorded.
#[non_exhaustive]
pub struct RequestTracing {
    /// The header name for request id.
    pub header_name: HeaderName,
    /// Whether to replace a request id sent by the caller. Default is `true`.
    pub overwrite: bool,
    /// The generator for request id.
    pub generator: Box<dyn IdGenerator + Send + Sync>,
}

impl std::fmt::Debug for RequestTracing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestTracing")
            .field("header_name", &self.header_name)
            .field("overwrite", &self.overwrite)
            .finish()
    }
}

impl RequestTracing {
    /// Create new `RequestTracing` middleware.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header_name: HeaderName::from_static(REQUEST_ID_HEADER),
            overwrite: true,
            generator: Box::new(UlidGenerator::new()),
        }
    }

    /// Set the header name for request id.
    #[inline]
    #[must_use]
    pub fn header_name(mut self, name: HeaderName) -> Self {
        self.header_name = name;
        self
    }

    /// Set whether to replace a request id sent by the caller. Default is `true`.
    #[inline]
    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the generator for request id.
    #[inline]
    #[must_use]
    pub fn generator(mut self, generator: impl IdGenerator + Send + Sync + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }
}

impl Default for RequestTracing {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for RequestTracing {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        _res: &mut Response,
        _ctrl: &mut FlowCtrl,
    ) {
        let inbound = if self.overwrite {
            None
        } else {
            req.headers()
                .get(&self.header_name)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };
        let request_id = match inbound {
            Some(id) => id,
            None => {
                let id = self.generator.generate(req, depot);
                if let Ok(value) = HeaderValue::from_str(&id) {
                    req.headers_mut().insert(self.header_name.clone(), value);
                }
                id
            }
        };
        depot.inject(RequestContext {
            request_id,
            trace_id: active_trace_id(),
        });
    }
}

/// The request's [`RequestContext`], or a fresh untraced one when no middleware assigned it.
#[must_use]
pub fn current_context(depot: &Depot) -> RequestContext {
    depot
        .request_context()
        .cloned()
        .unwrap_or_else(RequestContext::generate)
}

#[cfg(test)]
mod tests {
    use opentelemetry::trace::{SpanContext, SpanId, TraceFlags, TraceId, TraceState};
    use salvo::otel::Tracing;
    use salvo::prelude::*;
    use salvo::test::{ResponseExt, TestClient};

    use super::*;

    const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    #[handler]
    async fn show(req: &mut Request, depot: &mut Depot) -> String {
        let ctx = current_context(depot);
        format!(
            "{}|{}|{}",
            ctx.request_id,
            ctx.trace_id().unwrap_or_default(),
            req.headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
        )
    }

    async fn send(router: Router, headers: &[(&'static str, &'static str)]) -> Vec<String> {
        let mut client = TestClient::get("http://127.0.0.1:5801/");
        for (name, value) in headers {
            client = client.add_header(*name, *value, true);
        }
        let body = client.send(router).await.take_string().await.unwrap();
        body.split('|').map(str::to_owned).collect()
    }

    async fn access(
        tracing: RequestTracing,
        headers: &[(&'static str, &'static str)],
    ) -> Vec<String> {
        let router = Router::new()
            .hoop(Tracing::new(tracer()))
            .hoop(tracing)
            .get(show);
        send(router, headers).await
    }

    fn trace_part(traceparent: &str, index: usize) -> &str {
        traceparent.split('-').nth(index).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let parts = access(RequestTracing::new(), &[]).await;
        assert_eq!(parts[0].len(), 26, "ulid expected, got {:?}", parts[0]);
        assert_eq!(parts[2], parts[0]);
    }

    #[tokio::test]
    async fn test_custom_generator() {
        let tracing = RequestTracing::new().generator(|| "fixed-id".to_owned());
        let parts = access(tracing, &[]).await;
        assert_eq!(parts[0], "fixed-id");
    }

    #[tokio::test]
    async fn test_overwrite() {
        let parts = access(RequestTracing::new(), &[(REQUEST_ID_HEADER, "from-caller")]).await;
        assert_ne!(parts[0], "from-caller");

        let tracing = RequestTracing::new().overwrite(false);
        let parts = access(tracing, &[(REQUEST_ID_HEADER, "from-caller")]).await;
        assert_eq!(parts[0], "from-caller");
        assert_eq!(parts[2], "from-caller");
    }

    #[tokio::test]
    async fn test_every_request_gets_a_span() {
        let first = access(RequestTracing::new(), &[]).await;
        let second = access(RequestTracing::new(), &[]).await;
        assert!(first[1].starts_with("00-"), "{:?}", first[1]);
        assert_eq!(trace_part(&first[1], 1).len(), 32);
        assert_eq!(trace_part(&first[1], 2).len(), 16);
        assert_ne!(trace_part(&first[1], 1), trace_part(&second[1], 1));
    }

    #[tokio::test]
    async fn test_traceparent_continues_trace() {
        let parts = access(RequestTracing::new(), &[(TRACEPARENT_HEADER, TRACEPARENT)]).await;
        assert_eq!(trace_part(&parts[1], 1), "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_ne!(trace_part(&parts[1], 2), "00f067aa0ba902b7");
        assert_eq!(trace_part(&parts[1], 3), "01");
    }

    #[tokio::test]
    async fn test_invalid_traceparent_starts_new_trace() {
        let parts = access(RequestTracing::new(), &[(TRACEPARENT_HEADER, "not-a-trace")]).await;
        assert!(parts[1].starts_with("00-"));
        assert!(!parts[1].contains("not-a-trace"));
    }

    #[tokio::test]
    async fn test_without_tracing_hoop() {
        let router = Router::new().hoop(RequestTracing::new()).get(show);
        let parts = send(router, &[(TRACEPARENT_HEADER, TRACEPARENT)]).await;
        assert_eq!(parts[1], "");
    }

    #[test]
    fn test_active_trace_id() {
        assert_eq!(active_trace_id(), None);

        let span_context = SpanContext::new(
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
            SpanId::from_hex("00f067aa0ba902b7").unwrap(),
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );
        let _guard = Context::new().with_remote_span_context(span_context).attach();
        assert_eq!(active_trace_id().as_deref(), Some(TRACEPARENT));
    }

    #[test]
    fn test_current_context_without_middleware() {
        let depot = Depot::new();
        let ctx = current_context(&depot);
        assert!(!ctx.request_id.is_empty());
        assert!(ctx.trace_id().is_none());
    }
}
