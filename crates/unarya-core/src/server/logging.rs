//! Request logging middleware: request IDs, spans and timing.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use http::{HeaderMap, HeaderValue, Request, Response};
use tower::{Layer, Service};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Header carrying the request ID, on both the request and the response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Returns the caller's request ID, assigning a fresh uuid v4 if it sent none.
fn ensure_request_id(headers: &mut HeaderMap) -> String {
    if let Some(id) = headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()) {
        return id.to_string();
    }

    let id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    id
}

/// A `Layer` wrapping every gRPC call in [`RequestLoggerService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLoggerLayer;

impl<S> Layer<S> for RequestLoggerLayer {
    type Service = RequestLoggerService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RequestLoggerService { inner: service }
    }
}

/// Tags each call with a request ID, runs it inside an INFO span and logs
/// its duration. The ID is echoed back on the response.
#[derive(Debug, Clone)]
pub struct RequestLoggerService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestLoggerService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::fmt::Display,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let request_id = ensure_request_id(request.headers_mut());
        let rpc = request.uri().path().to_string();
        let span = info_span!("rpc", request_id = %request_id, rpc = %rpc);
        let start = Instant::now();

        let future = span.in_scope(|| self.inner.call(request));
        Box::pin(
            async move {
                let result = future.await;
                let duration_ms = start.elapsed().as_millis();

                match result {
                    Ok(mut response) => {
                        let grpc_status = response
                            .headers()
                            .get("grpc-status")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("0")
                            .to_string();
                        info!(duration_ms, grpc_status = %grpc_status, "Request completed");
                        if let Ok(value) = HeaderValue::from_str(&request_id) {
                            response.headers_mut().insert(REQUEST_ID_HEADER, value);
                        }
                        Ok(response)
                    }
                    Err(e) => {
                        warn!(duration_ms, error = %e, "Request failed");
                        Err(e)
                    }
                }
            }
            .instrument(span),
        )
    }
}
