//! Tower middleware that opens a request scope around each request.
//!
//! Place it inside the authentication layer so the [`Principal`] is already
//! in the request extensions when the scope is created:
//!
//! ```text
//! HTTP Request
//!   ↓
//! authentication middleware (external) inserts Principal
//!   ↓
//! RequestScopeLayer builds Arc<RequestContext>, enters the scope
//!   ↓
//! handler logs; enrichers find the context through AmbientContext
//! ```
//!
//! [`Principal`]: crate::Principal

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::Request;
use tower::{Layer, Service};

use crate::accessor;

use super::context_from_request;

/// Layer producing [`RequestScopeService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestScopeLayer;

impl RequestScopeLayer {
    /// Creates the layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestScopeLayer {
    type Service = RequestScopeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestScopeService { inner }
    }
}

/// Runs the inner service with a fresh request context as the ambient scope.
///
/// The scope covers both the inner `call` and every poll of its future.
///
/// The context is also inserted into the request extensions as
/// `Arc<RequestContext>` so handlers can reach it directly.
#[derive(Debug, Clone)]
pub struct RequestScopeService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestScopeService<S>
where
    S: Service<Request<B>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let ctx = Arc::new(context_from_request(&request));
        request.extensions_mut().insert(Arc::clone(&ctx));

        let inner = &mut self.inner;
        let future = accessor::sync_scope(Arc::clone(&ctx), || inner.call(request));
        Box::pin(accessor::scope(ctx, future))
    }
}
