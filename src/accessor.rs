//! Access to the current request from code that has no handle to it.
//!
//! Log statements can run anywhere, so enrichers look the request up through a
//! [`ContextAccessor`] instead of receiving it as an argument. The default
//! accessor, [`AmbientContext`], reads a task-local slot that [`scope`] or
//! [`sync_scope`] fills for the duration of one request.

use std::future::Future;
use std::sync::Arc;

use tokio::task::futures::TaskLocalFuture;

use crate::context::RequestContext;

tokio::task_local! {
    static CURRENT_REQUEST: Arc<RequestContext>;
}

/// Yields the request being processed, if any.
///
/// Returning `None` is the normal answer for background work and startup
/// code.
pub trait ContextAccessor: Send + Sync {
    /// Returns the current request context.
    fn current(&self) -> Option<Arc<RequestContext>>;
}

impl<F> ContextAccessor for F
where
    F: Fn() -> Option<Arc<RequestContext>> + Send + Sync,
{
    fn current(&self) -> Option<Arc<RequestContext>> {
        self()
    }
}

/// Accessor backed by the task-local request scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmbientContext;

impl ContextAccessor for AmbientContext {
    fn current(&self) -> Option<Arc<RequestContext>> {
        current()
    }
}

/// Returns the request context of the enclosing [`scope`], if any.
pub fn current() -> Option<Arc<RequestContext>> {
    CURRENT_REQUEST.try_with(Arc::clone).ok()
}

/// Runs `future` with `ctx` as the current request.
///
/// The scope does not propagate into tasks spawned from inside `future`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use identity_enrichers::{accessor, RequestContext};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let ctx = Arc::new(RequestContext::new("req-1"));
/// let seen = accessor::scope(ctx, async { accessor::current().map(|c| c.request_id().to_string()) }).await;
/// assert_eq!(seen.as_deref(), Some("req-1"));
/// assert!(accessor::current().is_none());
/// # });
/// ```
pub fn scope<F>(ctx: Arc<RequestContext>, future: F) -> TaskLocalFuture<Arc<RequestContext>, F>
where
    F: Future,
{
    tracing::debug!(request_id = %ctx.request_id(), "entering request scope");
    CURRENT_REQUEST.scope(ctx, future)
}

/// Runs `f` synchronously with `ctx` as the current request.
pub fn sync_scope<R>(ctx: Arc<RequestContext>, f: impl FnOnce() -> R) -> R {
    CURRENT_REQUEST.sync_scope(ctx, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_is_none_outside_scope() {
        assert!(current().is_none());
        assert!(AmbientContext.current().is_none());
    }

    #[test]
    fn sync_scope_exposes_context() {
        let ctx = Arc::new(RequestContext::new("req-sync"));
        let seen = sync_scope(Arc::clone(&ctx), || AmbientContext.current());

        assert!(Arc::ptr_eq(&seen.unwrap(), &ctx));
        assert!(current().is_none());
    }

    #[test]
    fn nested_scopes_restore_outer() {
        let outer = Arc::new(RequestContext::new("outer"));
        let inner = Arc::new(RequestContext::new("inner"));

        sync_scope(outer, || {
            let seen = sync_scope(inner, || current().map(|c| c.request_id().to_string()));
            assert_eq!(seen.as_deref(), Some("inner"));
            assert_eq!(current().unwrap().request_id(), "outer");
        });
    }

    #[test]
    fn closures_are_accessors() {
        let ctx = Arc::new(RequestContext::new("req-fn"));
        let captured = Arc::clone(&ctx);
        let accessor = move || Some(Arc::clone(&captured));

        assert!(Arc::ptr_eq(&accessor.current().unwrap(), &ctx));
    }

    #[tokio::test]
    async fn scope_spans_await_points() {
        let ctx = Arc::new(RequestContext::new("req-async"));
        let id = scope(ctx, async {
            tokio::task::yield_now().await;
            current().map(|c| c.request_id().to_string())
        })
        .await;

        assert_eq!(id.as_deref(), Some("req-async"));
    }
}
