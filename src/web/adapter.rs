//! Builds a [`RequestContext`] from an HTTP request.

use http::Request;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::principal::Principal;

/// Header carrying a caller-supplied request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Creates the context for `request`.
///
/// The request ID comes from the `x-request-id` header when it is present and
/// valid UTF-8, otherwise a UUID v4 is generated. The user is the
/// [`Principal`] that the authentication middleware stored in the request
/// extensions, if any.
///
/// # Examples
///
/// ```
/// use identity_enrichers::web::context_from_request;
/// use identity_enrichers::{Claim, Principal};
///
/// let mut request = http::Request::builder()
///     .header("x-request-id", "req-42")
///     .body(())
///     .unwrap();
/// request
///     .extensions_mut()
///     .insert(Principal::authenticated(vec![Claim::new("oid", "abc")]));
///
/// let ctx = context_from_request(&request);
/// assert_eq!(ctx.request_id(), "req-42");
/// assert!(ctx.with_user(|u| u.is_some_and(|u| u.is_authenticated())));
/// ```
pub fn context_from_request<B>(request: &Request<B>) -> RequestContext {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let ctx = RequestContext::new(request_id);
    ctx.set_user(request.extensions().get::<Principal>().cloned());
    ctx
}
