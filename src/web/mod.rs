//! HTTP integration.
//!
//! Connects an HTTP stack to the enrichers. Authentication itself is out of
//! scope: some earlier middleware validates the caller and stores a
//! [`Principal`](crate::Principal) in the request extensions. This module
//! turns that into a [`RequestContext`](crate::RequestContext) and makes it the
//! ambient request for the rest of the request's processing.
//!
//! # Example Flow
//!
//! ```ignore
//! let logger = LoggerConfig::new()
//!     .with_object_id()
//!     .with_upn()
//!     .write_to(sink)
//!     .build();
//! tracing_subscriber::registry().with(logger).init();
//!
//! let app = ServiceBuilder::new()
//!     .layer(auth_layer)              // external: inserts Principal
//!     .layer(RequestScopeLayer::new())
//!     .service(handler);              // tracing::info! here gets ObjectId, Upn
//! ```

mod adapter;
mod middleware;

pub use adapter::{context_from_request, REQUEST_ID_HEADER};
pub use middleware::{RequestScopeLayer, RequestScopeService};
