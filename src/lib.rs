//! Identity enrichment for structured logs.
//!
//! Attaches properties derived from the authenticated user (display name,
//! UPN, object id, tenant id, application id, or any claim) to every log event
//! written while a request is being handled.
//!
//! - **Memoized per request**: each property is computed once per request and
//!   the same `Arc<LogProperty>` is reused for every later event
//! - **Silent outside requests**: no request, or no authenticated user, means
//!   no property; enrichment never fails a log call
//! - **Composed, not subclassed**: one [`PropertyEnricher`] type, parameterized
//!   by an [`ExtractRule`]
//!
//! # Core Types
//!
//! - [`RequestContext`]: per-request user and property cache
//! - [`PropertyEnricher`]: the memoizing enricher
//! - [`LoggerConfig`] / [`Logger`]: enrichment pipeline, also usable as a
//!   `tracing_subscriber` layer
//! - [`ClaimsEnrichment`]: fluent registration of the built-in enrichers
//! - [`web::RequestScopeLayer`]: tower middleware that opens the request scope
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use identity_enrichers::{
//!     accessor, claim_types, Claim, ClaimsEnrichment, LoggerConfig, Principal, RequestContext,
//!     VecSink,
//! };
//!
//! let sink = VecSink::new();
//! let logger = LoggerConfig::new()
//!     .with_object_id()
//!     .write_to(sink.clone())
//!     .build();
//!
//! let ctx = Arc::new(RequestContext::with_principal(
//!     "req-123",
//!     Principal::authenticated(vec![Claim::new(claim_types::OBJECT_ID, "abc-123")]),
//! ));
//!
//! accessor::sync_scope(ctx, || logger.info("handled request"));
//!
//! let event = sink.last().expect("event written");
//! assert_eq!(event.property_value("ObjectId"), Some("abc-123"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod accessor;
mod context;
mod enricher;
mod error;
mod event;
mod extract;
mod pipeline;
mod principal;
mod registration;
mod sink;
pub mod web;

pub use accessor::{AmbientContext, ContextAccessor};
pub use context::{EnrichmentKey, RequestContext, RequestItems};
pub use enricher::{Descriptor, Enricher, PropertyEnricher, UNKNOWN_VALUE};
pub use error::Error;
pub use event::{LogEvent, LogLevel, LogProperty};
pub use extract::{AppId, ClaimValue, DisplayName, ExtractRule, ObjectId, TenantId, Upn};
pub use pipeline::{Logger, LoggerConfig};
pub use principal::{claim_types, Claim, Principal};
pub use registration::ClaimsEnrichment;
pub use sink::{DelegatingSink, EventSink, SinkError, SinkErrorKind, VecSink};
