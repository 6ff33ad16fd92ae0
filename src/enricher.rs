//! The memoizing identity enricher.
//!
//! [`PropertyEnricher`] is the only enricher type in the crate. The variants
//! (display name, UPN, object id, ...) differ in the [`ExtractRule`] they carry
//! and in their descriptor, nothing else.

use std::cell::Cell;
use std::sync::Arc;

use crate::accessor::{AmbientContext, ContextAccessor};
use crate::context::{EnrichmentKey, RequestContext};
use crate::error::{require_non_blank, Error};
use crate::event::{LogEvent, LogProperty};
use crate::extract::{AppId, ClaimValue, DisplayName, ExtractRule, ObjectId, TenantId, Upn};

/// Value recorded when an extraction yields nothing usable.
pub const UNKNOWN_VALUE: &str = "unknown";

thread_local! {
    static EXTRACTING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running an extraction rule until dropped.
struct ExtractionGuard;

impl ExtractionGuard {
    fn enter() -> Self {
        EXTRACTING.with(|flag| flag.set(true));
        ExtractionGuard
    }

    fn active() -> bool {
        EXTRACTING.with(Cell::get)
    }
}

impl Drop for ExtractionGuard {
    fn drop(&mut self) {
        EXTRACTING.with(|flag| flag.set(false));
    }
}

/// Adds properties to log events before they are written.
///
/// Implementations must not panic and must not block; enrichment is a side
/// channel and may not interfere with logging.
pub trait Enricher: Send + Sync {
    /// Enriches `event` in place.
    fn enrich(&self, event: &mut LogEvent);
}

/// Fixed configuration of one enricher: where it caches and what it emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    key: EnrichmentKey,
    property_name: String,
}

impl Descriptor {
    /// Creates a descriptor.
    pub fn new(key: EnrichmentKey, property_name: impl Into<String>) -> Self {
        Self {
            key,
            property_name: property_name.into(),
        }
    }

    /// Returns the request cache key.
    pub fn key(&self) -> &EnrichmentKey {
        &self.key
    }

    /// Returns the property name written to events.
    pub fn property_name(&self) -> &str {
        &self.property_name
    }
}

/// Enricher that computes one property per request and reuses it.
///
/// On each call:
/// 1. No current request: nothing happens.
/// 2. No user, or the user is not authenticated: nothing happens.
/// 3. Otherwise the property is taken from the request cache, or computed with
///    the extraction rule and cached. An empty or missing value becomes
///    [`UNKNOWN_VALUE`]. The property is added to the event unless the event
///    already has one with that name.
///
/// The rule runs at most once per request, and every event in the request
/// receives the same `Arc<LogProperty>`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use identity_enrichers::{
///     accessor, Claim, Enricher, LogEvent, LogLevel, Principal, PropertyEnricher, RequestContext,
/// };
/// use identity_enrichers::claim_types;
///
/// let enricher = PropertyEnricher::object_id();
/// let ctx = Arc::new(RequestContext::with_principal(
///     "req-1",
///     Principal::authenticated(vec![Claim::new(claim_types::OBJECT_ID, "abc-123")]),
/// ));
///
/// let mut event = LogEvent::new(LogLevel::Info, "hello");
/// accessor::sync_scope(ctx, || enricher.enrich(&mut event));
///
/// assert_eq!(event.property_value("ObjectId"), Some("abc-123"));
/// ```
#[derive(Debug, Clone)]
pub struct PropertyEnricher<R, A = AmbientContext> {
    descriptor: Descriptor,
    rule: R,
    accessor: A,
}

impl<R: ExtractRule> PropertyEnricher<R> {
    /// Creates an enricher reading the ambient request scope.
    pub fn new(key: EnrichmentKey, property_name: impl Into<String>, rule: R) -> Self {
        Self {
            descriptor: Descriptor::new(key, property_name),
            rule,
            accessor: AmbientContext,
        }
    }
}

impl<R, A> PropertyEnricher<R, A> {
    /// Replaces the request accessor.
    pub fn with_accessor<B: ContextAccessor>(self, accessor: B) -> PropertyEnricher<R, B> {
        PropertyEnricher {
            descriptor: self.descriptor,
            rule: self.rule,
            accessor,
        }
    }

    /// Returns the descriptor.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }
}

impl<R: ExtractRule, A: ContextAccessor> PropertyEnricher<R, A> {
    /// Returns this enricher's property for `ctx`, computing it on first use.
    ///
    /// Returns `None` when the request has no authenticated user, or when
    /// called from inside an extraction rule on the same thread (an event
    /// logged by a rule is written without identity properties).
    pub fn property_for(&self, ctx: &RequestContext) -> Option<Arc<LogProperty>> {
        if ExtractionGuard::active() {
            return None;
        }
        ctx.with_user(|user| {
            let user = user.filter(|u| u.is_authenticated())?;
            Some(ctx.items().get_or_insert_with(&self.descriptor.key, || {
                let _guard = ExtractionGuard::enter();
                let value = self
                    .rule
                    .extract(user)
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| UNKNOWN_VALUE.to_string());
                tracing::trace!(
                    request_id = %ctx.request_id(),
                    property = %self.descriptor.property_name,
                    "caching enrichment property"
                );
                LogProperty::new(self.descriptor.property_name.clone(), value)
            }))
        })
    }
}

impl<R: ExtractRule, A: ContextAccessor> Enricher for PropertyEnricher<R, A> {
    fn enrich(&self, event: &mut LogEvent) {
        let Some(ctx) = self.accessor.current() else {
            return;
        };
        if let Some(property) = self.property_for(&ctx) {
            event.add_property_if_absent(property);
        }
    }
}

impl PropertyEnricher<DisplayName> {
    /// Enriches with `DisplayName`.
    pub fn display_name() -> Self {
        Self::new(EnrichmentKey::DisplayName, "DisplayName", DisplayName)
    }
}

impl PropertyEnricher<Upn> {
    /// Enriches with `Upn`, the user principal name.
    pub fn upn() -> Self {
        Self::new(EnrichmentKey::Upn, "Upn", Upn)
    }
}

impl PropertyEnricher<ObjectId> {
    /// Enriches with `ObjectId`.
    pub fn object_id() -> Self {
        Self::new(EnrichmentKey::ObjectId, "ObjectId", ObjectId)
    }
}

impl PropertyEnricher<TenantId> {
    /// Enriches with `TenantId`.
    pub fn tenant_id() -> Self {
        Self::new(EnrichmentKey::TenantId, "TenantId", TenantId)
    }
}

impl PropertyEnricher<AppId> {
    /// Enriches with `AppId`.
    pub fn app_id() -> Self {
        Self::new(EnrichmentKey::AppId, "AppId", AppId)
    }
}

impl PropertyEnricher<ClaimValue> {
    /// Enriches with the first value of `claim_type`.
    ///
    /// The property is named `property_name`, or `claim_type` itself when no
    /// override is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `claim_type` or the override is
    /// empty or whitespace.
    pub fn claim(claim_type: &str, property_name: Option<&str>) -> Result<Self, Error> {
        let claim_type = require_non_blank(claim_type, "claim_type")?;
        let property_name = match property_name {
            Some(name) => require_non_blank(name, "property_name")?,
            None => claim_type,
        };

        let key = EnrichmentKey::Claim {
            claim_type: claim_type.to_string(),
            property_name: property_name.to_string(),
        };
        Ok(Self::new(key, property_name, ClaimValue::new(claim_type)))
    }
}
