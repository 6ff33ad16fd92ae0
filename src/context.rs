//! Per-request state shared with the enrichers.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::event::LogProperty;
use crate::principal::Principal;

/// Identifies one enrichment slot in a request's cache.
///
/// Keys are typed rather than built by string concatenation, so a custom
/// claim exposed as `DisplayName` cannot collide with the display-name
/// enricher.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnrichmentKey {
    /// Display name enricher
    DisplayName,
    /// User principal name enricher
    Upn,
    /// Object identifier enricher
    ObjectId,
    /// Tenant identifier enricher
    TenantId,
    /// Application identifier enricher
    AppId,
    /// Custom claim enricher
    Claim {
        /// Claim type looked up on the principal
        claim_type: String,
        /// Property name exposed on log events
        property_name: String,
    },
}

/// Request-scoped cache of computed log properties.
///
/// Supports lookup and insert only. Population is a single check-and-set
/// under a mutex: when several tasks of one request race, exactly one
/// computes the value and the rest receive the winner's instance.
#[derive(Debug, Default)]
pub struct RequestItems {
    entries: Mutex<HashMap<EnrichmentKey, Arc<LogProperty>>>,
}

impl RequestItems {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached property for `key`.
    pub fn get(&self, key: &EnrichmentKey) -> Option<Arc<LogProperty>> {
        self.entries.lock().get(key).cloned()
    }

    /// Returns the cached property for `key`, computing and storing it first
    /// if absent. `init` runs at most once per key for the life of the store.
    pub fn get_or_insert_with<F>(&self, key: &EnrichmentKey, init: F) -> Arc<LogProperty>
    where
        F: FnOnce() -> LogProperty,
    {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(key) {
            return Arc::clone(existing);
        }
        let property = Arc::new(init());
        entries.insert(key.clone(), Arc::clone(&property));
        property
    }

    /// Stores `property` under `key` unless the slot is taken.
    ///
    /// Returns the instance that ends up cached.
    pub fn insert_if_absent(
        &self,
        key: EnrichmentKey,
        property: Arc<LogProperty>,
    ) -> Arc<LogProperty> {
        Arc::clone(self.entries.lock().entry(key).or_insert(property))
    }
}

/// State bound to one inbound request.
///
/// Created once per request and dropped with it; never reused. The user is
/// interior-mutable because authentication may complete after the context
/// exists.
///
/// # Examples
///
/// ```
/// use identity_enrichers::{Claim, Principal, RequestContext};
///
/// let ctx = RequestContext::new("req-1");
/// assert!(ctx.with_user(|u| u.is_none()));
///
/// ctx.set_user(Some(Principal::authenticated(vec![Claim::new("oid", "abc")])));
/// let oid = ctx.with_user(|u| u.and_then(|u| u.find_first("oid")).map(str::to_owned));
/// assert_eq!(oid.as_deref(), Some("abc"));
/// ```
#[derive(Debug)]
pub struct RequestContext {
    request_id: String,
    user: RwLock<Option<Principal>>,
    items: RequestItems,
}

impl RequestContext {
    /// Creates a context with no user.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user: RwLock::new(None),
            items: RequestItems::new(),
        }
    }

    /// Creates a context for `user`.
    pub fn with_principal(request_id: impl Into<String>, user: Principal) -> Self {
        let ctx = Self::new(request_id);
        ctx.set_user(Some(user));
        ctx
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Replaces the user attached to this request.
    pub fn set_user(&self, user: Option<Principal>) {
        *self.user.write() = user;
    }

    /// Runs `f` with the current user, if any.
    pub fn with_user<R>(&self, f: impl FnOnce(Option<&Principal>) -> R) -> R {
        f(self.user.read().as_ref())
    }

    /// Runs `f` with mutable access to the current user, if any.
    pub fn with_user_mut<R>(&self, f: impl FnOnce(Option<&mut Principal>) -> R) -> R {
        f(self.user.write().as_mut())
    }

    /// Returns the request-scoped property cache.
    pub fn items(&self) -> &RequestItems {
        &self.items
    }
}
