//! Fluent registration of the identity enrichers on a [`LoggerConfig`].
//!
//! Each call appends one enricher and hands the configuration back.
//! Registering the same enricher twice is allowed; both instances share the
//! request cache, so the output is unchanged.
//!
//! The configuration is taken by value, so there is no null handle to check:
//!
//! ```compile_fail
//! use identity_enrichers::{ClaimsEnrichment, LoggerConfig};
//!
//! let missing: Option<LoggerConfig> = None;
//! let _ = missing.with_object_id();
//! ```

use crate::enricher::PropertyEnricher;
use crate::error::Error;
use crate::pipeline::LoggerConfig;

/// Registration calls for the identity enrichers.
///
/// # Examples
///
/// ```
/// use identity_enrichers::{ClaimsEnrichment, LoggerConfig, VecSink};
///
/// let logger = LoggerConfig::new()
///     .with_display_name()
///     .with_object_id()
///     .with_tenant_id()
///     .with_custom_claim("email", Some("Email"))?
///     .write_to(VecSink::new())
///     .build();
/// # let _ = logger;
/// # Ok::<(), identity_enrichers::Error>(())
/// ```
pub trait ClaimsEnrichment: Sized {
    /// Adds the `DisplayName` property.
    fn with_display_name(self) -> Self;

    /// Adds the `Upn` property.
    ///
    /// The user principal name is optional in v2.0 tokens but always present
    /// in v1.0 tokens.
    fn with_upn(self) -> Self;

    /// Adds the `ObjectId` property.
    fn with_object_id(self) -> Self;

    /// Adds the `TenantId` property.
    fn with_tenant_id(self) -> Self;

    /// Adds the `AppId` property, read from `appid` (v1.0) or `azp` (v2.0).
    fn with_app_id(self) -> Self;

    /// Adds a property holding the first value of `claim_type`.
    ///
    /// The property is named `property_name`, or `claim_type` when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `claim_type` or `property_name`
    /// is empty or whitespace. Nothing is registered in that case.
    fn with_custom_claim(
        self,
        claim_type: &str,
        property_name: Option<&str>,
    ) -> Result<Self, Error>;
}

impl ClaimsEnrichment for LoggerConfig {
    fn with_display_name(self) -> Self {
        registered("DisplayName");
        self.enrich_with(PropertyEnricher::display_name())
    }

    fn with_upn(self) -> Self {
        registered("Upn");
        self.enrich_with(PropertyEnricher::upn())
    }

    fn with_object_id(self) -> Self {
        registered("ObjectId");
        self.enrich_with(PropertyEnricher::object_id())
    }

    fn with_tenant_id(self) -> Self {
        registered("TenantId");
        self.enrich_with(PropertyEnricher::tenant_id())
    }

    fn with_app_id(self) -> Self {
        registered("AppId");
        self.enrich_with(PropertyEnricher::app_id())
    }

    fn with_custom_claim(
        self,
        claim_type: &str,
        property_name: Option<&str>,
    ) -> Result<Self, Error> {
        let enricher = PropertyEnricher::claim(claim_type, property_name)?;
        registered(enricher.descriptor().property_name());
        Ok(self.enrich_with(enricher))
    }
}

fn registered(property: &str) {
    tracing::debug!(property, "registered identity enricher");
}
