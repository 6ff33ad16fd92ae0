//! Extraction rules: how a property value is read from a principal.
//!
//! A rule is a pure lookup. It returns `None` when the value is missing; it
//! never fails, so a lookup problem and a missing claim look the same to the
//! enricher.

use crate::principal::{claim_types, Principal};

/// Produces a property value from an authenticated principal.
///
/// Rules run while the request's cache slot is locked. A rule may log, but
/// events it emits on the same thread skip identity enrichment.
pub trait ExtractRule: Send + Sync {
    /// Reads the value, or `None` if it is not available.
    fn extract(&self, user: &Principal) -> Option<String>;
}

impl<F> ExtractRule for F
where
    F: Fn(&Principal) -> Option<String> + Send + Sync,
{
    fn extract(&self, user: &Principal) -> Option<String> {
        self(user)
    }
}

/// Human-readable name of the user.
///
/// Prefers a dedicated name claim (`preferred_username`, then `name`), and
/// falls back to joining given name and surname.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayName;

impl ExtractRule for DisplayName {
    fn extract(&self, user: &Principal) -> Option<String> {
        if let Some(name) = user.find_first_of(&[
            claim_types::PREFERRED_USERNAME,
            claim_types::NAME,
            claim_types::NAME_SHORT,
        ]) {
            return Some(name.to_string());
        }

        let given = user.find_first_of(&[claim_types::GIVEN_NAME, claim_types::GIVEN_NAME_SHORT]);
        let surname = user.find_first_of(&[claim_types::SURNAME, claim_types::FAMILY_NAME]);
        match (given, surname) {
            (Some(g), Some(s)) => Some(format!("{} {}", g, s)),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => None,
        }
    }
}

/// User principal name.
///
/// Optional in v2.0 tokens, always present in v1.0 tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct Upn;

impl ExtractRule for Upn {
    fn extract(&self, user: &Principal) -> Option<String> {
        user.find_first_of(&[claim_types::UPN, claim_types::UPN_SHORT])
            .map(str::to_owned)
    }
}

/// Object identifier of the user in the directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectId;

impl ExtractRule for ObjectId {
    fn extract(&self, user: &Principal) -> Option<String> {
        user.find_first_of(&[claim_types::OBJECT_ID, claim_types::OID])
            .map(str::to_owned)
    }
}

/// Tenant the user signed in to.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantId;

impl ExtractRule for TenantId {
    fn extract(&self, user: &Principal) -> Option<String> {
        user.find_first_of(&[claim_types::TENANT_ID, claim_types::TID])
            .map(str::to_owned)
    }
}

/// Application the token was issued to: `appid` in v1.0 tokens, `azp` in v2.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppId;

impl ExtractRule for AppId {
    fn extract(&self, user: &Principal) -> Option<String> {
        user.find_first_of(&[claim_types::APP_ID, claim_types::AZP])
            .map(str::to_owned)
    }
}

/// First value of an arbitrary claim type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimValue {
    claim_type: String,
}

impl ClaimValue {
    /// Creates a rule reading `claim_type`.
    pub fn new(claim_type: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
        }
    }

    /// Returns the claim type this rule reads.
    pub fn claim_type(&self) -> &str {
        &self.claim_type
    }
}

impl ExtractRule for ClaimValue {
    fn extract(&self, user: &Principal) -> Option<String> {
        user.find_first(&self.claim_type).map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::Claim;

    fn user(claims: &[(&str, &str)]) -> Principal {
        Principal::authenticated(claims.iter().map(|(t, v)| Claim::new(*t, *v)).collect())
    }

    #[test]
    fn display_name_prefers_preferred_username() {
        let u = user(&[
            (claim_types::NAME_SHORT, "Alice Example"),
            (claim_types::PREFERRED_USERNAME, "alice@example.com"),
        ]);
        assert_eq!(DisplayName.extract(&u).as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn display_name_uses_name_uri_before_short_name() {
        let u = user(&[
            (claim_types::NAME_SHORT, "short"),
            (claim_types::NAME, "From URI"),
        ]);
        assert_eq!(DisplayName.extract(&u).as_deref(), Some("From URI"));
    }

    #[test]
    fn display_name_joins_given_and_surname() {
        let u = user(&[
            (claim_types::GIVEN_NAME_SHORT, "Ada"),
            (claim_types::SURNAME, "Lovelace"),
        ]);
        assert_eq!(DisplayName.extract(&u).as_deref(), Some("Ada Lovelace"));

        let only_given = user(&[(claim_types::GIVEN_NAME, "Ada")]);
        assert_eq!(DisplayName.extract(&only_given).as_deref(), Some("Ada"));

        assert_eq!(DisplayName.extract(&user(&[])), None);
    }

    #[test]
    fn upn_reads_uri_then_short_form() {
        assert_eq!(
            Upn.extract(&user(&[(claim_types::UPN_SHORT, "bob@contoso.com")])).as_deref(),
            Some("bob@contoso.com")
        );
        assert_eq!(
            Upn.extract(&user(&[
                (claim_types::UPN_SHORT, "short@contoso.com"),
                (claim_types::UPN, "uri@contoso.com"),
            ]))
            .as_deref(),
            Some("uri@contoso.com")
        );
    }

    #[test]
    fn object_and_tenant_ids() {
        let u = user(&[
            (claim_types::OBJECT_ID, "abc-123"),
            (claim_types::TID, "tenant-9"),
        ]);
        assert_eq!(ObjectId.extract(&u).as_deref(), Some("abc-123"));
        assert_eq!(TenantId.extract(&u).as_deref(), Some("tenant-9"));
    }

    #[test]
    fn app_id_prefers_v1_claim() {
        let both = user(&[(claim_types::AZP, "v2-app"), (claim_types::APP_ID, "v1-app")]);
        assert_eq!(AppId.extract(&both).as_deref(), Some("v1-app"));

        let v2 = user(&[(claim_types::AZP, "v2-app")]);
        assert_eq!(AppId.extract(&v2).as_deref(), Some("v2-app"));
    }

    #[test]
    fn claim_value_reads_first_match() {
        let rule = ClaimValue::new("email");
        let u = user(&[("email", "first@example.com"), ("email", "second@example.com")]);

        assert_eq!(rule.claim_type(), "email");
        assert_eq!(rule.extract(&u).as_deref(), Some("first@example.com"));
        assert_eq!(rule.extract(&user(&[])), None);
    }

    #[test]
    fn closures_are_rules() {
        let rule = |u: &Principal| u.find_first("sub").map(|s| s.to_uppercase());
        assert_eq!(rule.extract(&user(&[("sub", "abc")])).as_deref(), Some("ABC"));
    }
}
