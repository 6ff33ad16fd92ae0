//! Authenticated identity as seen by the enrichers.
//!
//! Claims are issued and validated elsewhere; this module only models what an
//! authentication layer hands over: an authentication flag and an ordered
//! list of claims.

/// Well-known claim types used by the built-in extractors.
///
/// Identity platforms emit either the long URI form (after claim mapping) or
/// the short JWT form. Extractors check the URI form first.
pub mod claim_types {
    /// Object identifier, URI form.
    pub const OBJECT_ID: &str = "http://schemas.microsoft.com/identity/claims/objectidentifier";
    /// Object identifier, JWT form.
    pub const OID: &str = "oid";
    /// Tenant identifier, URI form.
    pub const TENANT_ID: &str = "http://schemas.microsoft.com/identity/claims/tenantid";
    /// Tenant identifier, JWT form.
    pub const TID: &str = "tid";
    /// User principal name, URI form.
    pub const UPN: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/upn";
    /// User principal name, JWT form.
    pub const UPN_SHORT: &str = "upn";
    /// Application id in v1.0 tokens.
    pub const APP_ID: &str = "appid";
    /// Authorized party (application id) in v2.0 tokens.
    pub const AZP: &str = "azp";
    /// Preferred user name.
    pub const PREFERRED_USERNAME: &str = "preferred_username";
    /// Name, URI form.
    pub const NAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
    /// Name, JWT form.
    pub const NAME_SHORT: &str = "name";
    /// Given name, URI form.
    pub const GIVEN_NAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/givenname";
    /// Given name, JWT form.
    pub const GIVEN_NAME_SHORT: &str = "given_name";
    /// Surname, URI form.
    pub const SURNAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/surname";
    /// Surname, JWT form.
    pub const FAMILY_NAME: &str = "family_name";
}

/// A single claim: a typed assertion about the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// Claim type, e.g. `oid` or a URI
    pub claim_type: String,
    /// Claim value
    pub value: String,
}

impl Claim {
    /// Creates a claim.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// The user attached to a request.
///
/// A principal may carry claims and still be unauthenticated; enrichers
/// ignore such principals entirely.
///
/// # Examples
///
/// ```
/// use identity_enrichers::{Claim, Principal};
///
/// let user = Principal::authenticated(vec![
///     Claim::new("email", "alice@example.com"),
///     Claim::new("email", "alice@other.example"),
/// ]);
///
/// assert!(user.is_authenticated());
/// assert_eq!(user.find_first("email"), Some("alice@example.com"));
/// assert_eq!(user.find_first("phone"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    authenticated: bool,
    claims: Vec<Claim>,
}

impl Principal {
    /// Creates an authenticated principal with the given claims.
    pub fn authenticated(claims: Vec<Claim>) -> Self {
        Self {
            authenticated: true,
            claims,
        }
    }

    /// Creates an unauthenticated principal with no claims.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Creates an unauthenticated principal that still carries claims.
    pub fn unauthenticated(claims: Vec<Claim>) -> Self {
        Self {
            authenticated: false,
            claims,
        }
    }

    /// Returns `true` if an authentication layer vouched for this principal.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns all claims in issue order.
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Returns the value of the first claim of `claim_type`.
    pub fn find_first(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// Returns the first non-empty value among `claim_types`, in order.
    pub fn find_first_of(&self, claim_types: &[&str]) -> Option<&str> {
        claim_types
            .iter()
            .filter_map(|t| self.find_first(t))
            .find(|v| !v.is_empty())
    }

    /// Appends a claim.
    pub fn add_claim(&mut self, claim: Claim) {
        self.claims.push(claim);
    }

    /// Replaces the value of the first claim of `claim_type`, or appends it.
    pub fn set_claim(&mut self, claim_type: &str, value: impl Into<String>) {
        match self.claims.iter_mut().find(|c| c.claim_type == claim_type) {
            Some(claim) => claim.value = value.into(),
            None => self.add_claim(Claim::new(claim_type, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_not_authenticated() {
        let user = Principal::anonymous();
        assert!(!user.is_authenticated());
        assert!(user.claims().is_empty());
    }

    #[test]
    fn unauthenticated_keeps_claims() {
        let user = Principal::unauthenticated(vec![Claim::new("oid", "abc")]);
        assert!(!user.is_authenticated());
        assert_eq!(user.find_first("oid"), Some("abc"));
    }

    #[test]
    fn find_first_returns_first_match() {
        let user = Principal::authenticated(vec![
            Claim::new("role", "reader"),
            Claim::new("role", "writer"),
        ]);
        assert_eq!(user.find_first("role"), Some("reader"));
    }

    #[test]
    fn find_first_of_skips_missing_and_empty() {
        let user = Principal::authenticated(vec![
            Claim::new(claim_types::OBJECT_ID, ""),
            Claim::new(claim_types::OID, "short-form"),
        ]);
        assert_eq!(
            user.find_first_of(&[claim_types::OBJECT_ID, claim_types::OID]),
            Some("short-form")
        );
        assert_eq!(user.find_first_of(&["missing"]), None);
    }

    #[test]
    fn add_claim_keeps_first_match() {
        let mut user = Principal::authenticated(vec![Claim::new("email", "a@example.com")]);
        user.add_claim(Claim::new("email", "b@example.com"));

        assert_eq!(user.claims().len(), 2);
        assert_eq!(user.find_first("email"), Some("a@example.com"));
    }

    #[test]
    fn set_claim_replaces_first_or_appends() {
        let mut user = Principal::authenticated(vec![
            Claim::new("oid", "one"),
            Claim::new("oid", "two"),
        ]);

        user.set_claim("oid", "changed");
        assert_eq!(user.find_first("oid"), Some("changed"));
        assert_eq!(user.claims()[1].value, "two");

        user.set_claim("tid", "tenant");
        assert_eq!(user.find_first("tid"), Some("tenant"));
        assert_eq!(user.claims().len(), 3);
    }
}
