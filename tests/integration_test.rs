//! End-to-end enrichment through the logging pipeline.

use std::sync::{Arc, OnceLock};

use identity_enrichers::{
    accessor, claim_types, Claim, ClaimsEnrichment, Enricher, EnrichmentKey, LogEvent, LogLevel,
    Logger, LoggerConfig, Principal, PropertyEnricher, RequestContext, VecSink, UNKNOWN_VALUE,
};

fn request(claims: Vec<Claim>) -> Arc<RequestContext> {
    Arc::new(RequestContext::with_principal(
        "req-e2e",
        Principal::authenticated(claims),
    ))
}

#[test]
fn object_id_is_memoized_for_the_request() {
    let sink = VecSink::new();
    let logger = LoggerConfig::new()
        .with_object_id()
        .write_to(sink.clone())
        .build();
    let ctx = request(vec![Claim::new(claim_types::OBJECT_ID, "abc-123")]);

    accessor::sync_scope(Arc::clone(&ctx), || {
        logger.info("first");

        ctx.with_user_mut(|user| {
            if let Some(user) = user {
                user.set_claim(claim_types::OBJECT_ID, "changed-456");
            }
        });

        logger.info("second");
    });

    let events = sink.drain();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].property_value("ObjectId"), Some("abc-123"));
    assert_eq!(events[1].property_value("ObjectId"), Some("abc-123"));
    assert!(Arc::ptr_eq(
        events[0].property("ObjectId").unwrap(),
        events[1].property("ObjectId").unwrap()
    ));
}

#[test]
fn logging_outside_a_request_adds_nothing() {
    let sink = VecSink::new();
    let logger = LoggerConfig::new()
        .with_display_name()
        .with_upn()
        .with_object_id()
        .with_tenant_id()
        .with_app_id()
        .with_custom_claim("email", Some("Email"))
        .unwrap()
        .write_to(sink.clone())
        .build();

    logger.info("background job");

    assert_eq!(sink.last().unwrap().property_count(), 0);
}

#[test]
fn unauthenticated_request_adds_nothing() {
    let sink = VecSink::new();
    let logger = LoggerConfig::new()
        .with_object_id()
        .with_custom_claim("email", None)
        .unwrap()
        .write_to(sink.clone())
        .build();
    let ctx = Arc::new(RequestContext::with_principal(
        "req-anon",
        Principal::unauthenticated(vec![
            Claim::new(claim_types::OBJECT_ID, "abc"),
            Claim::new("email", "someone@example.com"),
        ]),
    ));

    accessor::sync_scope(ctx, || logger.warn("who is this"));

    assert_eq!(sink.last().unwrap().property_count(), 0);
}

#[test]
fn all_builtin_enrichers_together() {
    let sink = VecSink::new();
    let logger = LoggerConfig::new()
        .with_display_name()
        .with_upn()
        .with_object_id()
        .with_tenant_id()
        .with_app_id()
        .write_to(sink.clone())
        .build();
    let ctx = request(vec![
        Claim::new(claim_types::PREFERRED_USERNAME, "alice@contoso.com"),
        Claim::new(claim_types::UPN_SHORT, "alice@contoso.onmicrosoft.com"),
        Claim::new(claim_types::OID, "oid-1"),
        Claim::new(claim_types::TENANT_ID, "tenant-1"),
        Claim::new(claim_types::AZP, "app-v2"),
    ]);

    accessor::sync_scope(ctx, || logger.info("signed in"));

    let event = sink.last().unwrap();
    assert_eq!(event.property_value("DisplayName"), Some("alice@contoso.com"));
    assert_eq!(event.property_value("Upn"), Some("alice@contoso.onmicrosoft.com"));
    assert_eq!(event.property_value("ObjectId"), Some("oid-1"));
    assert_eq!(event.property_value("TenantId"), Some("tenant-1"));
    assert_eq!(event.property_value("AppId"), Some("app-v2"));
}

#[test]
fn missing_claims_become_unknown() {
    let sink = VecSink::new();
    let logger = LoggerConfig::new()
        .with_upn()
        .with_custom_claim("email", Some("Email"))
        .unwrap()
        .write_to(sink.clone())
        .build();

    accessor::sync_scope(request(vec![Claim::new("email", "")]), || {
        logger.info("no upn, empty email")
    });

    let event = sink.last().unwrap();
    assert_eq!(event.property_value("Upn"), Some(UNKNOWN_VALUE));
    assert_eq!(event.property_value("Email"), Some(UNKNOWN_VALUE));
}

#[test]
fn custom_claim_property_naming() {
    let sink = VecSink::new();
    let logger = LoggerConfig::new()
        .with_custom_claim("email", None)
        .unwrap()
        .with_custom_claim("email", Some("Email"))
        .unwrap()
        .write_to(sink.clone())
        .build();

    accessor::sync_scope(request(vec![Claim::new("email", "bob@example.com")]), || {
        logger.info("two names")
    });

    let event = sink.last().unwrap();
    assert_eq!(event.property_value("email"), Some("bob@example.com"));
    assert_eq!(event.property_value("Email"), Some("bob@example.com"));
}

#[test]
fn requests_do_not_share_cached_values() {
    let enricher = PropertyEnricher::tenant_id();
    let first = request(vec![Claim::new(claim_types::TID, "tenant-a")]);
    let second = request(vec![Claim::new(claim_types::TID, "tenant-b")]);

    let mut a = LogEvent::new(LogLevel::Info, "a");
    let mut b = LogEvent::new(LogLevel::Info, "b");
    accessor::sync_scope(Arc::clone(&first), || enricher.enrich(&mut a));
    accessor::sync_scope(Arc::clone(&second), || enricher.enrich(&mut b));

    assert_eq!(a.property_value("TenantId"), Some("tenant-a"));
    assert_eq!(b.property_value("TenantId"), Some("tenant-b"));
}

#[test]
fn user_set_after_context_creation_is_seen() {
    let sink = VecSink::new();
    let logger = LoggerConfig::new()
        .with_object_id()
        .write_to(sink.clone())
        .build();
    let ctx = Arc::new(RequestContext::new("req-late-auth"));

    accessor::sync_scope(Arc::clone(&ctx), || {
        logger.info("before auth");
        ctx.set_user(Some(Principal::authenticated(vec![Claim::new(
            claim_types::OID,
            "late",
        )])));
        logger.info("after auth");
    });

    let events = sink.drain();
    assert!(!events[0].contains_property("ObjectId"));
    assert_eq!(events[1].property_value("ObjectId"), Some("late"));
}

#[test]
fn rule_that_logs_does_not_deadlock() {
    let sink = VecSink::new();
    let slot: Arc<OnceLock<Logger>> = Arc::new(OnceLock::new());
    let from_rule = Arc::clone(&slot);
    let subject = PropertyEnricher::new(
        EnrichmentKey::Claim {
            claim_type: "sub".into(),
            property_name: "Subject".into(),
        },
        "Subject",
        move |user: &Principal| {
            if let Some(logger) = from_rule.get() {
                logger.info("resolving subject");
            }
            user.find_first("sub").map(str::to_owned)
        },
    );
    let logger = LoggerConfig::new()
        .enrich_with(subject)
        .write_to(sink.clone())
        .build();
    slot.set(logger.clone()).unwrap();

    accessor::sync_scope(request(vec![Claim::new("sub", "s-1")]), || {
        logger.info("outer");
        logger.info("again");
    });

    let events = sink.drain();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].message(), "resolving subject");
    assert!(!events[0].contains_property("Subject"));
    assert_eq!(events[1].message(), "outer");
    assert_eq!(events[1].property_value("Subject"), Some("s-1"));
    assert_eq!(events[2].property_value("Subject"), Some("s-1"));
}
