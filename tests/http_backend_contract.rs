mod support;

use std::time::{Duration, Instant};

use dashsync::api::{ApiError, DashboardBackend, HttpBackend, Priority, RiskLevel};
use dashsync::cancel::CallContext;
use dashsync::sync::{SyncError, aggregate, fetch_all};
use serde_json::json;
use support::stub_server::{StubRoute, StubServer, dashboard_routes};
use url::Url;

fn backend_for(server: &StubServer) -> HttpBackend {
    HttpBackend::with_base_url(Url::parse(server.base_url()).unwrap(), 1024 * 1024)
}

fn ctx() -> CallContext {
    CallContext::new(Duration::from_secs(5))
}

#[test]
fn decodes_every_resource_from_its_envelope() {
    let server = StubServer::start(dashboard_routes());
    let backend = backend_for(&server);
    let ctx = ctx();

    assert_eq!(backend.health(&ctx).unwrap().status, "healthy");
    let overview = backend.overview(&ctx).unwrap().expect("overview present");
    assert_eq!(overview.total_documents, 2);
    assert_eq!(overview.backend_health, "healthy");

    let documents = backend.documents(&ctx).unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].risk_level, RiskLevel::Medium);
    assert!(documents[0].is_completed());
    assert_eq!(documents[1].file_size, None);

    let notifications = backend.notifications(&ctx).unwrap();
    let ids: Vec<&str> = notifications.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["n1", "n2", "n3"]);
    assert_eq!(notifications[0].priority, Priority::High);

    assert_eq!(backend.timeline(&ctx).unwrap().len(), 1);
    let analytics = backend.analytics(&ctx).unwrap().expect("analytics present");
    assert_eq!(analytics.compliance_areas.len(), 2);
}

#[test]
fn missing_data_defaults_to_empty_or_absent() {
    let server = StubServer::start(dashboard_routes());
    let empty = StubRoute::raw(200, r#"{ "status": "success" }"#);
    server.set("GET /api/dashboard/documents", empty.clone());
    server.set("GET /api/dashboard/overview", empty);
    let backend = backend_for(&server);

    assert!(backend.documents(&ctx()).unwrap().is_empty());
    assert!(backend.overview(&ctx()).unwrap().is_none());
}

#[test]
fn error_envelope_is_rejected_with_its_message() {
    let server = StubServer::start(dashboard_routes());
    server.set(
        "GET /api/dashboard/timeline",
        StubRoute::raw(200, r#"{ "status": "error", "message": "bucket offline" }"#),
    );

    let err = backend_for(&server).timeline(&ctx()).unwrap_err();

    assert_eq!(err, ApiError::Rejected("bucket offline".into()));
}

#[test]
fn http_error_keeps_status_and_body() {
    let server = StubServer::start(dashboard_routes());
    server.set(
        "GET /api/dashboard/analytics",
        StubRoute::raw(500, r#"{"detail":"Failed to get analytics"}"#),
    );

    let err = backend_for(&server).analytics(&ctx()).unwrap_err();

    match err {
        ApiError::Status { code, body } => {
            assert_eq!(code, 500);
            assert!(body.contains("Failed to get analytics"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn mutations_use_their_methods() {
    let server = StubServer::start(dashboard_routes());
    let backend = backend_for(&server);

    backend.mark_notification_read("n1", &ctx()).unwrap();
    let refreshed = backend.refresh_analytics(&ctx()).unwrap().unwrap();
    let report = backend.analyze_document("doc1", &ctx()).unwrap();

    assert_eq!(refreshed.compliance_trend[0].score, 90.0);
    assert_eq!(report.0, json!({ "documentId": "doc1", "overallScore": 88 }));
    assert_eq!(
        server.hits(),
        [
            "PUT /api/dashboard/notifications/n1/read",
            "POST /api/dashboard/refresh-analytics",
            "GET /api/dashboard/analyze/doc1",
        ]
    );
}

#[test]
fn ids_are_sent_percent_encoded() {
    let server = StubServer::start(dashboard_routes());

    let err = backend_for(&server)
        .mark_notification_read("weird id/1", &ctx())
        .unwrap_err();

    assert!(matches!(err, ApiError::Status { code: 404, .. }));
    assert_eq!(
        server.hits(),
        ["PUT /api/dashboard/notifications/weird%20id%2F1/read"]
    );
}

#[test]
fn request_timeout_cuts_off_hung_endpoint() {
    let server = StubServer::start(dashboard_routes());
    server.set(
        "GET /api/dashboard/overview",
        StubRoute::success(json!({})).delayed(Duration::from_secs(3)),
    );
    let started = Instant::now();

    let err = backend_for(&server)
        .overview(&CallContext::new(Duration::from_millis(200)))
        .unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn oversized_body_is_refused() {
    let server = StubServer::start(dashboard_routes());
    let backend = HttpBackend::with_base_url(Url::parse(server.base_url()).unwrap(), 64);

    let err = backend.documents(&ctx()).unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
}

#[test]
fn aggregate_over_http_returns_all_fields() {
    let server = StubServer::start(dashboard_routes());

    let fields = fetch_all(&backend_for(&server), &ctx()).unwrap();

    assert!(fields.overview.is_some());
    assert_eq!(fields.documents.len(), 2);
    assert_eq!(fields.notifications.len(), 3);
    assert_eq!(fields.timeline.len(), 1);
    assert!(fields.analytics.is_some());
    assert_eq!(server.hit_count("GET /health"), 1);
}

#[test]
fn document_with_null_metrics_still_aggregates() {
    let server = StubServer::start(dashboard_routes());
    server.set(
        "GET /api/dashboard/documents",
        StubRoute::success(json!([
            {
                "id": "doc3",
                "fileName": "pending.pdf",
                "overallScore": null,
                "riskLevel": null,
                "totalClauses": null,
                "complianceRate": null,
                "status": "processing"
            }
        ])),
    );

    let fields = fetch_all(&backend_for(&server), &ctx()).unwrap();

    assert_eq!(fields.documents.len(), 1);
    assert_eq!(fields.documents[0].overall_score, 0.0);
    assert_eq!(fields.documents[0].risk_level, RiskLevel::Unknown);
}

#[test]
fn hung_resource_fails_the_aggregate() {
    let server = StubServer::start(dashboard_routes());
    server.set(
        "GET /api/dashboard/timeline",
        StubRoute::success(json!([])).delayed(Duration::from_secs(3)),
    );

    let err = fetch_all(
        &backend_for(&server),
        &CallContext::new(Duration::from_millis(300)),
    )
    .unwrap_err();

    assert!(
        matches!(
            err,
            SyncError::AggregateFetch {
                resource: dashsync::api::Resource::Timeline,
                ..
            }
        ),
        "{err:?}"
    );
}

#[test]
fn unhealthy_probe_skips_data_requests() {
    let server = StubServer::start(dashboard_routes());
    server.set(
        "GET /health",
        StubRoute::raw(
            200,
            r#"{ "status": "unhealthy", "message": "GCS client error" }"#,
        ),
    );

    let err = fetch_all(&backend_for(&server), &ctx()).unwrap_err();

    assert_eq!(err, SyncError::Connectivity("GCS client error".into()));
    assert_eq!(server.hits(), ["GET /health"]);
}

#[test]
fn unreachable_backend_is_a_connectivity_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let backend = HttpBackend::with_base_url(
        Url::parse(&format!("http://{addr}")).unwrap(),
        1024,
    );

    let err = aggregate::probe(&backend, &ctx()).unwrap_err();

    assert!(matches!(err, SyncError::Connectivity(_)), "{err:?}");
}
