#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::{header, StatusCode};
use common::{gateway, json_body, location, set_cookies, RequestSpec, MASTER_HOST, STORE_ID, TENANT_HOST};
use mockito::{Matcher, Mock, Server};
use serde_json::json;
use tower::ServiceExt;

async fn mock_tenant_context(backend: &mut Server) -> Mock {
    backend
        .mock("GET", "/tenancy/context")
        .match_header("x-forwarded-host", TENANT_HOST)
        .with_status(200)
        .with_body(
            json!({
                "mode": "tenant",
                "store": { "id": STORE_ID, "name": "Main Street Motors", "slug": "mainstreet" },
            })
            .to_string(),
        )
        .create_async()
        .await
}

async fn mock_identity(backend: &mut Server, token: &str) -> Mock {
    backend
        .mock("GET", "/auth/me")
        .match_header("authorization", format!("Bearer {token}").as_str())
        .with_status(200)
        .with_body(
            json!({
                "id": "0d4c1a9e-7f1b-4d4a-8b0e-2a9c3f6d1e22",
                "email": "sam@mainstreet.com",
                "fullName": "Sam Lee",
                "roles": ["sales"],
            })
            .to_string(),
        )
        .create_async()
        .await
}

#[tokio::test]
async fn health_is_not_gated() {
    let backend = Server::new_async().await;

    let response = gateway(&backend.url())
        .oneshot(RequestSpec::new("GET", "/api/health", "anything.example").build())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn unmatched_api_path_is_json_not_found() {
    let backend = Server::new_async().await;

    let response = gateway(&backend.url())
        .oneshot(RequestSpec::new("GET", "/api/nope", TENANT_HOST).build())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn gate_redirects_without_calling_backend() {
    let mut backend = Server::new_async().await;
    let context = backend
        .mock("GET", "/tenancy/context")
        .expect(0)
        .create_async()
        .await;
    let me = backend.mock("GET", "/auth/me").expect(0).create_async().await;
    let app = gateway(&backend.url());

    let cases = [
        // admin area from a tenant host
        (TENANT_HOST, "/sa/stores", Some("lotline_access=acc"), "/dashboard"),
        // no session
        (TENANT_HOST, "/vehicles", None, "/login"),
        (MASTER_HOST, "/", None, "/login"),
        // master host on a store page outside support mode
        (MASTER_HOST, "/vehicles", Some("lotline_access=acc"), "/sa/select-store"),
        (
            MASTER_HOST,
            "/leads/12",
            Some("lotline_access=acc; lotline_support_store=not-a-uuid"),
            "/sa/select-store",
        ),
    ];

    for (host, path, cookie, target) in cases {
        let mut request = RequestSpec::new("GET", path, host);
        if let Some(cookie) = cookie {
            request = request.cookie(cookie);
        }
        let response = app.clone().oneshot(request.build()).await.unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{host}{path}");
        assert_eq!(location(&response), target, "{host}{path}");
    }

    context.assert_async().await;
    me.assert_async().await;
}

#[tokio::test]
async fn page_with_session_renders_context() {
    let mut backend = Server::new_async().await;
    let _context = mock_tenant_context(&mut backend).await;
    let _me = mock_identity(&mut backend, "acc").await;

    let response = gateway(&backend.url())
        .oneshot(
            RequestSpec::new("GET", "/dashboard", "MAINSTREET.lotline.io")
                .cookie("lotline_access=acc")
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
    let body = json_body(response).await;
    assert_eq!(body["host"], TENANT_HOST);
    assert_eq!(body["path"], "/dashboard");
    assert_eq!(body["tenant"]["store"]["id"], STORE_ID);
    assert_eq!(body["identity"]["fullName"], "Sam Lee");
}

#[tokio::test]
async fn look_alike_of_admin_prefix_is_an_ordinary_page() {
    let mut backend = Server::new_async().await;
    let _context = mock_tenant_context(&mut backend).await;
    let _me = mock_identity(&mut backend, "acc").await;

    let response = gateway(&backend.url())
        .oneshot(
            RequestSpec::new("GET", "/salesXYZ", TENANT_HOST)
                .cookie("lotline_access=acc")
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["path"], "/salesXYZ");
}

#[tokio::test]
async fn master_store_page_in_support_mode_is_allowed() {
    let mut backend = Server::new_async().await;
    let _context = backend
        .mock("GET", "/tenancy/context")
        .match_header("x-forwarded-host", MASTER_HOST)
        .with_status(200)
        .with_body(r#"{"mode":"master"}"#)
        .create_async()
        .await;
    let me = backend
        .mock("GET", "/auth/me")
        .match_header("x-store-id", STORE_ID)
        .with_status(200)
        .with_body(
            json!({
                "id": "0d4c1a9e-7f1b-4d4a-8b0e-2a9c3f6d1e22",
                "email": "dana@lotline.io",
                "fullName": "Dana Ortiz",
                "isSuperAdmin": true,
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let cookie = format!("lotline_access=acc; lotline_support_store={STORE_ID}");
    let response = gateway(&backend.url())
        .oneshot(
            RequestSpec::new("GET", "/vehicles", MASTER_HOST)
                .cookie(&cookie)
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["tenant"]["mode"], "master");
    me.assert_async().await;
}

#[tokio::test]
async fn unknown_host_goes_to_domain_not_found() {
    let mut backend = Server::new_async().await;
    let _context = backend
        .mock("GET", "/tenancy/context")
        .with_status(200)
        .with_body(r#"{"mode":"unknown"}"#)
        .create_async()
        .await;
    let me = backend.mock("GET", "/auth/me").expect(0).create_async().await;
    let app = gateway(&backend.url());

    let response = app
        .clone()
        .oneshot(
            RequestSpec::new("GET", "/dashboard", "typo.lotline.io")
                .cookie("lotline_access=acc")
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/domain-not-found");

    // The target page itself renders without a session
    let response = app
        .oneshot(RequestSpec::new("GET", "/domain-not-found", "typo.lotline.io").build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["tenant"]["mode"], "unknown");
    assert!(body["identity"].is_null());

    me.assert_async().await;
}

#[tokio::test]
async fn backend_outage_fails_closed_to_domain_not_found() {
    let response = gateway("http://127.0.0.1:9")
        .oneshot(
            RequestSpec::new("GET", "/dashboard", TENANT_HOST)
                .cookie("lotline_access=acc")
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/domain-not-found");
}

#[tokio::test]
async fn expired_access_is_refreshed_on_navigation() {
    let mut backend = Server::new_async().await;
    let _context = mock_tenant_context(&mut backend).await;
    let stale = backend
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer old")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = backend
        .mock("POST", "/auth/refresh")
        .match_body(Matcher::Json(json!({ "refreshToken": "ref-1" })))
        .with_status(200)
        .with_body(r#"{"accessToken":"new"}"#)
        .expect(1)
        .create_async()
        .await;
    let _fresh = mock_identity(&mut backend, "new").await;

    let response = gateway(&backend.url())
        .oneshot(
            RequestSpec::new("GET", "/customers", TENANT_HOST)
                .cookie("lotline_access=old; lotline_refresh=ref-1")
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1, "{cookies:?}");
    assert!(cookies[0].starts_with("lotline_access=new"));
    let cache = response.headers().get(header::CACHE_CONTROL).unwrap();
    assert!(cache.to_str().unwrap().starts_with("no-store"));
    assert_eq!(json_body(response).await["identity"]["fullName"], "Sam Lee");

    stale.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn failed_refresh_on_navigation_redirects_to_login() {
    let mut backend = Server::new_async().await;
    let _context = mock_tenant_context(&mut backend).await;
    let _stale = backend
        .mock("GET", "/auth/me")
        .with_status(401)
        .create_async()
        .await;
    let refresh = backend
        .mock("POST", "/auth/refresh")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let response = gateway(&backend.url())
        .oneshot(
            RequestSpec::new("GET", "/customers", TENANT_HOST)
                .cookie("lotline_access=old; lotline_refresh=ref-1")
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");
    assert!(set_cookies(&response).is_empty());
    refresh.assert_async().await;
}

#[tokio::test]
async fn non_canonical_page_paths_redirect_to_canonical_form() {
    let mut backend = Server::new_async().await;
    let context = backend
        .mock("GET", "/tenancy/context")
        .expect(0)
        .create_async()
        .await;
    let app = gateway(&backend.url());

    let cases = [
        ("//sa/stores", "/sa/stores"),
        ("/./sa/stores", "/sa/stores"),
        ("/%73a", "/sa"),
        ("/dashboard/../sa?tab=stores", "/sa?tab=stores"),
        ("//vehicles", "/vehicles"),
    ];

    for (path, canonical) in cases {
        let response = app
            .clone()
            .oneshot(
                RequestSpec::new("GET", path, TENANT_HOST)
                    .cookie("lotline_access=acc")
                    .build(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(location(&response), canonical, "{path}");
    }

    // Following the redirect lands on the gate proper
    let response = app
        .oneshot(
            RequestSpec::new("GET", "/sa/stores", TENANT_HOST)
                .cookie("lotline_access=acc")
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(location(&response), "/dashboard");

    context.assert_async().await;
}

#[tokio::test]
async fn undecodable_page_path_is_bad_request() {
    let backend = Server::new_async().await;

    let response = gateway(&backend.url())
        .oneshot(
            RequestSpec::new("GET", "/%ff%fe", TENANT_HOST)
                .cookie("lotline_access=acc")
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn encoded_api_ids_are_forwarded_untouched() {
    let mut backend = Server::new_async().await;
    let mock = backend
        .mock("GET", "/customers/a%2Fb")
        .with_status(200)
        .with_body(r#"{"id":"a/b"}"#)
        .expect(1)
        .create_async()
        .await;

    let response = gateway(&backend.url())
        .oneshot(
            RequestSpec::new("GET", "/api/proxy/customers/a%2Fb", TENANT_HOST)
                .cookie("lotline_access=acc")
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_host_is_unknown_without_backend_lookup() {
    let mut backend = Server::new_async().await;
    let context = backend
        .mock("GET", "/tenancy/context")
        .expect(0)
        .create_async()
        .await;

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/dashboard")
        .header(header::COOKIE, "lotline_access=acc")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = gateway(&backend.url()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/domain-not-found");
    context.assert_async().await;
}

#[tokio::test]
async fn malformed_identity_reply_means_no_session() {
    let mut backend = Server::new_async().await;
    let _context = mock_tenant_context(&mut backend).await;
    let me = backend
        .mock("GET", "/auth/me")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>")
        .expect(2)
        .create_async()
        .await;
    let app = gateway(&backend.url());

    let response = app
        .clone()
        .oneshot(
            RequestSpec::new("GET", "/dashboard", TENANT_HOST)
                .cookie("lotline_access=acc")
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");

    let response = app
        .oneshot(
            RequestSpec::new("GET", "/api/session", TENANT_HOST)
                .cookie("lotline_access=acc")
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["identity"].is_null());
    assert_eq!(body["tenant"]["mode"], "tenant");

    me.assert_async().await;
}
