//! Router tests driving per-browser dashboards over HTTP.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use photo_admin_authz::{AuthorizationCheck, MemoryAllowList};
use photo_admin_gallery::{MemoryObjectStore, StoreCall};
use photo_admin_platform_access::{MemoryAuthProvider, SignInOptions};
use photo_admin_server::app::{AppState, router};
use photo_admin_server::auth::middleware::SESSION_COOKIE;
use photo_admin_server::pages;
use photo_admin_server::sessions::{DashboardParts, DashboardSessions};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    app: axum::Router,
    sessions: Arc<DashboardSessions>,
    store: Arc<MemoryObjectStore>,
}

impl TestApp {
    fn new(photos: &[&str]) -> Self {
        let store = Arc::new(MemoryObjectStore::with_photos(photos));
        let sessions = Arc::new(DashboardSessions::new(
            DashboardParts {
                authorization: AuthorizationCheck::new(Arc::new(MemoryAllowList::new([
                    "admin@example.com",
                ]))),
                sign_in: SignInOptions::new("google".to_string(), "/admin".to_string()),
                store: store.clone(),
            },
            Arc::new(MemoryAuthProvider::new()),
            chrono::Duration::hours(1),
        ));
        let templates = pages::templates().expect("templates");
        let app = router(
            AppState::new(sessions.clone(), templates, None, false),
            None,
        );
        Self {
            app,
            sessions,
            store,
        }
    }

    /// Opens a dashboard over `provider` and returns its cookie header.
    async fn browser(&self, provider: Arc<MemoryAuthProvider>) -> String {
        let (id, _) = self.sessions.open(provider).await;
        format!("{SESSION_COOKIE}={id}")
    }

    async fn signed_in(&self, email: &str) -> String {
        self.browser(Arc::new(MemoryAuthProvider::signed_in(Some(email))))
            .await
    }

    async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.app.clone().oneshot(request).await.expect("response")
    }

    async fn page(&self, cookie: Option<&str>) -> String {
        body_text(self.send(get("/admin", cookie)).await).await
    }
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8")
}

fn request(method: &str, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    }
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    request("GET", uri, cookie)
        .body(Body::empty())
        .expect("request")
}

fn post(uri: &str, cookie: Option<&str>) -> Request<Body> {
    request("POST", uri, cookie)
        .body(Body::empty())
        .expect("request")
}

fn select_all(cookie: Option<&str>) -> Request<Body> {
    request("POST", "/admin/select-all", cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("checked=true"))
        .expect("request")
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn root_redirects_to_admin() {
    let app = TestApp::new(&[]);

    let response = app.send(get("/", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin");
}

#[tokio::test]
async fn visitor_without_session_gets_sign_in_prompt() {
    let app = TestApp::new(&["a.jpg"]);

    let response = app.send(get("/admin", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Iniciar sesión con Google"));
    assert!(app.store.untouched());
}

#[tokio::test]
async fn non_admin_gets_access_denied() {
    let app = TestApp::new(&["a.jpg"]);
    let cookie = app.signed_in("guest@example.com").await;

    let html = app.page(Some(&cookie)).await;

    assert!(html.contains("Acceso denegado."));
    assert!(html.contains("guest@example.com"));
}

#[tokio::test]
async fn admin_selects_and_deletes_through_forms() {
    let app = TestApp::new(&["a.jpg", "b.jpg"]);
    let cookie = app.signed_in("admin@example.com").await;
    let cookie = Some(cookie.as_str());

    assert!(app.page(cookie).await.contains("Total fotos: 2"));

    let response = app.send(select_all(cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.page(cookie).await.contains("Eliminar (2)"));

    app.send(post("/admin/selection/delete", cookie)).await;
    assert!(
        app.page(cookie)
            .await
            .contains("Estás a punto de eliminar 2 fotos")
    );

    app.send(post("/admin/delete/confirm", cookie)).await;
    let html = app.page(cookie).await;
    assert!(html.contains("Total fotos: 0"));
    assert!(html.contains("No hay fotos aún."));
    assert!(app.store.photo_names().is_empty());
}

#[tokio::test]
async fn second_browser_without_cookie_cannot_act() {
    let app = TestApp::new(&["a.jpg", "b.jpg"]);
    let admin = app.signed_in("admin@example.com").await;

    for cookie in [None, Some("session=forged")] {
        for response in [
            app.send(select_all(cookie)).await,
            app.send(post("/admin/selection/delete", cookie)).await,
            app.send(post("/admin/photos/a.jpg/delete", cookie)).await,
            app.send(post("/admin/delete/confirm", cookie)).await,
            app.send(post("/admin/photos/a.jpg/download", cookie)).await,
        ] {
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(response.headers()[header::LOCATION], "/admin");
        }
        assert!(app.page(cookie).await.contains("Iniciar sesión con Google"));
    }

    assert_eq!(app.store.photo_names().len(), 2);
    assert!(
        !app.store
            .calls()
            .iter()
            .any(|call| matches!(call, StoreCall::Delete(_) | StoreCall::RawBlob(_)))
    );
    let html = app.page(Some(&admin)).await;
    assert!(html.contains("Total fotos: 2"));
    assert!(!html.contains("Eliminar ("));
    assert!(!html.contains("Estás a punto de eliminar"));
}

#[tokio::test]
async fn browsers_keep_separate_selections() {
    let app = TestApp::new(&["a.jpg", "b.jpg"]);
    let first = app.signed_in("admin@example.com").await;
    let second = app.signed_in("admin@example.com").await;

    app.send(select_all(Some(&first))).await;

    assert!(app.page(Some(&first)).await.contains("Eliminar (2)"));
    assert!(!app.page(Some(&second)).await.contains("Eliminar ("));
}

#[tokio::test]
async fn single_download_is_served_as_an_attachment() {
    let app = TestApp::new(&["a.jpg", "b.jpg"]);
    let cookie = app.signed_in("admin@example.com").await;

    let response = app
        .send(post("/admin/photos/a.jpg/download", Some(&cookie)))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"a.jpg\""
    );
    assert_eq!(body_text(response).await, "a.jpg");
}

#[tokio::test]
async fn download_outside_the_catalog_is_refused() {
    let app = TestApp::new(&["a.jpg"]);
    let cookie = app.signed_in("admin@example.com").await;

    let response = app
        .send(post("/admin/photos/other.jpg/download", Some(&cookie)))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    assert!(
        !app.store
            .calls()
            .iter()
            .any(|call| matches!(call, StoreCall::RawBlob(_)))
    );
}

#[tokio::test]
async fn batch_download_hands_names_to_the_browser_once() {
    let app = TestApp::new(&["a.jpg", "b.jpg", "c.jpg"]);
    let cookie = app.signed_in("admin@example.com").await;
    let cookie = Some(cookie.as_str());
    app.send(post("/admin/photos/c.jpg/toggle", cookie)).await;
    app.send(post("/admin/photos/a.jpg/toggle", cookie)).await;

    let response = app.send(post("/admin/selection/download", cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let html = app.page(cookie).await;
    assert!(html.contains("id=\"downloads\""));
    assert!(html.contains("c.jpg&quot;,&quot;a.jpg"));
    assert!(!app.page(cookie).await.contains("id=\"downloads\""));
}

#[tokio::test]
async fn logout_forgets_the_browser() {
    let app = TestApp::new(&[]);
    let cookie = app.signed_in("admin@example.com").await;

    let response = app.send(post("/auth/logout", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("session=;") && c.contains("Max-Age=0"))
    );
    assert!(app.sessions.is_empty());
    assert!(app.page(Some(&cookie)).await.contains("Iniciar sesión con Google"));
}

#[tokio::test]
async fn expired_session_is_forgotten_on_next_visit() {
    let app = TestApp::new(&["a.jpg"]);
    let provider = Arc::new(MemoryAuthProvider::signed_in(Some("admin@example.com")));
    let cookie = app.browser(provider.clone()).await;
    provider.sign_in_for(Some("admin@example.com"), chrono::Duration::seconds(-1));

    let response = app.send(get("/admin", Some(&cookie))).await;

    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("session=;"))
    );
    assert!(body_text(response).await.contains("Iniciar sesión con Google"));
    assert!(app.sessions.is_empty());
}

#[tokio::test]
async fn login_without_session_starts_sign_in() {
    let app = TestApp::new(&[]);

    let response = app.send(get("/auth/login", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin");
    assert!(app.sessions.is_empty());
}

#[tokio::test]
async fn callback_without_auth_state_is_rejected() {
    let app = TestApp::new(&[]);

    let response = app
        .send(get("/auth/callback?code=c&state=s", None))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.sessions.is_empty());
}

#[tokio::test]
async fn callback_without_oidc_is_not_found() {
    let app = TestApp::new(&[]);

    let response = app
        .send(get("/auth/callback?code=c&state=s", Some("auth_state={}")))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.sessions.is_empty());
}
