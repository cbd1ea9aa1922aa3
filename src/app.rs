use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::auth;
use crate::state::AppState;

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn verify_request(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri("/auth/verify");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn signup_body() -> Value {
        json!({ "email": "a@b.co", "password": "Abc123", "name": "A" })
    }

    #[tokio::test]
    async fn health_check() {
        let app = build_app(AppState::fake());
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn signup_login_verify_example() {
        let app = build_app(AppState::fake());

        let (status, body) = send(&app, json_request("POST", "/auth/signup", signup_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        let user = body["user"].as_object().unwrap();
        assert_eq!(user["email"], "a@b.co");
        assert_eq!(user["name"], "A");
        assert!(user["id"].is_string());
        assert_eq!(user.len(), 3, "only id, email and name are exposed");

        let (status, body) = send(&app, json_request("POST", "/auth/signup", signup_body())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "User already exists.");

        let (status, body) = send(
            &app,
            json_request("POST", "/auth/login", json!({ "email": "a@b.co", "password": "Abc123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["authToken"].as_str().unwrap().to_owned();

        let (status, claims) = send(&app, verify_request(Some(&format!("Bearer {token}")))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(claims["email"], "a@b.co");
        assert_eq!(claims["name"], "A");
        assert_eq!(claims["id"], user["id"]);
        assert!(claims.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn signup_validation_messages() {
        let app = build_app(AppState::fake());

        let cases = [
            (
                json!({ "email": "a@b.co", "password": "Abc123" }),
                "Provide email, password and name",
            ),
            (
                json!({ "email": "a@b", "password": "Abc123", "name": "A" }),
                "Provide a valid email address.",
            ),
            (
                json!({ "email": "a@b.co", "password": "abc123", "name": "A" }),
                "Password must have at least 6 characters and contain at least one number, one lowercase and one uppercase letter.",
            ),
        ];
        for (body, message) in cases {
            let (status, res) = send(&app, json_request("POST", "/auth/signup", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(res["message"], message);
        }
    }

    #[tokio::test]
    async fn login_failures() {
        let app = build_app(AppState::fake());
        send(&app, json_request("POST", "/auth/signup", signup_body())).await;

        let (status, body) =
            send(&app, json_request("POST", "/auth/login", json!({ "email": "a@b.co" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Provide email and password.");

        let (wrong_status, wrong) = send(
            &app,
            json_request("POST", "/auth/login", json!({ "email": "a@b.co", "password": "Abc124" })),
        )
        .await;
        let (unknown_status, unknown) = send(
            &app,
            json_request("POST", "/auth/login", json!({ "email": "x@b.co", "password": "Abc123" })),
        )
        .await;
        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong, unknown);
    }

    #[tokio::test]
    async fn unusable_bodies_get_json_400() {
        let app = build_app(AppState::fake());

        let wrong_type = json_request(
            "POST",
            "/auth/signup",
            json!({ "email": 5, "password": "Abc123", "name": "A" }),
        );
        let broken_json = Request::builder()
            .method("POST")
            .uri("/auth/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{"))
            .unwrap();
        let no_content_type = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .body(Body::from(r#"{"email":"a@b.co","password":"Abc123"}"#))
            .unwrap();

        for req in [wrong_type, broken_json, no_content_type] {
            let uri = req.uri().clone();
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["message"], "Provide a JSON request body.", "{uri}");
        }
    }

    #[tokio::test]
    async fn verify_rejects_missing_malformed_and_tampered_tokens() {
        let app = build_app(AppState::fake());
        send(&app, json_request("POST", "/auth/signup", signup_body())).await;
        let (_, body) = send(
            &app,
            json_request("POST", "/auth/login", json!({ "email": "a@b.co", "password": "Abc123" })),
        )
        .await;
        let token = body["authToken"].as_str().unwrap().to_owned();

        let (status, body) = send(&app, verify_request(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Missing Authorization header");

        let (status, _) = send(&app, verify_request(Some(&format!("Token {token}")))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, verify_request(Some("Bearer not.a.jwt"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let mut bytes = token.into_bytes();
        let last = bytes.len() - 3;
        bytes[last] = if bytes[last] == b'x' { b'y' } else { b'x' };
        let tampered = String::from_utf8(bytes).unwrap();
        let (status, body) = send(&app, verify_request(Some(&format!("Bearer {tampered}")))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid or expired token");
    }
}
