use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database};
use serde_json::{json, Value};
use service::auth::service::AuthConfig;
use tower::ServiceExt;

async fn build_app() -> anyhow::Result<Router> {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;
    migration::Migrator::up(&db, None).await?;
    let auth = AuthConfig { jwt_secret: "test-secret".into(), access_ttl_secs: 60, refresh_ttl_secs: 600 };
    Ok(server::startup::build_app(db, auth))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
        None => req.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[tokio::test]
async fn public_paths_and_missing_token() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = build_app().await?;

    let (status, body) = call(&app, Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = call(&app, Method::GET, "/api-docs/openapi.json", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/quotes/{id}/approve"].is_object());

    let (status, body) = call(&app, Method::GET, "/api/me", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = call(&app, Method::GET, "/api/me", Some("not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn register_login_refresh() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = build_app().await?;

    let signup = json!({
        "name": "Ana Souza", "cpf": "123.456.789-01", "phone": "11999990000",
        "email": "ana@example.com", "address": "Rua A, 1", "password": "S3curePass!"
    });
    let (status, body) = call(&app, Method::POST, "/api/register/customer", None, Some(signup.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["cpf"], "12345678901");
    assert!(body.get("credentials").is_none());

    let (status, body) = call(&app, Method::POST, "/api/register/customer", None, Some(signup)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["field"], "cpf");

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/token",
        None,
        Some(json!({"username": "12345678901", "password": "wrong-pass"})),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, session) = call(
        &app,
        Method::POST,
        "/api/token",
        None,
        Some(json!({"username": "ana@example.com", "password": "S3curePass!"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let access = session["access"].as_str().unwrap_or_default().to_string();
    let refresh = session["refresh"].as_str().unwrap_or_default().to_string();
    assert!(!access.is_empty() && !refresh.is_empty());

    let (status, me) = call(&app, Method::GET, "/api/me", Some(&access), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "CUSTOMER");
    assert_eq!(me["username"], "12345678901");
    assert!(me["profile_id"].is_string());

    let (status, _) = call(&app, Method::GET, "/api/me", Some(&refresh), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, fresh) = call(
        &app,
        Method::POST,
        "/api/token/refresh",
        None,
        Some(json!({"refresh": refresh})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let new_access = fresh["access"].as_str().unwrap_or_default().to_string();
    let (status, _) = call(&app, Method::GET, "/api/me", Some(&new_access), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::POST, "/api/token/refresh", None, Some(json!({"refresh": access}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::GET, "/api/customers", Some(&new_access), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}
