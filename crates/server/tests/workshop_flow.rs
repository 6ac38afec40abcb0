use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database};
use serde_json::{json, Value};
use service::auth::service::AuthConfig;
use service::registry::accounts::bootstrap_manager;
use tower::ServiceExt;

async fn build_app() -> anyhow::Result<Router> {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;
    migration::Migrator::up(&db, None).await?;
    bootstrap_manager(&db, "admin", "admin-pass-1", Some("Admin")).await?;
    let auth = AuthConfig { jwt_secret: "test-secret".into(), access_ttl_secs: 60, refresh_ttl_secs: 600 };
    Ok(server::startup::build_app(db, auth))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let req = Request::builder().method(method).uri(uri);
    let req = if token.is_empty() {
        req
    } else {
        req.header(header::AUTHORIZATION, format!("Bearer {token}"))
    };
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

async fn login(app: &Router, username: &str, password: &str) -> anyhow::Result<String> {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/token",
        "",
        Some(json!({"username": username, "password": password})),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::OK, "login failed for {username}: {body}");
    Ok(body["access"].as_str().unwrap_or_default().to_string())
}

fn id(v: &Value) -> String {
    v["id"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn quote_to_service_order_and_counter_sale() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = build_app().await?;
    let mgr = login(&app, "admin", "admin-pass-1").await?;

    // Mechanic gets generated credentials, returned once.
    let (status, mech) = call(&app, Method::POST, "/api/mechanics", &mgr, Some(json!({
        "name": "Carlos Lima", "cpf": "98765432100", "phone": "11988887777",
        "email": "carlos@shop.com", "address": "Rua B, 2"
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let creds = &mech["credentials"];
    assert_eq!(creds["username"], "carlos");
    let mech_token = login(&app, "carlos", creds["password"].as_str().unwrap_or_default()).await?;

    let (status, _) = call(&app, Method::POST, "/api/register/customer", "", Some(json!({
        "name": "Bia", "cpf": "11122233344", "phone": "11911112222", "password": "bia-password"
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let cust = login(&app, "11122233344", "bia-password").await?;
    let (_, me) = call(&app, Method::GET, "/api/me", &cust, None).await?;
    let customer_id = me["profile_id"].as_str().unwrap_or_default().to_string();

    let (status, car) = call(&app, Method::POST, "/api/vehicles", &cust, Some(json!({
        "plate": "abc-1d23", "model": "Onix", "make": "Chevrolet", "year": 2020
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(car["plate"], "ABC1D23");

    let (status, pads) = call(&app, Method::POST, "/api/products", &mgr, Some(json!({
        "name": "Brake pad", "sale_price_cents": 12000, "cost_cents": 6000, "stock_qty": 6, "min_stock": 5
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/products",
        &mech_token,
        Some(json!({"name": "x", "sale_price_cents": 1})),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, quote) = call(&app, Method::POST, "/api/quotes", &mech_token, Some(json!({
        "customer_id": customer_id, "vehicle_id": id(&car), "valid_until": "2099-12-31"
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let qid = id(&quote);

    let (status, body) = call(&app, Method::POST, &format!("/api/quotes/{qid}/finalize"), &mech_token, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "items");

    let (status, detail) = call(
        &app,
        Method::POST,
        &format!("/api/quotes/{qid}/items"),
        &mech_token,
        Some(json!({"product_id": id(&pads), "quantity": 2})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["total_cents"], 24000);
    let (status, _) = call(&app, Method::POST, &format!("/api/quotes/{qid}/finalize"), &mech_token, None).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, notes) = call(&app, Method::GET, "/api/notifications?unread=true", &cust, None).await?;
    assert_eq!(notes.as_array().map(Vec::len), Some(1));
    assert_eq!(notes[0]["kind"], "QUOTE_READY");

    let (status, approval) = call(&app, Method::POST, &format!("/api/quotes/{qid}/approve"), &cust, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approval["quote"]["status"], "APPROVED");
    assert_eq!(approval["service_order"]["status"], "IN_PROGRESS");
    let order_id = approval["service_order"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = call(&app, Method::POST, &format!("/api/quotes/{qid}/approve"), &cust, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "quote has already been processed");

    let (status, order) = call(&app, Method::GET, &format!("/api/service-orders/{order_id}"), &cust, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["customer_status"], "In maintenance");

    let (status, done) = call(
        &app,
        Method::POST,
        &format!("/api/service-orders/{order_id}/status"),
        &mech_token,
        Some(json!({"status": "COMPLETED"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["customer_status"], "Ready for pickup");

    let (_, low) = call(&app, Method::GET, "/api/products?low_stock=true", &mgr, None).await?;
    assert_eq!(low[0]["stock_qty"], 4);

    // Counter sale: a shortfall rejects everything, staff only.
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/sales",
        &mgr,
        Some(json!({"items": [{"product_id": id(&pads), "quantity": 10}]})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap_or_default().starts_with("requested quantity exceeds available stock"));
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/sales",
        &cust,
        Some(json!({"items": [{"product_id": id(&pads), "quantity": 1}]})),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, sale) = call(
        &app,
        Method::POST,
        "/api/sales",
        &mgr,
        Some(json!({"items": [{"product_id": id(&pads), "quantity": 1}]})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["total_cents"], 12000);

    let (_, product) = call(&app, Method::GET, &format!("/api/products/{}", id(&pads)), &mgr, None).await?;
    assert_eq!(product["stock_qty"], 3);
    Ok(())
}

#[tokio::test]
async fn supplier_handles_purchase_orders() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = build_app().await?;
    let mgr = login(&app, "admin", "admin-pass-1").await?;

    let signup = json!({
        "company_name": "Auto Pecas Sul", "cnpj": "12.345.678/0001-95", "phone": "1133334444",
        "password": "supplier-pass"
    });
    let (status, _) = call(&app, Method::POST, "/api/register/supplier", "", Some(signup)).await?;
    assert_eq!(status, StatusCode::CREATED);
    let sup = login(&app, "12345678000195", "supplier-pass").await?;

    let part = json!({"name": "Clutch kit", "sale_price_cents": 90000, "cost_cents": 60000, "stock_qty": 5});
    let (status, kit) = call(&app, Method::POST, "/api/products", &sup, Some(part)).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, po) = call(&app, Method::POST, "/api/purchase-orders", &mgr, Some(json!({
        "product_id": id(&kit), "quantity": 2
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(po["status"], "PENDING");
    assert_eq!(po["total_cents"], 120000);
    let po_id = id(&po);

    let (_, mine) = call(&app, Method::GET, "/api/purchase-orders?status=PENDING", &sup, None).await?;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));

    let (status, approved) = call(
        &app,
        Method::POST,
        &format!("/api/purchase-orders/{po_id}/approve"),
        &sup,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "APPROVED");
    let (status, body) = call(&app, Method::POST, &format!("/api/purchase-orders/{po_id}/approve"), &sup, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Already Processed");

    let (_, product) = call(&app, Method::GET, &format!("/api/products/{}", id(&kit)), &sup, None).await?;
    assert_eq!(product["stock_qty"], 3);

    let shipped = Some(json!({"status": "SHIPPED"}));
    let uri = format!("/api/purchase-orders/{po_id}/status");
    let (status, body) = call(&app, Method::POST, &uri, &sup, shipped).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "SHIPPED");

    // Ordered products keep their history.
    let (status, body) = call(&app, Method::DELETE, &format!("/api/products/{}", id(&kit)), &sup, None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["field"], "product_id");

    let (status, second) = call(&app, Method::POST, "/api/purchase-orders", &mgr, Some(json!({
        "product_id": id(&kit), "quantity": 1
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/purchase-orders/{}/reject", id(&second));
    let (status, body) = call(&app, Method::POST, &uri, &sup, Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "reason");
    let (status, body) = call(&app, Method::POST, &uri, &sup, Some(json!({"reason": "Discontinued"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rejection_reason"], "Discontinued");
    Ok(())
}

#[tokio::test]
async fn oversized_prices_are_bad_requests() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = build_app().await?;
    let mgr = login(&app, "admin", "admin-pass-1").await?;
    let (_, bulb) = call(&app, Method::POST, "/api/products", &mgr, Some(json!({
        "name": "Bulb", "sale_price_cents": 500, "stock_qty": 10
    }))).await?;

    let sale = json!({"items": [{"product_id": id(&bulb), "quantity": 2, "unit_price_cents": i64::MAX}]});
    let (status, body) = call(&app, Method::POST, "/api/sales", &mgr, Some(sale)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "unit_price_cents");
    assert_eq!(body["detail"], "amount too large");

    let (_, product) = call(&app, Method::GET, &format!("/api/products/{}", id(&bulb)), &mgr, None).await?;
    assert_eq!(product["stock_qty"], 10);
    Ok(())
}
