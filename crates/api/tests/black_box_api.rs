use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value as JsonValue, json};

use stockroom_api::config::{ApiConfig, JwtKey};
use stockroom_auth::RoleNames;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(ApiConfig {
            jwt_key: JwtKey::Secret(JWT_SECRET.to_string()),
            ..ApiConfig::default()
        })
        .await
    }

    async fn spawn_with(config: ApiConfig) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = stockroom_api::app::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt_with(secret: &str, roles: &[&str], expires_in: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = json!({
        "sub": "black-box",
        "iat": now.timestamp(),
        "exp": (now + expires_in).timestamp(),
        "realm_access": { "roles": roles },
    });

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn mint_jwt(roles: &[&str]) -> String {
    mint_jwt_with(JWT_SECRET, roles, ChronoDuration::minutes(10))
}

fn product(barcode: &str) -> JsonValue {
    json!({ "barcode": barcode, "name": "Espresso beans", "price": 18.99, "quantity": 12 })
}

async fn error_body(res: reqwest::Response) -> JsonValue {
    let body: JsonValue = res.json().await.unwrap();
    assert!(body["message"].is_string());
    assert!(body["timestamp"].is_string());
    body
}

#[tokio::test]
async fn health_needs_no_token() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/actuator/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: JsonValue = res.json().await.unwrap();
    assert_eq!(body["status"], "UP");
}

#[tokio::test]
async fn anonymous_read_requires_authentication() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/products/123")).await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_body(res).await["code"], "AUTHENTICATION_REQUIRED");
}

#[tokio::test]
async fn user_cannot_create_products() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(mint_jwt(&["USER"]))
        .json(&product("123"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_body(res).await["code"], "ACCESS_DENIED");
}

#[tokio::test]
async fn duplicate_barcode_is_conflict() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt(&["ADMIN"]);

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(&admin)
        .json(&product("123"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let created: JsonValue = res.json().await.unwrap();
    assert_eq!(created["barcode"], "123");
    assert_eq!(created["price"], 18.99);

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(&admin)
        .json(&product("123"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = error_body(res).await;
    assert_eq!(body["code"], "DUPLICATE_RESOURCE");
    assert!(body["message"].as_str().unwrap().contains("123"));
}

#[tokio::test]
async fn user_can_list_and_read_products() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let user = mint_jwt(&["USER"]);

    for barcode in ["a-1", "a-2"] {
        let res = client
            .post(srv.url("/products"))
            .bearer_auth(mint_jwt(&["ADMIN"]))
            .json(&product(barcode))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client.get(srv.url("/products")).bearer_auth(&user).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let list: Vec<JsonValue> = res.json().await.unwrap();
    assert_eq!(list.len(), 2);

    let res = client.get(srv.url("/products/a-2")).bearer_auth(&user).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/products/zzz")).bearer_auth(&user).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_body(res).await["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn admin_updates_price_and_deletes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt(&["ADMIN"]);

    client
        .post(srv.url("/products"))
        .bearer_auth(&admin)
        .json(&product("p-1"))
        .send()
        .await
        .unwrap();

    let res = client
        .patch(srv.url("/products/p-1/price"))
        .bearer_auth(mint_jwt(&["USER"]))
        .json(&json!({ "price": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .patch(srv.url("/products/p-1/price"))
        .bearer_auth(&admin)
        .json(&json!({ "price": 25.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: JsonValue = res.json().await.unwrap();
    assert_eq!(updated["price"], 25.0);

    let res = client.delete(srv.url("/products/p-1")).bearer_auth(&admin).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // Deleting a missing product is a no-op.
    let res = client.delete(srv.url("/products/999")).bearer_auth(&admin).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn expired_token_is_reported() {
    let srv = TestServer::spawn().await;

    let token = mint_jwt_with(JWT_SECRET, &["ADMIN"], ChronoDuration::minutes(-10));
    let res = reqwest::Client::new()
        .get(srv.url("/products"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_body(res).await["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn foreign_signature_is_invalid() {
    let srv = TestServer::spawn().await;

    let token = mint_jwt_with("someone-else", &["ADMIN"], ChronoDuration::minutes(10));
    let res = reqwest::Client::new()
        .get(srv.url("/products"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_body(res).await["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn role_names_follow_configuration() {
    let srv = TestServer::spawn_with(ApiConfig {
        jwt_key: JwtKey::Secret(JWT_SECRET.to_string()),
        roles: RoleNames::new("store-admin", "clerk"),
        ..ApiConfig::default()
    })
    .await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(mint_jwt(&["ADMIN"]))
        .json(&product("c-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(mint_jwt(&["store-admin"]))
        .json(&product("c-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url("/products/c-1"))
        .bearer_auth(mint_jwt(&["clerk"]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
