//! Full HTTP flow over the in-process stores.

use std::sync::Arc;

use api::{bootstrap, build_app};
use auth::{AuthConfig, InitialAdmin, MemoryAuthStore, TokenCodec};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use catalog::{CatalogConfig, MemoryCatalogStore};
use serde_json::{Value, json};
use tower::ServiceExt;

struct Server {
    app: Router,
    codec: TokenCodec,
}

impl Server {
    async fn start() -> Self {
        let config = Arc::new(
            AuthConfig::with_secret(vec![42u8; 32])
                .unwrap()
                .with_initial_admin(InitialAdmin {
                    email: "ana@oficina.com".into(),
                    password: "admin-pw".into(),
                    name: "Ana".into(),
                }),
        );

        let auth_store = MemoryAuthStore::new();
        let catalog_store = MemoryCatalogStore::new(auth_store.clone());
        let auth_repo = Arc::new(auth_store);

        let report = bootstrap(auth_repo.clone(), config.clone()).await.unwrap();
        assert_eq!(report.roles_created, 4);
        assert!(report.admin_seeded);

        let codec = TokenCodec::new(&config);
        let app = build_app(
            auth_repo,
            Arc::new(catalog_store),
            config,
            CatalogConfig::default(),
        );

        Self { app, codec }
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn login(&self, email: &str, password: &str) -> (String, Value) {
        let (status, body) = self
            .call(
                "POST",
                "/users/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (body["token"].as_str().unwrap().to_string(), body["user"].clone())
    }
}

#[tokio::test]
async fn test_admin_attaches_customer_cannot() {
    let server = Server::start().await;

    // B registers as a customer
    let (status, bruno) = server
        .call(
            "POST",
            "/users",
            None,
            Some(json!({ "email": "bruno@oficina.com", "password": "bruno-pw", "name": "Bruno" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bruno["roles"], json!(["CUSTOMER"]));

    // A's token carries ADMIN
    let (admin_token, ana) = server.login("ana@oficina.com", "admin-pw").await;
    let claims = server.codec.verify(&admin_token).unwrap();
    assert_eq!(claims.sub.value(), ana["id"].as_i64().unwrap());
    assert!(claims.roles.contains(&auth::domain::RoleName::Admin));

    let (customer_token, _) = server.login("bruno@oficina.com", "bruno-pw").await;

    let (status, oil) = server
        .call(
            "POST",
            "/services",
            Some(&admin_token),
            Some(json!({ "name": "Oil Change", "price": "250.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(oil["price"], "250.00");

    let (status, order) = server
        .call(
            "POST",
            "/orders",
            Some(&admin_token),
            Some(json!({ "ownerId": bruno["id"], "serviceIds": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["ownerId"], bruno["id"]);

    let link = format!("/orders/{}/services/{}", order["id"], oil["id"]);

    let (status, updated) = server.call("POST", &link, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["serviceIds"], json!([oil["id"]]));

    let (status, problem) = server.call("POST", &link, Some(&customer_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(problem["status"], 403);

    // the link is unchanged by the refused call
    let (status, services) = server
        .call(
            "GET",
            &format!("/orders/{}/services", order["id"]),
            Some(&customer_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(services.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_identity_deletion_rules() {
    let server = Server::start().await;
    let (admin_token, ana) = server.login("ana@oficina.com", "admin-pw").await;

    // the only admin stays
    let (status, problem) = server
        .call(
            "DELETE",
            &format!("/users/{}", ana["id"]),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["detail"], "cannot delete the last system admin");

    let (_, carla) = server
        .call(
            "POST",
            "/users",
            None,
            Some(json!({ "email": "carla@oficina.com", "password": "pw", "name": "Carla" })),
        )
        .await;
    let (status, order) = server
        .call(
            "POST",
            "/orders",
            Some(&admin_token),
            Some(json!({ "ownerId": carla["id"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // an owner of orders stays
    let carla_uri = format!("/users/{}", carla["id"]);
    let (status, problem) = server
        .call("DELETE", &carla_uri, Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["detail"], "identity still owns orders");

    let (status, _) = server
        .call(
            "DELETE",
            &format!("/orders/{}", order["id"]),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = server
        .call("DELETE", &carla_uri, Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server.call("GET", &carla_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_forged_token_and_public_reads() {
    let server = Server::start().await;
    let (token, _) = server.login("ana@oficina.com", "admin-pw").await;

    let mut forged = token.into_bytes();
    let last = forged.len() - 1;
    forged[last] = if forged[last] == b'A' { b'B' } else { b'A' };
    let forged = String::from_utf8(forged).unwrap();

    let (status, _) = server.call("GET", "/users/me", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server.call("GET", "/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // public reads need nothing
    let (status, _) = server.call("GET", "/services", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
