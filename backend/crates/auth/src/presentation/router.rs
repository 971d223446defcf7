//! Identity Router

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::application::gate::AccessRequirement;
use crate::domain::repository::{IdentityRepository, RoleRepository};
use crate::domain::value_object::role_name::RoleName;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::guard;

/// Routes mounted under `/users`
pub fn identity_router<R>(state: AuthAppState<R>) -> Router
where
    R: IdentityRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let gate = state.gate.clone();

    Router::new()
        .route(
            "/",
            post(handlers::sign_up::<R>).get(handlers::list_identities::<R>),
        )
        .route("/login", post(handlers::sign_in::<R>))
        .route(
            "/me",
            guard(
                get(handlers::current_identity::<R>),
                &gate,
                AccessRequirement::AuthenticatedOnly,
            ),
        )
        .route(
            "/{id}",
            get(handlers::get_identity::<R>).merge(guard(
                delete(handlers::delete_identity::<R>),
                &gate,
                AccessRequirement::any_of([RoleName::Admin]),
            )),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::application::config::AuthConfig;
    use crate::domain::entity::identity::NewIdentity;
    use crate::domain::value_object::{
        display_name::DisplayName, email::Email, secret::Secret,
    };
    use crate::infra::memory::MemoryAuthStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn app_with_admin() -> Router {
        let store = MemoryAuthStore::with_default_roles();
        store
            .create(
                &NewIdentity::new(
                    Email::new("root@oficina.com").unwrap(),
                    Secret::new("rootpw").unwrap(),
                    DisplayName::new("Root").unwrap(),
                )
                .with_role(RoleName::Admin),
            )
            .await
            .unwrap();

        let config = AuthConfig::with_secret(vec![5u8; 32]).unwrap();
        identity_router(AuthAppState::new(Arc::new(store), Arc::new(config)))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response: Response = app.clone().oneshot(request).await.unwrap();
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

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn with_token(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn login(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = send(
            app,
            post_json("/login", json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_register_login_me() {
        let app = app_with_admin().await;

        let (status, body) = send(
            &app,
            post_json(
                "/",
                json!({ "email": "bia@oficina.com", "password": "pw", "name": "Bia" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["roles"], json!(["CUSTOMER"]));
        assert!(body.get("secret").is_none());

        let token = login(&app, "bia@oficina.com", "pw").await;
        let (status, body) = send(&app, with_token("GET", "/me", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "bia@oficina.com");
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let app = app_with_admin().await;
        let request = || {
            post_json(
                "/",
                json!({ "email": "root@oficina.com", "password": "x", "name": "Again" }),
            )
        };
        let (status, _) = send(&app, request()).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_bad_login_is_unauthorized() {
        let app = app_with_admin().await;
        let (status, body) = send(
            &app,
            post_json(
                "/login",
                json!({ "email": "root@oficina.com", "password": "nope" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);
    }

    #[tokio::test]
    async fn test_list_by_role() {
        let app = app_with_admin().await;

        let (status, body) = send(
            &app,
            Request::get("/?role=ADMIN").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) = send(
            &app,
            Request::get("/?role=WIZARD").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_requires_admin_and_keeps_last_admin() {
        let app = app_with_admin().await;

        let (status, _) = send(&app, Request::delete("/1").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let root = login(&app, "root@oficina.com", "rootpw").await;
        let (status, body) = send(&app, with_token("DELETE", "/1", &root)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "cannot delete the last system admin");

        let (status, _) = send(&app, with_token("DELETE", "/99", &root)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Request::get("/1").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
    }
}
