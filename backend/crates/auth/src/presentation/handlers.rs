//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::id::IdentityId;

use crate::application::config::AuthConfig;
use crate::application::{
    AuthGate, CredentialVerifier, DeleteIdentityUseCase, FindIdentitiesUseCase, SignInInput,
    SignInUseCase, SignUpInput, SignUpUseCase, TokenCodec,
};
use crate::domain::repository::{IdentityRepository, RoleRepository};
use crate::domain::value_object::role_name::RoleName;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    IdentityListQuery, IdentityResponse, SignInRequest, SignInResponse, SignUpRequest,
};
use crate::presentation::middleware::Authenticated;

/// Shared state for identity handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: IdentityRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub codec: Arc<TokenCodec>,
    pub gate: AuthGate,
}

impl<R> AuthAppState<R>
where
    R: IdentityRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        let codec = Arc::new(TokenCodec::new(&config));
        Self {
            repo,
            config,
            gate: AuthGate::new(codec.clone()),
            codec,
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /users
pub async fn sign_up<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<(StatusCode, Json<IdentityResponse>)>
where
    R: IdentityRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.repo.clone());

    let identity = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
            name: req.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(IdentityResponse::from(&identity))))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /users/login
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<Json<SignInResponse>>
where
    R: IdentityRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        CredentialVerifier::new(state.repo.clone()),
        state.codec.clone(),
    );

    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(SignInResponse {
        token: output.token,
        user: IdentityResponse::from(&output.identity),
    }))
}

// ============================================================================
// Queries
// ============================================================================

/// GET /users?role=NAME
pub async fn list_identities<R>(
    State(state): State<AuthAppState<R>>,
    Query(query): Query<IdentityListQuery>,
) -> AuthResult<Json<Vec<IdentityResponse>>>
where
    R: IdentityRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let role = query
        .role
        .as_deref()
        .map(str::parse::<RoleName>)
        .transpose()?;

    let identities = FindIdentitiesUseCase::new(state.repo.clone())
        .list(role)
        .await?;

    Ok(Json(identities.iter().map(IdentityResponse::from).collect()))
}

/// GET /users/me
pub async fn current_identity<R>(
    State(state): State<AuthAppState<R>>,
    Authenticated(context): Authenticated,
) -> AuthResult<Json<IdentityResponse>>
where
    R: IdentityRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let identity = FindIdentitiesUseCase::new(state.repo.clone())
        .by_id(context.identity_id)
        .await?;

    Ok(Json(IdentityResponse::from(&identity)))
}

/// GET /users/{id}
pub async fn get_identity<R>(
    State(state): State<AuthAppState<R>>,
    Path(id): Path<i64>,
) -> AuthResult<Json<IdentityResponse>>
where
    R: IdentityRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let identity = FindIdentitiesUseCase::new(state.repo.clone())
        .by_id(IdentityId::from_i64(id))
        .await?;

    Ok(Json(IdentityResponse::from(&identity)))
}

// ============================================================================
// Delete
// ============================================================================

/// DELETE /users/{id}
pub async fn delete_identity<R>(
    State(state): State<AuthAppState<R>>,
    Path(id): Path<i64>,
) -> AuthResult<StatusCode>
where
    R: IdentityRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let deleted = DeleteIdentityUseCase::new(state.repo.clone())
        .execute(IdentityId::from_i64(id))
        .await?;

    if deleted {
        Ok(StatusCode::OK)
    } else {
        Err(AuthError::NotFound)
    }
}
