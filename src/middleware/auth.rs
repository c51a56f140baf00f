//! Bearer Authentication Middleware
//!
//! This module authenticates API callers against the identity provider and
//! exposes the result to handlers as an [`AuthContext`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::AuthConfig,
    models::{email_local_part, DerivedId, UserRequest},
    services::{token::ACCESS_TOKEN_CLAIM, Claims, TokenError, ValidationMode},
    utils::error::ErrorResponse,
    AppState,
};

/// Authenticated caller, immutable for the lifetime of a request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthContext {
    /// Token subject
    pub subject: Option<String>,
    /// Identity provider organization id
    pub org_id: Option<String>,
    /// Organization name, used as the tenant key of stored entities
    pub org_name: Option<String>,
    pub email: Option<String>,
    /// Raw token, present only after signature verification
    pub access_token: Option<String>,
}

fn claim_str(claims: &Claims, key: &str) -> Option<String> {
    match claims.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

impl AuthContext {
    /// Build the caller from validated claims.
    ///
    /// Organization name and email fall back to the identity provider's
    /// namespaced custom claims, `{audience}/{org_id}/{field}`.
    pub fn from_claims(claims: &Claims, audience: &str) -> Self {
        let org_id = claim_str(claims, "org_id");
        let namespaced = |field: &str| {
            let key = format!(
                "{}/{}/{}",
                audience,
                org_id.as_deref().unwrap_or_default(),
                field
            );
            claim_str(claims, &key)
        };

        Self {
            subject: claim_str(claims, "sub"),
            org_name: claim_str(claims, "org_name").or_else(|| namespaced("org_name")),
            email: claim_str(claims, "user_email").or_else(|| namespaced("user_email")),
            access_token: claim_str(claims, ACCESS_TOKEN_CLAIM),
            org_id,
        }
    }

    /// Anonymous caller holding the local API key
    pub fn local(org_name: &str) -> Self {
        Self {
            org_name: Some(org_name.to_string()),
            ..Self::default()
        }
    }

    /// Reject callers whose token names no organization
    pub fn require_organization(self) -> Result<Self, TokenError> {
        if self.org_id.is_none() || self.org_name.is_none() {
            return Err(TokenError::OrganizationRequired);
        }
        Ok(self)
    }

    /// The caller as a user record, if the token identifies one
    pub fn user(&self) -> Option<UserRequest> {
        let email = self.email.as_deref()?;
        Some(UserRequest {
            org_id: self.org_name.clone(),
            email: Some(email.to_string()),
            name: Some(email_local_part(email)),
            ..UserRequest::default()
        })
    }

    /// Derived id of the caller's user record
    pub fn user_id(&self) -> Option<String> {
        self.user().map(|user| user.derived_id())
    }
}

/// Extractor for AuthContext from request extensions
///
/// This allows using AuthContext as a handler parameter after auth middleware has run.
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

/// Authentication error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    Token(TokenError),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::Token(err)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AuthError::Token(TokenError::BadCredentials | TokenError::Expired) => {
                (StatusCode::UNAUTHORIZED, "unauthorized")
            }
            AuthError::Token(
                TokenError::CredentialsUnverifiable | TokenError::OrganizationRequired,
            ) => (StatusCode::FORBIDDEN, "forbidden"),
        };

        let message = match self {
            AuthError::MissingToken => "Missing bearer token".to_string(),
            AuthError::Token(err) => err.to_string(),
        };

        (status, Json(ErrorResponse::new(error, message))).into_response()
    }
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn is_local_api_key(config: &AuthConfig, token: &str) -> bool {
    config
        .local_api_key
        .as_deref()
        .is_some_and(|key| !key.is_empty() && key == token)
}

/// Authenticate a bearer token in the configured environment
pub async fn authenticate(state: &AppState, token: &str) -> Result<AuthContext, TokenError> {
    let environment = state.config.environment;
    let auth = &state.config.auth;

    if environment.is_local() && is_local_api_key(auth, token) {
        debug!("Authenticated with the local API key");
        return Ok(AuthContext::local(&auth.local_org_name));
    }

    let mode = ValidationMode::for_environment(environment);
    let claims = state.tokens.validate(token, mode).await?;
    let context = AuthContext::from_claims(&claims, &auth.audience);

    if environment.is_local() {
        return Ok(context);
    }

    context.require_organization().inspect_err(|_| {
        warn!("Token carries no organization");
    })
}

/// Authentication middleware
///
/// This middleware extracts and validates bearer tokens from the Authorization header.
/// On success, it injects the AuthContext into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or(AuthError::MissingToken)?;

    let context = authenticate(&state, token).await?;

    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}
