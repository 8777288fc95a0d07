//! Axum extractors for the HTTP surface.
//!
//! `BearerToken` pulls the raw token off the Authorization header,
//! `AuthenticatedCustomer` verifies it against the signer, and `JsonBody`
//! wraps `axum::Json` so malformed bodies come back as a 400 with the same
//! `{code, message}` shape as every other error.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::state::AppState;

/// Bearer token extracted from the `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = StoreError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                StoreError::Unauthenticated("Missing authorization header.".to_string())
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            StoreError::Unauthenticated(
                "Invalid authorization format. Expected 'Bearer <token>'.".to_string(),
            )
        })?;

        if token.is_empty() {
            return Err(StoreError::Unauthenticated("Empty bearer token.".to_string()));
        }

        Ok(Self(token.to_string()))
    }
}

/// The verified identity behind a bearer token.
///
/// Carries only the username claim; handlers that need the stored account
/// (admin flag, customer id) load it through the account store so revoked or
/// deleted accounts fail closed.
#[derive(Debug, Clone)]
pub struct AuthenticatedCustomer {
    /// Username from the token's subject claim.
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedCustomer {
    type Rejection = StoreError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state).await?;
        let claims = state.tokens.verify(&bearer.0)?;
        Ok(Self { username: claims.sub })
    }
}

/// JSON request body that rejects with the standard error shape.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = StoreError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| StoreError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}
