//! API handlers for Steward REST endpoints

pub mod activity;
pub mod assets;
pub mod assignments;
pub mod dashboard;
pub mod health;
pub mod incidents;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, models::claims::OrgClaims, AppState};

/// Extractor for the organization-scoped caller from a JWT bearer token
pub struct AuthenticatedOrg(pub OrgClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedOrg {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        // Check for Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication("Invalid authorization header format".to_string()));
        }

        let token = &auth_header[7..];

        // Validate JWT token using the secret from configuration
        let claims = OrgClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedOrg(claims))
    }
}
