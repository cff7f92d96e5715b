use axum::{extract::FromRequestParts, http::request::Parts};
use common::ActorRole;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication. Role checks
/// happen via the `require_*` helpers in the handler body.
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub display_name: String,
    pub is_dealer: bool,
    pub dealer_id: Option<i32>,
    pub department: Option<String>,
    pub is_admin: bool,
}

impl AuthUser {
    /// Timeline role for activities authored by this user.
    pub fn actor_role(&self) -> ActorRole {
        ActorRole::from_account(self.is_dealer, self.department.as_deref())
    }

    /// Staff-only endpoints reject dealer accounts.
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_dealer {
            Err(AppError::Forbidden)
        } else {
            Ok(())
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin { Ok(()) } else { Err(AppError::Forbidden) }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.uid,
            username: claims.sub,
            display_name: claims.name,
            is_dealer: claims.dealer,
            dealer_id: claims.dealer_id,
            department: claims.department,
            is_admin: claims.admin,
        })
    }
}
