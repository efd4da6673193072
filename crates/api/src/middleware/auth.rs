//! JWT-based session extractor for admin handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use catalog_core::error::CoreError;
use catalog_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// A verified admin session extracted from the `Authorization: Bearer` header.
///
/// Every catalog admin handler takes this as its first parameter:
///
/// ```ignore
/// async fn my_handler(session: AdminSession) -> AppResult<Json<()>> {
///     tracing::info!(user_id = session.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
///
/// A missing or invalid token is rejected with 401; a valid token for an
/// unverified user with 403.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        if !claims.verified {
            return Err(AppError::Core(CoreError::Forbidden(
                "Your email address is not verified.".into(),
            )));
        }

        Ok(AdminSession {
            user_id: claims.sub,
        })
    }
}
