//! Authentication middleware
//!
//! Bearer JWT verification and role-based permission checks. Tokens are issued
//! elsewhere; this service only verifies them.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::{Permission, PermissionTable, Role};

use crate::error::AppError;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
}

impl AuthUser {
    /// User injected when authentication is disabled
    pub fn anonymous_admin() -> Self {
        Self {
            user_id: 0,
            role: Role::Admin,
        }
    }

    /// Check if the user's role grants a permission
    pub fn has_permission(&self, table: &PermissionTable, permission: Permission) -> bool {
        table.allows(self.role, permission)
    }

    /// Permission guard for use in handlers
    pub fn require(&self, table: &PermissionTable, permission: Permission) -> Result<(), AppError> {
        if self.has_permission(table, permission) {
            Ok(())
        } else {
            tracing::debug!(
                user_id = self.user_id,
                role = self.role.as_str(),
                ?permission,
                "Permission denied"
            );
            Err(AppError::InsufficientPermissions)
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role: String,
    pub exp: i64,
}

/// Decode and validate a JWT token
pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    let role = Role::parse(&claims.role)
        .map_err(|_| AppError::Unauthorized("Unknown role in token".to_string()))?;

    Ok(AuthUser {
        user_id: claims.sub,
        role,
    })
}

/// Authentication middleware that validates bearer tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = if !state.config.auth.enabled {
        AuthUser::anonymous_admin()
    } else {
        let Some(TypedHeader(Authorization(bearer))) = bearer else {
            return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
                .into_response();
        };
        match decode_token(bearer.token(), &state.config.auth.jwt_secret) {
            Ok(user) => user,
            Err(err) => return err.into_response(),
        }
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
