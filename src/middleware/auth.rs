use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{
    dto::auth::Claims, error::AppError, permissions::Permission, state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.iter().any(|p| p == permission.as_str())
    }
}

pub fn ensure_permission(user: &AuthUser, permission: Permission) -> Result<(), AppError> {
    if !user.has_permission(permission) {
        tracing::debug!(
            user_id = %user.user_id,
            permission = permission.as_str(),
            "permission denied"
        );
        return Err(AppError::Forbidden);
    }
    Ok(())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.auth.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        Ok(AuthUser {
            user_id,
            role: decoded.claims.role,
            permissions: decoded.claims.permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(permissions: &[Permission]) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: "ROLE_OWNER".into(),
            permissions: permissions.iter().map(|p| p.as_str().to_string()).collect(),
        }
    }

    #[test]
    fn granted_permission_passes() {
        let user = user_with(&[Permission::EditOrders]);
        assert!(ensure_permission(&user, Permission::EditOrders).is_ok());
    }

    #[test]
    fn missing_permission_is_forbidden() {
        let user = user_with(&[Permission::ViewOrders]);
        assert!(matches!(
            ensure_permission(&user, Permission::EditOrders),
            Err(AppError::Forbidden)
        ));
    }
}
