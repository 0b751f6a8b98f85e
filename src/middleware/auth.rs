use axum::{extract::FromRequestParts, http::header};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    entity::Users,
    error::AppError,
    models::UserRole,
    security::decode_access_token,
    state::AppState,
};

/// The authenticated caller, resolved from a bearer token to a stored, active user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Single authorization rule: admins may act on anything, everyone else only on
/// resources they own. `owner = None` marks an admin-only resource.
pub fn check_access(actor: &AuthUser, owner: Option<Uuid>) -> Access {
    if actor.is_admin() {
        return Access::Allow;
    }
    match owner {
        Some(owner_id) if owner_id == actor.user_id => Access::Allow,
        _ => Access::Deny,
    }
}

pub fn ensure_access(actor: &AuthUser, owner: Option<Uuid>) -> Result<(), AppError> {
    match check_access(actor, owner) {
        Access::Allow => Ok(()),
        Access::Deny => Err(AppError::Forbidden(
            "The user doesn't have enough privileges".into(),
        )),
    }
}

pub fn ensure_admin(actor: &AuthUser) -> Result<(), AppError> {
    ensure_access(actor, None)
}

fn bearer_token(parts: &axum::http::request::Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user_id = decode_access_token(token, &state.config.jwt_secret)?;

        let user = Users::find_by_id(user_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

        if !user.is_active {
            return Err(AppError::BadRequest("Inactive user".into()));
        }

        Ok(AuthUser {
            user_id: user.id,
            role: UserRole::from_db(&user.role),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: UserRole) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn admin_is_allowed_everywhere() {
        let admin = actor(UserRole::Admin);
        assert_eq!(check_access(&admin, None), Access::Allow);
        assert_eq!(check_access(&admin, Some(Uuid::new_v4())), Access::Allow);
    }

    #[test]
    fn client_is_limited_to_own_resources() {
        let client = actor(UserRole::Client);
        assert_eq!(check_access(&client, Some(client.user_id)), Access::Allow);
        assert_eq!(check_access(&client, Some(Uuid::new_v4())), Access::Deny);
        assert_eq!(check_access(&client, None), Access::Deny);
        assert!(matches!(ensure_admin(&client), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn bearer_scheme_is_required() {
        let request = axum::http::Request::builder()
            .header(header::AUTHORIZATION, "Basic abc")
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();
        assert!(matches!(bearer_token(&parts), Err(AppError::Unauthorized(_))));

        let request = axum::http::Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc.def")
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def");
    }
}
