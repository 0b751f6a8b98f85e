use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::users::{Message, UpdateMeRequest, UpdatePasswordRequest, UpdateUserRequest, UserList},
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_access, ensure_admin},
    models::UserPublic,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    security::{hash_password, verify_password},
    state::AppState,
};

pub async fn read_me(state: &AppState, actor: &AuthUser) -> AppResult<ApiResponse<UserPublic>> {
    let user = find_user(&state.orm, actor.user_id).await?;
    Ok(ApiResponse::success("Current user", user.into(), Some(Meta::empty())))
}

pub async fn update_me(
    state: &AppState,
    actor: &AuthUser,
    payload: UpdateMeRequest,
) -> AppResult<ApiResponse<UserPublic>> {
    payload.validate()?;
    let user = find_user(&state.orm, actor.user_id).await?;

    if let Some(email) = payload.email.as_ref().filter(|e| **e != user.email) {
        ensure_email_free(&state.orm, email, user.id).await?;
    }

    let mut active: ActiveModel = user.into();
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(full_name) = payload.full_name {
        active.full_name = Set(Some(full_name));
    }
    let user = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Updated", user.into(), Some(Meta::empty())))
}

pub async fn update_password_me(
    state: &AppState,
    actor: &AuthUser,
    payload: UpdatePasswordRequest,
) -> AppResult<ApiResponse<Message>> {
    payload.validate()?;
    let user = find_user(&state.orm, actor.user_id).await?;

    if !verify_password(&payload.current_password, &user.hashed_password)? {
        return Err(AppError::BadRequest("Incorrect password".into()));
    }
    if payload.current_password == payload.new_password {
        return Err(AppError::BadRequest(
            "New password cannot be the same as the current one".into(),
        ));
    }

    let mut active: ActiveModel = user.into();
    active.hashed_password = Set(hash_password(&payload.new_password)?);
    let user = active.update(&state.orm).await?;

    tracing::info!(user_id = %user.id, "password changed");
    Ok(ApiResponse::success(
        "Updated",
        Message::new("Password updated successfully"),
        Some(Meta::empty()),
    ))
}

pub async fn delete_me(state: &AppState, actor: &AuthUser) -> AppResult<ApiResponse<Message>> {
    let user = find_user(&state.orm, actor.user_id).await?;
    Users::delete_by_id(user.id).exec(&state.orm).await?;

    tracing::info!(user_id = %user.id, "user deleted own account");
    Ok(ApiResponse::success(
        "Deleted",
        Message::new("User deleted successfully"),
        Some(Meta::empty()),
    ))
}

pub async fn list_users(
    state: &AppState,
    actor: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(actor)?;
    let (skip, limit) = pagination.normalize();

    let finder = Users::find()
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id);
    let count = finder.clone().count(&state.orm).await?;
    let users = finder.offset(skip).limit(limit).all(&state.orm).await?;

    let data = users.into_iter().map(UserPublic::from).collect();
    Ok(ApiResponse::success(
        "Users",
        UserList { data, count },
        Some(Meta::new(skip, limit, count)),
    ))
}

pub async fn read_user(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<UserPublic>> {
    ensure_access(actor, Some(id))?;
    let user = find_user(&state.orm, id).await?;
    Ok(ApiResponse::success("User", user.into(), Some(Meta::empty())))
}

pub async fn update_user(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<UserPublic>> {
    ensure_admin(actor)?;
    payload.validate()?;
    let user = find_user(&state.orm, id).await?;

    if let Some(email) = payload.email.as_ref().filter(|e| **e != user.email) {
        ensure_email_free(&state.orm, email, user.id).await?;
    }

    let mut active: ActiveModel = user.into();
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(full_name) = payload.full_name {
        active.full_name = Set(Some(full_name));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(role) = payload.role {
        active.role = Set(role.as_str().to_string());
    }
    if let Some(password) = payload.password {
        active.hashed_password = Set(hash_password(&password)?);
    }
    let user = active.update(&state.orm).await?;

    tracing::info!(user_id = %user.id, admin_id = %actor.user_id, "user updated by admin");
    Ok(ApiResponse::success("Updated", user.into(), Some(Meta::empty())))
}

pub async fn delete_user(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Message>> {
    ensure_admin(actor)?;
    let user = find_user(&state.orm, id).await?;

    if user.id == actor.user_id {
        return Err(AppError::Forbidden(
            "Super users are not allowed to delete themselves".into(),
        ));
    }

    Users::delete_by_id(user.id).exec(&state.orm).await?;

    tracing::info!(user_id = %id, admin_id = %actor.user_id, "user deleted");
    Ok(ApiResponse::success(
        "Deleted",
        Message::new("User deleted successfully"),
        Some(Meta::empty()),
    ))
}

async fn find_user<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<UserModel> {
    Users::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))
}

async fn ensure_email_free<C: ConnectionTrait>(conn: &C, email: &str, owner: Uuid) -> AppResult<()> {
    let taken = Users::find()
        .filter(Column::Email.eq(email))
        .filter(Column::Id.ne(owner))
        .one(conn)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict("User with this email already exists".into()));
    }
    Ok(())
}
