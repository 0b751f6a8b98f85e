use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::auth::{LoginForm, RegisterRequest, Token},
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    models::{UserPublic, UserRole},
    response::{ApiResponse, Meta},
    security::{create_access_token, hash_password, verify_password},
    services::now,
    state::AppState,
};

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<UserPublic>> {
    payload.validate()?;

    if find_by_email(&state.orm, &payload.email).await?.is_some() {
        return Err(AppError::Conflict(
            "The user with this email already exists in the system".into(),
        ));
    }

    let user = insert_user(
        &state.orm,
        NewUser {
            email: &payload.email,
            password: &payload.password,
            full_name: payload.full_name,
            role: UserRole::Client,
            is_active: true,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(ApiResponse::success(
        "User created",
        user.into(),
        Some(Meta::empty()),
    ))
}

pub async fn login_user(state: &AppState, form: LoginForm) -> AppResult<Token> {
    let user = authenticate(&state.orm, &form.username, &form.password)
        .await?
        .ok_or_else(|| AppError::BadRequest("Incorrect email or password".into()))?;

    if !user.is_active {
        return Err(AppError::BadRequest("Inactive user".into()));
    }

    let token = create_access_token(
        user.id,
        UserRole::from_db(&user.role),
        &state.config.jwt_secret,
        state.config.access_token_expire_minutes,
    )?;

    tracing::debug!(user_id = %user.id, "access token issued");
    Ok(Token::bearer(token))
}

pub async fn authenticate<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    password: &str,
) -> AppResult<Option<UserModel>> {
    let Some(user) = find_by_email(conn, email).await? else {
        return Ok(None);
    };
    if !verify_password(password, &user.hashed_password)? {
        return Ok(None);
    }
    Ok(Some(user))
}

pub async fn find_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> AppResult<Option<UserModel>> {
    Ok(Users::find()
        .filter(Column::Email.eq(email))
        .one(conn)
        .await?)
}

pub async fn insert_user<C: ConnectionTrait>(conn: &C, new: NewUser<'_>) -> AppResult<UserModel> {
    let hashed_password = hash_password(new.password)?;
    let user = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(new.email.to_string()),
        is_active: Set(new.is_active),
        full_name: Set(new.full_name),
        role: Set(new.role.as_str().to_string()),
        hashed_password: Set(hashed_password),
        created_at: Set(now()),
    }
    .insert(conn)
    .await?;
    Ok(user)
}
