mod common;

use commerce_admin_api::{
    dto::{
        auth::{LoginForm, RegisterRequest},
        users::{UpdateMeRequest, UpdatePasswordRequest, UpdateUserRequest},
    },
    entity::Users,
    error::AppError,
    models::UserRole,
    routes::params::Pagination,
    security::verify_password,
    services::{auth_service, user_service},
};
use common::{create_user, test_state};
use sea_orm::EntityTrait;
use uuid::Uuid;

#[tokio::test]
async fn register_creates_a_client_and_rejects_a_taken_email() -> anyhow::Result<()> {
    let state = test_state().await?;
    let request = || RegisterRequest {
        email: "new@example.com".into(),
        password: "longenough".into(),
        full_name: Some("New User".into()),
    };

    let user = auth_service::register_user(&state, request())
        .await?
        .data
        .expect("user");
    assert_eq!(user.role, UserRole::Client);
    assert!(user.is_active);

    let err = auth_service::register_user(&state, request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "short@example.com".into(),
            password: "short".into(),
            full_name: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_inactive_users() -> anyhow::Result<()> {
    let state = test_state().await?;
    let admin = create_user(&state, "admin@example.com", "adminpass", UserRole::Admin).await?;
    let user = create_user(&state, "user@example.com", "userpass1", UserRole::Client).await?;

    let form = |username: &str, password: &str| LoginForm {
        username: username.into(),
        password: password.into(),
    };

    let token = auth_service::login_user(&state, form("user@example.com", "userpass1")).await?;
    assert_eq!(token.token_type, "bearer");
    assert!(!token.access_token.is_empty());

    for (username, password) in [("user@example.com", "wrong-pass"), ("nobody@example.com", "userpass1")] {
        let err = auth_service::login_user(&state, form(username, password))
            .await
            .unwrap_err();
        match err {
            AppError::BadRequest(detail) => assert_eq!(detail, "Incorrect email or password"),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    user_service::update_user(
        &state,
        &admin,
        user.user_id,
        UpdateUserRequest {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await?;
    let err = auth_service::login_user(&state, form("user@example.com", "userpass1"))
        .await
        .unwrap_err();
    match err {
        AppError::BadRequest(detail) => assert_eq!(detail, "Inactive user"),
        other => panic!("expected BadRequest, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn password_change_requires_current_and_a_new_value() -> anyhow::Result<()> {
    let state = test_state().await?;
    let me = create_user(&state, "me@example.com", "original1", UserRole::Client).await?;
    let before = Users::find_by_id(me.user_id)
        .one(&state.orm)
        .await?
        .expect("user")
        .hashed_password;

    let change = |current: &str, new: &str| UpdatePasswordRequest {
        current_password: current.into(),
        new_password: new.into(),
    };

    let err = user_service::update_password_me(&state, &me, change("not-mine-1", "replaced1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref d) if d == "Incorrect password"));

    let err = user_service::update_password_me(&state, &me, change("original1", "original1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    user_service::update_password_me(&state, &me, change("original1", "replaced1")).await?;

    let after = Users::find_by_id(me.user_id)
        .one(&state.orm)
        .await?
        .expect("user")
        .hashed_password;
    assert_ne!(before, after);
    assert!(verify_password("replaced1", &after)?);
    assert!(!verify_password("original1", &after)?);
    Ok(())
}

#[tokio::test]
async fn profile_email_must_stay_unique() -> anyhow::Result<()> {
    let state = test_state().await?;
    create_user(&state, "taken@example.com", "password1", UserRole::Client).await?;
    let me = create_user(&state, "me@example.com", "password1", UserRole::Client).await?;

    let err = user_service::update_me(
        &state,
        &me,
        UpdateMeRequest {
            email: Some("taken@example.com".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let updated = user_service::update_me(
        &state,
        &me,
        UpdateMeRequest {
            full_name: Some("Me Myself".into()),
            email: Some("me@example.com".into()),
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(updated.full_name.as_deref(), Some("Me Myself"));
    Ok(())
}

#[tokio::test]
async fn non_admins_only_reach_their_own_record() -> anyhow::Result<()> {
    let state = test_state().await?;
    let admin = create_user(&state, "admin@example.com", "adminpass", UserRole::Admin).await?;
    let alice = create_user(&state, "alice@example.com", "password1", UserRole::Client).await?;
    let bob = create_user(&state, "bob@example.com", "password1", UserRole::Client).await?;

    assert!(user_service::read_user(&state, &alice, alice.user_id).await.is_ok());
    assert!(matches!(
        user_service::read_user(&state, &alice, bob.user_id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        user_service::list_users(&state, &alice, Pagination::default()).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        user_service::update_user(&state, &alice, bob.user_id, UpdateUserRequest::default()).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        user_service::delete_user(&state, &alice, bob.user_id).await,
        Err(AppError::Forbidden(_))
    ));

    let listed = user_service::list_users(&state, &admin, Pagination::default())
        .await?
        .data
        .expect("users");
    assert_eq!(listed.count, 3);
    assert!(user_service::read_user(&state, &admin, bob.user_id).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn admin_manages_users_but_cannot_delete_itself() -> anyhow::Result<()> {
    let state = test_state().await?;
    let admin = create_user(&state, "admin@example.com", "adminpass", UserRole::Admin).await?;
    let bob = create_user(&state, "bob@example.com", "password1", UserRole::Client).await?;

    let promoted = user_service::update_user(
        &state,
        &admin,
        bob.user_id,
        UpdateUserRequest {
            role: Some(UserRole::Admin),
            full_name: Some("Bob".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(promoted.role, UserRole::Admin);

    let err = user_service::delete_user(&state, &admin, admin.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    user_service::delete_user(&state, &admin, bob.user_id).await?;
    assert!(matches!(
        user_service::read_user(&state, &admin, bob.user_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        user_service::delete_user(&state, &admin, Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn deleting_own_account_removes_it() -> anyhow::Result<()> {
    let state = test_state().await?;
    let me = create_user(&state, "gone@example.com", "password1", UserRole::Client).await?;

    user_service::delete_me(&state, &me).await?;
    assert!(Users::find_by_id(me.user_id).one(&state.orm).await?.is_none());
    Ok(())
}
