use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{UserPublic, UserRole};

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMeRequest {
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 8, max = 40))]
    pub current_password: String,
    #[validate(length(min = 8, max = 40))]
    pub new_password: String,
}

/// Administrative update of any user.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<UserRole>,
    #[validate(length(min = 8, max = 40))]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub data: Vec<UserPublic>,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
