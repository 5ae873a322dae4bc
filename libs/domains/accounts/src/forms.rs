//! Boundary forms: raw request bodies validated before they reach the service.

use serde::Deserialize;
use std::borrow::Cow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{double_option, CreateUser, Role, UpdateUser};

pub const PHONE_PREFIX_MESSAGE: &str = "Phone number must start with +255 or 0";

/// Tanzanian numbers are entered either internationally or with a leading 0
fn validate_phone_prefix(phone: &str) -> Result<(), ValidationError> {
    if phone.starts_with("+255") || phone.starts_with('0') {
        return Ok(());
    }
    Err(ValidationError::new("phone_prefix").with_message(Cow::Borrowed(PHONE_PREFIX_MESSAGE)))
}

#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct LoginForm {
    #[validate(
        length(min = 1, max = 20),
        custom(function = "validate_phone_prefix")
    )]
    pub phone_number: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 20))]
    pub first_name: String,
    #[validate(length(min = 1, max = 20))]
    pub last_name: String,
    #[validate(
        length(min = 1, max = 20),
        custom(function = "validate_phone_prefix")
    )]
    pub phone_number: String,
    #[validate(email, length(max = 100))]
    pub email: String,
    #[serde(default, alias = "ward")]
    pub ward_id: Option<Uuid>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,
}

impl From<RegisterForm> for CreateUser {
    fn from(form: RegisterForm) -> Self {
        CreateUser {
            email: form.email,
            phone_number: form.phone_number,
            first_name: form.first_name,
            last_name: form.last_name,
            password: form.password,
            role: Role::Household,
            ward_id: form.ward_id,
        }
    }
}

/// Profile edit; only these keys are read from the body
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProfileForm {
    #[validate(length(min = 1, max = 20))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub last_name: Option<String>,
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
    #[validate(
        length(min = 1, max = 20),
        custom(function = "validate_phone_prefix")
    )]
    pub phone_number: Option<String>,
    /// Send `null` to clear the ward assignment
    #[serde(default, alias = "ward", deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub ward_id: Option<Option<Uuid>>,
}

impl From<ProfileForm> for UpdateUser {
    fn from(form: ProfileForm) -> Self {
        UpdateUser {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            phone_number: form.phone_number,
            ward_id: form.ward_id,
        }
    }
}

#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordChangeForm {
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "New passwords do not match"))]
    pub new_password_confirm: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OtpForm {
    #[validate(
        length(min = 1, max = 20),
        custom(function = "validate_phone_prefix")
    )]
    pub phone_number: String,
    #[validate(length(min = 1, max = 10))]
    pub code: String,
}
