use chrono::{DateTime, Utc};
use database::{ReadScope, SoftDeletable, SoftDelete};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Account roles
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "ward_officer")]
    WardOfficer,
    #[sea_orm(string_value = "collector")]
    Collector,
    #[sea_orm(string_value = "driver")]
    Driver,
    #[default]
    #[sea_orm(string_value = "household")]
    Household,
}

impl Role {
    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::WardOfficer => "Ward Officer",
            Role::Collector => "Money Collector",
            Role::Driver => "Driver",
            Role::Household => "Household User",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn is_ward_officer(&self) -> bool {
        matches!(self, Role::WardOfficer)
    }

    pub fn is_collector(&self) -> bool {
        matches!(self, Role::Collector)
    }

    pub fn is_driver(&self) -> bool {
        matches!(self, Role::Driver)
    }

    pub fn is_household(&self) -> bool {
        matches!(self, Role::Household)
    }
}

/// Account domain entity
///
/// Phone number and email are both unique across every row, deleted or not.
#[derive(Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub role: Role,
    pub ward_id: Option<Uuid>,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_staff: bool,
    pub soft_delete: SoftDelete,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("phone_number", &self.phone_number)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("ward_id", &self.ward_id)
            .field("is_active", &self.is_active)
            .field("soft_delete", &self.soft_delete)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name(), self.role.label())
    }
}

impl SoftDeletable for User {
    fn soft_delete_state(&self) -> &SoftDelete {
        &self.soft_delete
    }

    fn soft_delete_state_mut(&mut self) -> &mut SoftDelete {
        &mut self.soft_delete
    }
}

impl User {
    /// New active, unverified account; the password must already be hashed
    pub fn new(input: CreateUser, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            phone_number: input.phone_number.trim().to_string(),
            email: normalize_email(&input.email),
            password_hash,
            role: input.role,
            ward_id: input.ward_id,
            is_active: true,
            is_verified: false,
            is_staff: false,
            soft_delete: SoftDelete::active(),
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Overwrite only the whitelisted attributes present in `input`.
    /// Text fields are trimmed the same way [`User::new`] trims them.
    pub fn apply_update(&mut self, input: UpdateUser) {
        let input = input.trimmed();
        if let Some(first_name) = input.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = input.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = input.email {
            self.email = normalize_email(&email);
        }
        if let Some(phone_number) = input.phone_number {
            self.phone_number = phone_number;
        }
        if let Some(ward_id) = input.ward_id {
            self.ward_id = ward_id;
        }
        self.updated_at = Utc::now();
    }
}

/// Trim and lower-case the domain part; the local part is kept as typed
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Public user representation, never carries the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
    pub role: Role,
    pub role_label: String,
    pub ward_id: Option<Uuid>,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_staff: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            full_name: user.full_name(),
            role_label: user.role.label().to_string(),
            is_deleted: user.is_deleted(),
            deleted_at: user.deleted_at(),
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            email: user.email,
            role: user.role,
            ward_id: user.ward_id,
            is_active: user.is_active,
            is_verified: user.is_verified,
            is_staff: user.is_staff,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Input for creating an account
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(email, length(max = 100))]
    pub email: String,
    #[validate(length(min = 1, max = 20))]
    pub phone_number: String,
    #[validate(length(min = 1, max = 20))]
    pub first_name: String,
    #[validate(length(min = 1, max = 20))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub ward_id: Option<Uuid>,
}

/// The attributes an update may touch
///
/// Unknown keys such as `role` or `is_staff` are dropped during
/// deserialization. `ward_id` distinguishes an absent key (keep) from an
/// explicit `null` (clear).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 20))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub last_name: Option<String>,
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub phone_number: Option<String>,
    #[serde(default, alias = "ward", deserialize_with = "double_option")]
    pub ward_id: Option<Option<Uuid>>,
}

impl UpdateUser {
    /// Surrounding whitespace stripped from every text field
    pub fn trimmed(self) -> Self {
        let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
        Self {
            first_name: trim(self.first_name),
            last_name: trim(self.last_name),
            email: trim(self.email),
            phone_number: trim(self.phone_number),
            ward_id: self.ward_id,
        }
    }
}

/// `Some(None)` for an explicit `null`, `None` when the key is missing
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query filters for listing users
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    /// `active` (default), `all` or `deleted_only`
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub scope: ReadScope,
    pub role: Option<Role>,
    pub ward_id: Option<Uuid>,
    /// Page size, at most 200
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Largest page `list_users` will return
pub const MAX_PAGE_SIZE: u64 = 200;

fn default_limit() -> u64 {
    50
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            scope: ReadScope::Active,
            role: None,
            ward_id: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl UserFilter {
    /// The same filter with `limit` capped at [`MAX_PAGE_SIZE`]
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.min(MAX_PAGE_SIZE),
            ..self
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        user.is_visible_in(self.scope)
            && self.role.is_none_or(|role| user.role == role)
            && self.ward_id.is_none_or(|ward_id| user.ward_id == Some(ward_id))
    }
}
