use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    extract_ip_from_headers, extract_user_agent, AuditEvent, AuditOutcome, UuidPath, ValidatedJson,
};
use database::{DeleteMode, ReadScope};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::error::{UserError, UserResult};
use crate::forms::{LoginForm, OtpForm, PasswordChangeForm, ProfileForm, RegisterForm};
use crate::models::{Role, UserFilter, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

const TAG: &str = "accounts";

/// OpenAPI documentation for the Accounts API
#[derive(OpenApi)]
#[openapi(
    paths(
        register,
        login,
        verify_otp,
        list_users,
        get_user,
        update_profile,
        change_password,
        delete_user,
        restore_user,
    ),
    components(
        schemas(
            UserResponse,
            Role,
            RegisterForm,
            LoginForm,
            OtpForm,
            ProfileForm,
            PasswordChangeForm,
            UserEnvelope,
            UserListResponse,
            MessageResponse,
            OtpResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Registration, login and account administration")
    )
)]
pub struct ApiDoc;

/// A user together with a human-readable message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OtpResponse {
    pub valid: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScopeQuery {
    /// `active` (default), `all` or `deleted_only`
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub scope: ReadScope,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteQuery {
    /// Remove the row instead of flagging it
    #[serde(default)]
    pub hard: bool,
}

/// Create the accounts router
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-otp", post(verify_otp))
        .route("/users", get(list_users))
        .route(
            "/users/{id}",
            get(get_user).put(update_profile).delete(delete_user),
        )
        .route("/users/{id}/password", post(change_password))
        .route("/users/{id}/restore", post(restore_user))
        .with_state(shared_service)
}

fn audit(
    headers: &HeaderMap,
    user_id: Option<String>,
    action: &str,
    outcome: AuditOutcome,
    details: serde_json::Value,
) {
    let resource = user_id.as_ref().map(|id| format!("user:{}", id));
    AuditEvent::new(user_id, action, resource, outcome)
        .with_ip(extract_ip_from_headers(headers))
        .with_user_agent(extract_user_agent(headers))
        .with_details(details)
        .log();
}

/// Self-registration; the account always starts as a household user
#[utoipa::path(
    post,
    path = "/register",
    tag = TAG,
    request_body = RegisterForm,
    responses(
        (status = 201, description = "Account created", body = UserEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    ValidatedJson(form): ValidatedJson<RegisterForm>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(form.into()).await?;

    audit(
        &headers,
        Some(user.id.to_string()),
        "user.register",
        AuditOutcome::Success,
        json!({ "role": user.role }),
    );

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            message: "Registration successful. Please login.".to_string(),
            user: user.into(),
        }),
    ))
}

/// Log in with phone number and password
///
/// An unknown phone and a wrong password produce the same 401.
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginForm,
    responses(
        (status = 200, description = "Credentials accepted", body = UserEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    ValidatedJson(form): ValidatedJson<LoginForm>,
) -> UserResult<Json<UserEnvelope>> {
    let Some(user) = service
        .verify_login(&form.phone_number, &form.password)
        .await?
    else {
        audit(&headers, None, "user.login", AuditOutcome::Denied, json!({}));
        return Err(UserError::InvalidCredentials);
    };

    audit(
        &headers,
        Some(user.id.to_string()),
        "user.login",
        AuditOutcome::Success,
        json!({}),
    );

    Ok(Json(UserEnvelope {
        message: format!("Welcome back, {}!", user.first_name),
        user: user.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/verify-otp",
    tag = TAG,
    request_body = OtpForm,
    responses(
        (status = 200, description = "Whether the code is valid", body = OtpResponse),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn verify_otp<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(form): ValidatedJson<OtpForm>,
) -> Json<OtpResponse> {
    Json(OtpResponse {
        valid: service.verify_otp(&form.phone_number, &form.code),
    })
}

/// List users, newest first
#[utoipa::path(
    get,
    path = "/users",
    tag = TAG,
    params(UserFilter),
    responses(
        (status = 200, description = "A page of users", body = UserListResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(filter): Query<UserFilter>,
) -> UserResult<Json<UserListResponse>> {
    let (users, total) = service.list_users(filter).await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(Into::into).collect(),
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID"), ScopeQuery),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
    Query(query): Query<ScopeQuery>,
) -> UserResult<Json<UserResponse>> {
    let user = service.get_user(id, query.scope).await?;
    Ok(Json(user.into()))
}

/// Update the profile fields; any other key in the body is ignored
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ProfileForm,
    responses(
        (status = 200, description = "Profile updated", body = UserEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    ValidatedJson(form): ValidatedJson<ProfileForm>,
) -> UserResult<Json<UserEnvelope>> {
    let user = service.update_user(id, form.into()).await?;

    audit(
        &headers,
        Some(id.to_string()),
        "user.update",
        AuditOutcome::Success,
        json!({}),
    );

    Ok(Json(UserEnvelope {
        message: "Profile updated successfully.".to_string(),
        user: user.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/users/{id}/password",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = PasswordChangeForm,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn change_password<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    ValidatedJson(form): ValidatedJson<PasswordChangeForm>,
) -> UserResult<Json<MessageResponse>> {
    if !service.check_password(id, &form.old_password).await? {
        audit(
            &headers,
            Some(id.to_string()),
            "user.password_change",
            AuditOutcome::Denied,
            json!({}),
        );
        return Err(UserError::IncorrectOldPassword);
    }

    service.change_password(id, &form.new_password).await?;

    audit(
        &headers,
        Some(id.to_string()),
        "user.password_change",
        AuditOutcome::Success,
        json!({}),
    );

    Ok(Json(MessageResponse {
        message: "Password changed successfully.".to_string(),
    }))
}

/// Soft delete by default; `?hard=true` removes the row
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID"), DeleteQuery),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    Query(query): Query<DeleteQuery>,
) -> UserResult<impl IntoResponse> {
    let mode = DeleteMode::from_hard(query.hard);
    service.delete_user(id, mode).await?;

    audit(
        &headers,
        Some(id.to_string()),
        "user.delete",
        AuditOutcome::Success,
        json!({ "hard": mode.is_hard() }),
    );

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/users/{id}/restore",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User restored", body = UserResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn restore_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResponse>> {
    let user = service.restore_user(id).await?;

    audit(
        &headers,
        Some(id.to_string()),
        "user.restore",
        AuditOutcome::Success,
        json!({}),
    );

    Ok(Json(user.into()))
}
