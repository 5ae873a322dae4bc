//! Audit logging for account and data changes.
//!
//! Handlers emit [`AuditEvent`]s for the actions they understand
//! (`user.register`, `user.login`, ...). The [`activity_log`] middleware
//! additionally records every mutating request as `"{METHOD} {path}"`.
//!
//! # Example
//! ```ignore
//! use axum_helpers::audit::{AuditEvent, AuditOutcome};
//!
//! AuditEvent::new(
//!     Some(user.id.to_string()),
//!     "user.password_change",
//!     Some(format!("user:{}", user.id)),
//!     AuditOutcome::Success,
//! )
//! .with_ip(extract_ip_from_headers(&headers))
//! .with_user_agent(extract_user_agent(&headers))
//! .log();
//! ```

use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;

/// Outcome of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    /// Validation or system error
    Failure,
    /// Rejected credentials or permissions
    Denied,
}

impl AuditOutcome {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AuditOutcome::Denied,
            s if s.is_success() || s.is_redirection() => AuditOutcome::Success,
            _ => AuditOutcome::Failure,
        }
    }
}

/// Structured audit event, emitted on the `audit` tracing target.
#[derive(Debug, Serialize)]
pub struct AuditEvent {
    /// User who performed the action (if known)
    pub user_id: Option<String>,
    /// Action performed (e.g., "user.login", "DELETE /api/accounts/users/1")
    pub action: String,
    /// Resource affected (e.g., "user:123", "ward:456")
    pub resource: Option<String>,
    pub outcome: AuditOutcome,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        user_id: Option<String>,
        action: impl Into<String>,
        resource: Option<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            user_id,
            action: action.into(),
            resource,
            outcome,
            ip_address: None,
            user_agent: None,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Attach extra JSON details. Never pass credentials here.
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    pub fn log(self) {
        tracing::info!(
            target: "audit",
            user_id = self.user_id,
            action = %self.action,
            resource = self.resource,
            outcome = ?self.outcome,
            ip = self.ip_address,
            user_agent = self.user_agent,
            timestamp = %self.timestamp,
            details = ?self.details,
            "audit event"
        );
    }
}

/// First entry of `X-Forwarded-For`, falling back to `X-Real-IP`.
pub fn extract_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
        })
}

pub fn extract_ip_from_socket(socket: Option<SocketAddr>) -> Option<String> {
    socket.map(|addr| addr.ip().to_string())
}

/// Client address: proxy headers first, then the peer socket.
pub fn client_ip(headers: &HeaderMap, socket: Option<SocketAddr>) -> Option<String> {
    extract_ip_from_headers(headers).or_else(|| extract_ip_from_socket(socket))
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Record every POST/PUT/PATCH/DELETE as an audit event after it completes.
///
/// The peer address is only available when the server is started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub async fn activity_log(request: Request, next: Next) -> Response {
    if !is_mutating(request.method()) {
        return next.run(request).await;
    }

    let action = format!("{} {}", request.method(), request.uri().path());
    let socket = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip = client_ip(request.headers(), socket);
    let user_agent = extract_user_agent(request.headers());

    let response = next.run(request).await;
    let status = response.status();

    AuditEvent::new(None, action, None, AuditOutcome::from_status(status))
        .with_ip(ip)
        .with_user_agent(user_agent)
        .with_details(serde_json::json!({ "status": status.as_u16() }))
        .log();

    response
}
