//! Status errors returned by resource clients.
//!
//! Every failed client call yields a [`StatusError`]. The reason is stable and
//! meant for automation; the message is for humans.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable cause of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusReason {
    /// The named object does not exist
    NotFound,
    /// An object with the same name already exists
    AlreadyExists,
    /// The write raced with another writer
    Conflict,
    /// The object failed validation
    Invalid,
    BadRequest,
    Unauthorized,
    Forbidden,
    /// The client gave up waiting
    Timeout,
    /// The server gave up waiting
    ServerTimeout,
    ServiceUnavailable,
    InternalError,
    MethodNotAllowed,
    TooManyRequests,
}

impl StatusReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::AlreadyExists => "AlreadyExists",
            Self::Conflict => "Conflict",
            Self::Invalid => "Invalid",
            Self::BadRequest => "BadRequest",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::Timeout => "Timeout",
            Self::ServerTimeout => "ServerTimeout",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::InternalError => "InternalError",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::TooManyRequests => "TooManyRequests",
        }
    }

    /// HTTP status code conventionally paired with the reason.
    pub fn code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::AlreadyExists | Self::Conflict => 409,
            Self::Invalid => 422,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::Timeout => 504,
            Self::ServerTimeout => 500,
            Self::ServiceUnavailable => 503,
            Self::InternalError => 500,
            Self::MethodNotAllowed => 405,
            Self::TooManyRequests => 429,
        }
    }
}

impl fmt::Display for StatusReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API group plus plural resource name, e.g. `("", "configmaps")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupResource {
    pub group: String,
    pub resource: String,
}

impl GroupResource {
    pub fn new(group: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            resource: resource.into(),
        }
    }

    /// Core-group resource derived from a kind name (`ConfigMap` -> `configmaps`).
    pub fn for_kind(kind: &str) -> Self {
        Self::new("", format!("{}s", kind.to_lowercase()))
    }
}

impl fmt::Display for GroupResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            f.write_str(&self.resource)
        } else {
            write!(f, "{}.{}", self.resource, self.group)
        }
    }
}

/// Optional machine-readable details of a status error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusDetails {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resource: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u32>,
}

/// Error returned by a resource client call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct StatusError {
    pub reason: StatusReason,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<StatusDetails>,
}

impl StatusError {
    pub fn new(reason: StatusReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            details: None,
        }
    }

    fn with_resource(mut self, resource: &GroupResource, name: &str) -> Self {
        let details = self.details.get_or_insert_with(StatusDetails::default);
        details.group = resource.group.clone();
        details.resource = resource.resource.clone();
        details.name = name.to_string();
        self
    }

    fn with_retry_after(mut self, seconds: u32) -> Self {
        self.details
            .get_or_insert_with(StatusDetails::default)
            .retry_after_seconds = Some(seconds);
        self
    }

    pub fn not_found(resource: &GroupResource, name: &str) -> Self {
        Self::new(
            StatusReason::NotFound,
            format!("{} \"{}\" not found", resource, name),
        )
        .with_resource(resource, name)
    }

    pub fn already_exists(resource: &GroupResource, name: &str) -> Self {
        Self::new(
            StatusReason::AlreadyExists,
            format!("{} \"{}\" already exists", resource, name),
        )
        .with_resource(resource, name)
    }

    pub fn conflict(resource: &GroupResource, name: &str, cause: impl fmt::Display) -> Self {
        Self::new(
            StatusReason::Conflict,
            format!(
                "Operation cannot be fulfilled on {} \"{}\": {}",
                resource, name, cause
            ),
        )
        .with_resource(resource, name)
    }

    pub fn forbidden(resource: &GroupResource, name: &str, cause: impl fmt::Display) -> Self {
        Self::new(
            StatusReason::Forbidden,
            format!("{} \"{}\" is forbidden: {}", resource, name, cause),
        )
        .with_resource(resource, name)
    }

    pub fn invalid(kind: &str, name: &str, cause: impl fmt::Display) -> Self {
        Self::new(
            StatusReason::Invalid,
            format!("{} \"{}\" is invalid: {}", kind, name, cause),
        )
        .with_resource(&GroupResource::for_kind(kind), name)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusReason::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusReason::Unauthorized, message)
    }

    pub fn internal(cause: impl fmt::Display) -> Self {
        Self::new(
            StatusReason::InternalError,
            format!("Internal error occurred: {}", cause),
        )
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusReason::ServiceUnavailable, message)
    }

    pub fn timeout(message: impl fmt::Display, retry_after_seconds: u32) -> Self {
        Self::new(StatusReason::Timeout, format!("Timeout: {}", message))
            .with_retry_after(retry_after_seconds)
    }

    pub fn server_timeout(resource: &GroupResource, operation: &str, retry_after_seconds: u32) -> Self {
        Self::new(
            StatusReason::ServerTimeout,
            format!(
                "The {} operation against {} could not be completed at this time, please try again.",
                operation, resource
            ),
        )
        .with_resource(resource, "")
        .with_retry_after(retry_after_seconds)
    }

    pub fn method_not_allowed(resource: &GroupResource, action: &str) -> Self {
        Self::new(
            StatusReason::MethodNotAllowed,
            format!("{} is not supported on resources of kind {}", action, resource),
        )
        .with_resource(resource, "")
    }

    pub fn too_many_requests(message: impl Into<String>, retry_after_seconds: u32) -> Self {
        Self::new(StatusReason::TooManyRequests, message).with_retry_after(retry_after_seconds)
    }

    /// HTTP status code for this error.
    pub fn code(&self) -> u16 {
        self.reason.code()
    }

    pub fn retry_after_seconds(&self) -> Option<u32> {
        self.details.as_ref().and_then(|d| d.retry_after_seconds)
    }

    pub fn is_not_found(&self) -> bool {
        self.reason == StatusReason::NotFound
    }

    pub fn is_already_exists(&self) -> bool {
        self.reason == StatusReason::AlreadyExists
    }

    pub fn is_conflict(&self) -> bool {
        self.reason == StatusReason::Conflict
    }

    pub fn is_invalid(&self) -> bool {
        self.reason == StatusReason::Invalid
    }

    pub fn is_bad_request(&self) -> bool {
        self.reason == StatusReason::BadRequest
    }

    pub fn is_unauthorized(&self) -> bool {
        self.reason == StatusReason::Unauthorized
    }

    pub fn is_forbidden(&self) -> bool {
        self.reason == StatusReason::Forbidden
    }

    pub fn is_timeout(&self) -> bool {
        self.reason == StatusReason::Timeout
    }

    pub fn is_server_timeout(&self) -> bool {
        self.reason == StatusReason::ServerTimeout
    }

    pub fn is_service_unavailable(&self) -> bool {
        self.reason == StatusReason::ServiceUnavailable
    }

    pub fn is_internal_error(&self) -> bool {
        self.reason == StatusReason::InternalError
    }
}
