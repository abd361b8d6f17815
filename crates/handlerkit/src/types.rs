//! Core types for resumable resource handlers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of request a handler is asked to serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Operation {
    /// Lowercase name, as used in log lines and CLI arguments
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
        }
    }

    /// Whether the operation changes remote state
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Delete)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    /// More invocations are needed
    InProgress,
    /// The operation finished successfully
    Success,
    /// The operation finished with an error
    Failed,
}

impl OperationStatus {
    /// Whether no further invocation will follow
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Canonical error codes reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerErrorCode {
    InvalidRequest,
    AccessDenied,
    NotFound,
    AlreadyExists,
    Throttling,
    ServiceInternalError,
    NotUpdatable,
    ServiceLimitExceeded,
    NotStabilized,
    GeneralServiceException,
    UnauthorizedTaggingOperation,
    InternalFailure,
}

impl HandlerErrorCode {
    /// Wire name of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "InvalidRequest",
            Self::AccessDenied => "AccessDenied",
            Self::NotFound => "NotFound",
            Self::AlreadyExists => "AlreadyExists",
            Self::Throttling => "Throttling",
            Self::ServiceInternalError => "ServiceInternalError",
            Self::NotUpdatable => "NotUpdatable",
            Self::ServiceLimitExceeded => "ServiceLimitExceeded",
            Self::NotStabilized => "NotStabilized",
            Self::GeneralServiceException => "GeneralServiceException",
            Self::UnauthorizedTaggingOperation => "UnauthorizedTaggingOperation",
            Self::InternalFailure => "InternalFailure",
        }
    }

    /// Whether the host may retry the whole operation after this failure.
    ///
    /// The handler itself never retries these; it fails the invocation and
    /// leaves the decision to the host's re-invocation policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttling)
    }
}

impl fmt::Display for HandlerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one handler invocation
///
/// `IN_PROGRESS` events always carry a continuation; terminal events never
/// do. The constructors below are the only way the crate builds events, so
/// both halves of that rule hold for every event a handler returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent<M, C> {
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<M>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_models: Option<Vec<M>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_context: Option<C>,
    #[serde(default)]
    pub callback_delay_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<HandlerErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl<M, C> ProgressEvent<M, C> {
    /// In-progress event that continues immediately within the same invocation
    pub fn progress(model: Option<M>, context: C) -> Self {
        Self::in_progress(model, context, 0)
    }

    /// In-progress event asking the host to call back after `delay_seconds`
    pub fn in_progress(model: Option<M>, context: C, delay_seconds: u32) -> Self {
        Self {
            status: OperationStatus::InProgress,
            resource_model: model,
            resource_models: None,
            callback_context: Some(context),
            callback_delay_seconds: delay_seconds,
            error_code: None,
            message: None,
            next_token: None,
        }
    }

    /// Successful terminal event for a single resource
    pub fn success(model: Option<M>) -> Self {
        Self {
            status: OperationStatus::Success,
            resource_model: model,
            resource_models: None,
            callback_context: None,
            callback_delay_seconds: 0,
            error_code: None,
            message: None,
            next_token: None,
        }
    }

    /// Successful terminal event for a listing
    pub fn success_list(models: Vec<M>, next_token: Option<String>) -> Self {
        Self {
            status: OperationStatus::Success,
            resource_model: None,
            resource_models: Some(models),
            callback_context: None,
            callback_delay_seconds: 0,
            error_code: None,
            message: None,
            next_token,
        }
    }

    /// Failed terminal event
    pub fn failed(model: Option<M>, code: HandlerErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: OperationStatus::Failed,
            resource_model: model,
            resource_models: None,
            callback_context: None,
            callback_delay_seconds: 0,
            error_code: Some(code),
            message: Some(message.into()),
            next_token: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }

    pub fn is_failed(&self) -> bool {
        self.status == OperationStatus::Failed
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == OperationStatus::InProgress
    }

    /// Whether the host has to be involved before work can continue:
    /// the event is terminal, or it asks for a delayed callback.
    pub fn should_yield(&self) -> bool {
        self.status.is_terminal() || self.callback_delay_seconds > 0
    }

    /// Chain another step onto a non-yielding event
    ///
    /// Terminal events and delayed in-progress events are returned as-is.
    pub fn then<F>(self, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        if self.should_yield() { self } else { f(self) }
    }
}
