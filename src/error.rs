//! Remote failure classification
//!
//! Every failure from the remote service is classified exactly once into an
//! [`ErrorCategory`], which decides the handler error code reported to the
//! host. Classification is a pure function of the error's code and message.

use crate::context::TriggerEvent;
use crate::model::ResourceModel;
use crate::service::{ServiceError, codes};
use handlerkit::{HandlerErrorCode, ProgressEvent};

/// Marker the service and the stabilization poller use for a trigger that
/// stopped moving towards deletion
pub const INVALID_STATE_MSG: &str = "Trigger entered into invalid delete state ";

const TAGGING_PERMISSION_ERRORS: [&str; 2] = [
    "is not authorized to perform: glue:TagResource",
    "is not authorized to perform: glue:UntagResource",
];

/// Canonical categories of remote failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    AccessDenied,
    InvalidInput,
    ServiceInternal,
    /// Throttled or timed out; the host may retry
    Throttled,
    AlreadyExists,
    ConcurrentModification,
    ResourceLimitExceeded,
    /// The trigger reported a state it should never be in
    NotStabilized,
    /// Access denied for a tagging-only permission
    UnauthorizedTaggingOperation,
    GeneralServiceError,
}

impl ErrorCategory {
    /// Whether the host may retry the operation after this failure
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled)
    }

    /// Whether a failure of this kind reports the model back to the host
    pub fn carries_model(&self) -> bool {
        !matches!(self, Self::AlreadyExists | Self::UnauthorizedTaggingOperation)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Trigger not found",
            Self::AccessDenied => "Access denied",
            Self::InvalidInput => "Invalid request",
            Self::ServiceInternal => "Service internal error",
            Self::Throttled => "Request throttled",
            Self::AlreadyExists => "Trigger already exists",
            Self::ConcurrentModification => "Concurrent modification",
            Self::ResourceLimitExceeded => "Resource limit exceeded",
            Self::NotStabilized => "Trigger did not stabilize",
            Self::UnauthorizedTaggingOperation => "Not authorized to tag",
            Self::GeneralServiceError => "Unexpected service error",
        }
    }

    /// Handler error code reported to the host
    pub fn handler_code(&self) -> HandlerErrorCode {
        match self {
            Self::NotFound => HandlerErrorCode::NotFound,
            Self::AccessDenied => HandlerErrorCode::AccessDenied,
            Self::InvalidInput => HandlerErrorCode::InvalidRequest,
            Self::ServiceInternal => HandlerErrorCode::ServiceInternalError,
            Self::Throttled => HandlerErrorCode::Throttling,
            Self::AlreadyExists => HandlerErrorCode::AlreadyExists,
            Self::ConcurrentModification => HandlerErrorCode::NotUpdatable,
            Self::ResourceLimitExceeded => HandlerErrorCode::ServiceLimitExceeded,
            Self::NotStabilized => HandlerErrorCode::NotStabilized,
            Self::UnauthorizedTaggingOperation => HandlerErrorCode::UnauthorizedTaggingOperation,
            Self::GeneralServiceError => HandlerErrorCode::GeneralServiceException,
        }
    }
}

/// Classify a remote failure
pub fn classify(err: &ServiceError) -> ErrorCategory {
    let code = err.code.as_str();

    if is_tagging_denial(err) {
        return ErrorCategory::UnauthorizedTaggingOperation;
    }

    match code {
        codes::ENTITY_NOT_FOUND | codes::NOT_FOUND => ErrorCategory::NotFound,
        codes::ACCESS_DENIED_EXCEPTION | codes::ACCESS_DENIED | codes::NOT_AUTHORIZED => {
            ErrorCategory::AccessDenied
        }
        codes::INVALID_INPUT => ErrorCategory::InvalidInput,
        codes::INTERNAL_SERVICE | codes::SERVICE_INTERNAL_ERROR => ErrorCategory::ServiceInternal,
        codes::OPERATION_TIMEOUT | codes::THROTTLING | codes::REQUEST_LIMIT_EXCEEDED => {
            ErrorCategory::Throttled
        }
        codes::IDEMPOTENT_PARAMETER_MISMATCH
        | codes::ALREADY_EXISTS_EXCEPTION
        | codes::ALREADY_EXISTS => ErrorCategory::AlreadyExists,
        codes::RESOURCE_NUMBER_LIMIT_EXCEEDED => ErrorCategory::ResourceLimitExceeded,
        codes::CONCURRENT_MODIFICATION => ErrorCategory::ConcurrentModification,
        _ if code.contains(INVALID_STATE_MSG) || err.message.contains(INVALID_STATE_MSG) => {
            ErrorCategory::NotStabilized
        }
        _ => ErrorCategory::GeneralServiceError,
    }
}

fn is_tagging_denial(err: &ServiceError) -> bool {
    matches!(
        err.code.as_str(),
        codes::ACCESS_DENIED | codes::ACCESS_DENIED_EXCEPTION
    ) && TAGGING_PERMISSION_ERRORS
        .iter()
        .any(|needle| err.message.contains(needle))
}

/// Turn a remote failure into the terminal event reported to the host
pub fn failure_event(err: &ServiceError, model: &ResourceModel) -> TriggerEvent {
    let category = classify(err);
    log::error!(
        "Remote call failed ({}): {err}",
        category.description()
    );

    let model = category.carries_model().then(|| model.clone());
    ProgressEvent::failed(model, category.handler_code(), err.to_string())
}
