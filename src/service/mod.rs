//! Remote trigger service abstraction
//!
//! The [`TriggerService`] trait is the only way the reconciler touches the
//! remote store. Every call either succeeds or fails with a [`ServiceError`]
//! carrying a machine-readable code and a human-readable message; the
//! reconciler never looks at anything else.

pub mod memory;

use crate::model::{Action, EventBatchingCondition, Predicate, ResourceModel, Tags};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use memory::{Call, MemoryOptions, MemoryService, TriggerStore};

/// Error codes the remote service emits
pub mod codes {
    pub const ENTITY_NOT_FOUND: &str = "EntityNotFoundException";
    pub const NOT_FOUND: &str = "NotFound";
    pub const ACCESS_DENIED_EXCEPTION: &str = "AccessDeniedException";
    pub const ACCESS_DENIED: &str = "AccessDenied";
    pub const NOT_AUTHORIZED: &str = "NotAuthorizedException";
    pub const INVALID_INPUT: &str = "InvalidInputException";
    pub const INTERNAL_SERVICE: &str = "InternalServiceException";
    pub const SERVICE_INTERNAL_ERROR: &str = "ServiceInternalError";
    pub const OPERATION_TIMEOUT: &str = "OperationTimeoutException";
    pub const THROTTLING: &str = "ThrottlingException";
    pub const REQUEST_LIMIT_EXCEEDED: &str = "RequestLimitExceeded";
    pub const ALREADY_EXISTS_EXCEPTION: &str = "AlreadyExistsException";
    pub const ALREADY_EXISTS: &str = "AlreadyExists";
    pub const IDEMPOTENT_PARAMETER_MISMATCH: &str = "IdempotentParameterMismatchException";
    pub const CONCURRENT_MODIFICATION: &str = "ConcurrentModificationException";
    pub const RESOURCE_NUMBER_LIMIT_EXCEEDED: &str = "ResourceNumberLimitExceededException";
    pub const INVALID_STATE: &str = "InvalidStateException";
}

/// Raw failure reported by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    pub code: String,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// `EntityNotFoundException` for a named trigger
    pub fn not_found(name: &str) -> Self {
        Self::new(codes::ENTITY_NOT_FOUND, format!("Trigger {name} not found"))
    }
}

/// Result type for remote calls
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Lifecycle state reported by the remote service
///
/// Unknown states are kept verbatim so they can be reported back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TriggerState {
    Creating,
    Created,
    Activating,
    Activated,
    Deactivating,
    Deactivated,
    Deleting,
    Updating,
    Other(String),
}

impl TriggerState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "CREATING",
            Self::Created => "CREATED",
            Self::Activating => "ACTIVATING",
            Self::Activated => "ACTIVATED",
            Self::Deactivating => "DEACTIVATING",
            Self::Deactivated => "DEACTIVATED",
            Self::Deleting => "DELETING",
            Self::Updating => "UPDATING",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for TriggerState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CREATING" => Self::Creating,
            "CREATED" => Self::Created,
            "ACTIVATING" => Self::Activating,
            "ACTIVATED" => Self::Activated,
            "DEACTIVATING" => Self::Deactivating,
            "DEACTIVATED" => Self::Deactivated,
            "DELETING" => Self::Deleting,
            "UPDATING" => Self::Updating,
            _ => Self::Other(s),
        }
    }
}

impl From<TriggerState> for String {
    fn from(state: TriggerState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for TriggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full definition sent when creating a trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSpec {
    pub name: String,
    pub trigger_type: Option<String>,
    pub workflow_name: Option<String>,
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub start_on_creation: Option<bool>,
    pub actions: Vec<Action>,
    pub predicate: Option<Predicate>,
    pub event_batching_condition: Option<EventBatchingCondition>,
}

impl TriggerSpec {
    pub fn from_model(name: &str, model: &ResourceModel) -> Self {
        Self {
            name: name.to_string(),
            trigger_type: model.trigger_type.clone(),
            workflow_name: model.workflow_name.clone(),
            schedule: model.schedule.clone(),
            description: model.description.clone(),
            start_on_creation: model.start_on_creation,
            actions: model.actions.clone(),
            predicate: model.predicate.clone(),
            event_batching_condition: model.event_batching_condition.clone(),
        }
    }
}

/// Partial definition sent when updating a trigger
///
/// `None` fields are left unchanged remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerUpdate {
    pub name: String,
    pub actions: Vec<Action>,
    pub description: Option<String>,
    pub predicate: Option<Predicate>,
    pub event_batching_condition: Option<EventBatchingCondition>,
    pub schedule: Option<String>,
}

impl TriggerUpdate {
    /// Build an update carrying only the non-empty optional fields of `model`
    pub fn from_model(name: &str, model: &ResourceModel) -> Self {
        Self {
            name: name.to_string(),
            actions: model.actions.clone(),
            description: model.description.clone().filter(|s| !s.is_empty()),
            predicate: model.predicate.clone(),
            event_batching_condition: model.event_batching_condition.clone(),
            schedule: model.schedule.clone().filter(|s| !s.is_empty()),
        }
    }
}

/// Trigger as the remote service reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSnapshot {
    pub name: String,
    pub state: TriggerState,
    #[serde(default)]
    pub trigger_type: Option<String>,
    #[serde(default)]
    pub workflow_name: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub predicate: Option<Predicate>,
    #[serde(default)]
    pub event_batching_condition: Option<EventBatchingCondition>,
}

impl TriggerSnapshot {
    /// Snapshot of a freshly created trigger
    pub fn from_spec(spec: &TriggerSpec, state: TriggerState) -> Self {
        Self {
            name: spec.name.clone(),
            state,
            trigger_type: spec.trigger_type.clone(),
            workflow_name: spec.workflow_name.clone(),
            schedule: spec.schedule.clone(),
            description: spec.description.clone(),
            actions: spec.actions.clone(),
            predicate: spec.predicate.clone(),
            event_batching_condition: spec.event_batching_condition.clone(),
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, update: &TriggerUpdate) {
        self.actions = update.actions.clone();
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(predicate) = &update.predicate {
            self.predicate = Some(predicate.clone());
        }
        if let Some(condition) = &update.event_batching_condition {
            self.event_batching_condition = Some(condition.clone());
        }
        if let Some(schedule) = &update.schedule {
            self.schedule = Some(schedule.clone());
        }
    }
}

/// One page of trigger names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerPage {
    pub names: Vec<String>,
    pub next_token: Option<String>,
}

/// Capability interface to the remote trigger store
///
/// Implementations:
/// - [`MemoryService`], an in-process store used by the local host and tests
pub trait TriggerService: Send + Sync {
    /// Create a trigger and return its name
    fn create_trigger(&self, spec: &TriggerSpec, tags: &Tags) -> ServiceResult<String>;

    /// Fetch a trigger by name
    fn get_trigger(&self, name: &str) -> ServiceResult<TriggerSnapshot>;

    /// Apply a partial update
    fn update_trigger(&self, name: &str, update: &TriggerUpdate) -> ServiceResult<TriggerSnapshot>;

    /// Start deleting a trigger
    fn delete_trigger(&self, name: &str) -> ServiceResult<()>;

    /// List trigger names, one page at a time
    fn list_triggers(&self, next_token: Option<&str>) -> ServiceResult<TriggerPage>;

    /// Fetch the tags of a resource by ARN
    fn get_tags(&self, arn: &str) -> ServiceResult<Tags>;

    /// Add or overwrite tags
    fn tag_resource(&self, arn: &str, tags: &Tags) -> ServiceResult<()>;

    /// Remove tags by key
    fn untag_resource(&self, arn: &str, keys: &[String]) -> ServiceResult<()>;
}
