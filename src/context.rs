//! Callback context carried between invocations

use crate::model::{ResourceModel, Tags};
use crate::service::TriggerSnapshot;
use handlerkit::{Continuation, ProgressEvent};
use serde::{Deserialize, Serialize};

/// Event type every trigger operation produces
pub type TriggerEvent = ProgressEvent<ResourceModel, CallbackContext>;

/// State of one logical operation, kept across invocations
///
/// Latches record one-time steps that already ran, so a re-invocation
/// resumes after them instead of repeating them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallbackContext {
    /// Last trigger snapshot fetched by a read
    pub trigger: Option<TriggerSnapshot>,
    /// Last tag snapshot fetched by a read
    pub tags: Option<Tags>,
    /// Create's existence check found no trigger
    pub pre_existence_check_done: bool,
    /// Delete's existence check found the trigger
    pub delete_pre_existence_check_done: bool,
    /// The delete call went through; only polling remains
    pub delete_issued: bool,
    /// Deletion polls that reported "not yet"
    pub stabilization_attempts: u32,
}

impl Continuation for CallbackContext {
    const VERSION: u32 = 1;
}
