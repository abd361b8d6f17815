//! Reconciliation handler for AWS Glue triggers
//!
//! Serves create, read, update, delete and list for a trigger resource. Each
//! operation runs as a resumable pipeline: an invocation either finishes with
//! a terminal outcome or yields `IN_PROGRESS` with a callback context and a
//! delay, and the host invokes it again with that context.
//!
//! The remote service sits behind [`TriggerService`]; [`MemoryService`]
//! implements it locally.

pub mod arn;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod model;
pub mod service;

pub use config::ReconcileConfig;
pub use context::{CallbackContext, TriggerEvent};
pub use engine::{TriggerHandler, reconcile};
pub use error::{ErrorCategory, classify};
pub use model::{ResourceModel, Tags};
pub use service::{MemoryService, ServiceError, TriggerService};
