//! Reconciliation engine for Glue triggers
//!
//! The engine runs one invocation of an operation:
//! 1. Planning - Pick the fixed step table for the operation
//! 2. Guarding - One-time existence checks latched in the callback context
//! 3. Executing - Run steps until one yields a terminal or delayed event
//! 4. Stabilizing - Poll a deleting trigger until it is gone
//!
//! Tag reconciliation lives in [`differ`].

pub mod differ;
pub mod executor;
pub mod guard;
pub mod planner;
pub mod stabilize;
pub mod steps;

pub use executor::{TriggerHandler, reconcile};
pub use planner::Step;
