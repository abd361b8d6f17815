//! Deletion stabilization
//!
//! After the delete call, every invocation re-reads the trigger:
//!
//! | Observation            | Outcome                       |
//! |------------------------|-------------------------------|
//! | `DELETING`             | call back later               |
//! | not found              | success, nothing left         |
//! | throttled              | call back later               |
//! | any other state        | `NotStabilized`               |
//! | any other failure      | classified failure            |
//!
//! Each "call back later" counts against the attempt budget.

use super::steps::Invocation;
use crate::context::{CallbackContext, TriggerEvent};
use crate::error::{ErrorCategory, INVALID_STATE_MSG, classify, failure_event};
use crate::model::ResourceModel;
use crate::service::{ServiceError, TriggerState, codes};
use handlerkit::{HandlerErrorCode, ProgressEvent};

/// Poll once for the end of a deletion
pub fn await_deletion(
    inv: &Invocation<'_>,
    name: &str,
    model: ResourceModel,
    ctx: CallbackContext,
) -> TriggerEvent {
    match inv.service.get_trigger(name) {
        Ok(snapshot) if snapshot.state == TriggerState::Deleting => {
            log::info!("{name} has not stabilized yet");
            not_yet(inv, name, model, ctx)
        }
        Ok(snapshot) => {
            log::error!("{name} has failed to stabilize in state {}", snapshot.state);
            let err = ServiceError::new(
                codes::INVALID_STATE,
                format!("{INVALID_STATE_MSG}{}", snapshot.state),
            );
            failure_event(&err, &model)
        }
        Err(err) => match classify(&err) {
            ErrorCategory::NotFound => {
                log::info!("Successfully deleted (stabilized): {name}");
                ProgressEvent::success(None)
            }
            category if category.is_retryable() => {
                log::debug!("{} while polling {name}, retrying", category.description());
                not_yet(inv, name, model, ctx)
            }
            _ => failure_event(&err, &model),
        },
    }
}

fn not_yet(
    inv: &Invocation<'_>,
    name: &str,
    model: ResourceModel,
    mut ctx: CallbackContext,
) -> TriggerEvent {
    ctx.stabilization_attempts += 1;
    let limit = inv.config.max_stabilization_attempts;
    if ctx.stabilization_attempts > limit {
        log::error!("{name} still deleting after {limit} checks");
        return ProgressEvent::failed(
            Some(model),
            HandlerErrorCode::NotStabilized,
            format!("Trigger {name} did not finish deleting after {limit} checks"),
        );
    }
    ProgressEvent::in_progress(Some(model), ctx, inv.config.stabilization_delay())
}
