//! One-time existence checks before create and delete
//!
//! Each check runs once per operation. Its latch in the callback context
//! makes every later invocation skip it.

use super::steps::Invocation;
use crate::context::{CallbackContext, TriggerEvent};
use crate::error::{ErrorCategory, classify, failure_event};
use crate::model::ResourceModel;
use handlerkit::{HandlerErrorCode, ProgressEvent};

/// Refuse to create a trigger whose name is already taken
///
/// A clean check latches and yields once before the create call.
pub fn check_before_create(
    inv: &Invocation<'_>,
    name: &str,
    model: ResourceModel,
    mut ctx: CallbackContext,
) -> TriggerEvent {
    if ctx.pre_existence_check_done {
        return ProgressEvent::progress(Some(model), ctx);
    }

    log::info!(
        "[ClientRequestToken: {}][StackId: {}] Checking that {name} does not exist",
        inv.token(),
        inv.stack()
    );

    match inv.service.get_trigger(name) {
        Ok(existing) => {
            log::warn!(
                "[ClientRequestToken: {}] Trigger {} already exists, failing create",
                inv.token(),
                existing.name
            );
            ProgressEvent::failed(
                Some(model),
                HandlerErrorCode::AlreadyExists,
                format!("Trigger with Id [ {} ] already exists.", existing.name),
            )
        }
        Err(err) if classify(&err) == ErrorCategory::NotFound => {
            log::info!(
                "[ClientRequestToken: {}] {name} does not exist, continuing create",
                inv.token()
            );
            ctx.pre_existence_check_done = true;
            ProgressEvent::in_progress(Some(model), ctx, inv.config.existence_delay())
        }
        Err(err) => failure_event(&err, &model),
    }
}

/// Finish delete early when there is nothing to delete
pub fn check_before_delete(
    inv: &Invocation<'_>,
    name: &str,
    model: ResourceModel,
    mut ctx: CallbackContext,
) -> TriggerEvent {
    if ctx.delete_pre_existence_check_done {
        return ProgressEvent::progress(Some(model), ctx);
    }

    log::info!(
        "[ClientRequestToken: {}][StackId: {}] Checking that {name} exists",
        inv.token(),
        inv.stack()
    );

    match inv.service.get_trigger(name) {
        Ok(_) => {
            ctx.delete_pre_existence_check_done = true;
            ProgressEvent::progress(Some(model), ctx)
        }
        Err(err) if classify(&err) == ErrorCategory::NotFound => {
            log::info!(
                "[ClientRequestToken: {}] {name} does not exist, nothing to delete",
                inv.token()
            );
            ProgressEvent::success(None)
        }
        Err(err) => failure_event(&err, &model),
    }
}
