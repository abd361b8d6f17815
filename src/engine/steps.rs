//! Step implementations
//!
//! Every step takes the event the previous step produced and returns the
//! next one. A step returns a non-yielding `IN_PROGRESS` event to let the
//! pipeline continue, or a terminal or delayed event to stop it.

use super::differ::{self, TagDelta};
use super::planner::Step;
use super::{guard, stabilize};
use crate::arn;
use crate::config::ReconcileConfig;
use crate::context::{CallbackContext, TriggerEvent};
use crate::error::failure_event;
use crate::model::{ResourceModel, Tags};
use crate::service::{TriggerService, TriggerSpec, TriggerUpdate};
use handlerkit::{HandlerErrorCode, HandlerRequest, ProgressEvent, generate_resource_identifier};

pub const NAME_CANNOT_BE_EMPTY: &str =
    "Model validation failed. Required key [Name] cannot be empty.";
pub const TYPE_OR_ACTIONS_EMPTY: &str =
    "Model validation failed. Required keys [Type]/[Actions] cannot be empty.";
pub const NAME_TYPE_OR_ACTIONS_EMPTY: &str =
    "Model validation failed. Required keys [Name]/[Type]/[Actions] cannot be empty.";

/// Everything a step can see besides the event it continues
pub struct Invocation<'a> {
    pub service: &'a dyn TriggerService,
    pub config: &'a ReconcileConfig,
    pub request: &'a HandlerRequest<ResourceModel>,
}

impl Invocation<'_> {
    pub fn token(&self) -> &str {
        &self.request.client_request_token
    }

    pub fn stack(&self) -> &str {
        self.request.stack_label()
    }

    /// ARN of a trigger in the request's region and account
    pub fn arn(&self, name: &str) -> String {
        arn::trigger_arn(&self.request.region, &self.request.aws_account_id, name)
    }

    /// Previous and desired tag sets, each with request-level tags on top
    fn tag_delta(&self, desired: &ResourceModel) -> TagDelta {
        let previous_inline = self
            .request
            .previous_resource_state
            .as_ref()
            .map(|m| m.tags.clone())
            .unwrap_or_default();
        let previous = differ::merge(&previous_inline, &self.request.previous_resource_tags);
        let desired = differ::merge(&desired.tags, &self.request.desired_resource_tags);
        differ::diff(&previous, &desired)
    }
}

/// Run one step
pub fn run(step: Step, inv: &Invocation<'_>, event: TriggerEvent) -> TriggerEvent {
    log::debug!(
        "Running {} step {step}",
        if step.is_remote() { "remote" } else { "local" }
    );
    let ctx = event.callback_context.unwrap_or_default();
    let Some(model) = event.resource_model else {
        return run_without_model(step, inv);
    };

    match step {
        Step::ValidateCreate => validate_create(model, ctx),
        Step::ValidateName => validate_name(model, ctx),
        Step::ValidateUpdate => validate_update(model, ctx),
        Step::AssignName => assign_name(inv, model, ctx),
        Step::AssembleModel => assemble_model(model, ctx),
        Step::ReportDesired => ProgressEvent::success(Some(model)),
        Step::ListTriggers => list_triggers(inv, &model),
        _ => {
            // Every pipeline validates the name before reaching these
            let Some(name) = model.name().map(str::to_string) else {
                return missing_name(Some(model));
            };
            match step {
                Step::CreateExistenceCheck => guard::check_before_create(inv, &name, model, ctx),
                Step::CreateTrigger => create_trigger(inv, &name, model),
                Step::FetchTrigger => fetch_trigger(inv, &name, model, ctx),
                Step::FetchTags => fetch_tags(inv, &name, model, ctx),
                Step::UpdateTrigger => update_trigger(inv, &name, model, ctx),
                Step::RemoveTags => remove_tags(inv, &name, model, ctx),
                Step::AddTags => add_tags(inv, &name, model, ctx),
                Step::DeleteExistenceCheck => guard::check_before_delete(inv, &name, model, ctx),
                Step::DeleteTrigger => delete_trigger(inv, &name, model, ctx),
                Step::AwaitDeletion => stabilize::await_deletion(inv, &name, model, ctx),
                _ => ProgressEvent::progress(Some(model), ctx),
            }
        }
    }
}

/// Steps reached with no model at all
fn run_without_model(step: Step, inv: &Invocation<'_>) -> TriggerEvent {
    match step {
        Step::ListTriggers => list_triggers(inv, &ResourceModel::default()),
        Step::ValidateCreate => {
            ProgressEvent::failed(None, HandlerErrorCode::InvalidRequest, TYPE_OR_ACTIONS_EMPTY)
        }
        Step::ValidateUpdate => ProgressEvent::failed(
            None,
            HandlerErrorCode::InvalidRequest,
            NAME_TYPE_OR_ACTIONS_EMPTY,
        ),
        _ => missing_name(None),
    }
}

fn missing_name(model: Option<ResourceModel>) -> TriggerEvent {
    ProgressEvent::failed(model, HandlerErrorCode::InvalidRequest, NAME_CANNOT_BE_EMPTY)
}

fn validate_create(model: ResourceModel, ctx: CallbackContext) -> TriggerEvent {
    if !model.has_type_and_actions() {
        return ProgressEvent::failed(
            Some(model),
            HandlerErrorCode::InvalidRequest,
            TYPE_OR_ACTIONS_EMPTY,
        );
    }
    ProgressEvent::progress(Some(model), ctx)
}

fn validate_name(model: ResourceModel, ctx: CallbackContext) -> TriggerEvent {
    if model.name().is_none() {
        return missing_name(Some(model));
    }
    ProgressEvent::progress(Some(model), ctx)
}

fn validate_update(model: ResourceModel, ctx: CallbackContext) -> TriggerEvent {
    if model.name().is_none() || !model.has_type_and_actions() {
        return ProgressEvent::failed(
            Some(model),
            HandlerErrorCode::InvalidRequest,
            NAME_TYPE_OR_ACTIONS_EMPTY,
        );
    }
    ProgressEvent::progress(Some(model), ctx)
}

fn assign_name(inv: &Invocation<'_>, mut model: ResourceModel, ctx: CallbackContext) -> TriggerEvent {
    if model.name().is_none() {
        let name = generate_resource_identifier(
            inv.request.logical_resource_identifier.as_deref(),
            inv.token(),
            inv.config.generated_name_length(),
        );
        log::info!("[ClientRequestToken: {}] Generated trigger name {name}", inv.token());
        model.name = Some(name);
    }
    ProgressEvent::progress(Some(model), ctx)
}

fn create_trigger(inv: &Invocation<'_>, name: &str, mut model: ResourceModel) -> TriggerEvent {
    let tags = create_tags(inv, &model);
    let spec = TriggerSpec::from_model(name, &model);

    match inv.service.create_trigger(&spec, &tags) {
        Ok(created) => {
            log::info!(
                "Resource created in StackId: {} with name: {created}",
                inv.stack()
            );
            model.name = Some(created);
            ProgressEvent::success(Some(model))
        }
        Err(err) => failure_event(&err, &model),
    }
}

fn fetch_trigger(
    inv: &Invocation<'_>,
    name: &str,
    model: ResourceModel,
    mut ctx: CallbackContext,
) -> TriggerEvent {
    log::info!("Reading trigger {name}");
    match inv.service.get_trigger(name) {
        Ok(snapshot) => {
            ctx.trigger = Some(snapshot);
            ProgressEvent::progress(Some(model), ctx)
        }
        Err(err) => failure_event(&err, &model),
    }
}

fn fetch_tags(
    inv: &Invocation<'_>,
    name: &str,
    model: ResourceModel,
    mut ctx: CallbackContext,
) -> TriggerEvent {
    match inv.service.get_tags(&inv.arn(name)) {
        Ok(tags) => {
            ctx.tags = Some(tags);
            ProgressEvent::progress(Some(model), ctx)
        }
        Err(err) => failure_event(&err, &model),
    }
}

/// Build the full model from the snapshots the read just fetched
fn assemble_model(model: ResourceModel, ctx: CallbackContext) -> TriggerEvent {
    let Some(trigger) = ctx.trigger else {
        return ProgressEvent::failed(
            Some(model),
            HandlerErrorCode::InternalFailure,
            "Trigger snapshot missing from callback context",
        );
    };

    let assembled = ResourceModel {
        name: Some(trigger.name),
        trigger_type: trigger.trigger_type,
        description: trigger.description,
        workflow_name: trigger.workflow_name,
        schedule: trigger.schedule,
        start_on_creation: None,
        actions: trigger.actions,
        predicate: trigger.predicate,
        event_batching_condition: trigger.event_batching_condition,
        tags: ctx.tags.unwrap_or_default(),
    };
    ProgressEvent::success(Some(assembled))
}

fn update_trigger(
    inv: &Invocation<'_>,
    name: &str,
    model: ResourceModel,
    ctx: CallbackContext,
) -> TriggerEvent {
    log::info!("[StackId: {}] Invoking update trigger {name}", inv.stack());
    let update = TriggerUpdate::from_model(name, &model);
    match inv.service.update_trigger(name, &update) {
        Ok(_) => ProgressEvent::progress(Some(model), ctx),
        Err(err) => failure_event(&err, &model),
    }
}

fn remove_tags(
    inv: &Invocation<'_>,
    name: &str,
    model: ResourceModel,
    ctx: CallbackContext,
) -> TriggerEvent {
    let delta = inv.tag_delta(&model);
    if delta.is_empty() {
        log::debug!("Tags of {name} already match");
    }
    if delta.to_remove.is_empty() {
        return ProgressEvent::progress(Some(model), ctx);
    }

    log::info!("Removing {} tag(s) from {name}", delta.to_remove.len());
    match inv
        .service
        .untag_resource(&inv.arn(name), &delta.remove_keys())
    {
        Ok(()) => ProgressEvent::progress(Some(model), ctx),
        Err(err) => failure_event(&err, &model),
    }
}

fn add_tags(
    inv: &Invocation<'_>,
    name: &str,
    model: ResourceModel,
    ctx: CallbackContext,
) -> TriggerEvent {
    let delta = inv.tag_delta(&model);
    if delta.to_add.is_empty() {
        return ProgressEvent::progress(Some(model), ctx);
    }

    log::info!("Adding {} tag(s) to {name}", delta.to_add.len());
    match inv.service.tag_resource(&inv.arn(name), &delta.to_add) {
        Ok(()) => ProgressEvent::progress(Some(model), ctx),
        Err(err) => failure_event(&err, &model),
    }
}

fn delete_trigger(
    inv: &Invocation<'_>,
    name: &str,
    model: ResourceModel,
    mut ctx: CallbackContext,
) -> TriggerEvent {
    if ctx.delete_issued {
        return ProgressEvent::progress(Some(model), ctx);
    }

    log::info!(
        "[StackId: {}, ClientRequestToken: {}] Deleting trigger {name}",
        inv.stack(),
        inv.token()
    );
    match inv.service.delete_trigger(name) {
        Ok(()) => {
            ctx.delete_issued = true;
            ProgressEvent::progress(Some(model), ctx)
        }
        Err(err) => failure_event(&err, &model),
    }
}

fn list_triggers(inv: &Invocation<'_>, model: &ResourceModel) -> TriggerEvent {
    match inv.service.list_triggers(inv.request.next_token.as_deref()) {
        Ok(page) => {
            let models = page.names.into_iter().map(ResourceModel::named).collect();
            ProgressEvent::success_list(models, page.next_token)
        }
        Err(err) => failure_event(&err, model),
    }
}

/// Tags a create call sends for `model`; empty maps are sent, not omitted
fn create_tags(inv: &Invocation<'_>, model: &ResourceModel) -> Tags {
    differ::merge(&model.tags, &inv.request.desired_resource_tags)
}
