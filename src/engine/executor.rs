//! Pipeline runner
//!
//! Runs the steps of one operation until a step yields: a terminal event
//! ends the operation, a delayed `IN_PROGRESS` event hands control back to
//! the host together with the callback context.

use super::planner;
use super::steps::{self, Invocation};
use crate::config::ReconcileConfig;
use crate::context::{CallbackContext, TriggerEvent};
use crate::model::ResourceModel;
use crate::service::TriggerService;
use handlerkit::{Handler, HandlerErrorCode, HandlerRequest, Operation, ProgressEvent};

/// Serve one invocation of `operation`
///
/// `context` is the callback context the previous invocation returned, or
/// `None` when the operation starts.
pub fn reconcile(
    service: &dyn TriggerService,
    config: &ReconcileConfig,
    operation: Operation,
    request: &HandlerRequest<ResourceModel>,
    context: Option<CallbackContext>,
) -> TriggerEvent {
    let inv = Invocation {
        service,
        config,
        request,
    };
    let model = request.desired_resource_state.clone();

    log::info!(
        "[StackId: {}, ClientRequestToken: {}, Name: {}] Entered {operation} handler",
        request.stack_label(),
        request.client_request_token,
        model.as_ref().and_then(ResourceModel::name).unwrap_or("-")
    );
    if let Some(ctx) = &context {
        log::debug!("Resuming {operation} with {ctx:?}");
    }

    let mut event = ProgressEvent::progress(model, context.unwrap_or_default());
    for step in planner::steps(operation) {
        event = event.then(|progress| steps::run(*step, &inv, progress));
    }

    if !event.should_yield() {
        log::error!("{operation} pipeline ended without an outcome");
        return ProgressEvent::failed(
            event.resource_model,
            HandlerErrorCode::InternalFailure,
            format!("{operation} finished without reaching an outcome"),
        );
    }

    log::info!(
        "{operation} returned {}{}",
        event.status,
        event
            .error_code
            .map(|code| format!(" ({code})"))
            .unwrap_or_default()
    );
    event
}

/// [`Handler`] serving trigger operations against a [`TriggerService`]
pub struct TriggerHandler<'a> {
    service: &'a dyn TriggerService,
    config: ReconcileConfig,
}

impl<'a> TriggerHandler<'a> {
    pub fn new(service: &'a dyn TriggerService, config: ReconcileConfig) -> Self {
        Self { service, config }
    }
}

impl Handler for TriggerHandler<'_> {
    type Model = ResourceModel;
    type Context = CallbackContext;

    fn handle(
        &self,
        operation: Operation,
        request: &HandlerRequest<ResourceModel>,
        context: Option<CallbackContext>,
    ) -> TriggerEvent {
        reconcile(self.service, &self.config, operation, request, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::steps::{NAME_CANNOT_BE_EMPTY, NAME_TYPE_OR_ACTIONS_EMPTY};
    use crate::model::{Action, Tags};
    use crate::service::{
        Call, MemoryOptions, MemoryService, ServiceError, TriggerSnapshot, TriggerState, codes,
    };
    use handlerkit::{DriveOptions, NoWait, OperationStatus, run_to_completion};

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn nightly() -> ResourceModel {
        ResourceModel {
            name: Some("nightly".into()),
            trigger_type: Some("SCHEDULED".into()),
            schedule: Some("cron(0 2 * * ? *)".into()),
            actions: vec![Action::job("etl")],
            tags: tags(&[("team", "data")]),
            ..Default::default()
        }
    }

    fn request(model: ResourceModel) -> HandlerRequest<ResourceModel> {
        HandlerRequest::new(Some(model), "token-1").with_location("us-east-1", "123456789012")
    }

    fn invoke(
        service: &MemoryService,
        operation: Operation,
        request: &HandlerRequest<ResourceModel>,
        context: Option<CallbackContext>,
    ) -> TriggerEvent {
        reconcile(
            service,
            &ReconcileConfig::default(),
            operation,
            request,
            context,
        )
    }

    /// Run create through both invocations so the trigger exists
    fn seed(service: &MemoryService, model: ResourceModel) {
        let req = request(model);
        let first = invoke(service, Operation::Create, &req, None);
        let done = invoke(service, Operation::Create, &req, first.callback_context);
        assert!(done.is_success());
    }

    fn assert_context_rule(event: &TriggerEvent) {
        match event.status {
            OperationStatus::InProgress => assert!(event.callback_context.is_some()),
            _ => assert!(event.callback_context.is_none()),
        }
    }

    // ---- validation ----

    #[test]
    fn test_create_without_type_fails_before_remote_calls() {
        let service = MemoryService::new();
        let mut model = nightly();
        model.trigger_type = None;

        let event = invoke(&service, Operation::Create, &request(model), None);

        assert!(event.is_failed());
        assert_eq!(event.error_code, Some(HandlerErrorCode::InvalidRequest));
        assert!(service.calls().is_empty());
    }

    #[test]
    fn test_create_and_update_without_actions_fail_before_remote_calls() {
        let service = MemoryService::new();
        let mut model = nightly();
        model.actions.clear();

        for operation in [Operation::Create, Operation::Update] {
            let event = invoke(&service, operation, &request(model.clone()), None);
            assert_eq!(event.error_code, Some(HandlerErrorCode::InvalidRequest));
        }
        assert!(service.calls().is_empty());
    }

    #[test]
    fn test_update_without_type_fails() {
        let service = MemoryService::new();
        let mut model = nightly();
        model.trigger_type = Some(String::new());

        let event = invoke(&service, Operation::Update, &request(model), None);

        assert_eq!(event.message.as_deref(), Some(NAME_TYPE_OR_ACTIONS_EMPTY));
        assert!(service.calls().is_empty());
    }

    #[test]
    fn test_read_and_delete_require_name() {
        let service = MemoryService::new();
        let mut model = nightly();
        model.name = None;

        for operation in [Operation::Read, Operation::Delete] {
            let event = invoke(&service, operation, &request(model.clone()), None);
            assert_eq!(event.error_code, Some(HandlerErrorCode::InvalidRequest));
            assert_eq!(event.message.as_deref(), Some(NAME_CANNOT_BE_EMPTY));
        }

        let no_model = HandlerRequest::new(None, "token-1");
        let event = invoke(&service, Operation::Read, &no_model, None);
        assert!(event.is_failed());
        assert!(event.resource_model.is_none());
        assert!(service.calls().is_empty());
    }

    // ---- create ----

    #[test]
    fn test_create_yields_once_after_clean_existence_check() {
        let service = MemoryService::new();
        let req = request(nightly());

        let first = invoke(&service, Operation::Create, &req, None);
        assert!(first.is_in_progress());
        assert!(first.callback_delay_seconds > 0);
        assert_context_rule(&first);
        let ctx = first.callback_context.clone().unwrap();
        assert!(ctx.pre_existence_check_done);
        assert_eq!(service.calls(), vec![Call::GetTrigger]);

        let second = invoke(&service, Operation::Create, &req, Some(ctx));
        assert!(second.is_success());
        assert_context_rule(&second);
        assert_eq!(
            service.calls(),
            vec![Call::GetTrigger, Call::CreateTrigger]
        );
        assert_eq!(
            second.resource_model.and_then(|m| m.name),
            Some("nightly".to_string())
        );
    }

    #[test]
    fn test_create_existing_trigger_fails_without_mutation() {
        let service = MemoryService::new();
        seed(&service, nightly());
        let before = service.call_count(Call::CreateTrigger);

        let event = invoke(&service, Operation::Create, &request(nightly()), None);

        assert_eq!(event.error_code, Some(HandlerErrorCode::AlreadyExists));
        assert!(event.message.unwrap().contains("[ nightly ]"));
        assert!(event.resource_model.is_some());
        assert_eq!(service.call_count(Call::CreateTrigger), before);
    }

    #[test]
    fn test_create_race_reports_already_exists_without_model() {
        let service = MemoryService::new();
        service.fail_next(
            Call::CreateTrigger,
            ServiceError::new(codes::ALREADY_EXISTS_EXCEPTION, "created concurrently"),
        );
        let req = request(nightly());

        let first = invoke(&service, Operation::Create, &req, None);
        let second = invoke(&service, Operation::Create, &req, first.callback_context);

        assert_eq!(second.error_code, Some(HandlerErrorCode::AlreadyExists));
        assert!(second.resource_model.is_none());
    }

    #[test]
    fn test_create_merges_request_tags() {
        let service = MemoryService::new();
        let mut req = request(nightly());
        req.desired_resource_tags = tags(&[("team", "stack"), ("cost", "42")]);

        let first = invoke(&service, Operation::Create, &req, None);
        invoke(&service, Operation::Create, &req, first.callback_context);

        assert_eq!(
            service.tags_of("nightly"),
            Some(tags(&[("cost", "42"), ("team", "stack")]))
        );
    }

    #[test]
    fn test_create_generates_stable_name() {
        let service = MemoryService::new();
        let mut model = nightly();
        model.name = None;
        let req = request(model).with_logical_id("NightlyTrigger");

        let handler = TriggerHandler::new(&service, ReconcileConfig::default());
        let (event, invocations) = run_to_completion(
            &handler,
            Operation::Create,
            &req,
            &DriveOptions::default(),
            &mut NoWait,
        )
        .unwrap();

        assert!(event.is_success());
        assert_eq!(invocations, 2);
        let name = event.resource_model.and_then(|m| m.name).unwrap();
        assert!(name.starts_with("NightlyTrigger-"));
        assert!(name.len() <= 40);
        assert!(service.contains(&name));
    }

    #[test]
    fn test_create_with_tiny_name_bound_still_names_trigger() {
        let service = MemoryService::new();
        let mut model = nightly();
        model.name = None;
        let req = request(model).with_logical_id("NightlyTrigger");
        let config = ReconcileConfig {
            generated_name_max_length: 0,
            ..Default::default()
        };

        let first = reconcile(&service, &config, Operation::Create, &req, None);
        assert!(first.is_in_progress());
        let name = first.resource_model.as_ref().and_then(|m| m.name.clone()).unwrap();
        assert_eq!(name.len(), 12);

        let mut resumed = req.clone();
        resumed.desired_resource_state = first.resource_model.clone();
        let second = reconcile(&service, &config, Operation::Create, &resumed, first.callback_context);
        assert!(second.is_success());
        assert!(service.contains(&name));
    }

    #[test]
    fn test_create_existence_check_error_is_classified() {
        let service = MemoryService::new();
        service.fail_next(
            Call::GetTrigger,
            ServiceError::new(codes::ACCESS_DENIED_EXCEPTION, "no glue:GetTrigger"),
        );

        let event = invoke(&service, Operation::Create, &request(nightly()), None);

        assert_eq!(event.error_code, Some(HandlerErrorCode::AccessDenied));
        assert!(!service.mutated());
    }

    // ---- read ----

    #[test]
    fn test_read_assembles_full_model() {
        let service = MemoryService::new();
        seed(&service, nightly());

        let event = invoke(
            &service,
            Operation::Read,
            &request(ResourceModel::named("nightly")),
            None,
        );

        assert!(event.is_success());
        let model = event.resource_model.unwrap();
        assert_eq!(model.trigger_type.as_deref(), Some("SCHEDULED"));
        assert_eq!(model.schedule.as_deref(), Some("cron(0 2 * * ? *)"));
        assert_eq!(model.actions, vec![Action::job("etl")]);
        assert_eq!(model.tags, tags(&[("team", "data")]));
    }

    #[test]
    fn test_read_missing_trigger_not_found() {
        let service = MemoryService::new();

        let event = invoke(
            &service,
            Operation::Read,
            &request(ResourceModel::named("ghost")),
            None,
        );

        assert_eq!(event.error_code, Some(HandlerErrorCode::NotFound));
        assert_eq!(event.resource_model, Some(ResourceModel::named("ghost")));
        assert_eq!(service.calls(), vec![Call::GetTrigger]);
    }

    // ---- update ----

    #[test]
    fn test_update_reconciles_tags_minimally() {
        let service = MemoryService::new();
        let mut previous = nightly();
        previous.tags = tags(&[("a", "1"), ("old", "x")]);
        seed(&service, previous.clone());

        let mut desired = nightly();
        desired.tags = tags(&[("a", "1"), ("b", "2")]);
        desired.description = Some("rebuilt nightly".into());
        let req = request(desired.clone()).with_previous(previous);
        let before = service.calls().len();

        let event = invoke(&service, Operation::Update, &req, None);

        assert!(event.is_success());
        assert_eq!(event.resource_model, Some(desired));
        assert_eq!(
            service.calls()[before..],
            [Call::UpdateTrigger, Call::UntagResource, Call::TagResource]
        );
        assert_eq!(service.tags_of("nightly"), Some(tags(&[("a", "1"), ("b", "2")])));
    }

    #[test]
    fn test_update_without_tag_changes_skips_tag_calls() {
        let service = MemoryService::new();
        seed(&service, nightly());
        let req = request(nightly()).with_previous(nightly());
        let before = service.calls().len();

        let event = invoke(&service, Operation::Update, &req, None);

        assert!(event.is_success());
        assert_eq!(service.calls()[before..], [Call::UpdateTrigger]);
    }

    #[test]
    fn test_update_keeps_omitted_fields() {
        let service = MemoryService::new();
        let mut original = nightly();
        original.description = Some("first".into());
        seed(&service, original);

        let mut desired = nightly();
        desired.description = None;
        desired.actions = vec![Action::crawler("catalog")];
        invoke(&service, Operation::Update, &request(desired), None);

        let read = invoke(
            &service,
            Operation::Read,
            &request(ResourceModel::named("nightly")),
            None,
        );
        let model = read.resource_model.unwrap();
        assert_eq!(model.description.as_deref(), Some("first"));
        assert_eq!(model.actions, vec![Action::crawler("catalog")]);
    }

    #[test]
    fn test_update_tagging_denied_has_no_model() {
        let service = MemoryService::new();
        seed(&service, nightly());
        service.fail_next(
            Call::TagResource,
            ServiceError::new(
                codes::ACCESS_DENIED_EXCEPTION,
                "User is not authorized to perform: glue:TagResource",
            ),
        );
        let mut desired = nightly();
        desired.tags.insert("new".into(), "tag".into());

        let event = invoke(
            &service,
            Operation::Update,
            &request(desired).with_previous(nightly()),
            None,
        );

        assert_eq!(
            event.error_code,
            Some(HandlerErrorCode::UnauthorizedTaggingOperation)
        );
        assert!(event.resource_model.is_none());
    }

    #[test]
    fn test_update_missing_trigger_not_found() {
        let service = MemoryService::new();
        let event = invoke(&service, Operation::Update, &request(nightly()), None);
        assert_eq!(event.error_code, Some(HandlerErrorCode::NotFound));
    }

    #[test]
    fn test_update_removes_stale_request_level_tags() {
        let service = MemoryService::new();
        let mut create = request(nightly());
        create.desired_resource_tags = tags(&[("stack", "x")]);
        let first = invoke(&service, Operation::Create, &create, None);
        invoke(&service, Operation::Create, &create, first.callback_context);
        let before = service.calls().len();

        let mut update = request(nightly()).with_previous(nightly());
        update.previous_resource_tags = tags(&[("stack", "x")]);
        let event = invoke(&service, Operation::Update, &update, None);

        assert!(event.is_success());
        assert_eq!(service.calls()[before..], [Call::UpdateTrigger, Call::UntagResource]);
        assert_eq!(service.tags_of("nightly"), Some(tags(&[("team", "data")])));
    }

    #[test]
    fn test_update_request_level_tags_override_inline() {
        let service = MemoryService::new();
        let mut create = request(nightly());
        create.desired_resource_tags = tags(&[("team", "stack")]);
        let first = invoke(&service, Operation::Create, &create, None);
        invoke(&service, Operation::Create, &create, first.callback_context);
        assert_eq!(service.tags_of("nightly"), Some(tags(&[("team", "stack")])));

        let mut desired = nightly();
        desired.tags.insert("env".into(), "dev".into());
        let mut update = request(desired).with_previous(nightly());
        update.previous_resource_tags = tags(&[("team", "stack")]);
        update.desired_resource_tags = tags(&[("env", "prod")]);
        let before = service.calls().len();

        let event = invoke(&service, Operation::Update, &update, None);

        assert!(event.is_success());
        assert_eq!(service.calls()[before..], [Call::UpdateTrigger, Call::TagResource]);
        assert_eq!(
            service.tags_of("nightly"),
            Some(tags(&[("env", "prod"), ("team", "data")]))
        );
    }

    // ---- delete ----

    #[test]
    fn test_delete_polls_until_gone() {
        let service = MemoryService::new();
        seed(&service, nightly());
        let req = request(ResourceModel::named("nightly"));

        let first = invoke(&service, Operation::Delete, &req, None);
        assert!(first.is_in_progress());
        assert!(first.callback_delay_seconds > 0);
        let ctx = first.callback_context.clone().unwrap();
        assert!(ctx.delete_pre_existence_check_done);
        assert!(ctx.delete_issued);

        let second = invoke(&service, Operation::Delete, &req, Some(ctx));
        assert!(second.is_success());
        assert!(second.resource_model.is_none());
        assert_context_rule(&second);
        assert_eq!(service.call_count(Call::DeleteTrigger), 1);
        assert!(!service.contains("nightly"));
    }

    #[test]
    fn test_delete_invalid_state_not_stabilized() {
        let service = MemoryService::new();
        seed(&service, nightly());
        let req = request(ResourceModel::named("nightly"));

        let first = invoke(&service, Operation::Delete, &req, None);
        assert!(first.is_in_progress());
        assert!(service.set_state("nightly", TriggerState::Other("DUMMY_STATE".into())));

        let second = invoke(&service, Operation::Delete, &req, first.callback_context);
        assert_eq!(second.error_code, Some(HandlerErrorCode::NotStabilized));
        assert!(
            second
                .message
                .unwrap()
                .contains("Trigger entered into invalid delete state DUMMY_STATE")
        );
    }

    #[test]
    fn test_delete_missing_trigger_succeeds() {
        let service = MemoryService::new();

        let event = invoke(
            &service,
            Operation::Delete,
            &request(ResourceModel::named("ghost")),
            None,
        );

        assert!(event.is_success());
        assert!(event.resource_model.is_none());
        assert_eq!(service.call_count(Call::DeleteTrigger), 0);
    }

    #[test]
    fn test_delete_poll_throttling_retries() {
        let service = MemoryService::new();
        seed(&service, nightly());
        let req = request(ResourceModel::named("nightly"));

        let first = invoke(&service, Operation::Delete, &req, None);
        service.fail_next(
            Call::GetTrigger,
            ServiceError::new(codes::REQUEST_LIMIT_EXCEEDED, "slow down"),
        );

        let second = invoke(&service, Operation::Delete, &req, first.callback_context);
        assert!(second.is_in_progress());
        assert_eq!(second.callback_context.as_ref().unwrap().stabilization_attempts, 2);

        let third = invoke(&service, Operation::Delete, &req, second.callback_context);
        assert!(third.is_success());
        assert_eq!(service.call_count(Call::DeleteTrigger), 1);
    }

    #[test]
    fn test_delete_gives_up_after_attempt_budget() {
        let service = MemoryService::with_options(MemoryOptions {
            deletion_polls: 10,
            ..Default::default()
        });
        seed(&service, nightly());
        let config = ReconcileConfig {
            max_stabilization_attempts: 2,
            ..Default::default()
        };
        let req = request(ResourceModel::named("nightly"));

        let mut context = None;
        let mut last = None;
        for _ in 0..3 {
            let event = reconcile(&service, &config, Operation::Delete, &req, context);
            context = event.callback_context.clone();
            last = Some(event);
        }

        let last = last.unwrap();
        assert_eq!(last.error_code, Some(HandlerErrorCode::NotStabilized));
        assert!(last.callback_context.is_none());
    }

    fn assert_classified_delete_failure(event: &TriggerEvent, code: HandlerErrorCode) {
        assert!(event.is_failed());
        assert_eq!(event.error_code, Some(code));
        assert_eq!(event.resource_model, Some(ResourceModel::named("nightly")));
        assert!(event.callback_context.is_none());
    }

    #[test]
    fn test_delete_existence_check_error_is_classified() {
        let service = MemoryService::new();
        seed(&service, nightly());
        service.fail_next(
            Call::GetTrigger,
            ServiceError::new(codes::ACCESS_DENIED_EXCEPTION, "no glue:GetTrigger"),
        );

        let event = invoke(
            &service,
            Operation::Delete,
            &request(ResourceModel::named("nightly")),
            None,
        );

        assert_classified_delete_failure(&event, HandlerErrorCode::AccessDenied);
        assert_eq!(service.call_count(Call::DeleteTrigger), 0);
        assert!(service.contains("nightly"));
    }

    #[test]
    fn test_delete_call_error_is_classified() {
        let service = MemoryService::new();
        seed(&service, nightly());
        service.fail_next(
            Call::DeleteTrigger,
            ServiceError::new(codes::CONCURRENT_MODIFICATION, "trigger is being updated"),
        );

        let event = invoke(
            &service,
            Operation::Delete,
            &request(ResourceModel::named("nightly")),
            None,
        );

        assert_classified_delete_failure(&event, HandlerErrorCode::NotUpdatable);
        assert!(service.contains("nightly"));
    }

    #[test]
    fn test_delete_poll_error_is_classified() {
        let service = MemoryService::new();
        seed(&service, nightly());
        let req = request(ResourceModel::named("nightly"));

        let first = invoke(&service, Operation::Delete, &req, None);
        assert!(first.is_in_progress());
        service.fail_next(
            Call::GetTrigger,
            ServiceError::new(codes::INTERNAL_SERVICE, "internal error"),
        );

        let second = invoke(&service, Operation::Delete, &req, first.callback_context);

        assert_classified_delete_failure(&second, HandlerErrorCode::ServiceInternalError);
        assert_eq!(service.call_count(Call::DeleteTrigger), 1);
    }

    // ---- list ----

    #[test]
    fn test_list_empty_is_success() {
        let service = MemoryService::new();
        let event = invoke(&service, Operation::List, &HandlerRequest::new(None, "t"), None);

        assert!(event.is_success());
        assert_eq!(event.resource_models, Some(Vec::new()));
        assert!(event.next_token.is_none());
    }

    #[test]
    fn test_list_passes_pagination_through() {
        let service = MemoryService::with_options(MemoryOptions {
            page_size: 1,
            ..Default::default()
        });
        for name in ["a", "b"] {
            service.insert(
                TriggerSnapshot {
                    name: name.into(),
                    state: TriggerState::Created,
                    trigger_type: Some("ON_DEMAND".into()),
                    workflow_name: None,
                    schedule: None,
                    description: None,
                    actions: vec![Action::job("etl")],
                    predicate: None,
                    event_batching_condition: None,
                },
                Tags::new(),
            );
        }

        let first = invoke(&service, Operation::List, &HandlerRequest::new(None, "t"), None);
        assert_eq!(first.resource_models, Some(vec![ResourceModel::named("a")]));

        let req = HandlerRequest::new(None, "t").with_next_token(first.next_token);
        let second = invoke(&service, Operation::List, &req, None);
        assert_eq!(second.resource_models, Some(vec![ResourceModel::named("b")]));
        assert!(second.next_token.is_none());
    }

    #[test]
    fn test_list_throttled_is_retryable_failure() {
        let service = MemoryService::new();
        service.fail_next(
            Call::ListTriggers,
            ServiceError::new(codes::THROTTLING, "rate exceeded"),
        );

        let event = invoke(&service, Operation::List, &HandlerRequest::new(None, "t"), None);

        let code = event.error_code.unwrap();
        assert_eq!(code, HandlerErrorCode::Throttling);
        assert!(code.is_retryable());
    }

    // ---- driver ----

    #[test]
    fn test_full_lifecycle_through_driver() {
        let service = MemoryService::new();
        let handler = TriggerHandler::new(&service, ReconcileConfig::default());
        let opts = DriveOptions::default();

        let (created, _) =
            run_to_completion(&handler, Operation::Create, &request(nightly()), &opts, &mut NoWait)
                .unwrap();
        assert!(created.is_success());

        let named = request(ResourceModel::named("nightly"));
        let (read, invocations) =
            run_to_completion(&handler, Operation::Read, &named, &opts, &mut NoWait).unwrap();
        assert!(read.is_success());
        assert_eq!(invocations, 1);

        let (deleted, invocations) =
            run_to_completion(&handler, Operation::Delete, &named, &opts, &mut NoWait).unwrap();
        assert!(deleted.is_success());
        assert_eq!(invocations, 2);
        assert!(!service.contains("nightly"));
    }
}
