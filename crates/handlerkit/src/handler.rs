//! Handler trait for resumable resource operations

use crate::continuation::Continuation;
use crate::request::HandlerRequest;
use crate::types::{Operation, ProgressEvent};

/// A resource handler driven by repeated invocations
///
/// Each call to [`Handler::handle`] performs as much of the operation as it
/// can without waiting, then returns:
/// - a terminal event (`SUCCESS` or `FAILED`), or
/// - `IN_PROGRESS` with a continuation and a callback delay.
///
/// The host invokes the handler again with the returned continuation once
/// the delay has elapsed. Implementations must not keep state anywhere but
/// the continuation, and must not block waiting for remote state to change.
///
/// # Example
///
/// ```ignore
/// impl Handler for TriggerHandler<'_> {
///     type Model = ResourceModel;
///     type Context = CallbackContext;
///
///     fn handle(
///         &self,
///         operation: Operation,
///         request: &HandlerRequest<ResourceModel>,
///         context: Option<CallbackContext>,
///     ) -> ProgressEvent<ResourceModel, CallbackContext> {
///         reconcile(self.service, &self.config, operation, request, context)
///     }
/// }
/// ```
pub trait Handler {
    /// Resource model the handler reconciles
    type Model: Clone;
    /// Continuation carried between invocations
    type Context: Continuation;

    /// Serve one invocation of `operation`
    ///
    /// `context` is `None` on the first invocation of an operation.
    fn handle(
        &self,
        operation: Operation,
        request: &HandlerRequest<Self::Model>,
        context: Option<Self::Context>,
    ) -> ProgressEvent<Self::Model, Self::Context>;
}
