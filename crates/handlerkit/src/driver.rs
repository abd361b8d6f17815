//! Host-side driver - re-invokes a handler until it reaches a terminal event
//!
//! This plays the part of the host: it hands the continuation from one
//! invocation to the next (through its serialized form, exactly as a real
//! host would store it), feeds the in-progress model back in as the desired
//! state, and waits out each callback delay through a [`WaitCallback`].

use crate::continuation::{decode, encode};
use crate::error::{Error, Result};
use crate::handler::Handler;
use crate::request::HandlerRequest;
use crate::types::{Operation, ProgressEvent};
use std::thread;
use std::time::Duration;

/// Callback for waiting between invocations
pub trait WaitCallback {
    /// Called after `invocation` returned IN_PROGRESS with `delay_seconds`
    fn wait(&mut self, delay_seconds: u32, invocation: u32);
}

/// Never waits; useful for tests and dry runs
pub struct NoWait;

impl WaitCallback for NoWait {
    fn wait(&mut self, _delay_seconds: u32, _invocation: u32) {}
}

/// Sleeps the current thread for the requested delay
pub struct SleepWait;

impl WaitCallback for SleepWait {
    fn wait(&mut self, delay_seconds: u32, invocation: u32) {
        if delay_seconds > 0 {
            log::info!("Invocation {invocation} in progress, calling back in {delay_seconds}s");
            thread::sleep(Duration::from_secs(u64::from(delay_seconds)));
        }
    }
}

/// Options for driving an operation
#[derive(Debug, Clone)]
pub struct DriveOptions {
    /// Give up after this many invocations
    pub max_invocations: u32,
}

impl Default for DriveOptions {
    fn default() -> Self {
        Self {
            max_invocations: 100,
        }
    }
}

/// Drive `operation` to a terminal event
///
/// Returns the terminal event and the number of invocations it took.
pub fn run_to_completion<H, W>(
    handler: &H,
    operation: Operation,
    request: &HandlerRequest<H::Model>,
    opts: &DriveOptions,
    wait: &mut W,
) -> Result<(ProgressEvent<H::Model, H::Context>, u32)>
where
    H: Handler,
    W: WaitCallback + ?Sized,
{
    let mut request = request.clone();
    let mut context: Option<H::Context> = None;

    for invocation in 1..=opts.max_invocations {
        let event = handler.handle(operation, &request, context.take());
        if event.status.is_terminal() {
            log::debug!("{operation} finished with {} after {invocation} invocation(s)", event.status);
            return Ok((event, invocation));
        }

        let raw = encode(
            event
                .callback_context
                .as_ref()
                .ok_or(Error::MissingContinuation)?,
        )?;
        log::trace!("{operation} continuation after invocation {invocation}: {raw}");

        if let Some(model) = event.resource_model {
            request.desired_resource_state = Some(model);
        }

        wait.wait(event.callback_delay_seconds, invocation);
        context = Some(decode(&raw)?);
    }

    Err(Error::InvocationLimit {
        limit: opts.max_invocations,
    })
}
