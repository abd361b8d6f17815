//! # Handlerkit
//!
//! Building blocks for resumable resource handlers.
//!
//! A handler reconciles one remote resource through a series of short,
//! independent invocations. Each invocation returns a [`ProgressEvent`]:
//! either a terminal outcome, or `IN_PROGRESS` together with a continuation
//! and a delay after which the host should invoke the handler again.
//!
//! ## Core Concepts
//!
//! - **Operation**: the kind of request (create, read, update, delete, list)
//! - **HandlerRequest**: desired/previous models plus request-scoped metadata
//! - **ProgressEvent**: the outcome of a single invocation
//! - **Continuation**: serializable state carried between invocations
//! - **Handler**: anything that turns a request into a progress event
//!
//! ## Example
//!
//! ```ignore
//! use handlerkit::{
//!     DriveOptions, Handler, HandlerRequest, NoWait, Operation, ProgressEvent,
//!     run_to_completion,
//! };
//!
//! let request = HandlerRequest::new(Some(model), "token-1");
//! let (event, invocations) = run_to_completion(
//!     &handler,
//!     Operation::Delete,
//!     &request,
//!     &DriveOptions::default(),
//!     &mut NoWait,
//! )?;
//! assert!(event.is_success());
//! ```
//!
//! ## Host Traits
//!
//! - [`Handler`]: implemented by resource handlers
//! - [`WaitCallback`]: how the host waits out a callback delay
//!
//! The driver only waits through [`WaitCallback`]. [`SleepWait`] blocks the
//! current thread; [`NoWait`] returns at once.

pub mod continuation;
pub mod driver;
pub mod error;
pub mod handler;
pub mod identifier;
pub mod request;
pub mod types;

// Re-export main types at crate root
pub use continuation::{Continuation, decode, encode};
pub use driver::{DriveOptions, NoWait, SleepWait, WaitCallback, run_to_completion};
pub use error::{Error, Result};
pub use handler::Handler;
pub use identifier::generate_resource_identifier;
pub use request::HandlerRequest;
pub use types::{HandlerErrorCode, Operation, OperationStatus, ProgressEvent};
