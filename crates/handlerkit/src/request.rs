//! Request passed to every handler invocation
//!
//! The request is immutable input: the same request is handed to every
//! invocation of one logical operation, alongside the continuation the
//! previous invocation produced.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the host knows about the operation being served
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest<M> {
    /// Model the caller wants the resource to match
    #[serde(default)]
    pub desired_resource_state: Option<M>,
    /// Model the resource was last reconciled to (updates only)
    #[serde(default)]
    pub previous_resource_state: Option<M>,
    /// Request-level tags the host wants applied on top of model tags
    #[serde(default)]
    pub desired_resource_tags: BTreeMap<String, String>,
    /// Request-level tags applied by the previous reconciliation
    #[serde(default)]
    pub previous_resource_tags: BTreeMap<String, String>,
    /// Logical name of the resource in the caller's template
    #[serde(default)]
    pub logical_resource_identifier: Option<String>,
    /// Token identifying this logical operation across invocations
    #[serde(default)]
    pub client_request_token: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub aws_account_id: String,
    #[serde(default)]
    pub stack_id: Option<String>,
    /// Pagination token for list requests
    #[serde(default)]
    pub next_token: Option<String>,
}

impl<M> HandlerRequest<M> {
    /// Create a request for a desired model and client token
    pub fn new(desired: Option<M>, client_request_token: impl Into<String>) -> Self {
        Self {
            desired_resource_state: desired,
            previous_resource_state: None,
            desired_resource_tags: BTreeMap::new(),
            previous_resource_tags: BTreeMap::new(),
            logical_resource_identifier: None,
            client_request_token: client_request_token.into(),
            region: String::new(),
            aws_account_id: String::new(),
            stack_id: None,
            next_token: None,
        }
    }

    /// Set the region and account the resource lives in
    pub fn with_location(mut self, region: impl Into<String>, account: impl Into<String>) -> Self {
        self.region = region.into();
        self.aws_account_id = account.into();
        self
    }

    /// Set the previous model
    pub fn with_previous(mut self, previous: M) -> Self {
        self.previous_resource_state = Some(previous);
        self
    }

    /// Set the logical identifier used for generated names
    pub fn with_logical_id(mut self, logical_id: impl Into<String>) -> Self {
        self.logical_resource_identifier = Some(logical_id.into());
        self
    }

    /// Set the pagination token
    pub fn with_next_token(mut self, token: Option<String>) -> Self {
        self.next_token = token;
        self
    }

    /// Stack id for log lines, or `-` when the request has none
    pub fn stack_label(&self) -> &str {
        self.stack_id.as_deref().unwrap_or("-")
    }
}
