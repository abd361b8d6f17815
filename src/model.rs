//! Trigger resource model
//!
//! The declared shape of a trigger as the caller describes it. Field names
//! serialize in PascalCase to match resource documents written by hand.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// String-keyed tag map
pub type Tags = BTreeMap<String, String>;

/// Declared identity and configuration of a trigger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceModel {
    /// Trigger name; assigned once and never changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `SCHEDULED`, `CONDITIONAL`, `ON_DEMAND` or `EVENT`
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub trigger_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,

    /// Cron expression for scheduled triggers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_on_creation: Option<bool>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Predicate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_batching_condition: Option<EventBatchingCondition>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: Tags,
}

impl ResourceModel {
    /// Model that carries only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Name, if present and non-empty
    pub fn name(&self) -> Option<&str> {
        non_empty(self.name.as_deref())
    }

    /// Type, if present and non-empty
    pub fn trigger_type(&self) -> Option<&str> {
        non_empty(self.trigger_type.as_deref())
    }

    /// Whether the model has the fields every mutation needs
    pub fn has_type_and_actions(&self) -> bool {
        self.trigger_type().is_some() && !self.actions.is_empty()
    }
}

/// One thing the trigger starts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Action {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawler_name: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, String>,

    /// Run timeout in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_configuration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_property: Option<NotificationProperty>,
}

impl Action {
    /// Action that starts a job
    pub fn job(name: impl Into<String>) -> Self {
        Self {
            job_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Action that starts a crawler
    pub fn crawler(name: impl Into<String>) -> Self {
        Self {
            crawler_name: Some(name.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NotificationProperty {
    /// Minutes after a run starts before a delay notification is sent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_delay_after: Option<u32>,
}

/// Logical combination of job and crawler state conditions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Predicate {
    /// `AND` or `ANY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Condition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawler_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawl_state: Option<String>,
}

/// Batch of events that fires an `EVENT` trigger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EventBatchingCondition {
    pub batch_size: u32,

    /// Window in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_window: Option<u32>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
