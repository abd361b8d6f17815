//! In-process trigger store
//!
//! `MemoryService` behaves like the remote service closely enough to drive
//! every reconciliation path locally: names are unique, missing triggers
//! fail with `EntityNotFoundException`, deletion stays visible as
//! `DELETING` for a configurable number of reads, and listings paginate.
//!
//! Tests script failures per call kind with [`MemoryService::fail_next`] and
//! inspect the call log with [`MemoryService::calls`]. The host persists the
//! store between runs through [`TriggerStore`].

use super::{
    ServiceError, ServiceResult, TriggerPage, TriggerService, TriggerSnapshot, TriggerSpec,
    TriggerState, TriggerUpdate, codes,
};
use crate::arn;
use crate::model::Tags;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Kinds of remote calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Call {
    CreateTrigger,
    GetTrigger,
    UpdateTrigger,
    DeleteTrigger,
    ListTriggers,
    GetTags,
    TagResource,
    UntagResource,
}

impl Call {
    /// Whether the call changes remote state
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::GetTrigger | Self::ListTriggers | Self::GetTags)
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateTrigger => "CreateTrigger",
            Self::GetTrigger => "GetTrigger",
            Self::UpdateTrigger => "UpdateTrigger",
            Self::DeleteTrigger => "DeleteTrigger",
            Self::ListTriggers => "ListTriggers",
            Self::GetTags => "GetTags",
            Self::TagResource => "TagResource",
            Self::UntagResource => "UntagResource",
        };
        f.write_str(s)
    }
}

/// Behavior knobs for the in-process store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryOptions {
    /// Names returned per listing page
    pub page_size: usize,
    /// Reads that still see a deleted trigger as `DELETING`
    pub deletion_polls: u32,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            page_size: 50,
            deletion_polls: 1,
        }
    }
}

/// One stored trigger with its tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTrigger {
    pub snapshot: TriggerSnapshot,
    #[serde(default)]
    pub tags: Tags,
    /// Reads left before a deleting trigger disappears
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_polls_left: Option<u32>,
}

/// Serializable contents of a [`MemoryService`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerStore {
    #[serde(default)]
    pub triggers: BTreeMap<String, StoredTrigger>,
}

/// In-process [`TriggerService`]
#[derive(Debug, Default)]
pub struct MemoryService {
    store: Mutex<TriggerStore>,
    options: MemoryOptions,
    failures: Mutex<HashMap<Call, VecDeque<ServiceError>>>,
    calls: Mutex<Vec<Call>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MemoryOptions) -> Self {
        Self::from_store(TriggerStore::default(), options)
    }

    /// Resume from a persisted store
    pub fn from_store(store: TriggerStore, options: MemoryOptions) -> Self {
        Self {
            store: Mutex::new(store),
            options,
            failures: Mutex::default(),
            calls: Mutex::default(),
        }
    }

    /// Copy of the current store, for persisting
    pub fn store(&self) -> TriggerStore {
        lock(&self.store).clone()
    }

    /// Seed a trigger directly, bypassing the call log
    pub fn insert(&self, snapshot: TriggerSnapshot, tags: Tags) {
        lock(&self.store).triggers.insert(
            snapshot.name.clone(),
            StoredTrigger {
                snapshot,
                tags,
                deletion_polls_left: None,
            },
        );
    }

    /// Force a trigger into `state`; returns false if it does not exist
    pub fn set_state(&self, name: &str, state: TriggerState) -> bool {
        let mut store = lock(&self.store);
        match store.triggers.get_mut(name) {
            Some(stored) => {
                if state != TriggerState::Deleting {
                    stored.deletion_polls_left = None;
                }
                stored.snapshot.state = state;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        lock(&self.store).triggers.contains_key(name)
    }

    /// Tags currently stored for a trigger
    pub fn tags_of(&self, name: &str) -> Option<Tags> {
        lock(&self.store)
            .triggers
            .get(name)
            .map(|stored| stored.tags.clone())
    }

    /// Fail the next `call` with `err`; queued failures are used in order
    pub fn fail_next(&self, call: Call, err: ServiceError) {
        lock(&self.failures).entry(call).or_default().push_back(err);
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, call: Call) -> usize {
        lock(&self.calls).iter().filter(|c| **c == call).count()
    }

    /// Whether any mutating call was made
    pub fn mutated(&self) -> bool {
        lock(&self.calls).iter().any(Call::is_mutating)
    }

    fn begin(&self, call: Call) -> ServiceResult<()> {
        lock(&self.calls).push(call);
        let scripted = lock(&self.failures)
            .get_mut(&call)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(err) => {
                log::debug!("{call} failing as scripted: {err}");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn name_from_arn(resource_arn: &str) -> ServiceResult<&str> {
        arn::trigger_name(resource_arn).ok_or_else(|| {
            ServiceError::new(
                codes::INVALID_INPUT,
                format!("Invalid trigger ARN: {resource_arn}"),
            )
        })
    }
}

impl TriggerService for MemoryService {
    fn create_trigger(&self, spec: &TriggerSpec, tags: &Tags) -> ServiceResult<String> {
        self.begin(Call::CreateTrigger)?;

        if spec.name.is_empty() {
            return Err(ServiceError::new(
                codes::INVALID_INPUT,
                "Trigger name cannot be empty",
            ));
        }
        if spec.trigger_type.as_deref().is_none_or(str::is_empty) {
            return Err(ServiceError::new(
                codes::INVALID_INPUT,
                "Trigger type cannot be empty",
            ));
        }

        let mut store = lock(&self.store);
        if store.triggers.contains_key(&spec.name) {
            return Err(ServiceError::new(
                codes::ALREADY_EXISTS_EXCEPTION,
                format!("Trigger {} already exists", spec.name),
            ));
        }

        let state = if spec.start_on_creation == Some(true) {
            TriggerState::Activated
        } else {
            TriggerState::Created
        };
        store.triggers.insert(
            spec.name.clone(),
            StoredTrigger {
                snapshot: TriggerSnapshot::from_spec(spec, state),
                tags: tags.clone(),
                deletion_polls_left: None,
            },
        );
        Ok(spec.name.clone())
    }

    fn get_trigger(&self, name: &str) -> ServiceResult<TriggerSnapshot> {
        self.begin(Call::GetTrigger)?;

        let mut store = lock(&self.store);
        let Some(stored) = store.triggers.get_mut(name) else {
            return Err(ServiceError::not_found(name));
        };

        let polls_left = stored.deletion_polls_left;
        match polls_left {
            Some(0) => {
                store.triggers.remove(name);
                Err(ServiceError::not_found(name))
            }
            Some(left) => {
                stored.deletion_polls_left = Some(left - 1);
                Ok(stored.snapshot.clone())
            }
            None => Ok(stored.snapshot.clone()),
        }
    }

    fn update_trigger(&self, name: &str, update: &TriggerUpdate) -> ServiceResult<TriggerSnapshot> {
        self.begin(Call::UpdateTrigger)?;

        let mut store = lock(&self.store);
        let stored = store
            .triggers
            .get_mut(name)
            .ok_or_else(|| ServiceError::not_found(name))?;
        if stored.snapshot.state == TriggerState::Deleting {
            return Err(ServiceError::new(
                codes::CONCURRENT_MODIFICATION,
                format!("Trigger {name} is being deleted"),
            ));
        }
        stored.snapshot.apply(update);
        Ok(stored.snapshot.clone())
    }

    fn delete_trigger(&self, name: &str) -> ServiceResult<()> {
        self.begin(Call::DeleteTrigger)?;

        let mut store = lock(&self.store);
        if !store.triggers.contains_key(name) {
            return Err(ServiceError::not_found(name));
        }
        if self.options.deletion_polls == 0 {
            store.triggers.remove(name);
            return Ok(());
        }
        if let Some(stored) = store.triggers.get_mut(name)
            && stored.deletion_polls_left.is_none()
        {
            stored.snapshot.state = TriggerState::Deleting;
            stored.deletion_polls_left = Some(self.options.deletion_polls);
        }
        Ok(())
    }

    fn list_triggers(&self, next_token: Option<&str>) -> ServiceResult<TriggerPage> {
        self.begin(Call::ListTriggers)?;

        let store = lock(&self.store);
        let page_size = self.options.page_size.max(1);
        let mut remaining = store
            .triggers
            .keys()
            .filter(|name| next_token.is_none_or(|token| name.as_str() >= token));

        let names: Vec<String> = remaining.by_ref().take(page_size).cloned().collect();
        let next_token = remaining.next().cloned();
        Ok(TriggerPage { names, next_token })
    }

    fn get_tags(&self, resource_arn: &str) -> ServiceResult<Tags> {
        self.begin(Call::GetTags)?;

        let name = Self::name_from_arn(resource_arn)?;
        lock(&self.store)
            .triggers
            .get(name)
            .map(|stored| stored.tags.clone())
            .ok_or_else(|| ServiceError::not_found(name))
    }

    fn tag_resource(&self, resource_arn: &str, tags: &Tags) -> ServiceResult<()> {
        self.begin(Call::TagResource)?;

        let name = Self::name_from_arn(resource_arn)?;
        let mut store = lock(&self.store);
        let stored = store
            .triggers
            .get_mut(name)
            .ok_or_else(|| ServiceError::not_found(name))?;
        stored
            .tags
            .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    fn untag_resource(&self, resource_arn: &str, keys: &[String]) -> ServiceResult<()> {
        self.begin(Call::UntagResource)?;

        let name = Self::name_from_arn(resource_arn)?;
        let mut store = lock(&self.store);
        let stored = store
            .triggers
            .get_mut(name)
            .ok_or_else(|| ServiceError::not_found(name))?;
        for key in keys {
            stored.tags.remove(key);
        }
        Ok(())
    }
}
