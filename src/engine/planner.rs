//! Step tables - the fixed pipeline each operation runs

use handlerkit::Operation;
use std::fmt;

/// One suspend-capable step of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Type and actions present
    ValidateCreate,
    /// Name present
    ValidateName,
    /// Name, type and actions present
    ValidateUpdate,
    /// Generate a name when the caller gave none
    AssignName,
    CreateExistenceCheck,
    CreateTrigger,
    FetchTrigger,
    FetchTags,
    AssembleModel,
    UpdateTrigger,
    RemoveTags,
    AddTags,
    ReportDesired,
    DeleteExistenceCheck,
    DeleteTrigger,
    AwaitDeletion,
    ListTriggers,
}

const CREATE: &[Step] = &[
    Step::ValidateCreate,
    Step::AssignName,
    Step::CreateExistenceCheck,
    Step::CreateTrigger,
];

const READ: &[Step] = &[
    Step::ValidateName,
    Step::FetchTrigger,
    Step::FetchTags,
    Step::AssembleModel,
];

const UPDATE: &[Step] = &[
    Step::ValidateUpdate,
    Step::UpdateTrigger,
    Step::RemoveTags,
    Step::AddTags,
    Step::ReportDesired,
];

const DELETE: &[Step] = &[
    Step::ValidateName,
    Step::DeleteExistenceCheck,
    Step::DeleteTrigger,
    Step::AwaitDeletion,
];

const LIST: &[Step] = &[Step::ListTriggers];

/// Ordered steps for an operation
pub fn steps(operation: Operation) -> &'static [Step] {
    match operation {
        Operation::Create => CREATE,
        Operation::Read => READ,
        Operation::Update => UPDATE,
        Operation::Delete => DELETE,
        Operation::List => LIST,
    }
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidateCreate => "validate-create",
            Self::ValidateName => "validate-name",
            Self::ValidateUpdate => "validate-update",
            Self::AssignName => "assign-name",
            Self::CreateExistenceCheck => "create-existence-check",
            Self::CreateTrigger => "create-trigger",
            Self::FetchTrigger => "fetch-trigger",
            Self::FetchTags => "fetch-tags",
            Self::AssembleModel => "assemble-model",
            Self::UpdateTrigger => "update-trigger",
            Self::RemoveTags => "remove-tags",
            Self::AddTags => "add-tags",
            Self::ReportDesired => "report-desired",
            Self::DeleteExistenceCheck => "delete-existence-check",
            Self::DeleteTrigger => "delete-trigger",
            Self::AwaitDeletion => "await-deletion",
            Self::ListTriggers => "list-triggers",
        }
    }

    /// Whether the step can call the remote service
    pub fn is_remote(&self) -> bool {
        !matches!(
            self,
            Self::ValidateCreate
                | Self::ValidateName
                | Self::ValidateUpdate
                | Self::AssignName
                | Self::AssembleModel
                | Self::ReportDesired
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
