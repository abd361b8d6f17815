//! Reconciliation tuning

use serde::{Deserialize, Serialize};

const MIN_GENERATED_NAME_LENGTH: usize = 13;

/// Delays and bounds used while reconciling
///
/// Loaded from the `[reconcile]` table of the host's config file; every
/// field falls back to its default when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Callback delay after create's existence check found nothing
    pub existence_check_delay_seconds: u32,

    /// Callback delay between deletion polls
    pub stabilization_delay_seconds: u32,

    /// Deletion polls allowed before giving up
    pub max_stabilization_attempts: u32,

    /// Upper bound for generated trigger names
    pub generated_name_max_length: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            existence_check_delay_seconds: 1,
            stabilization_delay_seconds: 5,
            max_stabilization_attempts: 60,
            generated_name_max_length: 40,
        }
    }
}

impl ReconcileConfig {
    /// Existence-check delay, never zero
    pub fn existence_delay(&self) -> u32 {
        self.existence_check_delay_seconds.max(1)
    }

    /// Stabilization delay, never zero
    pub fn stabilization_delay(&self) -> u32 {
        self.stabilization_delay_seconds.max(1)
    }

    /// Generated name bound, never shorter than the hash suffix plus separator
    pub fn generated_name_length(&self) -> usize {
        self.generated_name_max_length.max(MIN_GENERATED_NAME_LENGTH)
    }
}
