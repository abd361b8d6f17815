//! Tag set reconciliation

use crate::model::Tags;

/// Minimal change turning one tag set into another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDelta {
    /// Keys to add or overwrite
    pub to_add: Tags,
    /// Keys to remove, with the values they had
    pub to_remove: Tags,
}

impl TagDelta {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Keys of `to_remove`, as the untag call expects them
    pub fn remove_keys(&self) -> Vec<String> {
        self.to_remove.keys().cloned().collect()
    }
}

/// Layer request-level tags over the model's inline tags
pub fn merge(inline: &Tags, request_level: &Tags) -> Tags {
    let mut merged = inline.clone();
    merged.extend(request_level.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Compute the delta from `previous` to `desired`
pub fn diff(previous: &Tags, desired: &Tags) -> TagDelta {
    let to_remove = previous
        .iter()
        .filter(|(key, _)| !desired.contains_key(*key))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let to_add = desired
        .iter()
        .filter(|(key, value)| previous.get(*key) != Some(*value))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    TagDelta { to_add, to_remove }
}
