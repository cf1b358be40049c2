//! Optional features detected during configuration.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::probe::ProbeResult;

/// Names of optional features whose probe succeeded.
///
/// Mandatory items never appear here, and neither does anything whose probe
/// failed: [`FeatureSet::record`] is the only way in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureSet {
    names: BTreeSet<String>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` if `result` reports it present. Returns whether it was added.
    pub fn record(&mut self, name: &str, result: &ProbeResult) -> bool {
        if !result.found {
            return false;
        }
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// One conditional-compilation define per feature, sorted.
    pub fn defines(&self) -> BTreeSet<String> {
        self.names.iter().map(|n| define_name(n)).collect()
    }
}

/// `HAVE_` followed by the name upper-cased, non-alphanumerics mapped to `_`.
///
/// `z80_special_reset` becomes `HAVE_Z80_SPECIAL_RESET`, `Z80.h` becomes
/// `HAVE_Z80_H`.
pub fn define_name(name: &str) -> String {
    let body: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("HAVE_{}", body)
}
