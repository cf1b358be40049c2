//! Policy evaluator: walk the probe table, abort on the first missing
//! mandatory item, and collect the optional features that are present.

use anyhow::Result;
use serde::Serialize;

use crate::core::{FeatureSet, ProbeEntry, ProbeResult, ProbeSpec, Requirement};
use crate::ops::errors::ConfigureError;
use crate::ops::probe::Prober;

/// Progress notifications emitted while the table is evaluated.
#[derive(Debug, Clone, Copy)]
pub enum ProbeEvent<'a> {
    /// A probe is about to run.
    Started {
        entry: &'a ProbeEntry,
        index: usize,
        total: usize,
    },
    /// A probe has finished.
    Finished {
        entry: &'a ProbeEntry,
        result: &'a ProbeResult,
    },
}

/// Outcome of a table evaluation in which every mandatory item was present.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Evaluation {
    /// Optional features that are available
    pub features: FeatureSet,
    /// Recorded-only probes and whether they were found
    pub recorded: Vec<(ProbeSpec, bool)>,
    /// Libraries to link, in probe order
    pub libraries: Vec<String>,
}

/// Evaluate `table` in order through `prober`.
///
/// The first mandatory failure stops the walk; no later probe runs. The
/// returned error downcasts to [`ConfigureError`].
pub fn evaluate(
    table: &[ProbeEntry],
    prober: &mut Prober<'_>,
    on_event: &mut dyn FnMut(ProbeEvent<'_>),
) -> Result<Evaluation> {
    let mut evaluation = Evaluation::default();
    let total = table.len();

    for (index, entry) in table.iter().enumerate() {
        on_event(ProbeEvent::Started {
            entry,
            index,
            total,
        });

        let result = match entry.requirement {
            Requirement::Recorded => prober.probe_unlinked(&entry.spec)?,
            Requirement::Mandatory | Requirement::Optional => prober.probe(&entry.spec)?,
        };

        on_event(ProbeEvent::Finished {
            entry,
            result: &result,
        });

        match entry.requirement {
            Requirement::Mandatory => {
                if !result.found {
                    return Err(missing_error(&entry.spec, &result).into());
                }
            }
            Requirement::Optional => {
                if evaluation.features.record(entry.spec.name(), &result) {
                    tracing::info!("optional feature {} available", entry.spec);
                } else {
                    tracing::debug!("optional feature {} not available", entry.spec);
                }
            }
            Requirement::Recorded => {
                evaluation.recorded.push((entry.spec.clone(), result.found));
            }
        }
    }

    evaluation.libraries = prober.linked_libraries();
    Ok(evaluation)
}

/// The error naming a missing mandatory item.
pub fn missing_error(spec: &ProbeSpec, result: &ProbeResult) -> ConfigureError {
    let diagnostic = result.diagnostic.clone();
    match spec {
        ProbeSpec::Header { name } => ConfigureError::MissingHeader {
            header: name.clone(),
            diagnostic,
        },
        ProbeSpec::Library { name } => ConfigureError::MissingLibrary {
            library: name.clone(),
            diagnostic,
        },
        ProbeSpec::Symbol { name, .. } => ConfigureError::MissingMandatoryFunction {
            name: name.clone(),
            diagnostic,
        },
        ProbeSpec::Macro { name, .. } => ConfigureError::MissingMandatoryMacro {
            name: name.clone(),
            diagnostic,
        },
    }
}
