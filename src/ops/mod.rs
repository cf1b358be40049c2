//! High-level operations.
//!
//! The configure pipeline in stage order: locate, probe, evaluate, emit.

pub mod configure;
pub mod emit;
pub mod errors;
pub mod locate;
pub mod policy;
pub mod probe;

pub use configure::{configure, render_probe_log, ConfigureOptions, ConfigureReport, LOG_FILE_NAME};
pub use emit::{build_descriptor, find_sources, write_descriptor, EmitSettings};
pub use errors::ConfigureError;
pub use locate::{locate, split_path_lists, LocatorHints};
pub use policy::{evaluate, Evaluation, ProbeEvent};
pub use probe::Prober;
