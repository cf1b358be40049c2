//! Core data structures for z80conf.
//!
//! This module contains the types the configuration pipeline passes
//! between its stages:
//! - Search paths (include/library directories)
//! - Probe specifications, results and the probe record
//! - Feature sets of detected optional capabilities
//! - The target library table and the build descriptor

pub mod descriptor;
pub mod feature;
pub mod probe;
pub mod search_paths;
pub mod target;

pub use descriptor::{BuildDescriptor, DescriptorFormat};
pub use feature::FeatureSet;
pub use probe::{ProbeEntry, ProbeKind, ProbeRecord, ProbeResult, ProbeSpec, Requirement};
pub use search_paths::SearchPaths;
pub use target::{TargetLibrary, TargetName, Z80};
