//! z80conf - capability prober and build-descriptor generator
//!
//! This crate checks that a C toolchain can see the Z80 emulator library
//! (header, library, functions and macros), turns the optional pieces it
//! finds into feature defines, and writes a build descriptor for the
//! binding's native extension.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for z80conf unit tests.
///
/// This module is only available when compiling with `--cfg test`.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    BuildDescriptor, DescriptorFormat, FeatureSet, ProbeEntry, ProbeRecord, ProbeResult,
    ProbeSpec, Requirement, SearchPaths, TargetLibrary, Z80,
};
pub use crate::ops::{configure, ConfigureError, ConfigureOptions, ConfigureReport};
