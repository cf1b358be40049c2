//! Toolchain access for trial builds.
//!
//! This module implements the compiler driver used to preprocess, compile
//! and link the minimal programs that probe the target library.

pub mod toolchain;
pub mod trial;

pub use toolchain::{
    detect_toolchain, CommandSpec, GccToolchain, Toolchain, ToolchainPlatform, TrialInput,
};
pub use trial::{ToolchainTrialRunner, TrialMode, TrialOutcome, TrialProgram, TrialRunner};
