//! Toolchain abstraction for C compilers.
//!
//! This module provides a unified interface for generating the
//! preprocess, compile and link commands used by trial programs.
//!
//! Toolchain detection priority:
//! 1. Explicit override (`--cc` or `toolchain.cc` in `z80conf.toml`)
//! 2. Environment variable (CC)
//! 3. Auto-detection (searching PATH for common compilers)

use std::path::{Path, PathBuf};

mod detect;
mod gcc;

pub use detect::{detect_compiler_family, detect_toolchain};
pub use gcc::GccToolchain;

/// A command to execute, with program, arguments, and environment.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The program to run (e.g., "gcc")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Input for a single trial invocation.
#[derive(Debug, Clone, Default)]
pub struct TrialInput {
    /// Source file of the trial program
    pub source: PathBuf,
    /// Output file (preprocessed text, object, or executable)
    pub output: PathBuf,
    /// Include directories
    pub include_dirs: Vec<PathBuf>,
    /// Library search paths
    pub lib_dirs: Vec<PathBuf>,
    /// Libraries to link (without -l prefix)
    pub libs: Vec<String>,
    /// Additional compiler flags
    pub cflags: Vec<String>,
    /// Additional linker flags
    pub ldflags: Vec<String>,
}

/// The platform/family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainPlatform {
    /// GCC (GNU Compiler Collection)
    Gcc,
    /// Clang/LLVM
    Clang,
    /// Apple Clang (macOS)
    AppleClang,
}

impl ToolchainPlatform {
    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainPlatform::Gcc => "gcc",
            ToolchainPlatform::Clang => "clang",
            ToolchainPlatform::AppleClang => "apple-clang",
        }
    }
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows how to generate trial commands for its compiler.
pub trait Toolchain: Send + Sync {
    /// Get the toolchain platform.
    fn platform(&self) -> ToolchainPlatform;

    /// Get the C compiler path.
    fn compiler_path(&self) -> &Path;

    /// Generate a preprocess-only command.
    fn preprocess_command(&self, input: &TrialInput) -> CommandSpec;

    /// Generate a compile-only command (no link).
    fn compile_command(&self, input: &TrialInput) -> CommandSpec;

    /// Generate a compile-and-link command producing an executable.
    fn link_command(&self, input: &TrialInput) -> CommandSpec;

    /// Get the object file extension.
    fn object_extension(&self) -> &str;

    /// Get the executable extension.
    fn exe_extension(&self) -> &str;
}
