//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use super::{CommandSpec, Toolchain, ToolchainPlatform, TrialInput};

/// GCC/Clang toolchain (Unix-like systems).
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C compiler
    pub cc: PathBuf,
    /// Compiler family (gcc, clang, apple-clang)
    pub family: ToolchainPlatform,
}

impl GccToolchain {
    /// Create a new GCC-style toolchain.
    pub fn new(cc: PathBuf, family: ToolchainPlatform) -> Self {
        GccToolchain { cc, family }
    }

    /// Compiler, user flags and include directories, shared by every mode.
    fn base_command(&self, input: &TrialInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cc);

        // Custom flags
        cmd = cmd.args(input.cflags.iter().cloned());

        // Include directories
        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        cmd
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cc
    }

    fn preprocess_command(&self, input: &TrialInput) -> CommandSpec {
        self.base_command(input)
            .arg("-E")
            .arg(input.source.display().to_string())
            .arg("-o")
            .arg(input.output.display().to_string())
    }

    fn compile_command(&self, input: &TrialInput) -> CommandSpec {
        self.base_command(input)
            .arg("-c")
            .arg(input.source.display().to_string())
            .arg("-o")
            .arg(input.output.display().to_string())
    }

    fn link_command(&self, input: &TrialInput) -> CommandSpec {
        let mut cmd = self
            .base_command(input)
            .arg(input.source.display().to_string())
            .arg("-o")
            .arg(input.output.display().to_string());

        // Library search paths
        for dir in &input.lib_dirs {
            cmd = cmd.arg(format!("-L{}", dir.display()));
        }

        // Custom linker flags
        cmd = cmd.args(input.ldflags.iter().cloned());

        // Libraries come last so the linker sees the references first
        for lib in &input.libs {
            cmd = cmd.arg(format!("-l{}", lib));
        }

        cmd
    }

    fn object_extension(&self) -> &str {
        "o"
    }

    fn exe_extension(&self) -> &str {
        if cfg!(windows) {
            "exe"
        } else {
            ""
        }
    }
}
