//! Trial programs and the capability that runs them.
//!
//! The prober never talks to a compiler directly. It hands a
//! [`TrialProgram`] to a [`TrialRunner`] and gets back a [`TrialOutcome`]:
//! whether the program preprocessed, compiled or linked, plus whatever the
//! toolchain printed. [`ToolchainTrialRunner`] is the real implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::toolchain::{Toolchain, TrialInput};
use crate::util::process::{output_text, ProcessBuilder};

/// How far a trial program has to get to count as a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialMode {
    /// Run the preprocessor only.
    Preprocess,
    /// Compile to an object file.
    Compile,
    /// Compile and link an executable.
    Link,
}

impl TrialMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialMode::Preprocess => "preprocess",
            TrialMode::Compile => "compile",
            TrialMode::Link => "link",
        }
    }
}

/// A minimal C program plus the search context it is built in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialProgram {
    pub mode: TrialMode,
    pub source: String,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    /// Libraries to link, without `-l`
    pub libs: Vec<String>,
}

impl TrialProgram {
    pub fn new(mode: TrialMode, source: impl Into<String>) -> Self {
        TrialProgram {
            mode,
            source: source.into(),
            include_dirs: Vec::new(),
            lib_dirs: Vec::new(),
            libs: Vec::new(),
        }
    }
}

/// Result of running a trial program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialOutcome {
    pub success: bool,
    /// The command line that was run
    pub command: String,
    /// Toolchain output, kept for humans only
    pub diagnostic: String,
}

/// Capability to build trial programs.
///
/// An `Err` means the toolchain could not be run at all, which is an
/// environment problem rather than a failed probe.
pub trait TrialRunner {
    fn run(&self, program: &TrialProgram) -> Result<TrialOutcome>;
}

const SOURCE_NAME: &str = "conftest.c";
const OUTPUT_STEM: &str = "conftest";

/// Runs trial programs through a detected toolchain, each in its own
/// temporary directory.
pub struct ToolchainTrialRunner {
    toolchain: Box<dyn Toolchain>,
    cflags: Vec<String>,
    ldflags: Vec<String>,
}

impl ToolchainTrialRunner {
    pub fn new(toolchain: Box<dyn Toolchain>) -> Self {
        ToolchainTrialRunner {
            toolchain,
            cflags: Vec::new(),
            ldflags: Vec::new(),
        }
    }

    /// Extra compiler flags passed to every trial.
    pub fn with_cflags(mut self, cflags: Vec<String>) -> Self {
        self.cflags = cflags;
        self
    }

    /// Extra linker flags passed to every link trial.
    pub fn with_ldflags(mut self, ldflags: Vec<String>) -> Self {
        self.ldflags = ldflags;
        self
    }

    fn output_name(&self, mode: TrialMode) -> String {
        let ext = match mode {
            TrialMode::Preprocess => "i",
            TrialMode::Compile => self.toolchain.object_extension(),
            TrialMode::Link => self.toolchain.exe_extension(),
        };
        if ext.is_empty() {
            OUTPUT_STEM.to_string()
        } else {
            format!("{}.{}", OUTPUT_STEM, ext)
        }
    }
}

impl TrialRunner for ToolchainTrialRunner {
    fn run(&self, program: &TrialProgram) -> Result<TrialOutcome> {
        let dir = tempfile::Builder::new()
            .prefix("z80conf-")
            .tempdir()
            .context("failed to create trial directory")?;

        let source = dir.path().join(SOURCE_NAME);
        std::fs::write(&source, &program.source)
            .with_context(|| format!("failed to write {}", source.display()))?;

        let input = TrialInput {
            source: PathBuf::from(SOURCE_NAME),
            output: PathBuf::from(self.output_name(program.mode)),
            include_dirs: program.include_dirs.clone(),
            lib_dirs: program.lib_dirs.clone(),
            libs: program.libs.clone(),
            cflags: self.cflags.clone(),
            ldflags: self.ldflags.clone(),
        };

        let spec = match program.mode {
            TrialMode::Preprocess => self.toolchain.preprocess_command(&input),
            TrialMode::Compile => self.toolchain.compile_command(&input),
            TrialMode::Link => self.toolchain.link_command(&input),
        }
        .env("LC_ALL", "C");

        let process = ProcessBuilder::from_spec(spec).cwd(dir.path());
        let command = process.display_command();
        tracing::debug!("trial {}: {}", program.mode.as_str(), command);

        let output = process.exec()?;
        let diagnostic = output_text(&output);
        if !output.status.success() {
            tracing::debug!("trial failed:\n{}", diagnostic);
        }

        Ok(TrialOutcome {
            success: output.status.success(),
            command,
            diagnostic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::{GccToolchain, ToolchainPlatform};

    fn runner(cc: &str) -> ToolchainTrialRunner {
        ToolchainTrialRunner::new(Box::new(GccToolchain::new(
            PathBuf::from(cc),
            ToolchainPlatform::Gcc,
        )))
    }

    #[test]
    fn test_output_names() {
        let r = runner("cc");
        assert_eq!(r.output_name(TrialMode::Preprocess), "conftest.i");
        assert_eq!(r.output_name(TrialMode::Compile), "conftest.o");
        if !cfg!(windows) {
            assert_eq!(r.output_name(TrialMode::Link), "conftest");
        }
    }

    #[test]
    fn test_missing_compiler_is_an_error() {
        let program = TrialProgram::new(TrialMode::Compile, "int x;\n");
        assert!(runner("/nonexistent/z80conf-cc").run(&program).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_compiler_in_temp_dir() {
        use std::os::unix::fs::PermissionsExt;

        // A fake compiler that succeeds only if the trial source is in its cwd.
        let tmp = tempfile::TempDir::new().unwrap();
        let cc = tmp.path().join("fake-cc");
        std::fs::write(&cc, "#!/bin/sh\ntest -f conftest.c || { echo no source >&2; exit 1; }\n")
            .unwrap();
        std::fs::set_permissions(&cc, std::fs::Permissions::from_mode(0o755)).unwrap();

        let program = TrialProgram::new(TrialMode::Preprocess, "#include <Z80.h>\n");
        let outcome = runner(cc.to_str().unwrap()).run(&program).unwrap();

        assert!(outcome.success, "{}", outcome.diagnostic);
        assert!(outcome.command.contains("-E"));
    }
}
