//! Test utilities for z80conf unit tests.
//!
//! [`FakeTrialRunner`] stands in for a real toolchain: every trial program
//! succeeds unless it mentions a name that was marked missing.
//!
//! # Example
//!
//! ```rust,ignore
//! use z80conf::test_support::FakeTrialRunner;
//!
//! let runner = FakeTrialRunner::new().missing("z80_special_reset");
//! let mut prober = Prober::new(&runner, &paths);
//! // ...
//! assert_eq!(runner.runs().len(), 1);
//! ```

use std::collections::BTreeSet;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::builder::trial::{TrialOutcome, TrialProgram, TrialRunner};

/// In-memory trial runner that records every program it is asked to build.
#[derive(Debug, Default)]
pub struct FakeTrialRunner {
    missing: BTreeSet<String>,
    broken: bool,
    runs: Mutex<Vec<TrialProgram>>,
}

impl FakeTrialRunner {
    /// A runner for which everything is present.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` (a header, library, function or macro) as absent.
    pub fn missing(mut self, name: &str) -> Self {
        self.missing.insert(name.to_string());
        self
    }

    /// Make every run fail as if the compiler could not be spawned.
    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    /// Programs run so far, in order.
    pub fn runs(&self) -> Vec<TrialProgram> {
        self.runs.lock().map(|runs| runs.clone()).unwrap_or_default()
    }

    fn absent_name<'a>(&'a self, program: &'a TrialProgram) -> Option<&'a str> {
        let in_source = program
            .source
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
            .find(|token| self.missing.contains(*token));
        let in_libs = program.libs.iter().find(|lib| self.missing.contains(*lib));

        in_source.or(in_libs.map(String::as_str))
    }
}

impl TrialRunner for FakeTrialRunner {
    fn run(&self, program: &TrialProgram) -> Result<TrialOutcome> {
        if self.broken {
            bail!("failed to spawn `cc`: No such file or directory");
        }

        if let Ok(mut runs) = self.runs.lock() {
            runs.push(program.clone());
        }

        let command = format!("cc ({}) conftest.c", program.mode.as_str());
        let outcome = match self.absent_name(program) {
            Some(name) => TrialOutcome {
                success: false,
                command,
                diagnostic: format!("conftest.c: error: `{}` not found", name),
            },
            None => TrialOutcome {
                success: true,
                command,
                diagnostic: String::new(),
            },
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::trial::TrialMode;

    #[test]
    fn test_fake_runner_matches_whole_tokens() {
        let runner = FakeTrialRunner::new().missing("Z80_PC");

        let present = TrialProgram::new(TrialMode::Compile, "#ifndef Z80_PCH\n#endif\n");
        assert!(runner.run(&present).unwrap().success);

        let absent = TrialProgram::new(TrialMode::Compile, "#ifndef Z80_PC\n#endif\n");
        let outcome = runner.run(&absent).unwrap();
        assert!(!outcome.success);
        assert!(outcome.diagnostic.contains("Z80_PC"));
        assert_eq!(runner.runs().len(), 2);
    }

    #[test]
    fn test_fake_runner_missing_library() {
        let runner = FakeTrialRunner::new().missing("Z80");
        let mut program = TrialProgram::new(TrialMode::Link, "#include <Z80.h>\n");
        assert!(runner.run(&program).unwrap().success);

        program.libs.push("Z80".to_string());
        assert!(!runner.run(&program).unwrap().success);
    }
}
