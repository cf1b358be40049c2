//! Prober: turn probe specs into results by building trial programs.
//!
//! Every check kind maps to one trial program:
//!
//! | Kind                     | Program                                   | Mode        |
//! |--------------------------|-------------------------------------------|-------------|
//! | Header                   | `#include <H>`                            | preprocess  |
//! | Library                  | empty `main`                              | link `-lL`  |
//! | Linkable function        | `extern` declaration, take its address    | link        |
//! | Header-declared function | `#include <H>`, take its address          | link        |
//! | Macro                    | `#include <H>` + `#ifndef M` / `#error`   | compile     |
//!
//! Symbol trials link every library that was probed with [`Prober::probe`]
//! and found. [`Prober::probe_unlinked`] records a result without adding to
//! the link set.

use anyhow::Result;

use crate::builder::trial::{TrialMode, TrialProgram, TrialRunner};
use crate::core::{ProbeRecord, ProbeResult, ProbeSpec, SearchPaths};

/// Runs probes against one set of search paths, remembering every result.
pub struct Prober<'a> {
    runner: &'a dyn TrialRunner,
    paths: &'a SearchPaths,
    record: ProbeRecord,
    linked: Vec<String>,
}

impl<'a> Prober<'a> {
    pub fn new(runner: &'a dyn TrialRunner, paths: &'a SearchPaths) -> Self {
        Prober {
            runner,
            paths,
            record: ProbeRecord::new(),
            linked: Vec::new(),
        }
    }

    /// Probe `spec`, or return its recorded result if it was probed before.
    ///
    /// An `Err` is an environment failure (the toolchain could not be run),
    /// never a missing item.
    pub fn probe(&mut self, spec: &ProbeSpec) -> Result<ProbeResult> {
        let result = self.probe_unlinked(spec)?;
        if let ProbeSpec::Library { name } = spec {
            if result.found && !self.linked.contains(name) {
                self.linked.push(name.clone());
            }
        }
        Ok(result)
    }

    /// Probe `spec` without linking a found library into later trials.
    pub fn probe_unlinked(&mut self, spec: &ProbeSpec) -> Result<ProbeResult> {
        if let Some(result) = self.record.get(spec) {
            tracing::debug!("{} already probed", spec);
            return Ok(result.clone());
        }

        let program = self.trial_program(spec);
        let outcome = self.runner.run(&program)?;

        let result = if outcome.success {
            ProbeResult::found()
        } else {
            ProbeResult::missing(outcome.diagnostic)
        }
        .with_command(outcome.command);

        tracing::debug!(
            "checking for {}... {}",
            spec,
            if result.found { "yes" } else { "no" }
        );

        Ok(self.record.insert(spec.clone(), result).clone())
    }

    /// Whether `spec` has been probed already.
    pub fn is_probed(&self, spec: &ProbeSpec) -> bool {
        self.record.get(spec).is_some()
    }

    pub fn record(&self) -> &ProbeRecord {
        &self.record
    }

    pub fn into_record(self) -> ProbeRecord {
        self.record
    }

    /// Libraries linked into later trials, in probe order.
    pub fn linked_libraries(&self) -> Vec<String> {
        self.linked.clone()
    }

    fn trial_program(&self, spec: &ProbeSpec) -> TrialProgram {
        let (mode, source, mut libs) = match spec {
            ProbeSpec::Header { name } => (TrialMode::Preprocess, header_source(name), vec![]),
            ProbeSpec::Library { name } => {
                let mut libs = self.linked_libraries();
                if !libs.contains(name) {
                    libs.insert(0, name.clone());
                }
                (TrialMode::Link, main_source(), libs)
            }
            ProbeSpec::Symbol { name, header } => (
                TrialMode::Link,
                function_source(name, header.as_deref()),
                self.linked_libraries(),
            ),
            ProbeSpec::Macro { name, header } => {
                (TrialMode::Compile, macro_source(name, header), vec![])
            }
        };

        libs.dedup();
        TrialProgram {
            mode,
            source,
            include_dirs: self.paths.include_dirs().to_vec(),
            lib_dirs: self.paths.lib_dirs().to_vec(),
            libs,
        }
    }
}

fn header_source(header: &str) -> String {
    format!("#include <{}>\n", header)
}

fn main_source() -> String {
    "int main(void) { return 0; }\n".to_string()
}

fn function_source(name: &str, header: Option<&str>) -> String {
    let decl = match header {
        Some(header) => format!("#include <{}>\n", header),
        None => format!("extern void {}();\n", name),
    };
    format!(
        "{decl}\
         int main(void)\n\
         {{\n\
         \tvoid ((*volatile p)());\n\
         \tp = (void ((*)())){name};\n\
         \treturn !p;\n\
         }}\n",
        decl = decl,
        name = name
    )
}

fn macro_source(name: &str, header: &str) -> String {
    format!(
        "#include <{header}>\n\
         #ifndef {name}\n\
         #error {name} is not defined\n\
         #endif\n\
         int conftest_unused;\n",
        header = header,
        name = name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeTrialRunner;
    use std::path::PathBuf;

    fn paths() -> SearchPaths {
        SearchPaths::new(
            vec![PathBuf::from("/opt/z80/include")],
            vec![PathBuf::from("/opt/z80/lib")],
        )
    }

    #[test]
    fn test_header_program() {
        let runner = FakeTrialRunner::new();
        let paths = paths();
        let mut prober = Prober::new(&runner, &paths);

        assert!(prober.probe(&ProbeSpec::header("Z80.h")).unwrap().found);

        let runs = runner.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].mode, TrialMode::Preprocess);
        assert!(runs[0].source.contains("#include <Z80.h>"));
        assert_eq!(runs[0].include_dirs, vec![PathBuf::from("/opt/z80/include")]);
    }

    #[test]
    fn test_symbol_links_passed_libraries() {
        let runner = FakeTrialRunner::new();
        let paths = paths();
        let mut prober = Prober::new(&runner, &paths);

        prober.probe(&ProbeSpec::library("Z80")).unwrap();
        prober.probe(&ProbeSpec::function("z80_power")).unwrap();

        let runs = runner.runs();
        assert_eq!(runs[0].libs, vec!["Z80".to_string()]);
        assert_eq!(runs[1].mode, TrialMode::Link);
        assert_eq!(runs[1].libs, vec!["Z80".to_string()]);
        assert!(runs[1].source.contains("extern void z80_power();"));
        assert!(!runs[1].source.contains("#include"));
    }

    #[test]
    fn test_declared_function_includes_header() {
        let runner = FakeTrialRunner::new();
        let paths = paths();
        let mut prober = Prober::new(&runner, &paths);

        prober
            .probe(&ProbeSpec::declared_function("z80_break", "Z80.h"))
            .unwrap();

        let run = &runner.runs()[0];
        assert!(run.source.contains("#include <Z80.h>"));
        assert!(!run.source.contains("extern void"));
        assert!(run.source.contains("(void ((*)()))z80_break"));
    }

    #[test]
    fn test_macro_program() {
        let runner = FakeTrialRunner::new().missing("Z80_PC");
        let paths = paths();
        let mut prober = Prober::new(&runner, &paths);

        let result = prober.probe(&ProbeSpec::macro_in("Z80_PC", "Z80.h")).unwrap();
        assert!(!result.found);
        assert!(result.diagnostic.is_some());

        let run = &runner.runs()[0];
        assert_eq!(run.mode, TrialMode::Compile);
        assert!(run.source.contains("#ifndef Z80_PC\n"));
        assert!(run.libs.is_empty());
    }

    #[test]
    fn test_probe_runs_once_per_spec() {
        let runner = FakeTrialRunner::new();
        let paths = paths();
        let mut prober = Prober::new(&runner, &paths);
        let spec = ProbeSpec::function("z80_run");

        let first = prober.probe(&spec).unwrap();
        let second = prober.probe(&spec).unwrap();

        assert_eq!(first, second);
        assert_eq!(runner.runs().len(), 1);
        assert!(prober.is_probed(&spec));
    }

    #[test]
    fn test_failed_library_not_linked_later() {
        let runner = FakeTrialRunner::new().missing("Z80");
        let paths = paths();
        let mut prober = Prober::new(&runner, &paths);

        assert!(!prober.probe(&ProbeSpec::library("Z80")).unwrap().found);
        prober.probe(&ProbeSpec::function("z80_run")).unwrap();

        assert!(runner.runs()[1].libs.is_empty());
        assert!(prober.linked_libraries().is_empty());
    }

    #[test]
    fn test_unlinked_library_stays_out_of_later_trials() {
        let runner = FakeTrialRunner::new();
        let paths = paths();
        let mut prober = Prober::new(&runner, &paths);

        assert!(prober.probe_unlinked(&ProbeSpec::library("m")).unwrap().found);
        prober.probe(&ProbeSpec::function("z80_run")).unwrap();

        assert!(runner.runs()[1].libs.is_empty());
        assert!(prober.linked_libraries().is_empty());

        // A later linking probe of the same library reuses the result.
        prober.probe(&ProbeSpec::library("m")).unwrap();
        assert_eq!(runner.runs().len(), 2);
        assert_eq!(prober.linked_libraries(), vec!["m".to_string()]);
    }

    #[test]
    fn test_probing_is_deterministic() {
        let runner = FakeTrialRunner::new()
            .missing("z80_special_reset")
            .missing("Z80_XYL");
        let paths = paths();
        let specs = crate::core::Z80
            .probe_table()
            .into_iter()
            .map(|e| e.spec)
            .collect::<Vec<_>>();

        let run = |runner: &FakeTrialRunner| {
            let mut prober = Prober::new(runner, &paths);
            specs
                .iter()
                .map(|s| prober.probe(s).unwrap())
                .collect::<Vec<_>>()
        };

        assert_eq!(run(&runner), run(&runner));
    }

    #[test]
    fn test_runner_error_propagates() {
        let runner = FakeTrialRunner::new().broken();
        let paths = paths();
        let mut prober = Prober::new(&runner, &paths);

        assert!(prober.probe(&ProbeSpec::header("Z80.h")).is_err());
        assert!(prober.record().is_empty());
    }
}
