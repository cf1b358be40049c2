//! The configure pipeline: locate, probe, evaluate, emit.
//!
//! Each stage only consumes what the previous ones produced. A missing
//! mandatory item ends the run before anything is emitted; the probe log
//! is still written so the failing trial can be inspected.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::builder::trial::TrialRunner;
use crate::core::{
    BuildDescriptor, DescriptorFormat, FeatureSet, ProbeEntry, ProbeRecord, ProbeSpec,
    SearchPaths, TargetLibrary,
};
use crate::ops::emit::{build_descriptor, write_descriptor, EmitSettings};
use crate::ops::locate::{locate, LocatorHints};
use crate::ops::policy::{evaluate, ProbeEvent};
use crate::ops::probe::Prober;
use crate::util::fs::write_string;

/// Name of the probe log written next to the descriptor.
pub const LOG_FILE_NAME: &str = "z80conf.log";

/// Options for a configure run.
#[derive(Debug, Clone)]
pub struct ConfigureOptions {
    /// Directory hints for the locator
    pub hints: LocatorHints,
    /// Probes appended after the built-in table
    pub extra_probes: Vec<ProbeEntry>,
    /// Where the descriptor and log are written
    pub out_dir: PathBuf,
    /// Descriptor format
    pub format: DescriptorFormat,
    /// Compiler, flags and source directory for the descriptor
    pub emit: EmitSettings,
    /// Write the probe log
    pub write_log: bool,
}

impl Default for ConfigureOptions {
    fn default() -> Self {
        ConfigureOptions {
            hints: LocatorHints::default(),
            extra_probes: Vec::new(),
            out_dir: PathBuf::from("."),
            format: DescriptorFormat::default(),
            emit: EmitSettings {
                compiler: "cc".to_string(),
                srcdir: PathBuf::from("."),
                ..Default::default()
            },
            write_log: true,
        }
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct ConfigureReport {
    pub search_paths: SearchPaths,
    pub record: ProbeRecord,
    pub features: FeatureSet,
    pub recorded: Vec<(ProbeSpec, bool)>,
    pub descriptor: BuildDescriptor,
    pub descriptor_path: PathBuf,
    pub log_path: Option<PathBuf>,
    pub duration: Duration,
}

/// Run the whole pipeline for `target`.
///
/// Missing mandatory items surface as a [`ConfigureError`] inside the
/// returned `anyhow::Error`.
///
/// [`ConfigureError`]: crate::ops::errors::ConfigureError
pub fn configure(
    target: &TargetLibrary,
    opts: &ConfigureOptions,
    runner: &dyn TrialRunner,
    on_event: &mut dyn FnMut(ProbeEvent<'_>),
) -> Result<ConfigureReport> {
    let start = Instant::now();

    let search_paths = locate(&opts.hints);

    let mut table = target.probe_table();
    table.extend(opts.extra_probes.iter().cloned());
    tracing::info!("probing {} items for {}", table.len(), target.name);

    let mut prober = Prober::new(runner, &search_paths);
    let evaluation = evaluate(&table, &mut prober, on_event);
    let record = prober.into_record();

    let log_path = if opts.write_log {
        write_probe_log(&opts.out_dir, target, &search_paths, &record, evaluation.as_ref().err())
    } else {
        None
    };

    let evaluation = evaluation?;

    let descriptor = build_descriptor(
        target,
        &search_paths,
        &evaluation.features,
        &evaluation.libraries,
        &opts.emit,
    );
    let descriptor_path = write_descriptor(&descriptor, &opts.out_dir, opts.format)?;

    Ok(ConfigureReport {
        search_paths,
        record,
        features: evaluation.features,
        recorded: evaluation.recorded,
        descriptor,
        descriptor_path,
        log_path,
        duration: start.elapsed(),
    })
}

/// Write the probe log. Failing to do so is only worth a warning.
fn write_probe_log(
    out_dir: &Path,
    target: &TargetLibrary,
    paths: &SearchPaths,
    record: &ProbeRecord,
    error: Option<&anyhow::Error>,
) -> Option<PathBuf> {
    let path = out_dir.join(LOG_FILE_NAME);
    let contents = render_probe_log(target, paths, record, error);

    match write_string(&path, &contents) {
        Ok(()) => Some(path),
        Err(e) => {
            tracing::warn!("{:#}", e);
            None
        }
    }
}

/// Render the probe log: every trial, its command, and what failed.
pub fn render_probe_log(
    target: &TargetLibrary,
    paths: &SearchPaths,
    record: &ProbeRecord,
    error: Option<&anyhow::Error>,
) -> String {
    let mut log = String::new();
    let _ = writeln!(log, "z80conf {} probe log for {}", env!("CARGO_PKG_VERSION"), target.name);
    let _ = writeln!(log, "include dirs: {:?}", paths.include_dirs());
    let _ = writeln!(log, "library dirs: {:?}", paths.lib_dirs());

    for (spec, result) in record.iter() {
        let _ = writeln!(log);
        let _ = writeln!(
            log,
            "checking for {} {}... {}",
            spec.kind(),
            spec,
            if result.found { "yes" } else { "no" }
        );
        if let Some(ref command) = result.command {
            let _ = writeln!(log, "  $ {}", command);
        }
        if let Some(ref diagnostic) = result.diagnostic {
            for line in diagnostic.lines() {
                let _ = writeln!(log, "  | {}", line);
            }
        }
    }

    if let Some(err) = error {
        let _ = writeln!(log);
        let _ = writeln!(log, "aborted: {:#}", err);
    }

    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Z80;
    use crate::ops::errors::ConfigureError;
    use crate::test_support::FakeTrialRunner;
    use tempfile::TempDir;

    fn options(out: &Path) -> ConfigureOptions {
        ConfigureOptions {
            out_dir: out.to_path_buf(),
            emit: EmitSettings {
                compiler: "cc".to_string(),
                srcdir: out.to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_success_without_optional_reset() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeTrialRunner::new().missing("z80_special_reset");

        let report = configure(&Z80, &options(tmp.path()), &runner, &mut |_| {}).unwrap();

        assert!(report.features.is_empty());
        assert!(report.descriptor.defines.is_empty());
        let makefile = std::fs::read_to_string(&report.descriptor_path).unwrap();
        assert!(!makefile.contains("HAVE_Z80_SPECIAL_RESET"));
        assert!(makefile.contains("LIBS = -lZ80"));
        assert_eq!(report.record.len(), Z80.probe_table().len());
    }

    #[test]
    fn test_success_with_optional_reset() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeTrialRunner::new();

        let report = configure(&Z80, &options(tmp.path()), &runner, &mut |_| {}).unwrap();

        assert_eq!(
            report.descriptor.defines.iter().collect::<Vec<_>>(),
            vec!["HAVE_Z80_SPECIAL_RESET"]
        );
        let makefile = std::fs::read_to_string(&report.descriptor_path).unwrap();
        assert!(makefile.contains("DEFS = -DHAVE_Z80_SPECIAL_RESET\n"));
        assert!(!makefile.contains("HAVE_Z80_H"));
        assert!(!makefile.contains("HAVE_Z80_POWER"));
    }

    #[test]
    fn test_missing_macro_emits_nothing() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeTrialRunner::new().missing("Z80_HL_");

        let err = configure(&Z80, &options(tmp.path()), &runner, &mut |_| {}).unwrap_err();

        assert_eq!(err.to_string(), "missing Z80_HL_");
        assert!(matches!(
            err.downcast_ref::<ConfigureError>(),
            Some(ConfigureError::MissingMandatoryMacro { .. })
        ));
        assert!(!tmp.path().join("Makefile").exists());

        let log = std::fs::read_to_string(tmp.path().join(LOG_FILE_NAME)).unwrap();
        assert!(log.contains("checking for macro Z80_HL_ in Z80.h... no"));
        assert!(log.contains("aborted: missing Z80_HL_"));
    }

    #[test]
    fn test_missing_core_function_emits_nothing() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeTrialRunner::new().missing("z80_execute");

        let err = configure(&Z80, &options(tmp.path()), &runner, &mut |_| {}).unwrap_err();

        assert_eq!(err.to_string(), "missing z80_execute()");
        assert!(matches!(
            err.downcast_ref::<ConfigureError>(),
            Some(ConfigureError::MissingMandatoryFunction { .. })
        ));
        assert!(!tmp.path().join("Makefile").exists());

        // No macro trial runs after the abort.
        assert!(runner.runs().iter().all(|run| !run.source.contains("#ifndef")));
    }

    #[test]
    fn test_missing_header_probes_nothing_else() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeTrialRunner::new().missing("Z80.h");

        let err = configure(&Z80, &options(tmp.path()), &runner, &mut |_| {}).unwrap_err();

        assert_eq!(err.to_string(), "missing header Z80.h");
        assert_eq!(runner.runs().len(), 1);
        assert!(!tmp.path().join("Makefile").exists());
    }

    #[test]
    fn test_extra_probes_run_last() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeTrialRunner::new();
        let mut opts = options(tmp.path());
        opts.extra_probes = vec![ProbeEntry::recorded(ProbeSpec::function("z80_hypothetical"))];

        let report = configure(&Z80, &opts, &runner, &mut |_| {}).unwrap();

        assert_eq!(
            report.recorded,
            vec![(ProbeSpec::function("z80_hypothetical"), true)]
        );
        assert!(!report.features.contains("z80_hypothetical"));
        let last = runner.runs().pop().unwrap();
        assert!(last.source.contains("z80_hypothetical"));
    }

    #[test]
    fn test_json_format() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeTrialRunner::new();
        let mut opts = options(tmp.path());
        opts.format = DescriptorFormat::Json;
        opts.write_log = false;

        let report = configure(&Z80, &opts, &runner, &mut |_| {}).unwrap();

        assert_eq!(report.descriptor_path, tmp.path().join("build.json"));
        assert!(report.log_path.is_none());
        assert!(!tmp.path().join(LOG_FILE_NAME).exists());
    }

    #[test]
    fn test_runs_are_reproducible() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeTrialRunner::new().missing("z80_special_reset");

        let first = configure(&Z80, &options(tmp.path()), &runner, &mut |_| {}).unwrap();
        let first_text = std::fs::read_to_string(&first.descriptor_path).unwrap();
        let second = configure(&Z80, &options(tmp.path()), &runner, &mut |_| {}).unwrap();
        let second_text = std::fs::read_to_string(&second.descriptor_path).unwrap();

        assert_eq!(first.descriptor, second.descriptor);
        assert_eq!(first_text, second_text);
    }
}
