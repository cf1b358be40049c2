//! `z80conf probe` command
//!
//! Runs one check through the same locator and prober as `configure`.

use anyhow::{bail, Result};

use crate::cli::ProbeArgs;
use crate::commands::{compiler_settings, load_project_config, locator_hints};
use z80conf::builder::{detect_toolchain, ToolchainTrialRunner};
use z80conf::core::{ProbeKind, ProbeSpec, Z80};
use z80conf::ops::{locate, Prober};
use z80conf::util::shell::{yes_no, Shell};

/// Returns whether the item was found.
pub fn execute(args: ProbeArgs, shell: &Shell) -> Result<bool> {
    if let Some(ref header) = args.header {
        if !args.kind.takes_header() {
            bail!(
                "--header {} is not valid for a {} check; only function and macro checks take a header",
                header,
                args.kind
            );
        }
    }

    let (_, config) = load_project_config()?;

    let hints = locator_hints(&args.paths, &config);
    let (cc, cflags, ldflags) = compiler_settings(&args.compiler, &config);

    let runner = ToolchainTrialRunner::new(detect_toolchain(cc.as_deref())?)
        .with_cflags(cflags)
        .with_ldflags(ldflags);
    let paths = locate(&hints);
    let mut prober = Prober::new(&runner, &paths);

    let spec = match args.kind {
        ProbeKind::Header => ProbeSpec::header(args.name),
        ProbeKind::Library => ProbeSpec::library(args.name),
        ProbeKind::Function => {
            // Link against the library when it is there, as configure would.
            prober.probe(&ProbeSpec::library(Z80.library))?;
            match args.header {
                Some(header) => ProbeSpec::declared_function(args.name, header),
                None => ProbeSpec::function(args.name),
            }
        }
        ProbeKind::Macro => {
            ProbeSpec::macro_in(args.name, args.header.as_deref().unwrap_or(Z80.header))
        }
    };

    let result = prober.probe(&spec)?;
    shell.checking(format_args!("{} {}", spec.kind(), spec), result.found);

    if !result.found {
        if let Some(ref diagnostic) = result.diagnostic {
            tracing::debug!("{}", diagnostic);
        }
    }

    println!("{}", yes_no(result.found));
    Ok(result.found)
}
