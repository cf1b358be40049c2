//! `z80conf configure` command

use anyhow::Result;

use crate::cli::ConfigureArgs;
use crate::commands::{compiler_settings, load_project_config, locator_hints};
use z80conf::builder::{detect_toolchain, ToolchainTrialRunner};
use z80conf::core::Z80;
use z80conf::ops::{configure, ConfigureOptions, EmitSettings, ProbeEvent};
use z80conf::util::fs::normalize_path;
use z80conf::util::shell::{format_duration, Shell, Status};

pub fn execute(args: ConfigureArgs, shell: &Shell) -> Result<()> {
    let (cwd, config) = load_project_config()?;

    let hints = locator_hints(&args.paths, &config);
    let (cc, cflags, ldflags) = compiler_settings(&args.compiler, &config);

    let toolchain = detect_toolchain(cc.as_deref())?;
    tracing::info!(
        "using {} ({})",
        toolchain.compiler_path().display(),
        toolchain.platform().as_str()
    );
    let compiler = toolchain.compiler_path().display().to_string();
    let runner = ToolchainTrialRunner::new(toolchain)
        .with_cflags(cflags.clone())
        .with_ldflags(ldflags.clone());

    let srcdir = args
        .srcdir
        .or(config.output.srcdir.clone())
        .unwrap_or_else(|| cwd.clone());
    let out_dir = args
        .out_dir
        .or(config.output.dir.clone())
        .unwrap_or(cwd);

    let opts = ConfigureOptions {
        hints,
        extra_probes: config.extra_probes(Z80.header)?,
        out_dir,
        format: args.format.or(config.output.format).unwrap_or_default(),
        emit: EmitSettings {
            compiler,
            cflags,
            ldflags,
            srcdir: normalize_path(&srcdir),
        },
        write_log: !args.no_log,
    };

    let total = Z80.probe_table().len() + opts.extra_probes.len();
    shell.status(Status::Probing, format!("{} ({} checks)", Z80.name, total));

    let mut progress = shell.progress(total as u64, "Probing");
    let result = configure(&Z80, &opts, &runner, &mut |event| {
        if let ProbeEvent::Finished { entry, result } = event {
            progress.inc(1, &entry.spec);
            shell.checking(
                format_args!("{} {}", entry.spec.kind(), entry.spec),
                result.found,
            );
        }
    });
    progress.finish();
    let report = result?;

    for define in report.features.defines() {
        shell.status(Status::Found, format!("optional feature ({})", define));
    }
    for (spec, found) in &report.recorded {
        shell.note(format!(
            "{} {}: {}",
            spec.kind(),
            spec,
            if *found { "present" } else { "absent" }
        ));
    }

    shell.status(Status::Created, report.descriptor_path.display());
    if let Some(ref log_path) = report.log_path {
        tracing::info!("probe log written to {}", log_path.display());
    }
    shell.status(
        Status::Finished,
        format!(
            "{} checks in {}",
            report.record.len(),
            format_duration(report.duration)
        ),
    );

    Ok(())
}
