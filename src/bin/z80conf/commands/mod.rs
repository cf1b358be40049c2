//! Command implementations

pub mod completions;
pub mod configure;
pub mod list;
pub mod probe;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::{CompilerArgs, PathArgs};
use z80conf::ops::{split_path_lists, LocatorHints};
use z80conf::util::config::{global_config_path, load_config, project_config_path};
use z80conf::util::Config;

/// Load global + project configuration for the current directory.
pub fn load_project_config() -> Result<(PathBuf, Config)> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let global = global_config_path();
    let config = load_config(global.as_deref(), &project_config_path(&cwd));
    Ok((cwd, config))
}

/// Locator hints: command line (or environment) first, then config.
pub fn locator_hints(args: &PathArgs, config: &Config) -> LocatorHints {
    let prefix = args
        .with_z80_dir
        .clone()
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| config.paths.prefix.clone());

    let include_dirs = split_path_lists(&args.with_z80_include);
    let lib_dirs = split_path_lists(&args.with_z80_lib);

    LocatorHints {
        prefix,
        include_dirs: if include_dirs.is_empty() {
            config.paths.include.clone()
        } else {
            include_dirs
        },
        lib_dirs: if lib_dirs.is_empty() {
            config.paths.lib.clone()
        } else {
            lib_dirs
        },
    }
}

/// Compiler override and extra flags, command line over config.
pub fn compiler_settings(
    args: &CompilerArgs,
    config: &Config,
) -> (Option<PathBuf>, Vec<String>, Vec<String>) {
    let cc = args.cc.clone().or_else(|| config.toolchain.cc.clone());
    let cflags = split_flags(args.cflags.as_deref(), &config.toolchain.cflags);
    let ldflags = split_flags(args.ldflags.as_deref(), &config.toolchain.ldflags);
    (cc, cflags, ldflags)
}

fn split_flags(cli: Option<&str>, config: &[String]) -> Vec<String> {
    match cli {
        Some(flags) => flags.split_whitespace().map(String::from).collect(),
        None => config.to_vec(),
    }
}
