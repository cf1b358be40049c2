//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::util::process::{find_c_compiler, find_executable, ProcessBuilder};

use super::{GccToolchain, Toolchain, ToolchainPlatform};

/// Detect the available toolchain.
///
/// Tries to find a C compiler with the following priority:
/// 1. The explicit override, as a path or a name on PATH
/// 2. The CC environment variable
/// 3. `cc`, `gcc`, `clang` on PATH
pub fn detect_toolchain(cc_override: Option<&Path>) -> Result<Box<dyn Toolchain>> {
    let cc = match cc_override {
        Some(cc) => resolve_override(cc)?,
        None => match find_c_compiler() {
            Some(cc) => cc,
            None => bail!(
                "no C compiler found\n\
                 \n\
                 z80conf requires a C compiler (cc, gcc, or clang).\n\
                 Set the CC environment variable, pass `--cc`, or install a compiler."
            ),
        },
    };

    let family = detect_compiler_family(&cc);

    tracing::debug!("Using C compiler {} ({})", cc.display(), family.as_str());

    Ok(Box::new(GccToolchain::new(cc, family)))
}

fn resolve_override(cc: &Path) -> Result<PathBuf> {
    if cc.is_file() {
        return Ok(cc.to_path_buf());
    }

    if let Some(found) = find_executable(&cc.to_string_lossy()) {
        return Ok(found);
    }

    bail!("C compiler `{}` not found", cc.display())
}

/// Detect whether the compiler is GCC, Clang, or Apple Clang.
///
/// Compilers that cannot be identified are treated as GCC-compatible.
pub fn detect_compiler_family(cc: &Path) -> ToolchainPlatform {
    // Check binary name first
    let name = cc
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if name.contains("gcc") {
        return ToolchainPlatform::Gcc;
    }

    // Try to detect from --version output
    let version = ProcessBuilder::new(cc)
        .arg("--version")
        .exec()
        .map(|out| String::from_utf8_lossy(&out.stdout).to_lowercase())
        .unwrap_or_default();

    family_from_version(&name, &version)
}

fn family_from_version(name: &str, version: &str) -> ToolchainPlatform {
    if name.contains("clang") || version.contains("clang") {
        if version.contains("apple") {
            ToolchainPlatform::AppleClang
        } else {
            ToolchainPlatform::Clang
        }
    } else {
        ToolchainPlatform::Gcc
    }
}
