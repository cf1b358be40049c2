//! Include and library search directories.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Ordered include and library directories handed to every trial and to
/// the emitted descriptor.
///
/// Empty lists mean "use the toolchain's own default search behaviour".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchPaths {
    include_dirs: Vec<PathBuf>,
    lib_dirs: Vec<PathBuf>,
}

impl SearchPaths {
    /// Create search paths, dropping duplicates while keeping first-seen order.
    pub fn new(include_dirs: Vec<PathBuf>, lib_dirs: Vec<PathBuf>) -> Self {
        SearchPaths {
            include_dirs: dedup(include_dirs),
            lib_dirs: dedup(lib_dirs),
        }
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    pub fn lib_dirs(&self) -> &[PathBuf] {
        &self.lib_dirs
    }

    /// True when no directory hints were given.
    pub fn is_system_default(&self) -> bool {
        self.include_dirs.is_empty() && self.lib_dirs.is_empty()
    }

    /// `-I` flags for the include directories.
    pub fn include_flags(&self) -> Vec<String> {
        self.include_dirs.iter().map(|d| dir_flag("-I", d)).collect()
    }

    /// `-L` flags for the library directories.
    pub fn lib_flags(&self) -> Vec<String> {
        self.lib_dirs.iter().map(|d| dir_flag("-L", d)).collect()
    }
}

fn dir_flag(prefix: &str, dir: &Path) -> String {
    format!("{}{}", prefix, dir.display())
}

fn dedup(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::with_capacity(dirs.len());
    for dir in dirs {
        if !out.contains(&dir) {
            out.push(dir);
        }
    }
    out
}
