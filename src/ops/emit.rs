//! Descriptor emitter: assemble the build descriptor and write it out.

use std::io::Write;
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};

use crate::core::{BuildDescriptor, DescriptorFormat, FeatureSet, SearchPaths, TargetLibrary};
use crate::ops::errors::ConfigureError;

/// Inputs to the descriptor that do not come from probing.
#[derive(Debug, Clone, Default)]
pub struct EmitSettings {
    /// C compiler driver written into the descriptor
    pub compiler: String,
    /// Extra compiler flags
    pub cflags: Vec<String>,
    /// Extra linker flags
    pub ldflags: Vec<String>,
    /// Directory holding the binding sources
    pub srcdir: PathBuf,
}

/// Build the descriptor from validated inputs.
///
/// Only the feature set contributes defines; mandatory items leave no trace.
pub fn build_descriptor(
    target: &TargetLibrary,
    paths: &SearchPaths,
    features: &FeatureSet,
    libraries: &[String],
    settings: &EmitSettings,
) -> BuildDescriptor {
    BuildDescriptor {
        target: target.target_name(),
        compiler: settings.compiler.clone(),
        include_flags: paths.include_flags(),
        defines: features.defines(),
        cflags: settings.cflags.clone(),
        lib_flags: paths.lib_flags(),
        ldflags: settings.ldflags.clone(),
        libs: libraries.to_vec(),
        srcdir: settings.srcdir.clone(),
        sources: find_sources(&settings.srcdir),
    }
}

/// C sources directly under `srcdir`, as sorted file names.
pub fn find_sources(srcdir: &Path) -> Vec<String> {
    let pattern = format!(
        "{}/*.c",
        Pattern::escape(&srcdir.display().to_string())
    );

    let entries = match glob(&pattern) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("cannot list sources in {}: {}", srcdir.display(), e);
            return Vec::new();
        }
    };

    let mut sources: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    sources.sort();
    sources
}

/// Write `descriptor` into `out_dir` and return the written path.
///
/// The file is written to a temporary sibling first and renamed into place,
/// so a failed run never leaves a partial descriptor behind.
pub fn write_descriptor(
    descriptor: &BuildDescriptor,
    out_dir: &Path,
    format: DescriptorFormat,
) -> Result<PathBuf, ConfigureError> {
    let path = out_dir.join(format.file_name());
    let failure = |source: std::io::Error| ConfigureError::DescriptorWriteFailure {
        path: path.clone(),
        source,
    };

    let contents = descriptor
        .render(format)
        .map_err(|e| failure(std::io::Error::other(e)))?;

    std::fs::create_dir_all(out_dir).map_err(failure)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".z80conf-")
        .tempfile_in(out_dir)
        .map_err(failure)?;
    tmp.write_all(contents.as_bytes()).map_err(failure)?;
    tmp.as_file().sync_all().map_err(failure)?;
    tmp.persist(&path).map_err(|e| failure(e.error))?;

    tracing::info!("wrote {}", path.display());
    Ok(path)
}
