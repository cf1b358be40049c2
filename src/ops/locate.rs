//! Locator: directory hints to search paths.
//!
//! No path is checked for existence here; whether something can be found
//! is decided by the prober alone.

use std::ffi::OsStr;
use std::path::PathBuf;

use crate::core::SearchPaths;

/// User-supplied directory hints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorHints {
    /// Install prefix; contributes `<prefix>/include` and `<prefix>/lib`.
    pub prefix: Option<PathBuf>,
    /// Explicit include directories, searched before the prefix.
    pub include_dirs: Vec<PathBuf>,
    /// Explicit library directories, searched before the prefix.
    pub lib_dirs: Vec<PathBuf>,
}

impl LocatorHints {
    pub fn is_empty(&self) -> bool {
        self.prefix.is_none() && self.include_dirs.is_empty() && self.lib_dirs.is_empty()
    }
}

/// Resolve hints into search paths. Never fails.
pub fn locate(hints: &LocatorHints) -> SearchPaths {
    let mut include_dirs = hints.include_dirs.clone();
    let mut lib_dirs = hints.lib_dirs.clone();

    if let Some(ref prefix) = hints.prefix {
        include_dirs.push(prefix.join("include"));
        lib_dirs.push(prefix.join("lib"));
    }

    let paths = SearchPaths::new(include_dirs, lib_dirs);
    if paths.is_system_default() {
        tracing::debug!("no directory hints; using toolchain defaults");
    } else {
        tracing::debug!(
            "search paths: include={:?} lib={:?}",
            paths.include_dirs(),
            paths.lib_dirs()
        );
    }
    paths
}

/// Split path-list values (`a:b` on Unix, `a;b` on Windows) into directories.
pub fn split_path_lists<I, S>(values: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    values
        .into_iter()
        .flat_map(|v| std::env::split_paths(v.as_ref()).collect::<Vec<_>>())
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_hints_is_system_default() {
        let paths = locate(&LocatorHints::default());
        assert!(paths.is_system_default());
    }

    #[test]
    fn test_prefix_expands() {
        let hints = LocatorHints {
            prefix: Some(PathBuf::from("/opt/z80")),
            ..Default::default()
        };
        let paths = locate(&hints);
        assert_eq!(paths.include_dirs(), &[PathBuf::from("/opt/z80/include")]);
        assert_eq!(paths.lib_dirs(), &[PathBuf::from("/opt/z80/lib")]);
    }

    #[test]
    fn test_explicit_dirs_come_first() {
        let hints = LocatorHints {
            prefix: Some(PathBuf::from("/opt/z80")),
            include_dirs: vec![PathBuf::from("/src/z80/API")],
            lib_dirs: vec![PathBuf::from("/src/z80/build")],
        };
        let paths = locate(&hints);
        assert_eq!(
            paths.include_dirs(),
            &[
                PathBuf::from("/src/z80/API"),
                PathBuf::from("/opt/z80/include")
            ]
        );
        assert_eq!(paths.lib_dirs()[0], PathBuf::from("/src/z80/build"));
    }

    #[test]
    fn test_nonexistent_dirs_are_kept() {
        let hints = LocatorHints {
            include_dirs: vec![PathBuf::from("/definitely/not/here")],
            ..Default::default()
        };
        assert_eq!(locate(&hints).include_dirs().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_split_path_lists() {
        let dirs = split_path_lists(["/a:/b", "/c", ""]);
        assert_eq!(
            dirs,
            vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")]
        );
    }
}
