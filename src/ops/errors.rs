//! Configuration error types.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// A configuration run that cannot continue.
///
/// Each variant renders as one line naming the offending item.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigureError {
    #[error("missing header {header}")]
    #[diagnostic(
        code(z80conf::probe::missing_header),
        help("Point `--with-z80-include` or `--with-z80-dir` at the Z80 installation")
    )]
    MissingHeader {
        header: String,
        diagnostic: Option<String>,
    },

    #[error("missing library {library}")]
    #[diagnostic(
        code(z80conf::probe::missing_library),
        help("Point `--with-z80-lib` or `--with-z80-dir` at the Z80 installation")
    )]
    MissingLibrary {
        library: String,
        diagnostic: Option<String>,
    },

    #[error("missing {name}()")]
    #[diagnostic(
        code(z80conf::probe::missing_function),
        help("The installed library is too old or was built without this function")
    )]
    MissingMandatoryFunction {
        name: String,
        diagnostic: Option<String>,
    },

    #[error("missing {name}")]
    #[diagnostic(
        code(z80conf::probe::missing_macro),
        help("The installed header is too old or does not define this constant")
    )]
    MissingMandatoryMacro {
        name: String,
        diagnostic: Option<String>,
    },

    #[error("failed to write build descriptor {}", .path.display())]
    #[diagnostic(code(z80conf::emit::write_failed))]
    DescriptorWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigureError {
    /// Compiler/linker output of the trial that failed, if any.
    pub fn trial_diagnostic(&self) -> Option<&str> {
        match self {
            ConfigureError::MissingHeader { diagnostic, .. }
            | ConfigureError::MissingLibrary { diagnostic, .. }
            | ConfigureError::MissingMandatoryFunction { diagnostic, .. }
            | ConfigureError::MissingMandatoryMacro { diagnostic, .. } => diagnostic.as_deref(),
            ConfigureError::DescriptorWriteFailure { .. } => None,
        }
    }

    /// True for errors caused by the target library not exposing something.
    pub fn is_missing_prerequisite(&self) -> bool {
        !matches!(self, ConfigureError::DescriptorWriteFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_item() {
        let err = ConfigureError::MissingHeader {
            header: "Z80.h".into(),
            diagnostic: None,
        };
        assert_eq!(err.to_string(), "missing header Z80.h");

        let err = ConfigureError::MissingLibrary {
            library: "Z80".into(),
            diagnostic: None,
        };
        assert_eq!(err.to_string(), "missing library Z80");

        let err = ConfigureError::MissingMandatoryFunction {
            name: "z80_power".into(),
            diagnostic: Some("undefined reference to `z80_power'".into()),
        };
        assert_eq!(err.to_string(), "missing z80_power()");
        assert!(err.trial_diagnostic().unwrap().contains("undefined reference"));

        let err = ConfigureError::MissingMandatoryMacro {
            name: "Z80_PC".into(),
            diagnostic: None,
        };
        assert_eq!(err.to_string(), "missing Z80_PC");
        assert!(err.is_missing_prerequisite());
    }

    #[test]
    fn test_write_failure_keeps_source() {
        let err = ConfigureError::DescriptorWriteFailure {
            path: PathBuf::from("/ro/Makefile"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to write build descriptor /ro/Makefile");
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_missing_prerequisite());
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = ConfigureError::MissingMandatoryMacro {
            name: "Z80_PC".into(),
            diagnostic: None,
        };
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("z80conf::probe::missing_macro")
        );
    }
}
