//! Configuration file support for z80conf.
//!
//! z80conf supports two configuration file locations:
//! - Global: `~/.z80conf/config.toml` - User-wide defaults
//! - Project: `z80conf.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! options take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{DescriptorFormat, ProbeEntry, ProbeKind, ProbeSpec, Requirement};

/// Name of the project configuration file.
pub const PROJECT_CONFIG_NAME: &str = "z80conf.toml";

/// z80conf configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search path hints
    pub paths: PathsConfig,

    /// Toolchain settings
    pub toolchain: ToolchainSettings,

    /// Descriptor output settings
    pub output: OutputConfig,

    /// Extra probes appended to the built-in table
    #[serde(rename = "probe")]
    pub probes: Vec<ProbeConfig>,
}

/// Search path hints for the locator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Install prefix (adds `<prefix>/include` and `<prefix>/lib`)
    pub prefix: Option<PathBuf>,

    /// Include directories
    pub include: Vec<PathBuf>,

    /// Library directories
    pub lib: Vec<PathBuf>,
}

/// Toolchain settings for trial builds and the descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the C compiler (e.g., /usr/bin/clang)
    pub cc: Option<PathBuf>,

    /// Additional C compiler flags
    pub cflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,
}

/// Where and how the descriptor is written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory (defaults to the current directory)
    pub dir: Option<PathBuf>,

    /// Descriptor format
    pub format: Option<DescriptorFormat>,

    /// Directory holding the binding sources
    pub srcdir: Option<PathBuf>,
}

/// An extra probe declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Check kind
    pub kind: ProbeKind,

    /// Probed name
    pub name: String,

    /// Header context; macros default to the umbrella header
    #[serde(default)]
    pub header: Option<String>,

    /// Requirement class
    #[serde(default)]
    pub requirement: Requirement,
}

impl ProbeConfig {
    /// Turn this declaration into a probe table entry.
    ///
    /// A `header` on a header or library check is an error.
    pub fn to_entry(&self, umbrella_header: &str) -> Result<ProbeEntry> {
        if let Some(ref header) = self.header {
            if !self.kind.takes_header() {
                bail!(
                    "`header = \"{}\"` is not valid for {} probe `{}`; only function and macro probes take a header",
                    header,
                    self.kind,
                    self.name
                );
            }
        }

        let spec = match self.kind {
            ProbeKind::Header => ProbeSpec::header(&self.name),
            ProbeKind::Library => ProbeSpec::library(&self.name),
            ProbeKind::Function => ProbeSpec::Symbol {
                name: self.name.clone(),
                header: self.header.clone(),
            },
            ProbeKind::Macro => ProbeSpec::macro_in(
                &self.name,
                self.header.as_deref().unwrap_or(umbrella_header),
            ),
        };
        Ok(ProbeEntry {
            spec,
            requirement: self.requirement,
        })
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Probes are additive: the other config's probes run after ours.
    pub fn merge(&mut self, other: Config) {
        // Paths
        if other.paths.prefix.is_some() {
            self.paths.prefix = other.paths.prefix;
        }
        if !other.paths.include.is_empty() {
            self.paths.include = other.paths.include;
        }
        if !other.paths.lib.is_empty() {
            self.paths.lib = other.paths.lib;
        }

        // Toolchain
        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if !other.toolchain.cflags.is_empty() {
            self.toolchain.cflags = other.toolchain.cflags;
        }
        if !other.toolchain.ldflags.is_empty() {
            self.toolchain.ldflags = other.toolchain.ldflags;
        }

        // Output
        if other.output.dir.is_some() {
            self.output.dir = other.output.dir;
        }
        if other.output.format.is_some() {
            self.output.format = other.output.format;
        }
        if other.output.srcdir.is_some() {
            self.output.srcdir = other.output.srcdir;
        }

        self.probes.extend(other.probes);
    }

    /// Extra probe table entries.
    pub fn extra_probes(&self, umbrella_header: &str) -> Result<Vec<ProbeEntry>> {
        self.probes
            .iter()
            .map(|p| p.to_entry(umbrella_header))
            .collect()
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (z80conf.toml)
/// 2. Global config (~/.z80conf/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if let Some(global_path) = global_path {
        if global_path.exists() {
            tracing::debug!("loading global config {}", global_path.display());
            config.merge(Config::load_or_default(global_path));
        }
    }

    // Project config overrides global
    if project_path.exists() {
        tracing::debug!("loading project config {}", project_path.display());
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global z80conf config directory (~/.z80conf).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".z80conf"))
}

/// Get the global config path (~/.z80conf/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (z80conf.toml in the project root).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_NAME)
}
