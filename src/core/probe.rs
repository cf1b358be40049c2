//! Probe specifications and their recorded outcomes.
//!
//! A [`ProbeSpec`] names one thing the target library must (or may) expose.
//! The [`Prober`](crate::ops::probe::Prober) turns each spec into a
//! [`ProbeResult`] exactly once and appends it to a [`ProbeRecord`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One existence check against the target library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProbeSpec {
    /// A header that must be includable.
    Header { name: String },

    /// A library that must be linkable by its canonical name.
    Library { name: String },

    /// A function symbol.
    ///
    /// With `header` unset the symbol only needs to resolve at link time;
    /// with a header it must also be declared by that header.
    #[serde(rename = "function")]
    Symbol {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header: Option<String>,
    },

    /// A macro or constant that must be defined after including `header`.
    Macro { name: String, header: String },
}

impl ProbeSpec {
    /// Header probe for `name`.
    pub fn header(name: impl Into<String>) -> Self {
        ProbeSpec::Header { name: name.into() }
    }

    /// Library probe for `name`.
    pub fn library(name: impl Into<String>) -> Self {
        ProbeSpec::Library { name: name.into() }
    }

    /// Linkable-function probe for `name`.
    pub fn function(name: impl Into<String>) -> Self {
        ProbeSpec::Symbol {
            name: name.into(),
            header: None,
        }
    }

    /// Header-declared function probe for `name`.
    pub fn declared_function(name: impl Into<String>, header: impl Into<String>) -> Self {
        ProbeSpec::Symbol {
            name: name.into(),
            header: Some(header.into()),
        }
    }

    /// Macro probe for `name` in `header`.
    pub fn macro_in(name: impl Into<String>, header: impl Into<String>) -> Self {
        ProbeSpec::Macro {
            name: name.into(),
            header: header.into(),
        }
    }

    /// The probed name.
    pub fn name(&self) -> &str {
        match self {
            ProbeSpec::Header { name }
            | ProbeSpec::Library { name }
            | ProbeSpec::Symbol { name, .. }
            | ProbeSpec::Macro { name, .. } => name,
        }
    }

    /// The header this probe compiles against, if any.
    pub fn header_context(&self) -> Option<&str> {
        match self {
            ProbeSpec::Header { .. } | ProbeSpec::Library { .. } => None,
            ProbeSpec::Symbol { header, .. } => header.as_deref(),
            ProbeSpec::Macro { header, .. } => Some(header),
        }
    }

    /// The kind of check this spec performs.
    pub fn kind(&self) -> ProbeKind {
        match self {
            ProbeSpec::Header { .. } => ProbeKind::Header,
            ProbeSpec::Library { .. } => ProbeKind::Library,
            ProbeSpec::Symbol { .. } => ProbeKind::Function,
            ProbeSpec::Macro { .. } => ProbeKind::Macro,
        }
    }
}

impl fmt::Display for ProbeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeSpec::Header { name } => write!(f, "{}", name),
            ProbeSpec::Library { name } => write!(f, "-l{}", name),
            ProbeSpec::Symbol { name, header: None } => write!(f, "{}()", name),
            ProbeSpec::Symbol {
                name,
                header: Some(header),
            } => write!(f, "{}() in {}", name, header),
            ProbeSpec::Macro { name, header } => write!(f, "{} in {}", name, header),
        }
    }
}

/// Kind of probe, without the names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Header,
    Library,
    Function,
    Macro,
}

impl ProbeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeKind::Header => "header",
            ProbeKind::Library => "library",
            ProbeKind::Function => "function",
            ProbeKind::Macro => "macro",
        }
    }

    /// Whether a check of this kind is run in the context of a header.
    pub fn takes_header(&self) -> bool {
        matches!(self, ProbeKind::Function | ProbeKind::Macro)
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProbeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "header" => Ok(ProbeKind::Header),
            "library" | "lib" => Ok(ProbeKind::Library),
            "function" | "func" => Ok(ProbeKind::Function),
            "macro" | "constant" => Ok(ProbeKind::Macro),
            _ => Err(format!(
                "invalid probe kind '{}'; expected 'header', 'library', 'function', or 'macro'",
                s
            )),
        }
    }
}

/// How the policy treats a probe's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    /// Absence aborts configuration.
    #[default]
    Mandatory,
    /// Presence adds a feature define; absence is silent.
    Optional,
    /// Presence is recorded in the report only; never emitted as a define.
    Recorded,
}

impl Requirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Requirement::Mandatory => "mandatory",
            Requirement::Optional => "optional",
            Requirement::Recorded => "recorded",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Requirement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mandatory" | "required" => Ok(Requirement::Mandatory),
            "optional" => Ok(Requirement::Optional),
            "recorded" => Ok(Requirement::Recorded),
            _ => Err(format!(
                "invalid requirement '{}'; expected 'mandatory', 'optional', or 'recorded'",
                s
            )),
        }
    }
}

/// A row of the probe table: what to check and what its absence means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeEntry {
    pub spec: ProbeSpec,
    pub requirement: Requirement,
}

impl ProbeEntry {
    pub fn mandatory(spec: ProbeSpec) -> Self {
        ProbeEntry {
            spec,
            requirement: Requirement::Mandatory,
        }
    }

    pub fn optional(spec: ProbeSpec) -> Self {
        ProbeEntry {
            spec,
            requirement: Requirement::Optional,
        }
    }

    pub fn recorded(spec: ProbeSpec) -> Self {
        ProbeEntry {
            spec,
            requirement: Requirement::Recorded,
        }
    }
}

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// Whether the probed item exists.
    pub found: bool,

    /// Compiler/linker output of a failed trial. Only ever shown to humans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,

    /// Command line of the trial that produced this result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl ProbeResult {
    pub fn found() -> Self {
        ProbeResult {
            found: true,
            diagnostic: None,
            command: None,
        }
    }

    pub fn missing(diagnostic: impl Into<String>) -> Self {
        let diagnostic = diagnostic.into();
        ProbeResult {
            found: false,
            diagnostic: (!diagnostic.trim().is_empty()).then_some(diagnostic),
            command: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

/// Append-only record of every probe run so far, in execution order.
#[derive(Debug, Clone, Default)]
pub struct ProbeRecord {
    entries: Vec<(ProbeSpec, ProbeResult)>,
    index: HashMap<ProbeSpec, usize>,
}

impl ProbeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the recorded result for `spec`.
    pub fn get(&self, spec: &ProbeSpec) -> Option<&ProbeResult> {
        self.index.get(spec).map(|&i| &self.entries[i].1)
    }

    /// Record a result. A spec that is already present keeps its first result.
    pub fn insert(&mut self, spec: ProbeSpec, result: ProbeResult) -> &ProbeResult {
        let i = match self.index.get(&spec) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.index.insert(spec.clone(), i);
                self.entries.push((spec, result));
                i
            }
        };
        &self.entries[i].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProbeSpec, &ProbeResult)> {
        self.entries.iter().map(|(s, r)| (s, r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_display() {
        assert_eq!(ProbeSpec::header("Z80.h").to_string(), "Z80.h");
        assert_eq!(ProbeSpec::library("Z80").to_string(), "-lZ80");
        assert_eq!(ProbeSpec::function("z80_run").to_string(), "z80_run()");
        assert_eq!(
            ProbeSpec::declared_function("z80_r", "Z80.h").to_string(),
            "z80_r() in Z80.h"
        );
        assert_eq!(
            ProbeSpec::macro_in("Z80_PC", "Z80.h").to_string(),
            "Z80_PC in Z80.h"
        );
    }

    #[test]
    fn test_header_context() {
        assert_eq!(ProbeSpec::header("Z80.h").header_context(), None);
        assert_eq!(ProbeSpec::function("z80_run").header_context(), None);
        assert_eq!(
            ProbeSpec::declared_function("z80_r", "Z80.h").header_context(),
            Some("Z80.h")
        );
        assert_eq!(
            ProbeSpec::macro_in("Z80_PC", "Z80.h").header_context(),
            Some("Z80.h")
        );
    }

    #[test]
    fn test_requirement_parse() {
        assert_eq!("mandatory".parse::<Requirement>().unwrap(), Requirement::Mandatory);
        assert_eq!("Optional".parse::<Requirement>().unwrap(), Requirement::Optional);
        assert_eq!("recorded".parse::<Requirement>().unwrap(), Requirement::Recorded);
        assert!("sometimes".parse::<Requirement>().is_err());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("func".parse::<ProbeKind>().unwrap(), ProbeKind::Function);
        assert_eq!("lib".parse::<ProbeKind>().unwrap(), ProbeKind::Library);
        assert!("symbol-ish".parse::<ProbeKind>().is_err());
    }

    #[test]
    fn test_kind_takes_header() {
        assert!(ProbeKind::Function.takes_header());
        assert!(ProbeKind::Macro.takes_header());
        assert!(!ProbeKind::Header.takes_header());
        assert!(!ProbeKind::Library.takes_header());
    }

    #[test]
    fn test_missing_drops_blank_diagnostic() {
        assert_eq!(ProbeResult::missing("  \n").diagnostic, None);
        assert_eq!(
            ProbeResult::missing("undefined reference").diagnostic.as_deref(),
            Some("undefined reference")
        );
    }

    #[test]
    fn test_record_keeps_first_result() {
        let mut record = ProbeRecord::new();
        let spec = ProbeSpec::function("z80_run");

        record.insert(spec.clone(), ProbeResult::found());
        let kept = record.insert(spec.clone(), ProbeResult::missing("late"));

        assert!(kept.found);
        assert_eq!(record.len(), 1);
        assert!(record.get(&spec).unwrap().found);
    }

    #[test]
    fn test_spec_serde_tags() {
        let spec: ProbeSpec =
            toml::from_str("kind = \"function\"\nname = \"z80_run\"").unwrap();
        assert_eq!(spec, ProbeSpec::function("z80_run"));

        let spec: ProbeSpec =
            toml::from_str("kind = \"macro\"\nname = \"Z80_PC\"\nheader = \"Z80.h\"").unwrap();
        assert_eq!(spec, ProbeSpec::macro_in("Z80_PC", "Z80.h"));
    }
}
