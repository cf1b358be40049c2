//! The target library and its probe table.
//!
//! The surface a binding needs is declared as data: a header, a library,
//! and lists of names per check kind. [`TargetLibrary::probe_table`] turns
//! that into the ordered list the policy evaluator walks.

use std::fmt;

use serde::Serialize;

use crate::core::probe::{ProbeEntry, ProbeSpec};

/// Declarative description of a library a binding is built against.
#[derive(Debug, Clone, Copy)]
pub struct TargetLibrary {
    /// Human-readable name, also used for `--with-<name>-*` options.
    pub name: &'static str,
    /// Umbrella header declaring the public interface.
    pub header: &'static str,
    /// Canonical library name, as passed to `-l`.
    pub library: &'static str,
    /// Output target identifier, `dir/base`.
    pub target: &'static str,
    /// Functions that only need to resolve at link time.
    pub core_functions: &'static [&'static str],
    /// Link-time functions whose presence enables a feature define.
    pub optional_functions: &'static [&'static str],
    /// Functions that must also be declared by the umbrella header.
    pub introspection_functions: &'static [&'static str],
    /// Macros and constants that the umbrella header must define.
    pub macros: &'static [&'static str],
}

/// The Z80 CPU emulator library.
pub const Z80: TargetLibrary = TargetLibrary {
    name: "Z80",
    header: "Z80.h",
    library: "Z80",
    target: "z80/z80",
    core_functions: &[
        "z80_power",
        "z80_instant_reset",
        "z80_int",
        "z80_nmi",
        "z80_execute",
        "z80_run",
    ],
    optional_functions: &["z80_special_reset"],
    introspection_functions: &[
        "z80_break",
        "z80_r",
        "z80_refresh_address",
        "z80_in_cycle",
        "z80_out_cycle",
    ],
    macros: &[
        // Cycle limits
        "Z80_MAXIMUM_CYCLES",
        "Z80_MAXIMUM_CYCLES_PER_STEP",
        "Z80_MINIMUM_CYCLES_PER_STEP",
        // Hooks
        "Z80_HOOK",
        // Options
        "Z80_OPTION_OUT_VC_255",
        "Z80_OPTION_LD_A_IR_BUG",
        "Z80_OPTION_HALT_SKIP",
        "Z80_OPTION_XQ",
        "Z80_OPTION_IM0_RETX_NOTIFICATIONS",
        "Z80_OPTION_YQ",
        // Models
        "Z80_MODEL_ZILOG_NMOS",
        "Z80_MODEL_ZILOG_CMOS",
        "Z80_MODEL_NEC_NMOS",
        "Z80_MODEL_ST_CMOS",
        // Interrupt requests
        "Z80_REQUEST_REJECT_NMI",
        "Z80_REQUEST_NMI",
        "Z80_REQUEST_INT",
        // Resume modes
        "Z80_RESUME_HALT",
        "Z80_RESUME_XY",
        "Z80_RESUME_IM0_XY",
        // 16-bit registers
        "Z80_MEMPTR",
        "Z80_PC",
        "Z80_SP",
        "Z80_XY",
        "Z80_IX",
        "Z80_IY",
        "Z80_AF",
        "Z80_BC",
        "Z80_DE",
        "Z80_HL",
        "Z80_AF_",
        "Z80_BC_",
        "Z80_DE_",
        "Z80_HL_",
        // 8-bit registers
        "Z80_MEMPTRH",
        "Z80_MEMPTRL",
        "Z80_PCH",
        "Z80_PCL",
        "Z80_SPH",
        "Z80_SPL",
        "Z80_XYH",
        "Z80_XYL",
        "Z80_IXH",
        "Z80_IXL",
        "Z80_IYH",
        "Z80_IYL",
        "Z80_A",
        "Z80_F",
        "Z80_B",
        "Z80_C",
        "Z80_D",
        "Z80_E",
        "Z80_H",
        "Z80_L",
        "Z80_A_",
        "Z80_F_",
        "Z80_B_",
        "Z80_C_",
        "Z80_D_",
        "Z80_E_",
        "Z80_H_",
        "Z80_L_",
    ],
};

impl TargetLibrary {
    /// The ordered probe table.
    ///
    /// Header and library come first: every later trial includes the header
    /// or links the library, so their absence would make later failures
    /// misleading.
    pub fn probe_table(&self) -> Vec<ProbeEntry> {
        let mut table = vec![
            ProbeEntry::mandatory(ProbeSpec::header(self.header)),
            ProbeEntry::mandatory(ProbeSpec::library(self.library)),
        ];

        table.extend(
            self.core_functions
                .iter()
                .map(|f| ProbeEntry::mandatory(ProbeSpec::function(*f))),
        );
        table.extend(
            self.optional_functions
                .iter()
                .map(|f| ProbeEntry::optional(ProbeSpec::function(*f))),
        );
        table.extend(self.introspection_functions.iter().map(|f| {
            ProbeEntry::mandatory(ProbeSpec::declared_function(*f, self.header))
        }));
        table.extend(
            self.macros
                .iter()
                .map(|m| ProbeEntry::mandatory(ProbeSpec::macro_in(*m, self.header))),
        );

        table
    }

    /// The fixed output target name.
    pub fn target_name(&self) -> TargetName {
        TargetName::parse(self.target)
    }
}

/// Output artifact name split into its install prefix and base name.
///
/// `z80/z80` installs as `z80` under `/z80`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetName {
    pub base: String,
    pub prefix: String,
}

impl TargetName {
    pub fn parse(target: &str) -> Self {
        match target.rsplit_once('/') {
            Some((dir, base)) => TargetName {
                base: base.to_string(),
                prefix: format!("/{}", dir.trim_matches('/')),
            },
            None => TargetName {
                base: target.to_string(),
                prefix: String::new(),
            },
        }
    }

    /// Shared-object file name for the host platform.
    pub fn shared_object(&self) -> String {
        format!("{}.{}", self.base, std::env::consts::DLL_EXTENSION)
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.base)
        } else {
            write!(f, "{}/{}", self.prefix.trim_start_matches('/'), self.base)
        }
    }
}
