//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use z80conf::core::{DescriptorFormat, ProbeKind};
use z80conf::util::ColorChoice;

/// z80conf - probe the Z80 emulator library and write a build descriptor
#[derive(Parser)]
#[command(name = "z80conf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print every check as it runs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the library and write the build descriptor
    Configure(ConfigureArgs),

    /// Run a single check and print yes or no
    Probe(ProbeArgs),

    /// Show the checks `configure` runs
    List,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where to look for the Z80 headers and library.
#[derive(Args, Debug, Clone, Default)]
pub struct PathArgs {
    /// Installation prefix (searches <DIR>/include and <DIR>/lib)
    #[arg(long = "with-z80-dir", value_name = "DIR", env = "Z80_DIR")]
    pub with_z80_dir: Option<PathBuf>,

    /// Include directories (path list, repeatable)
    #[arg(long = "with-z80-include", value_name = "DIRS", env = "Z80_INCLUDE")]
    pub with_z80_include: Vec<String>,

    /// Library directories (path list, repeatable)
    #[arg(long = "with-z80-lib", value_name = "DIRS", env = "Z80_LIB")]
    pub with_z80_lib: Vec<String>,
}

/// Compiler selection and extra flags.
#[derive(Args, Debug, Clone, Default)]
pub struct CompilerArgs {
    /// C compiler to use (overrides CC and config)
    #[arg(long, value_name = "PATH")]
    pub cc: Option<PathBuf>,

    /// Extra compiler flags, space separated
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub cflags: Option<String>,

    /// Extra linker flags, space separated
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub ldflags: Option<String>,
}

#[derive(Args)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    #[command(flatten)]
    pub compiler: CompilerArgs,

    /// Directory to write the descriptor and probe log into
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Directory holding the binding's C sources
    #[arg(long, value_name = "DIR")]
    pub srcdir: Option<PathBuf>,

    /// Descriptor format: makefile or json
    #[arg(long)]
    pub format: Option<DescriptorFormat>,

    /// Do not write the probe log
    #[arg(long)]
    pub no_log: bool,
}

#[derive(Args)]
pub struct ProbeArgs {
    /// Check kind: header, library, function, macro
    pub kind: ProbeKind,

    /// Name to check for
    pub name: String,

    /// Header that must declare the function or define the macro
    #[arg(long)]
    pub header: Option<String>,

    #[command(flatten)]
    pub paths: PathArgs,

    #[command(flatten)]
    pub compiler: CompilerArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
