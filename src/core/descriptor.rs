//! The build descriptor handed to the downstream compile step.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::target::TargetName;

/// Output format of the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorFormat {
    #[default]
    Makefile,
    Json,
}

impl DescriptorFormat {
    /// File name the descriptor is written under.
    pub fn file_name(&self) -> &'static str {
        match self {
            DescriptorFormat::Makefile => "Makefile",
            DescriptorFormat::Json => "build.json",
        }
    }
}

impl FromStr for DescriptorFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "makefile" | "make" => Ok(DescriptorFormat::Makefile),
            "json" => Ok(DescriptorFormat::Json),
            _ => Err(format!(
                "invalid descriptor format '{}'; expected 'makefile' or 'json'",
                s
            )),
        }
    }
}

/// Everything the compile step needs to build the binding.
///
/// Built once by the emitter after every mandatory probe has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildDescriptor {
    /// Output artifact
    pub target: TargetName,
    /// C compiler driver
    pub compiler: String,
    /// `-I` flags
    pub include_flags: Vec<String>,
    /// Conditional-compilation defines, one per optional feature present
    pub defines: BTreeSet<String>,
    /// Extra compiler flags
    pub cflags: Vec<String>,
    /// `-L` flags
    pub lib_flags: Vec<String>,
    /// Extra linker flags
    pub ldflags: Vec<String>,
    /// Libraries to link, without `-l`
    pub libs: Vec<String>,
    /// Directory holding the binding sources
    pub srcdir: PathBuf,
    /// Binding source files, relative to `srcdir`
    pub sources: Vec<String>,
}

impl BuildDescriptor {
    /// Render the descriptor in the requested format.
    pub fn render(&self, format: DescriptorFormat) -> serde_json::Result<String> {
        match format {
            DescriptorFormat::Makefile => Ok(self.to_makefile()),
            DescriptorFormat::Json => {
                let mut json = serde_json::to_string_pretty(self)?;
                json.push('\n');
                Ok(json)
            }
        }
    }

    /// `-D` flags for the defines.
    pub fn define_flags(&self) -> Vec<String> {
        self.defines.iter().map(|d| format!("-D{}", d)).collect()
    }

    /// `-l` flags for the libraries.
    pub fn lib_link_flags(&self) -> Vec<String> {
        self.libs.iter().map(|l| format!("-l{}", l)).collect()
    }

    fn objects(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|s| match s.rsplit_once('.') {
                Some((stem, _)) => format!("{}.o", stem),
                None => format!("{}.o", s),
            })
            .collect()
    }

    /// Render as a POSIX makefile.
    pub fn to_makefile(&self) -> String {
        let mut cflags = vec!["-fPIC".to_string()];
        cflags.extend(self.cflags.iter().cloned());

        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "# Generated by z80conf {}. Do not edit.", env!("CARGO_PKG_VERSION"));
        let _ = writeln!(out);
        let _ = writeln!(out, "SHELL = /bin/sh");
        let _ = writeln!(out, "srcdir = {}", make_escape(&self.srcdir.display().to_string()));
        let _ = writeln!(out, "VPATH = $(srcdir)");
        let _ = writeln!(out);
        let _ = writeln!(out, "CC = {}", self.compiler);
        let _ = writeln!(out, "DEFS = {}", self.define_flags().join(" "));
        let _ = writeln!(
            out,
            "CPPFLAGS = {}",
            join_with(&make_words(&self.include_flags), "$(DEFS)")
        );
        let _ = writeln!(out, "CFLAGS = {}", cflags.join(" "));
        let _ = writeln!(
            out,
            "LDFLAGS = {}",
            join_all(&make_words(&self.lib_flags), &self.ldflags)
        );
        let _ = writeln!(out, "LIBS = {}", self.lib_link_flags().join(" "));
        let _ = writeln!(out);
        let _ = writeln!(out, "TARGET = {}", self.target.base);
        let _ = writeln!(out, "TARGET_PREFIX = {}", self.target.prefix);
        let _ = writeln!(out, "DLLIB = {}", self.target.shared_object());
        let _ = writeln!(out, "SRCS = {}", self.sources.join(" "));
        let _ = writeln!(out, "OBJS = {}", self.objects().join(" "));
        let _ = writeln!(out);
        let _ = writeln!(out, "prefix = /usr/local");
        let _ = writeln!(out, "libdir = $(prefix)/lib");
        let _ = writeln!(out, "installdir = $(DESTDIR)$(libdir)$(TARGET_PREFIX)");
        let _ = writeln!(out);
        let _ = writeln!(out, ".PHONY: all clean install");
        let _ = writeln!(out, ".SUFFIXES: .c .o");
        let _ = writeln!(out);
        let _ = writeln!(out, "all: $(DLLIB)");
        let _ = writeln!(out);
        let _ = writeln!(out, "$(DLLIB): $(OBJS)");
        let _ = writeln!(out, "\t$(CC) -shared -o $@ $(OBJS) $(LDFLAGS) $(LIBS)");
        let _ = writeln!(out);
        let _ = writeln!(out, ".c.o:");
        let _ = writeln!(out, "\t$(CC) $(CPPFLAGS) $(CFLAGS) -c $< -o $@");
        let _ = writeln!(out);
        let _ = writeln!(out, "install: $(DLLIB)");
        let _ = writeln!(out, "\tmkdir -p $(installdir)");
        let _ = writeln!(out, "\tcp $(DLLIB) $(installdir)/");
        let _ = writeln!(out);
        let _ = writeln!(out, "clean:");
        let _ = writeln!(out, "\trm -f $(OBJS) $(DLLIB)");
        out
    }
}

fn join_with(flags: &[String], tail: &str) -> String {
    let mut parts: Vec<&str> = flags.iter().map(String::as_str).collect();
    parts.push(tail);
    parts.join(" ")
}

fn join_all(a: &[String], b: &[String]) -> String {
    a.iter().chain(b.iter()).cloned().collect::<Vec<_>>().join(" ")
}

/// Quote each flag for the recipe shell and protect `$` from make.
fn make_words(flags: &[String]) -> Vec<String> {
    flags.iter().map(|f| shell_quote(f).replace('$', "$$")).collect()
}

fn shell_quote(word: &str) -> String {
    let plain = word
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_./=+,:@%".contains(c));
    if plain && !word.is_empty() {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

fn make_escape(s: &str) -> String {
    s.replace('$', "$$").replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> BuildDescriptor {
        BuildDescriptor {
            target: TargetName::parse("z80/z80"),
            compiler: "cc".to_string(),
            include_flags: vec!["-I/opt/z80/include".to_string()],
            defines: ["HAVE_Z80_SPECIAL_RESET".to_string()].into_iter().collect(),
            cflags: vec!["-O2".to_string()],
            lib_flags: vec!["-L/opt/z80/lib".to_string()],
            ldflags: vec![],
            libs: vec!["Z80".to_string()],
            srcdir: PathBuf::from("ext/z80"),
            sources: vec!["z80.c".to_string()],
        }
    }

    #[test]
    fn test_search_flags_are_quoted() {
        let mut desc = descriptor();
        desc.include_flags = vec!["-I/opt/my z80/include".to_string()];
        desc.lib_flags = vec!["-L/opt/$z80/lib".to_string()];

        let mk = desc.to_makefile();
        assert!(mk.contains("CPPFLAGS = '-I/opt/my z80/include' $(DEFS)\n"));
        assert!(mk.contains("LDFLAGS = '-L/opt/$$z80/lib'\n"));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("-I/opt/z80/include"), "-I/opt/z80/include");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("makefile".parse::<DescriptorFormat>().unwrap(), DescriptorFormat::Makefile);
        assert_eq!("JSON".parse::<DescriptorFormat>().unwrap(), DescriptorFormat::Json);
        assert!("ninja".parse::<DescriptorFormat>().is_err());
    }

    #[test]
    fn test_makefile_contents() {
        let mk = descriptor().to_makefile();
        assert!(mk.contains("CC = cc\n"));
        assert!(mk.contains("DEFS = -DHAVE_Z80_SPECIAL_RESET\n"));
        assert!(mk.contains("CPPFLAGS = -I/opt/z80/include $(DEFS)\n"));
        assert!(mk.contains("CFLAGS = -fPIC -O2\n"));
        assert!(mk.contains("LDFLAGS = -L/opt/z80/lib\n"));
        assert!(mk.contains("LIBS = -lZ80\n"));
        assert!(mk.contains("TARGET = z80\n"));
        assert!(mk.contains("TARGET_PREFIX = /z80\n"));
        assert!(mk.contains("SRCS = z80.c\n"));
        assert!(mk.contains("OBJS = z80.o\n"));
        assert!(mk.contains("\t$(CC) -shared -o $@ $(OBJS) $(LDFLAGS) $(LIBS)\n"));
    }

    #[test]
    fn test_makefile_without_defines() {
        let mut desc = descriptor();
        desc.defines.clear();
        let mk = desc.to_makefile();
        assert!(mk.contains("DEFS = \n"));
        assert!(!mk.contains("HAVE_"));
    }

    #[test]
    fn test_json_render() {
        let json = descriptor().render(DescriptorFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["target"]["base"], "z80");
        assert_eq!(value["defines"][0], "HAVE_Z80_SPECIAL_RESET");
        assert_eq!(value["libs"][0], "Z80");
    }

    #[test]
    fn test_make_escape() {
        assert_eq!(make_escape("/my dir/$x"), "/my\\ dir/$$x");
    }
}
