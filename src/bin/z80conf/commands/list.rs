//! `z80conf list` command

use anyhow::Result;

use crate::commands::load_project_config;
use z80conf::core::Z80;

pub fn execute() -> Result<()> {
    let (_, config) = load_project_config()?;

    let mut table = Z80.probe_table();
    table.extend(config.extra_probes(Z80.header)?);

    for entry in &table {
        println!(
            "{:<9} {:<36} {}",
            entry.spec.kind().as_str(),
            entry.spec.to_string(),
            entry.requirement
        );
    }

    Ok(())
}
