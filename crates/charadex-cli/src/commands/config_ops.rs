use std::fs;
use std::io::Write;

use charadex_core::settings::{default_toml, parse_settings_toml};

use super::CommandError;

pub fn settings_export(out: &mut dyn Write) -> Result<(), CommandError> {
    write!(out, "{}", default_toml())?;
    Ok(())
}

pub fn settings_validate(out: &mut dyn Write, file: &str) -> Result<(), CommandError> {
    let content = fs::read_to_string(file)?;
    let s = parse_settings_toml(&content)?;
    writeln!(
        out,
        "OK: validation.min_coverage={}, validation.warn_coverage={}, validation.max_coverage={}, reference.max_characters={}",
        s.validation.min_coverage,
        s.validation.warn_coverage,
        s.validation.max_coverage,
        s.reference.max_characters
    )?;
    Ok(())
}
