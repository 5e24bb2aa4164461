/// Substitution file reader
///
/// One rule per line, `from|to`. A `to` of `EXCLUDE` removes the key from the
/// transfer list. Blank lines and lines starting with `#` are skipped.

use anyhow::{bail, Context, Result};
use payout_core::{PayTo, SubstitutionRule, SubstitutionTable};
use std::path::Path;

pub fn parse(text: &str) -> Result<SubstitutionTable> {
    let mut rules = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split('|').map(str::trim);
        let (from, to) = match (fields.next(), fields.next(), fields.next()) {
            (Some(from), Some(to), None) if !from.is_empty() && !to.is_empty() => (from, to),
            _ => bail!("substitution line {}: expected `from|to`, got {:?}", idx + 1, raw),
        };
        rules.push(SubstitutionRule::new(from, PayTo::parse(to)));
    }

    Ok(SubstitutionTable::new(rules))
}

/// Read the table at `path`. A missing file is an empty table.
pub fn load(path: &Path) -> Result<SubstitutionTable> {
    if !path.exists() {
        tracing::info!("No substitution file at {}, using an empty table", path.display());
        return Ok(SubstitutionTable::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read substitution file {}", path.display()))?;
    let table = parse(&text).with_context(|| format!("in {}", path.display()))?;
    tracing::info!("Loaded {} substitution rules from {}", table.len(), path.display());
    Ok(table)
}
