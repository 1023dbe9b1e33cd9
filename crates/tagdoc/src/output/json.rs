use std::fs;
use std::path::Path;

use crate::docs::SymbolRegistry;
use crate::error::Result;

/// The registry as one pretty-printed document with every object's keys
/// sorted.
pub fn to_json(registry: &SymbolRegistry) -> Result<String> {
    let value = serde_json::to_value(registry)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn write_json(
    registry: &SymbolRegistry,
    path: &Path,
) -> Result<()> {
    let mut text = to_json(registry)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}
