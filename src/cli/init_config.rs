use super::config::{default_config_path, LedgerConfig};
use std::path::PathBuf;

/// Write a commented default configuration file
pub fn execute(path: Option<String>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = path.map(PathBuf::from).unwrap_or_else(default_config_path);

    LedgerConfig::create_default(&path, force)?;
    println!("Created: {}", path.display());
    println!("Set [rpc] endpoint before querying a contract.");

    Ok(())
}
