use std::io::Write;

use anyhow::{Context, Result, anyhow};
use graphdb_manager::{GraphDatabase, GraphDatabaseManager, ManagerConfig, ServiceKind};

use crate::config;

/// Print every service the server offers, one per line
///
/// # Errors
/// Discovery failure or a failed write to `out`
pub async fn services(manager: &GraphDatabaseManager, out: &mut impl Write) -> Result<()> {
    manager.wait_for_discovery().await?;

    let names = manager.available_services()?;
    tracing::info!(count = names.len(), "services discovered");
    for name in names.iter() {
        if ServiceKind::from_name(name).is_some() {
            writeln!(out, "{name}")?;
        } else {
            writeln!(out, "{name} (no local proxy)")?;
        }
    }
    Ok(())
}

/// Print the raw descriptor of service `name` as pretty JSON
///
/// # Errors
/// Discovery failure, or the server does not offer `name`
pub async fn describe(
    manager: &GraphDatabaseManager,
    name: &str,
    out: &mut impl Write,
) -> Result<()> {
    manager.wait_for_discovery().await?;

    let descriptor = manager.descriptor(name).ok_or_else(|| {
        anyhow!(
            "service '{name}' is not offered by {}",
            manager.manage_url()
        )
    })?;
    let pretty = serde_json::to_string_pretty(descriptor.as_value())
        .context("failed to format descriptor")?;
    writeln!(out, "{pretty}")?;
    Ok(())
}

/// Validate the configuration and print it
///
/// # Errors
/// Unusable server URL or HTTP settings
pub fn check(config: &ManagerConfig, out: &mut impl Write) -> Result<()> {
    tracing::info!("checking configuration");
    let db = GraphDatabase::from_config(config)?;

    writeln!(out, "Configuration is valid")?;
    writeln!(out, "management url: {}", db.manage_url())?;
    writeln!(out, "{}", config::to_yaml(config)?)?;
    Ok(())
}
