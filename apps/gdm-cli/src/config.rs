use std::path::Path;

use anyhow::{Context, Result, ensure};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use graphdb_manager::ManagerConfig;

/// Environment prefix; `GDM__HTTP__TIMEOUT_SECS=5` maps to `http.timeout_secs`
pub const ENV_PREFIX: &str = "GDM__";

/// Values given on the command line, applied last
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Overrides {
    fn apply(&self, config: &mut ManagerConfig) {
        if let Some(url) = &self.url {
            config.url.clone_from(url);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.http.timeout_secs = timeout_secs;
        }
    }
}

/// Layered config: defaults, then YAML (if given), then `GDM__*` env, then CLI
///
/// # Errors
/// Missing config file, or a layer that does not deserialize into [`ManagerConfig`]
pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<ManagerConfig> {
    let mut figment = Figment::new().merge(Serialized::defaults(ManagerConfig::default()));
    if let Some(path) = path {
        ensure!(
            path.is_file(),
            "config file does not exist: {}",
            path.display()
        );
        figment = figment.merge(Yaml::file(path));
    }

    let mut config: ManagerConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("failed to load configuration")?;

    overrides.apply(&mut config);
    Ok(config)
}

/// Serialize configuration to YAML.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn to_yaml(config: &ManagerConfig) -> Result<String> {
    serde_saphyr::to_string(config).context("failed to serialize config to YAML")
}
