use crate::{compiler::DEFAULT_LANGUAGE, selector::SelectionConfig};
use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

pub const SERVICE_NAME: &str = "SOURCE_RESOLVER";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub network: NetworkContext,
    /// Explicit priority order of source providers. All registered providers
    /// are tried in registration order if not set.
    pub source_fetchers: Option<Vec<String>>,
    /// Provider specific options keyed by provider name.
    pub fetchers: BTreeMap<String, serde_json::Value>,
    pub compiler: CompilerSettings,
}

/// Network the resolved contract is deployed on.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkContext {
    pub name: String,
    pub id: u64,
}

impl Default for NetworkContext {
    fn default() -> Self {
        Self {
            name: "development".to_string(),
            id: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerSettings {
    pub language: String,
    /// Overrides the docker setting reported by providers.
    pub docker: Option<serde_json::Value>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            docker: None,
        }
    }
}

impl Settings {
    /// Reads the file referenced by `SOURCE_RESOLVER__CONFIG` (if set) and
    /// applies `SOURCE_RESOLVER__*` environment overrides on top.
    pub fn build() -> anyhow::Result<Self> {
        let config_path_name = format!("{SERVICE_NAME}__CONFIG");
        let config_path = std::env::var(&config_path_name);

        let mut builder = Config::builder();
        if let Ok(config_path) = config_path {
            builder = builder.add_source(File::with_name(&config_path));
            std::env::remove_var(&config_path_name);
        };
        // Use `__` so that keys with underscores in names stay addressable
        // (e.g. `SOURCE_RESOLVER__COMPILER__DOCKER`).
        builder =
            builder.add_source(config::Environment::with_prefix(SERVICE_NAME).separator("__"));

        let settings: Self = builder
            .build()?
            .try_deserialize()
            .map_err(|err| anyhow!(err))?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.network.name.is_empty() {
            return Err(anyhow!("network name should not be empty"));
        }
        if self.compiler.language.is_empty() {
            return Err(anyhow!("compiler language should not be empty"));
        }
        if let Some(source_fetchers) = &self.source_fetchers {
            if source_fetchers.is_empty() {
                return Err(anyhow!(
                    "source_fetchers should list at least one provider when set"
                ));
            }
            let mut seen = HashSet::new();
            if let Some(duplicate) = source_fetchers.iter().find(|name| !seen.insert(*name)) {
                return Err(anyhow!("source fetcher {duplicate} is listed more than once"));
            }
        }
        Ok(())
    }

    pub fn selection(&self) -> SelectionConfig {
        SelectionConfig {
            order: self.source_fetchers.clone(),
            options: self.fetchers.clone(),
            network_id: self.network.id,
        }
    }
}
