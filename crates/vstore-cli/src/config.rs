use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use serde::{Deserialize, Serialize};
use vstore_acl::Owner;
use vstore_client::StoreConfig;

use crate::cli::Cli;

const DEFAULT_CONFIG_FILE: &str = ".vstore.toml";
const DEFAULT_OWNER: &str = "vstore";

/// Settings read from the TOML config file. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub state: Option<String>,
    pub owner: Option<String>,
    pub media_type: Option<String>,
    pub pretty: Option<bool>,
    pub owner_annotations: BTreeMap<String, String>,
}

impl CliConfig {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load the config file. An explicitly named file must exist; the
    /// default `$HOME/.vstore.toml` is optional.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match default_config_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }
}

fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_CONFIG_FILE))
}

/// Effective settings after merging flags, environment, and config file.
#[derive(Clone, Debug)]
pub struct Settings {
    pub state: String,
    pub owner: Owner,
    pub store: StoreConfig,
}

impl Settings {
    /// Flags (and their environment variables, which clap folds in) win over
    /// the config file, which wins over built-in defaults.
    pub fn resolve(cli: &Cli, file: CliConfig) -> anyhow::Result<Self> {
        let Some(state) = cli.state.clone().or(file.state) else {
            bail!("no state store configured: pass --state, set VSTORE_STATE, or set `state` in the config file");
        };

        let owner_name = cli
            .owner
            .clone()
            .or(file.owner)
            .unwrap_or_else(|| DEFAULT_OWNER.to_string());
        let mut owner = Owner::new(owner_name);
        owner.annotations = file.owner_annotations;

        let defaults = StoreConfig::default();
        let store = StoreConfig {
            media_type: file.media_type.unwrap_or(defaults.media_type),
            pretty: file.pretty.unwrap_or(defaults.pretty),
        };

        Ok(Self { state, owner, store })
    }
}
