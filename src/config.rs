use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::types::NODES_FILE;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub persist_dir: PathBuf,
    pub save_interval_secs: u64,
    pub bootstrap_peers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            persist_dir: PathBuf::from("data"),
            save_interval_secs: 120,
            bootstrap_peers: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file("peerkeep.toml"))
                .merge(Json::file("peerkeep.json"))
                .merge(Env::prefixed("PEERKEEP_")),
        )
    }

    fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: Config = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        if config.save_interval_secs == 0 {
            anyhow::bail!("save_interval_secs must be greater than zero");
        }

        Ok(config)
    }

    pub fn save_interval(&self) -> Duration {
        Duration::from_secs(self.save_interval_secs)
    }

    pub fn nodes_path(&self) -> PathBuf {
        self.persist_dir.join(NODES_FILE)
    }
}
