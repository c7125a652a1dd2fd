use super::Registry;
use crate::types::{Address, AddressSet};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use log::debug;
use tokio::sync::Mutex;

/// In-memory set of known peers.
#[derive(Default)]
pub struct PeerBook {
    nodes: Mutex<AddressSet>,
}

impl PeerBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a peer after checking it looks like `host:port`.
    pub async fn add(&self, addr: Address) -> Result<()> {
        validate(&addr)?;
        let mut nodes = self.nodes.lock().await;
        if nodes.contains(&addr) {
            bail!("node {} already added", addr);
        }
        debug!("Added node {}", addr);
        nodes.insert(addr);
        Ok(())
    }

    pub async fn remove(&self, addr: &Address) -> bool {
        let removed = self.nodes.lock().await.remove(addr);
        if removed {
            debug!("Removed node {}", addr);
        }
        removed
    }

    pub async fn contains(&self, addr: &Address) -> bool {
        self.nodes.lock().await.contains(addr)
    }

    pub async fn len(&self) -> usize {
        self.nodes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.nodes.lock().await.is_empty()
    }
}

fn validate(addr: &Address) -> Result<()> {
    let (host, port) = addr
        .host_port()
        .ok_or_else(|| anyhow!("address {} is not host:port", addr))?;
    if host.is_empty() {
        bail!("address {} has no host", addr);
    }
    if port == 0 {
        bail!("address {} has port 0", addr);
    }
    Ok(())
}

#[async_trait]
impl Registry for PeerBook {
    async fn snapshot(&self) -> Vec<Address> {
        let nodes = self.nodes.lock().await;
        nodes.iter().cloned().collect()
    }

    async fn restore(&self, addr: Address) -> Result<()> {
        self.add(addr).await
    }
}
