//! Data structures shared by the persistence core.
//!
//! An [`Address`] is the opaque identity of a peer, usually `host:port`.
//! The live set of known peers is an [`AddressSet`]; what ends up on disk
//! is tagged with [`FormatMetadata`] so an incompatible file is refused
//! instead of half-understood.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the file holding the persisted node list.
pub const NODES_FILE: &str = "nodes.json";

/// Header and version identifying the node list file.
pub const NODES_METADATA: FormatMetadata = FormatMetadata {
    header: "Peerkeep Node List",
    version: "1.0.0",
};

/// A peer address such as `10.0.0.1:9981`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the address into host and port, if it has that shape.
    ///
    /// Bracketed IPv6 hosts (`[::1]:9981`) keep their brackets.
    pub fn host_port(&self) -> Option<(&str, u16)> {
        let (host, port) = self.0.rsplit_once(':')?;
        let port = port.parse().ok()?;
        Some((host, port))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The set of known peers. Insertion order carries no meaning.
pub type AddressSet = HashSet<Address>;

/// Identifies the on-disk schema of a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatMetadata {
    pub header: &'static str,
    pub version: &'static str,
}
