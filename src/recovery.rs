//! Startup recovery of the node list.

use log::{info, warn};

use crate::error::PersistError;
use crate::registry::Registry;
use crate::store::Store;
use crate::types::Address;

/// Outcome of [`load_nodes`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub restored: usize,
    /// Addresses the registry refused, with the reason it gave.
    pub rejected: Vec<(Address, String)>,
}

/// Reads the persisted node list and hands every address to the registry.
///
/// A missing file yields an empty report. Any other read failure is
/// returned and should abort startup. A rejected address is logged and
/// skipped; the rest are still restored.
pub async fn load_nodes(store: &Store, registry: &dyn Registry) -> Result<LoadReport, PersistError> {
    let nodes = match store.read() {
        Ok(nodes) => nodes,
        Err(e) if e.is_not_found() => {
            info!(
                "No node list at {}, starting empty",
                store.path().display()
            );
            return Ok(LoadReport::default());
        }
        Err(e) => return Err(e),
    };

    let mut sorted: Vec<Address> = nodes.into_iter().collect();
    sorted.sort();

    let mut report = LoadReport::default();
    for node in sorted {
        match registry.restore(node.clone()).await {
            Ok(()) => report.restored += 1,
            Err(e) => {
                warn!("Error loading node '{}' from persist: {}", node, e);
                report.rejected.push((node, e.to_string()));
            }
        }
    }

    info!(
        "Restored {} nodes from {} ({} rejected)",
        report.restored,
        store.path().display(),
        report.rejected.len()
    );
    Ok(report)
}
