//! Peerkeep daemon entry point.

use std::sync::Arc;

use log::{error, info, warn};
use tokio::signal;

use peerkeep::codec::SnapshotCodec;
use peerkeep::config::Config;
use peerkeep::recovery::load_nodes;
use peerkeep::registry::{PeerBook, Registry};
use peerkeep::scheduler::{save, SaveScheduler};
use peerkeep::shutdown::ThreadGroup;
use peerkeep::store::Store;
use peerkeep::types::{Address, NODES_METADATA};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    // Load configuration
    let cfg = Config::load()?;
    info!("Starting peerkeep with config: {:?}", cfg);

    std::fs::create_dir_all(&cfg.persist_dir)?;
    let store = Arc::new(Store::new(
        cfg.nodes_path(),
        SnapshotCodec::new(NODES_METADATA),
    ));

    // Shared state
    let book = Arc::new(PeerBook::new());

    // Recover the node list before anything else touches the book
    load_nodes(&store, book.as_ref()).await?;

    for peer in &cfg.bootstrap_peers {
        if let Err(e) = book.add(Address::from(peer.as_str())).await {
            warn!("Skipping bootstrap peer {}: {}", peer, e);
        }
    }

    // Background saves
    let group = ThreadGroup::new();
    let scheduler = SaveScheduler::start(
        book.clone(),
        Arc::clone(&store),
        Arc::clone(&group),
        cfg.save_interval(),
    );

    // Graceful Shutdown
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C, shutting down...");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }

    group.stop().await;
    scheduler.await_stop().await;

    // One last save now that nothing else is writing
    let nodes = book.snapshot().await.into_iter().collect();
    if let Err(e) = save(store, nodes).await {
        error!("Unable to save node list on shutdown: {}", e);
    }

    info!("Shutdown complete.");
    Ok(())
}
