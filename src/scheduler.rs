//! Periodic flush of the address set to disk.
//!
//! The loop sleeps for one interval, or until the thread group is told to
//! stop, whichever comes first. A save joins the thread group for its whole
//! duration so shutdown can wait for it; if the group is already stopping
//! the save is skipped and the loop ends.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::registry::Registry;
use crate::shutdown::ThreadGroup;
use crate::store::Store;
use crate::types::AddressSet;

pub struct SaveScheduler {
    handle: JoinHandle<()>,
}

impl SaveScheduler {
    /// Spawns the save loop on the current tokio runtime.
    pub fn start(
        registry: Arc<dyn Registry>,
        store: Arc<Store>,
        group: Arc<ThreadGroup>,
        interval: Duration,
    ) -> Self {
        let handle = tokio::spawn(save_loop(registry, store, group, interval));
        Self { handle }
    }

    /// Waits for the save loop to exit. Only returns after the thread group
    /// has been stopped.
    pub async fn await_stop(self) {
        if let Err(e) = self.handle.await {
            error!("Save loop terminated abnormally: {}", e);
        }
    }
}

async fn save_loop(
    registry: Arc<dyn Registry>,
    store: Arc<Store>,
    group: Arc<ThreadGroup>,
    interval: Duration,
) {
    info!(
        "Saving node list to {} every {:?}",
        store.path().display(),
        interval
    );
    let mut failures: u64 = 0;

    loop {
        tokio::select! {
            _ = group.stopped() => break,
            _ = sleep(interval) => {}
        }

        let Ok(_guard) = group.enter() else {
            break;
        };

        let nodes: AddressSet = registry.snapshot().await.into_iter().collect();
        match save(Arc::clone(&store), nodes).await {
            Ok(()) => failures = 0,
            Err(e) => {
                failures += 1;
                error!(
                    "Unable to save node list ({} consecutive failures): {}",
                    failures, e
                );
            }
        }
    }

    debug!("Save loop stopped");
}

/// Writes `nodes` on the blocking pool so the fsync does not stall the runtime.
pub async fn save(store: Arc<Store>, nodes: AddressSet) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || store.write(&nodes)).await??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SnapshotCodec;
    use crate::registry::PeerBook;
    use crate::types::{Address, NODES_FILE, NODES_METADATA};
    use tokio::time::{timeout, Instant};

    const INTERVAL: Duration = Duration::from_millis(50);

    fn set(addrs: &[&str]) -> AddressSet {
        addrs.iter().map(|a| Address::from(*a)).collect()
    }

    async fn wait_for_contents(store: &Store, expected: &AddressSet) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Ok(found) = store.read() {
                if &found == expected {
                    return;
                }
            }
            assert!(
                Instant::now() < deadline,
                "persisted node list never became {:?}",
                expected
            );
            sleep(Duration::from_millis(10)).await;
        }
    }

    fn setup() -> (tempfile::TempDir, Arc<PeerBook>, Arc<Store>, Arc<ThreadGroup>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::new(
            dir.path().join(NODES_FILE),
            SnapshotCodec::new(NODES_METADATA),
        ));
        (dir, Arc::new(PeerBook::new()), store, ThreadGroup::new())
    }

    #[tokio::test]
    async fn tracks_the_live_set() {
        let (_dir, book, store, group) = setup();
        book.add("10.0.0.1:9981".into()).await.unwrap();
        book.add("10.0.0.2:9981".into()).await.unwrap();

        let scheduler =
            SaveScheduler::start(book.clone(), store.clone(), group.clone(), INTERVAL);

        wait_for_contents(&store, &set(&["10.0.0.1:9981", "10.0.0.2:9981"])).await;

        book.remove(&"10.0.0.1:9981".into()).await;
        wait_for_contents(&store, &set(&["10.0.0.2:9981"])).await;

        group.stop().await;
        timeout(Duration::from_secs(1), scheduler.await_stop())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn stop_before_first_tick_writes_nothing() {
        let (_dir, book, store, group) = setup();
        book.add("10.0.0.1:9981".into()).await.unwrap();

        let scheduler =
            SaveScheduler::start(book.clone(), store.clone(), group.clone(), INTERVAL);
        group.stop().await;

        timeout(INTERVAL, scheduler.await_stop()).await.unwrap();
        assert!(store.read().unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn no_saves_after_stop_returns() {
        let (_dir, book, store, group) = setup();
        book.add("10.0.0.1:9981".into()).await.unwrap();

        let scheduler =
            SaveScheduler::start(book.clone(), store.clone(), group.clone(), INTERVAL);
        wait_for_contents(&store, &set(&["10.0.0.1:9981"])).await;

        // Race the stop against the next tick.
        sleep(INTERVAL).await;
        group.stop().await;
        timeout(Duration::from_secs(1), scheduler.await_stop())
            .await
            .unwrap();

        let frozen = std::fs::read(store.path()).unwrap();
        book.add("10.0.0.2:9981".into()).await.unwrap();
        sleep(INTERVAL * 3).await;
        assert_eq!(std::fs::read(store.path()).unwrap(), frozen);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn failed_saves_keep_the_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-yet");
        let store = Arc::new(Store::new(
            missing.join(NODES_FILE),
            SnapshotCodec::new(NODES_METADATA),
        ));
        let book = Arc::new(PeerBook::new());
        let group = ThreadGroup::new();
        book.add("10.0.0.1:9981".into()).await.unwrap();

        let scheduler =
            SaveScheduler::start(book.clone(), store.clone(), group.clone(), INTERVAL);

        // Several cycles fail because the directory is absent.
        sleep(INTERVAL * 3).await;
        std::fs::create_dir(&missing).unwrap();
        wait_for_contents(&store, &set(&["10.0.0.1:9981"])).await;

        group.stop().await;
        scheduler.await_stop().await;
    }
}
