use std::sync::Arc;

use tokio::sync::RwLock;

use common::Snapshot;

/// Holder of the last published snapshot.
///
/// Only the owning `RefreshCoordinator` can publish. Everyone else gets a
/// `SnapshotReader`.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published snapshot in full. Readers see either the old or
    /// the new snapshot, never a mix.
    pub(crate) async fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write().await = snapshot.clone();
        snapshot
    }

    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            current: self.current.clone(),
        }
    }
}

/// Cloneable read-only handle passed to the presentation layer.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotReader {
    pub async fn current(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AnalysisResult;

    #[tokio::test]
    async fn starts_empty() {
        let store = SnapshotStore::new();
        let snap = store.reader().current().await;
        assert!(snap.is_empty());
        assert!(snap.generated_at.is_empty());
    }

    #[tokio::test]
    async fn publish_replaces_whole_snapshot() {
        let store = SnapshotStore::new();
        let reader = store.reader();

        let before = reader.current().await;
        store
            .publish(Snapshot::new(
                vec![AnalysisResult::error("BTCUSDT")],
                "01.01.2026 00:00",
            ))
            .await;
        let after = reader.current().await;

        // An Arc handed out earlier still points at the old snapshot.
        assert!(before.is_empty());
        assert_eq!(after.len(), 1);
        assert_eq!(after.generated_at, "01.01.2026 00:00");
    }
}
