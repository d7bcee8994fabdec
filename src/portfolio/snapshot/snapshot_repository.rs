use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::errors::{Error, Result, StorageError};

use super::snapshot_model::{Snapshot, SnapshotItem, SnapshotKind};

/// Persistence contract for snapshots.
///
/// `save` writes the header and all item rows as one logical transaction:
/// either everything becomes visible or nothing does. Items are owned by
/// their snapshot and removed with it.
pub trait SnapshotRepositoryTrait: Send + Sync {
    fn save(&self, snapshot: &Snapshot, items: &[SnapshotItem]) -> Result<()>;
    fn get_by_id(&self, snapshot_id: &str) -> Result<Snapshot>;
    fn get_by_slug(&self, slug: &str) -> Result<Snapshot>;
    fn get_items(&self, snapshot_id: &str) -> Result<Vec<SnapshotItem>>;

    /// Most recent snapshot of the same kind and parent strictly before
    /// `before`.
    fn get_latest_before(
        &self,
        kind: SnapshotKind,
        entity_id: &str,
        before: NaiveDate,
    ) -> Result<Option<Snapshot>>;

    fn slug_exists(&self, slug: &str) -> Result<bool>;
    fn set_irr(&self, snapshot_id: &str, irr_pct: f64) -> Result<()>;
    fn delete(&self, snapshot_id: &str) -> Result<()>;
}

#[derive(Default)]
struct Store {
    snapshots: HashMap<String, Snapshot>,
    items: HashMap<String, Vec<SnapshotItem>>,
}

/// In-memory reference implementation. A single write lock around the whole
/// store makes every `save` atomic.
#[derive(Default)]
pub struct InMemorySnapshotRepository {
    store: RwLock<Store>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotRepositoryTrait for InMemorySnapshotRepository {
    fn save(&self, snapshot: &Snapshot, items: &[SnapshotItem]) -> Result<()> {
        if let Some(stray) = items.iter().find(|item| item.snapshot_id != snapshot.id) {
            return Err(Error::Storage(StorageError::OperationFailed(format!(
                "Item {} does not belong to snapshot {}",
                stray.id, snapshot.id
            ))));
        }
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        store
            .snapshots
            .insert(snapshot.id.clone(), snapshot.clone());
        store.items.insert(snapshot.id.clone(), items.to_vec());
        Ok(())
    }

    fn get_by_id(&self, snapshot_id: &str) -> Result<Snapshot> {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        store
            .snapshots
            .get(snapshot_id)
            .cloned()
            .ok_or_else(|| Error::Storage(StorageError::NotFound(snapshot_id.to_string())))
    }

    fn get_by_slug(&self, slug: &str) -> Result<Snapshot> {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        store
            .snapshots
            .values()
            .find(|snapshot| snapshot.slug == slug)
            .cloned()
            .ok_or_else(|| Error::Storage(StorageError::NotFound(slug.to_string())))
    }

    fn get_items(&self, snapshot_id: &str) -> Result<Vec<SnapshotItem>> {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        Ok(store.items.get(snapshot_id).cloned().unwrap_or_default())
    }

    fn get_latest_before(
        &self,
        kind: SnapshotKind,
        entity_id: &str,
        before: NaiveDate,
    ) -> Result<Option<Snapshot>> {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        Ok(store
            .snapshots
            .values()
            .filter(|snapshot| {
                snapshot.kind == kind
                    && snapshot.entity_id == entity_id
                    && snapshot.snapshot_date < before
            })
            .max_by_key(|snapshot| (snapshot.snapshot_date, snapshot.created_at))
            .cloned())
    }

    fn slug_exists(&self, slug: &str) -> Result<bool> {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        Ok(store
            .snapshots
            .values()
            .any(|snapshot| snapshot.slug == slug))
    }

    fn set_irr(&self, snapshot_id: &str, irr_pct: f64) -> Result<()> {
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        let snapshot = store
            .snapshots
            .get_mut(snapshot_id)
            .ok_or_else(|| Error::Storage(StorageError::NotFound(snapshot_id.to_string())))?;
        snapshot.irr_pct = Some(irr_pct);
        Ok(())
    }

    fn delete(&self, snapshot_id: &str) -> Result<()> {
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        store.snapshots.remove(snapshot_id);
        // Items cascade with their parent.
        store.items.remove(snapshot_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(entity_id: &str, date_str: &str, slug: &str) -> Snapshot {
        Snapshot::new(
            SnapshotKind::Portfolio,
            entity_id,
            date_str.parse().unwrap(),
            format!("{} {}", entity_id, date_str),
            slug.to_string(),
            "TRY",
        )
    }

    #[test]
    fn save_and_load_round_trip() {
        let repository = InMemorySnapshotRepository::new();
        let snap = snapshot("p1", "2024-01-31", "p1-jan#aaaaaa");
        let mut item = SnapshotItem::new(&snap.id, "THYAO");
        item.market_value = dec!(100);

        repository.save(&snap, &[item]).unwrap();
        assert_eq!(repository.get_by_id(&snap.id).unwrap().slug, snap.slug);
        assert_eq!(repository.get_items(&snap.id).unwrap().len(), 1);
        assert!(repository.slug_exists("p1-jan#aaaaaa").unwrap());
        assert_eq!(repository.get_by_slug("p1-jan#aaaaaa").unwrap().id, snap.id);
    }

    #[test]
    fn rejects_items_of_another_snapshot() {
        let repository = InMemorySnapshotRepository::new();
        let snap = snapshot("p1", "2024-01-31", "a#aaaaaa");
        let stray = SnapshotItem::new("other-snapshot", "THYAO");

        assert!(repository.save(&snap, &[stray]).is_err());
        // Nothing was written.
        assert!(repository.get_by_id(&snap.id).is_err());
    }

    #[test]
    fn latest_before_ignores_other_entities_and_later_dates() {
        let repository = InMemorySnapshotRepository::new();
        repository
            .save(&snapshot("p1", "2024-01-31", "a#aaaaaa"), &[])
            .unwrap();
        repository
            .save(&snapshot("p1", "2024-02-29", "b#aaaaaa"), &[])
            .unwrap();
        repository
            .save(&snapshot("p2", "2024-03-31", "c#aaaaaa"), &[])
            .unwrap();

        let found = repository
            .get_latest_before(SnapshotKind::Portfolio, "p1", "2024-03-15".parse().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(found.snapshot_date, "2024-02-29".parse().unwrap());

        let none = repository
            .get_latest_before(SnapshotKind::Portfolio, "p1", "2024-01-01".parse().unwrap())
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn delete_cascades_items() {
        let repository = InMemorySnapshotRepository::new();
        let snap = snapshot("p1", "2024-01-31", "a#aaaaaa");
        repository
            .save(&snap, &[SnapshotItem::new(&snap.id, "THYAO")])
            .unwrap();

        repository.delete(&snap.id).unwrap();
        assert!(repository.get_by_id(&snap.id).is_err());
        assert!(repository.get_items(&snap.id).unwrap().is_empty());
    }

    #[test]
    fn irr_backfill_updates_header_only() {
        let repository = InMemorySnapshotRepository::new();
        let snap = snapshot("p1", "2024-01-31", "a#aaaaaa");
        repository.save(&snap, &[]).unwrap();

        repository.set_irr(&snap.id, 0.123).unwrap();
        assert_eq!(repository.get_by_id(&snap.id).unwrap().irr_pct, Some(0.123));
    }
}
