//! Integration tests for the registry over the durable store.
//!
//! Tests: Registry → SqliteItemStore → SQLite
//!
//! Verifies:
//! - Records survive a round trip through the database unchanged
//! - Concurrent checkouts of one item produce exactly one winner, both through
//!   the single-connection test database and a pooled on-disk database
//! - The registry works behind a runtime-chosen `Arc<dyn ItemStore>`

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Barrier;

    use depot_inventory::{IdentifierEncoder, ItemId, NewItem, RenderOptions};

    use crate::item_store::{InMemoryItemStore, ItemStore, SqliteItemStore};
    use crate::registry::{ItemRegistry, RegistryError};

    async fn sqlite_registry() -> ItemRegistry<SqliteItemStore> {
        let store = SqliteItemStore::in_memory().await.unwrap();
        ItemRegistry::new(store, IdentifierEncoder::default())
    }

    #[tokio::test]
    async fn check_in_and_out_through_sqlite() {
        let registry = sqlite_registry().await;

        let item = registry
            .check_in(NewItem::new("Drill", "Bob", "Aisle 3"))
            .await
            .unwrap();
        let loaded = registry.get(item.id_typed()).await.unwrap();
        assert_eq!(loaded, item);
        assert_eq!(loaded.scan_artifact().decode().unwrap(), loaded.identifier_payload());

        let out = registry.check_out(item.id_typed(), "Carol").await.unwrap();
        assert_eq!(out.checkout().unwrap().taken_by, "Carol");
        assert!(out.checkout().unwrap().time_out >= out.time_in());

        let err = registry.check_out(item.id_typed(), "Dave").await.unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyCheckedOut { ref taken_by } if taken_by == "Carol"));
    }

    #[tokio::test]
    async fn failed_check_in_leaves_sqlite_untouched() {
        let registry = sqlite_registry().await;
        let err = registry
            .check_in(NewItem::new("Drill", "", "Aisle 3"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
        assert!(registry.list().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sqlite_checkouts_have_exactly_one_winner() {
        const RACERS: usize = 12;

        let registry = Arc::new(sqlite_registry().await);
        let id = registry
            .check_in(NewItem::new("Forklift battery", "Bob", "Bay 7"))
            .await
            .unwrap()
            .id_typed();
        let barrier = Arc::new(Barrier::new(RACERS));

        let handles: Vec<_> = (0..RACERS)
            .map(|i| {
                let registry = registry.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    registry.check_out(id, &format!("picker-{i}")).await
                })
            })
            .collect();

        let mut ok = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(RegistryError::AlreadyCheckedOut { .. }) => rejected += 1,
                Err(e) => panic!("unexpected error: {e:?}"),
            }
        }
        assert_eq!((ok, rejected), (1, RACERS - 1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_checkouts_on_a_pooled_database_file_have_exactly_one_winner() {
        const ROUNDS: usize = 5;
        const RACERS: usize = 32;

        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("depot.db").display());
        let store = SqliteItemStore::connect(&url).await.unwrap();
        let registry = Arc::new(ItemRegistry::new(store, IdentifierEncoder::default()));

        for round in 0..ROUNDS {
            let id = registry
                .check_in(NewItem::new(format!("Pallet {round}"), "Bob", "Bay 7"))
                .await
                .unwrap()
                .id_typed();
            let barrier = Arc::new(Barrier::new(RACERS));

            let handles: Vec<_> = (0..RACERS)
                .map(|i| {
                    let registry = registry.clone();
                    let barrier = barrier.clone();
                    tokio::spawn(async move {
                        barrier.wait().await;
                        registry.check_out(id, &format!("picker-{i}")).await
                    })
                })
                .collect();

            let mut winners = Vec::new();
            let mut rejected = 0;
            for handle in handles {
                match handle.await.unwrap() {
                    Ok(item) => winners.push(item.checkout().unwrap().taken_by.clone()),
                    Err(RegistryError::AlreadyCheckedOut { .. }) => rejected += 1,
                    Err(e) => panic!("round {round}: unexpected error: {e:?}"),
                }
            }
            assert_eq!((winners.len(), rejected), (1, RACERS - 1), "round {round}");

            let stored = registry.get(id).await.unwrap();
            assert_eq!(stored.checkout().unwrap().taken_by, winners[0]);
        }
    }

    #[tokio::test]
    async fn registry_over_dyn_store() {
        let stores: Vec<Arc<dyn ItemStore>> = vec![
            Arc::new(InMemoryItemStore::new()),
            Arc::new(SqliteItemStore::in_memory().await.unwrap()),
        ];

        for store in stores {
            let registry = ItemRegistry::new(store, IdentifierEncoder::default());
            let item = registry
                .check_in(NewItem::new("Ladder", "Eve", "Dock 2"))
                .await
                .unwrap();
            assert_eq!(registry.list().await.unwrap(), vec![item.clone()]);
            assert!(matches!(
                registry.check_out(ItemId::new(), "Eve").await,
                Err(RegistryError::NotFound)
            ));
        }
    }

    #[tokio::test]
    async fn payload_over_configured_limit_is_an_encoding_error() {
        let encoder = IdentifierEncoder::new(RenderOptions {
            max_payload_len: 32,
            ..RenderOptions::default()
        })
        .unwrap();
        let registry = ItemRegistry::new(SqliteItemStore::in_memory().await.unwrap(), encoder);

        // "Drill-Bob-" + 24-char timestamp = 34 characters.
        let err = registry
            .check_in(NewItem::new("Drill", "Bob", "Aisle 3"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Encoding(_)));
        assert!(registry.list().await.unwrap().is_empty());
    }
}
