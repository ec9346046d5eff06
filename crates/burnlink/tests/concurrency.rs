//! Concurrent reads must never hand out more views than the limit allows.

use std::sync::Arc;

use burnlink::{BurnlinkError, CreateOptions, MessageService};
use burnlink_store::{MemoryStore, SqliteStore, Store};
use burnlink_testkit::test_codec;

const READERS: usize = 24;

async fn race<S: Store + 'static>(
    services: Vec<Arc<MessageService<S>>>,
    id: &str,
) -> (usize, usize) {
    let tasks: Vec<_> = (0..READERS)
        .map(|i| {
            let service = services[i % services.len()].clone();
            let id = id.to_owned();
            tokio::spawn(async move { service.read(&id).await })
        })
        .collect();

    let mut ok = 0;
    let mut not_found = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => ok += 1,
            Err(BurnlinkError::MessageNotFound) => not_found += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    (ok, not_found)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_single_view_race_memory() {
    let service = Arc::new(MessageService::new(Arc::new(MemoryStore::new()), test_codec()));
    let id = service.create(CreateOptions::new("only once")).await.unwrap();

    let (ok, not_found) = race(vec![service.clone()], id.as_str()).await;
    assert_eq!(ok, 1);
    assert_eq!(not_found, READERS - 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_bounded_views_race_memory() {
    let service = Arc::new(MessageService::new(Arc::new(MemoryStore::new()), test_codec()));
    let id = service
        .create(CreateOptions::new("a few times").view_limit(5))
        .await
        .unwrap();

    let (ok, not_found) = race(vec![service.clone()], id.as_str()).await;
    assert_eq!(ok, 5);
    assert_eq!(not_found, READERS - 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_single_view_race_across_sqlite_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");

    // Separate connections to one file stand in for separate processes.
    let services: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::new(SqliteStore::open(&path).unwrap());
            Arc::new(MessageService::new(store, test_codec()))
        })
        .collect();

    let id = services[0]
        .create(CreateOptions::new("one reader wins"))
        .await
        .unwrap();

    let (ok, not_found) = race(services.clone(), id.as_str()).await;
    assert_eq!(ok, 1);
    assert_eq!(not_found, READERS - 1);

    for service in &services {
        service.shutdown().await;
    }
    assert_eq!(services[0].store().count().await.unwrap(), 0);
}
