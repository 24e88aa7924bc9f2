// Concurrency contract of the numbering allocator: N concurrent allocations
// for one user yield N distinct numbers with no duplicates.
//
// Requires a provisioned database reachable via TEST_DATABASE_URL; run with
// `cargo test -- --ignored` once one is available.

use std::collections::HashSet;
use std::sync::Arc;

use sqlx::mysql::MySqlPoolOptions;
use uuid::Uuid;

use faktura::numbering::repositories::MySqlSequenceRepository;
use faktura::numbering::SequenceRepository;

#[tokio::test]
#[ignore = "requires a provisioned MySQL database (TEST_DATABASE_URL)"]
async fn test_concurrent_allocations_yield_distinct_numbers() {
    let url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must point at a MySQL test database");

    let pool = MySqlPoolOptions::new()
        .max_connections(16)
        .connect(&url)
        .await
        .expect("failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let repo = Arc::new(MySqlSequenceRepository::new(pool, "INV".to_string(), 1));
    let user_id = format!("it-user-{}", Uuid::new_v4());

    let mut handles = Vec::new();
    for _ in 0..32 {
        let repo = repo.clone();
        let user_id = user_id.clone();
        handles.push(tokio::spawn(
            async move { repo.allocate(&user_id).await },
        ));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap().unwrap());
    }

    let distinct: HashSet<_> = numbers.iter().cloned().collect();
    assert_eq!(distinct.len(), numbers.len(), "duplicate numbers allocated");

    // The counter advanced exactly once per allocation
    let sequence = repo.get(&user_id).await.unwrap();
    assert_eq!(sequence.next_value, 1 + numbers.len() as u64);
}

#[tokio::test]
#[ignore = "requires a provisioned MySQL database (TEST_DATABASE_URL)"]
async fn test_updated_settings_apply_to_next_allocation() {
    let url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must point at a MySQL test database");

    let pool = MySqlPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let repo = MySqlSequenceRepository::new(pool, "INV".to_string(), 1);
    let user_id = format!("it-user-{}", Uuid::new_v4());

    repo.update(&user_id, "2025-".to_string(), 100).await.unwrap();

    assert_eq!(repo.allocate(&user_id).await.unwrap(), "2025-100");
    assert_eq!(repo.allocate(&user_id).await.unwrap(), "2025-101");
}
