//! Integration tests for the Diesel adapters against a live PostgreSQL.
//!
//! Set `EVENTHUB_TEST_DATABASE_URL` to a disposable database to run them;
//! without it every test returns early. Migrations are applied on first use
//! and each test creates uniquely named rows so runs never collide.

use std::collections::BTreeSet;
use std::sync::Arc;

use eventhub::domain::ports::{
    EventRepository, InsertOutcome, RegistrationStore, RemoveOutcome, UserPersistenceError,
    UserRepository,
};
use eventhub::domain::{CredentialHash, EventId, NewEvent, NewUser, UserId, Username};
use eventhub::outbound::persistence::{
    DbPool, DieselEventRepository, DieselRegistrationStore, DieselUserRepository, PoolConfig,
    run_pending_migrations,
};
use tokio::sync::{Barrier, OnceCell};
use uuid::Uuid;

const DATABASE_URL_ENV: &str = "EVENTHUB_TEST_DATABASE_URL";

static MIGRATED: OnceCell<()> = OnceCell::const_new();

struct Adapters {
    users: DieselUserRepository,
    events: DieselEventRepository,
    registrations: Arc<DieselRegistrationStore>,
}

async fn adapters() -> Option<Adapters> {
    let Ok(url) = std::env::var(DATABASE_URL_ENV) else {
        eprintln!("SKIP-TEST-CLUSTER: {DATABASE_URL_ENV} not set");
        return None;
    };
    MIGRATED
        .get_or_init(|| async {
            run_pending_migrations(&url).await.expect("migrations apply");
        })
        .await;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(8))
        .await
        .expect("pool builds");
    Some(Adapters {
        users: DieselUserRepository::new(pool.clone()),
        events: DieselEventRepository::new(pool.clone()),
        registrations: Arc::new(DieselRegistrationStore::new(pool)),
    })
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

async fn add_event(adapters: &Adapters, capacity: u32) -> EventId {
    let event = NewEvent::try_from_parts(&unique("event"), capacity).expect("valid event");
    adapters
        .events
        .insert_if_absent(&event)
        .await
        .expect("insert event")
        .expect("fresh event")
        .id
}

async fn add_user(adapters: &Adapters) -> UserId {
    adapters
        .users
        .insert(&NewUser {
            username: Username::new(unique("user")).expect("valid username"),
            credential_hash: CredentialHash::new("unused"),
            is_admin: false,
        })
        .await
        .expect("insert user")
        .id()
}

#[tokio::test]
async fn insert_if_absent_skips_existing_names() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let event = NewEvent::try_from_parts(&unique("event"), 5).expect("valid event");

    let first = adapters.events.insert_if_absent(&event).await.expect("first");
    let second = adapters.events.insert_if_absent(&event).await.expect("second");

    assert!(first.is_some());
    assert!(second.is_none());
}

#[tokio::test]
async fn duplicate_usernames_are_reported() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let user = NewUser {
        username: Username::new(unique("user")).expect("valid username"),
        credential_hash: CredentialHash::new("unused"),
        is_admin: false,
    };

    adapters.users.insert(&user).await.expect("first insert");
    let err = adapters
        .users
        .insert(&user)
        .await
        .expect_err("duplicate insert");

    assert!(matches!(err, UserPersistenceError::DuplicateUsername { .. }));
}

#[tokio::test]
async fn try_insert_reports_duplicates_before_capacity() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let event_id = add_event(&adapters, 1).await;
    let alice = add_user(&adapters).await;
    let bob = add_user(&adapters).await;
    let store = &adapters.registrations;

    let first = store.try_insert(alice, event_id).await.expect("first");
    let again = store.try_insert(alice, event_id).await.expect("again");
    let full = store.try_insert(bob, event_id).await.expect("full");

    assert!(matches!(first, InsertOutcome::Inserted(_)));
    assert_eq!(again, InsertOutcome::DuplicateViolation);
    assert_eq!(full, InsertOutcome::CapacityViolation);
    assert_eq!(store.count_for_event(event_id).await.expect("count"), 1);
}

#[tokio::test]
async fn try_insert_reports_missing_references() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let user_id = add_user(&adapters).await;

    let outcome = adapters
        .registrations
        .try_insert(user_id, EventId::new(i64::MAX))
        .await
        .expect("insert attempt");

    assert_eq!(outcome, InsertOutcome::MissingReference);
}

#[tokio::test]
async fn remove_releases_the_seat() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let event_id = add_event(&adapters, 1).await;
    let alice = add_user(&adapters).await;
    let bob = add_user(&adapters).await;
    let store = &adapters.registrations;
    store.try_insert(alice, event_id).await.expect("alice");

    assert_eq!(
        store.remove(alice, event_id).await.expect("remove"),
        RemoveOutcome::Removed
    );
    assert_eq!(
        store.remove(alice, event_id).await.expect("remove again"),
        RemoveOutcome::Absent
    );
    assert!(matches!(
        store.try_insert(bob, event_id).await.expect("bob"),
        InsertOutcome::Inserted(_)
    ));
    assert_eq!(
        store.event_ids_for_user(bob).await.expect("enrollments"),
        BTreeSet::from([event_id])
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_respect_capacity() {
    let Some(adapters) = adapters().await else {
        return;
    };
    let event_id = add_event(&adapters, 3).await;
    let mut users = Vec::new();
    for _ in 0..12 {
        users.push(add_user(&adapters).await);
    }

    let barrier = Arc::new(Barrier::new(users.len()));
    let handles: Vec<_> = users
        .iter()
        .map(|user_id| {
            let store = Arc::clone(&adapters.registrations);
            let barrier = Arc::clone(&barrier);
            let user_id = *user_id;
            tokio::spawn(async move {
                barrier.wait().await;
                store.try_insert(user_id, event_id).await
            })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        match handle.await.expect("task joined") {
            Ok(InsertOutcome::Inserted(_)) => inserted += 1,
            Ok(InsertOutcome::CapacityViolation) => {}
            // Serialisation losers are retried by the enrollment core.
            Err(err) => assert!(err.is_transient(), "unexpected error: {err}"),
            Ok(other) => panic!("unexpected outcome: {other:?}"),
        }
    }

    let count = adapters
        .registrations
        .count_for_event(event_id)
        .await
        .expect("count");
    assert_eq!(count, inserted);
    assert!(count <= 3);

    let roster = adapters.registrations.roster(event_id).await.expect("roster");
    assert_eq!(roster.len() as u64, count);
}
