//! `PgLedger` against a live server, each test in its own schema.
//!
//! Runs only when `FERRY_TEST_POSTGRES_ADDRESS` (`host:port`) is set;
//! `FERRY_TEST_POSTGRES_DATABASE`, `FERRY_TEST_POSTGRES_USERNAME` and
//! `FERRY_TEST_POSTGRES_PASSWORD` complete the connection.

use ferry_core::{
    compute_fingerprint, DatabaseConfig, DbType, Direction, MigrationDescriptor, MigrationStatus,
    Outcome, VersionOrder,
};
use ferry_db::connect_options;
use ferry_ledger::{Ledger, LedgerError, PgLedger, SortOrder};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

fn test_config() -> Option<DatabaseConfig> {
    let address = std::env::var("FERRY_TEST_POSTGRES_ADDRESS").ok()?;
    Some(DatabaseConfig {
        db_type: DbType::Postgres,
        address,
        name: std::env::var("FERRY_TEST_POSTGRES_DATABASE")
            .unwrap_or_else(|_| "postgres".to_string()),
        username: std::env::var("FERRY_TEST_POSTGRES_USERNAME").ok(),
        password: std::env::var("FERRY_TEST_POSTGRES_PASSWORD").ok(),
        ..DatabaseConfig::default()
    })
}

/// A ledger whose `schema_migrations` lives in a schema of its own
struct IsolatedLedger {
    admin: PgPool,
    schema: String,
    ledger: PgLedger,
}

impl IsolatedLedger {
    async fn open(test: &str) -> Option<Self> {
        let Some(config) = test_config() else {
            eprintln!("Skipping {test}: FERRY_TEST_POSTGRES_ADDRESS is not set");
            return None;
        };
        let options = connect_options(&config).unwrap();
        let admin = match PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => pool,
            Err(e) => {
                eprintln!("Skipping {test}: database not available ({e})");
                return None;
            }
        };

        let schema = format!("ferry_{test}_{}", std::process::id());
        sqlx::raw_sql(&format!(
            "DROP SCHEMA IF EXISTS {schema} CASCADE; CREATE SCHEMA {schema};"
        ))
        .execute(&admin)
        .await
        .unwrap();

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options.options([("search_path", schema.as_str())]))
            .await
            .unwrap();
        let ledger = PgLedger::new(pool);
        ledger.ensure_schema().await.unwrap();
        Some(Self {
            admin,
            schema,
            ledger,
        })
    }

    async fn close(self) {
        sqlx::raw_sql(&format!("DROP SCHEMA IF EXISTS {} CASCADE;", self.schema))
            .execute(&self.admin)
            .await
            .unwrap();
    }
}

fn descriptor(version: u32, description: &str, direction: Direction) -> MigrationDescriptor {
    let content = format!("-- {description}\nSELECT {version};");
    MigrationDescriptor {
        version,
        description: description.to_string(),
        direction,
        source_path: format!("V{version}__{description}.{}.sql", direction.file_tag()),
        fingerprint: compute_fingerprint(content.as_bytes()),
        content,
    }
}

#[tokio::test]
async fn test_pg_ensure_schema_is_idempotent() {
    let Some(fx) = IsolatedLedger::open("ensure_schema").await else {
        return;
    };
    fx.ledger.ensure_schema().await.unwrap();
    assert!(fx.ledger.list_all().await.unwrap().is_empty());
    fx.close().await;
}

#[tokio::test]
async fn test_pg_insert_and_lookup() {
    let Some(fx) = IsolatedLedger::open("insert_lookup").await else {
        return;
    };
    let before = chrono::Utc::now() - chrono::Duration::seconds(60);

    let record = fx
        .ledger
        .insert(&descriptor(3, "accounts", Direction::Upgrade))
        .await
        .unwrap();

    assert!(record.id > 0);
    assert_eq!(record.version, 3);
    assert_eq!(record.direction, Direction::Upgrade);
    assert_eq!(record.status, MigrationStatus::Pending);
    assert!(record.created_at >= before);
    assert_eq!(record.created_at, record.updated_at);

    assert_eq!(
        fx.ledger
            .count_by_source_path("V3__accounts.up.sql")
            .await
            .unwrap(),
        1
    );
    let found = fx
        .ledger
        .find_by_source_path("V3__accounts.up.sql")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, record);
    assert!(fx
        .ledger
        .find_by_source_path("V4__missing.up.sql")
        .await
        .unwrap()
        .is_none());
    fx.close().await;
}

#[tokio::test]
async fn test_pg_duplicate_version_direction() {
    let Some(fx) = IsolatedLedger::open("duplicate").await else {
        return;
    };
    fx.ledger
        .insert(&descriptor(1, "orgs", Direction::Upgrade))
        .await
        .unwrap();

    let err = fx
        .ledger
        .insert(&descriptor(1, "organizations", Direction::Upgrade))
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            LedgerError::Duplicate {
                version: 1,
                direction: Direction::Upgrade
            }
        ),
        "{err}"
    );
    fx.ledger
        .insert(&descriptor(1, "orgs", Direction::Downgrade))
        .await
        .unwrap();
    assert_eq!(fx.ledger.list_all().await.unwrap().len(), 2);
    fx.close().await;
}

#[tokio::test]
async fn test_pg_update_resolves_record_once() {
    let Some(fx) = IsolatedLedger::open("update_once").await else {
        return;
    };
    let record = fx
        .ledger
        .insert(&descriptor(1, "orgs", Direction::Upgrade))
        .await
        .unwrap();

    let updated = fx
        .ledger
        .update(record.id, 4, &Outcome::Succeeded)
        .await
        .unwrap();
    assert_eq!(
        updated.status,
        MigrationStatus::Applied {
            execution_seconds: 4
        }
    );
    assert!(updated.updated_at >= updated.created_at);
    assert_eq!(updated.created_at, record.created_at);

    let err = fx
        .ledger
        .update(record.id, 0, &Outcome::Failed("again".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)), "{err}");

    let err = fx
        .ledger
        .update(9_999, 0, &Outcome::Succeeded)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)), "{err}");
    fx.close().await;
}

#[tokio::test]
async fn test_pg_outstanding_queries() {
    let Some(fx) = IsolatedLedger::open("outstanding").await else {
        return;
    };
    for (version, name) in [(2, "users"), (1, "orgs"), (3, "teams")] {
        fx.ledger
            .insert(&descriptor(version, name, Direction::Upgrade))
            .await
            .unwrap();
    }
    fx.ledger
        .insert(&descriptor(1, "orgs", Direction::Downgrade))
        .await
        .unwrap();

    let ascending: Vec<u32> = fx
        .ledger
        .fetch_outstanding(Direction::Upgrade, SortOrder::Ascending)
        .await
        .unwrap()
        .iter()
        .map(|r| r.version)
        .collect();
    assert_eq!(ascending, vec![2, 1, 3]);

    let descending: Vec<u32> = fx
        .ledger
        .fetch_outstanding(Direction::Upgrade, SortOrder::Descending)
        .await
        .unwrap()
        .iter()
        .map(|r| r.version)
        .collect();
    assert_eq!(descending, vec![3, 1, 2]);

    let down = fx
        .ledger
        .fetch_outstanding_by_version(1, Direction::Downgrade)
        .await
        .unwrap();
    assert_eq!(down.source_path, "V1__orgs.down.sql");
    assert!(matches!(
        fx.ledger
            .fetch_outstanding_by_version(2, Direction::Downgrade)
            .await,
        Err(LedgerError::NotFound(_))
    ));
    fx.close().await;
}

#[tokio::test]
async fn test_pg_current_version_lifecycle() {
    let Some(fx) = IsolatedLedger::open("current_version").await else {
        return;
    };
    assert!(matches!(
        fx.ledger.current_version(VersionOrder::Insertion).await,
        Err(LedgerError::NotFound(_))
    ));

    let v2 = fx
        .ledger
        .insert(&descriptor(2, "users", Direction::Upgrade))
        .await
        .unwrap();
    let v1 = fx
        .ledger
        .insert(&descriptor(1, "orgs", Direction::Upgrade))
        .await
        .unwrap();
    let v3 = fx
        .ledger
        .insert(&descriptor(3, "teams", Direction::Upgrade))
        .await
        .unwrap();
    fx.ledger.update(v2.id, 0, &Outcome::Succeeded).await.unwrap();
    fx.ledger.update(v1.id, 0, &Outcome::Succeeded).await.unwrap();
    fx.ledger
        .update(v3.id, 0, &Outcome::Failed("boom".to_string()))
        .await
        .unwrap();

    let insertion = fx
        .ledger
        .current_version(VersionOrder::Insertion)
        .await
        .unwrap();
    assert_eq!(insertion.version, 1);
    let numeric = fx
        .ledger
        .current_version(VersionOrder::Numeric)
        .await
        .unwrap();
    assert_eq!(numeric.version, 2);

    let down = fx
        .ledger
        .insert(&descriptor(1, "orgs", Direction::Downgrade))
        .await
        .unwrap();
    fx.ledger.update(down.id, 0, &Outcome::Succeeded).await.unwrap();
    assert_eq!(
        fx.ledger
            .current_version(VersionOrder::Insertion)
            .await
            .unwrap()
            .version,
        2
    );

    let all = fx.ledger.list_all().await.unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[2].status.error_message(), Some("boom"));
    fx.close().await;
}
