/// Entity round trips and helper queries against in-memory SQLite
pub mod crud_tests;

/// Conditional stock updates
pub mod stock_tests;

use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub(crate) async fn memory_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite");
    migration::Migrator::up(&db, None).await.expect("migrate");
    db
}
