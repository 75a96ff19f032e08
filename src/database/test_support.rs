use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// 内存 SQLite 测试库（sqlx 对 `sqlite::memory:` 使用共享缓存，连接池内连接共享同一数据库）
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(4)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("connect in-memory sqlite");
    Migrator::up(&db, None)
        .await
        .expect("run migrations on in-memory sqlite");
    db
}
