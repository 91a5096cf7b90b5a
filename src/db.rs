use std::str::FromStr;

use crate::config::AppConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

// Setup the database and make sure the schema exists
pub async fn setup_database(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true))
        .await?;

    init_schema(&pool).await?;
    tracing::info!("database ready at {}", config.database_url);

    Ok(pool)
}

// Slug and pub_date are indexed to back the date-partitioned archive queries.
pub async fn init_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS thoughts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            published BOOLEAN NOT NULL DEFAULT FALSE,
            pub_date DATETIME NOT NULL,
            content TEXT NOT NULL,
            html_content TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_thoughts_slug ON thoughts (slug)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_thoughts_pub_date ON thoughts (pub_date)")
        .execute(pool)
        .await?;

    Ok(())
}
