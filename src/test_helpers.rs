use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::db;
use crate::models::ThoughtDraft;

// Single connection so the in-memory database outlives individual acquires.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    db::init_schema(&pool).await.expect("schema");
    pool
}

pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn draft(title: &str, slug: &str, published: bool, pub_date: DateTime<Utc>) -> ThoughtDraft {
    ThoughtDraft {
        title: title.to_string(),
        slug: slug.to_string(),
        published,
        pub_date: Some(pub_date),
        content: format!("Some *{title}* content"),
    }
}
