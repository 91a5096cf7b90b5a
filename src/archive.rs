//! Date-partitioned, paginated archive queries over published thoughts.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::Thought;

pub const PAGE_SIZE: i64 = 10;

/// Explicit visibility predicate. Every public surface passes `Published`;
/// `All` exists so callers and tests can compose without hidden defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Published,
    All,
}

impl Visibility {
    fn to_sql(self) -> &'static str {
        match self {
            Self::Published => "published = TRUE",
            Self::All => "1 = 1",
        }
    }
}

/// Equality filters on the date components of `pub_date`, narrowing by
/// depth: all time, year, year+month, or year+month+day.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFilter {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
}

impl DateFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: None,
        }
    }

    pub fn day(year: i32, month: u32, day: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: Some(day),
        }
    }

    fn to_sql(&self) -> String {
        let mut sql = String::new();
        if self.year.is_some() {
            sql.push_str(" AND CAST(strftime('%Y', pub_date) AS INTEGER) = ?");
        }
        if self.month.is_some() {
            sql.push_str(" AND CAST(strftime('%m', pub_date) AS INTEGER) = ?");
        }
        if self.day.is_some() {
            sql.push_str(" AND CAST(strftime('%d', pub_date) AS INTEGER) = ?");
        }
        sql
    }

    fn bind_values(&self) -> Vec<i64> {
        [
            self.year.map(i64::from),
            self.month.map(i64::from),
            self.day.map(i64::from),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub per_page: i64,
    pub total: i64,
    pub num_pages: i64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }
}

/// One archive slice: the requested page plus the distinct publication dates
/// of the whole filtered set, for archive navigation.
#[derive(Debug)]
pub struct Archive {
    pub page: Page<Thought>,
    pub date_list: Vec<NaiveDate>,
}

/// Shared algorithm behind every archive granularity: restrict by
/// visibility, slice by date components, order newest-first (id breaks
/// ties), paginate at `PAGE_SIZE`. Pages past the end come back empty
/// rather than failing.
pub async fn list(
    pool: &SqlitePool,
    visibility: Visibility,
    filter: DateFilter,
    page: u32,
) -> Result<Archive, AppError> {
    let conditions = format!("{}{}", visibility.to_sql(), filter.to_sql());

    let count_sql = format!("SELECT COUNT(*) FROM thoughts WHERE {conditions}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for value in filter.bind_values() {
        count_query = count_query.bind(value);
    }
    let total = count_query.fetch_one(pool).await?;

    let number = i64::from(page);
    let num_pages = ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1);
    let offset = (number - 1) * PAGE_SIZE;

    let items_sql = format!(
        "SELECT
            id,
            title,
            slug,
            published,
            pub_date,
            content,
            html_content
        FROM
            thoughts
        WHERE
            {conditions}
        ORDER BY
            julianday(pub_date) DESC, id DESC
        LIMIT ? OFFSET ?"
    );
    let mut items_query = sqlx::query_as::<_, Thought>(&items_sql);
    for value in filter.bind_values() {
        items_query = items_query.bind(value);
    }
    let items = items_query
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let dates_sql = format!(
        "SELECT DISTINCT date(pub_date) FROM thoughts WHERE {conditions} ORDER BY date(pub_date) DESC"
    );
    let mut dates_query = sqlx::query_scalar::<_, NaiveDate>(&dates_sql);
    for value in filter.bind_values() {
        dates_query = dates_query.bind(value);
    }
    let date_list = dates_query.fetch_all(pool).await?;

    Ok(Archive {
        page: Page {
            items,
            number,
            per_page: PAGE_SIZE,
            total,
            num_pages,
        },
        date_list,
    })
}

/// Resolves one thought by its canonical date+slug path. Slug uniqueness
/// within a day is an external convention; on duplicates the newest wins.
pub async fn get_by_path(
    pool: &SqlitePool,
    visibility: Visibility,
    year: i32,
    month: u32,
    day: u32,
    slug: &str,
) -> Result<Thought, AppError> {
    let sql = format!(
        "SELECT
            id,
            title,
            slug,
            published,
            pub_date,
            content,
            html_content
        FROM
            thoughts
        WHERE
            {}
        AND CAST(strftime('%Y', pub_date) AS INTEGER) = ?
        AND CAST(strftime('%m', pub_date) AS INTEGER) = ?
        AND CAST(strftime('%d', pub_date) AS INTEGER) = ?
        AND slug = ?
        ORDER BY
            julianday(pub_date) DESC, id DESC
        LIMIT 1",
        visibility.to_sql()
    );

    sqlx::query_as::<_, Thought>(&sql)
        .bind(year)
        .bind(i64::from(month))
        .bind(i64::from(day))
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}
