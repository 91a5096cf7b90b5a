use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::archive::{self, Archive, DateFilter, Visibility};
use crate::error::AppError;
use crate::models::{Thought, ThoughtDraft};
use crate::params::{self, PageParams};

#[derive(Serialize)]
pub struct PaginatorMeta {
    pub count: i64,
    pub per_page: i64,
    pub num_pages: i64,
}

#[derive(Serialize)]
pub struct PageMeta {
    pub number: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Listing context handed to the templating layer, under the names it
/// consumes: the page of thoughts, pagination state, and the distinct
/// publication dates for archive navigation.
#[derive(Serialize)]
pub struct ArchiveContext {
    pub thought_list: Vec<Thought>,
    pub date_list: Vec<NaiveDate>,
    pub is_paginated: bool,
    pub paginator: PaginatorMeta,
    pub page_obj: PageMeta,
}

impl From<Archive> for ArchiveContext {
    fn from(archive: Archive) -> Self {
        let page = archive.page;
        let is_paginated = page.is_paginated();
        let paginator = PaginatorMeta {
            count: page.total,
            per_page: page.per_page,
            num_pages: page.num_pages,
        };
        let page_obj = PageMeta {
            number: page.number,
            has_next: page.has_next(),
            has_previous: page.has_previous(),
        };
        Self {
            thought_list: page.items,
            date_list: archive.date_list,
            is_paginated,
            paginator,
            page_obj,
        }
    }
}

/// Detail context: the entity is exposed under both the generic and the
/// domain name.
#[derive(Serialize)]
pub struct DetailContext {
    pub object: Thought,
    pub thought: Thought,
}

pub async fn index(
    State(pool): State<SqlitePool>,
    Query(params): Query<PageParams>,
) -> Result<Json<ArchiveContext>, AppError> {
    let archive =
        archive::list(&pool, Visibility::Published, DateFilter::all(), params.page()).await?;
    Ok(Json(archive.into()))
}

pub async fn by_year(
    State(pool): State<SqlitePool>,
    Path(year): Path<i32>,
    Query(params): Query<PageParams>,
) -> Result<Json<ArchiveContext>, AppError> {
    let archive =
        archive::list(&pool, Visibility::Published, DateFilter::year(year), params.page()).await?;
    Ok(Json(archive.into()))
}

pub async fn by_month(
    State(pool): State<SqlitePool>,
    Path((year, month)): Path<(i32, String)>,
    Query(params): Query<PageParams>,
) -> Result<Json<ArchiveContext>, AppError> {
    let month = params::parse_month(&month).ok_or(AppError::NotFound)?;
    let archive = archive::list(
        &pool,
        Visibility::Published,
        DateFilter::month(year, month),
        params.page(),
    )
    .await?;
    Ok(Json(archive.into()))
}

pub async fn by_day(
    State(pool): State<SqlitePool>,
    Path((year, month, day)): Path<(i32, String, u32)>,
    Query(params): Query<PageParams>,
) -> Result<Json<ArchiveContext>, AppError> {
    let month = params::parse_month(&month).ok_or(AppError::NotFound)?;
    let archive = archive::list(
        &pool,
        Visibility::Published,
        DateFilter::day(year, month, day),
        params.page(),
    )
    .await?;
    Ok(Json(archive.into()))
}

pub async fn detail(
    State(pool): State<SqlitePool>,
    Path((year, month, day, slug)): Path<(i32, String, u32, String)>,
) -> Result<Json<DetailContext>, AppError> {
    let month = params::parse_month(&month).ok_or(AppError::NotFound)?;
    let thought =
        archive::get_by_path(&pool, Visibility::Published, year, month, day, &slug).await?;
    Ok(Json(DetailContext {
        object: thought.clone(),
        thought,
    }))
}

pub async fn create_thought(
    State(pool): State<SqlitePool>,
    Json(draft): Json<ThoughtDraft>,
) -> Result<(StatusCode, Json<Thought>), AppError> {
    let thought = Thought::create(&pool, &draft).await?;
    Ok((StatusCode::CREATED, Json(thought)))
}

pub async fn update_thought(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(draft): Json<ThoughtDraft>,
) -> Result<Json<Thought>, AppError> {
    let thought = Thought::update(&pool, id, &draft).await?;
    Ok(Json(thought))
}

pub async fn delete_thought(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    Thought::delete(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
