use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, ValidationErrors};
use crate::markdown;

pub const TITLE_MAX_CHARS: usize = 80;

/// A thought (blog post). `html_content` is always the rendered form of
/// `content` as of the most recent save.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Thought {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub published: bool,
    pub pub_date: DateTime<Utc>,
    pub content: String,
    pub html_content: String,
}

/// Write payload for a thought. `html_content` is deliberately absent:
/// callers cannot set it, it is recomputed from `content` on every save.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThoughtDraft {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub published: bool,
    pub pub_date: Option<DateTime<Utc>>,
    pub content: String,
}

impl ThoughtDraft {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();

        if self.title.trim().is_empty() {
            errors.add("title", "This field cannot be blank.");
        } else {
            let length = self.title.chars().count();
            if length > TITLE_MAX_CHARS {
                errors.add(
                    "title",
                    format!(
                        "Ensure this value has at most {TITLE_MAX_CHARS} characters (it has {length})."
                    ),
                );
            }
        }
        if self.slug.trim().is_empty() {
            errors.add("slug", "This field cannot be blank.");
        }
        if self.pub_date.is_none() {
            errors.add("pub_date", "This field cannot be null.");
        }
        if self.content.trim().is_empty() {
            errors.add("content", "This field cannot be blank.");
        }

        errors.into_result()
    }
}

impl Thought {
    /// Validate, render, then persist in a single statement so no reader can
    /// observe a row whose `html_content` is stale relative to `content`.
    pub async fn create(pool: &SqlitePool, draft: &ThoughtDraft) -> Result<Thought, AppError> {
        draft.validate()?;
        let html_content = markdown::render(&draft.content);

        let thought = sqlx::query_as::<_, Thought>(
            r#"
            INSERT INTO thoughts (title, slug, published, pub_date, content, html_content)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                title,
                slug,
                published,
                pub_date,
                content,
                html_content
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(draft.published)
        .bind(draft.pub_date)
        .bind(&draft.content)
        .bind(&html_content)
        .fetch_one(pool)
        .await?;

        Ok(thought)
    }

    /// Full update; re-renders `html_content` like every other save.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        draft: &ThoughtDraft,
    ) -> Result<Thought, AppError> {
        draft.validate()?;
        let html_content = markdown::render(&draft.content);

        sqlx::query_as::<_, Thought>(
            r#"
            UPDATE
                thoughts
            SET
                title = ?,
                slug = ?,
                published = ?,
                pub_date = ?,
                content = ?,
                html_content = ?
            WHERE
                id = ?
            RETURNING
                id,
                title,
                slug,
                published,
                pub_date,
                content,
                html_content
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(draft.published)
        .bind(draft.pub_date)
        .bind(&draft.content)
        .bind(&html_content)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
    }

    /// Thoughts have no foreign relationships, so deletion has no cascades.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM thoughts WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// `{year}/{month}/{day}/{slug}/`, components unpadded.
    pub fn canonical_path(&self) -> String {
        format!(
            "{}/{}/{}/{}/",
            self.pub_date.year(),
            self.pub_date.month(),
            self.pub_date.day(),
            self.slug
        )
    }

    pub fn display_name(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{draft, memory_pool, utc};

    fn sample_thought() -> Thought {
        Thought {
            id: 1,
            title: "Test".to_string(),
            slug: "test".to_string(),
            published: false,
            pub_date: utc(2011, 1, 1),
            content: "A *test* string".to_string(),
            html_content: String::new(),
        }
    }

    #[test]
    fn canonical_path_is_year_month_day_slug() {
        let thought = sample_thought();
        assert_ne!(thought.canonical_path(), "");
        assert_eq!(thought.canonical_path(), "2011/1/1/test/");
    }

    #[test]
    fn display_name_is_the_title_verbatim() {
        let thought = sample_thought();
        assert_eq!(thought.display_name(), "Test");
        assert_ne!(thought.display_name(), "Thought object");
    }

    #[test]
    fn blank_draft_fails_with_field_specific_errors() {
        let errors = match ThoughtDraft::default().validate() {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation failure, got {:?}", other),
        };

        for field in ["title", "slug", "content"] {
            assert_eq!(
                errors.get(field).and_then(|messages| messages.first()),
                Some(&"This field cannot be blank.".to_string()),
                "missing error for {field}"
            );
        }
        assert_eq!(
            errors.get("pub_date").and_then(|messages| messages.first()),
            Some(&"This field cannot be null.".to_string())
        );
        // html_content is derived, never required.
        assert!(errors.get("html_content").is_none());
    }

    #[test]
    fn title_of_81_chars_fails_naming_the_limit() {
        let mut overlong = draft("x", "test", false, utc(2011, 1, 1));
        overlong.title = "a".repeat(81);
        let errors = match overlong.validate() {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation failure, got {:?}", other),
        };
        assert_eq!(
            errors.get("title").and_then(|messages| messages.first()),
            Some(&"Ensure this value has at most 80 characters (it has 81).".to_string())
        );
    }

    #[test]
    fn title_of_80_chars_passes() {
        let mut payload = draft("x", "test", false, utc(2011, 1, 1));
        payload.title = "a".repeat(80);
        assert!(payload.validate().is_ok());
    }

    #[tokio::test]
    async fn create_renders_markdown_into_html_content() {
        let pool = memory_pool().await;
        let mut payload = draft("Test", "test", true, utc(2011, 1, 1));
        payload.content = "A *test* string".to_string();

        let thought = Thought::create(&pool, &payload).await.unwrap();
        assert_eq!(thought.html_content, "<p>A <em>test</em> string</p>");
        assert_eq!(thought.html_content, crate::markdown::render(&thought.content));
    }

    #[tokio::test]
    async fn update_recomputes_html_content() {
        let pool = memory_pool().await;
        let mut payload = draft("Test", "test", true, utc(2011, 1, 1));
        payload.content = "first".to_string();
        let thought = Thought::create(&pool, &payload).await.unwrap();

        payload.content = "now *second*".to_string();
        let updated = Thought::update(&pool, thought.id, &payload).await.unwrap();
        assert_eq!(updated.html_content, "<p>now <em>second</em></p>");
        assert_eq!(updated.html_content, crate::markdown::render(&updated.content));
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found() {
        let pool = memory_pool().await;
        let payload = draft("Test", "test", true, utc(2011, 1, 1));
        let result = Thought::update(&pool, 999, &payload).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let pool = memory_pool().await;
        let thought = Thought::create(&pool, &draft("Test", "test", true, utc(2011, 1, 1)))
            .await
            .unwrap();

        Thought::delete(&pool, thought.id).await.unwrap();
        assert!(matches!(
            Thought::delete(&pool, thought.id).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn validation_failure_writes_nothing() {
        let pool = memory_pool().await;
        let mut payload = draft("Test", "test", true, utc(2011, 1, 1));
        payload.content = String::new();

        assert!(matches!(
            Thought::create(&pool, &payload).await,
            Err(AppError::Validation(_))
        ));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM thoughts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
