//! PostgreSQL store. Portfolio documents live in a JSONB column.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::db::models::{BlogPatch, BlogPost, NewBlogPost, PortfolioData, PortfolioField, UserRecord};
use crate::image::ImageRef;
use crate::slug;
use crate::templates::TemplateKind;

use super::{
    username_key, BlogStore, CredentialStore, Credentials, ProfileStore, StoreError, StoreResult,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        self.pool.as_ref()
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    uid: String,
    username: String,
    email: String,
    portfolio_template: String,
    blog_template: String,
    portfolio_data: Json<PortfolioData>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            uid: row.uid,
            username: row.username,
            email: row.email,
            portfolio_template: row.portfolio_template,
            blog_template: row.blog_template,
            portfolio_data: row.portfolio_data.0,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct BlogRow {
    id: Uuid,
    uid: String,
    title: String,
    content: String,
    cover_image: Option<Json<ImageRef>>,
    slug: String,
    created_at: DateTime<Utc>,
}

impl From<BlogRow> for BlogPost {
    fn from(row: BlogRow) -> Self {
        Self {
            id: row.id.to_string(),
            uid: row.uid,
            title: row.title,
            content: row.content,
            cover_image: row.cover_image.map(|json| json.0),
            slug: row.slug,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "uid, username, email, portfolio_template, blog_template, portfolio_data, created_at";

const BLOG_COLUMNS: &str = "id, uid, title, content, cover_image, slug, created_at";

fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

fn ensure_updated(rows: u64, entity: &'static str, id: &str) -> StoreResult<()> {
    if rows == 0 {
        Err(StoreError::not_found(entity, id))
    } else {
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn create_principal(
        &self,
        uid: &str,
        username: &str,
        email: &str,
    ) -> StoreResult<UserRecord> {
        let record = UserRecord::new(uid, &username_key(username), email);

        let result = sqlx::query(
            r#"
            INSERT INTO users (uid, username, email, portfolio_template, blog_template, portfolio_data, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&record.uid)
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.portfolio_template)
        .bind(&record.blog_template)
        .bind(Json(&record.portfolio_data))
        .bind(record.created_at)
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => {
                tracing::info!(uid = %record.uid, username = %record.username, "principal created");
                Ok(record)
            }
            Err(e) => match unique_violation(&e) {
                Some(constraint) if constraint == "users_pkey" => {
                    Err(StoreError::already_exists("User", uid))
                }
                Some(_) => Err(StoreError::Conflict(format!(
                    "username '{}' is taken",
                    record.username
                ))),
                None => Err(e.into()),
            },
        }
    }

    async fn get_by_uid(&self, uid: &str) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE uid = $1",
            USER_COLUMNS
        ))
        .bind(uid)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn get_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE LOWER(username) = $1 LIMIT 1",
            USER_COLUMNS
        ))
        .bind(username_key(username))
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn is_username_available(&self, username: &str) -> StoreResult<bool> {
        let (taken,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = $1)")
                .bind(username_key(username))
                .fetch_one(self.pool())
                .await?;
        Ok(!taken)
    }

    async fn update_whole_profile(&self, uid: &str, data: PortfolioData) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET portfolio_data = $2 WHERE uid = $1")
            .bind(uid)
            .bind(Json(&data))
            .execute(self.pool())
            .await?;
        ensure_updated(result.rows_affected(), "User", uid)
    }

    async fn update_single_field(
        &self,
        uid: &str,
        field: PortfolioField,
        value: serde_json::Value,
    ) -> StoreResult<()> {
        let value = field
            .normalize(value)
            .map_err(|e| StoreError::InvalidField(format!("{}: {}", field.key(), e)))?;

        let result = sqlx::query(
            "UPDATE users SET portfolio_data = jsonb_set(portfolio_data, $2, $3, true) WHERE uid = $1",
        )
        .bind(uid)
        .bind(vec![field.key().to_string()])
        .bind(Json(value))
        .execute(self.pool())
        .await?;
        ensure_updated(result.rows_affected(), "User", uid)
    }

    async fn update_template_choice(
        &self,
        uid: &str,
        kind: TemplateKind,
        template_id: &str,
    ) -> StoreResult<()> {
        let sql = match kind {
            TemplateKind::Portfolio => "UPDATE users SET portfolio_template = $2 WHERE uid = $1",
            TemplateKind::Blog => "UPDATE users SET blog_template = $2 WHERE uid = $1",
        };
        let result = sqlx::query(sql)
            .bind(uid)
            .bind(template_id)
            .execute(self.pool())
            .await?;
        ensure_updated(result.rows_affected(), "User", uid)
    }
}

impl PgStore {
    async fn owner_of(&self, id: &str) -> StoreResult<(Uuid, String)> {
        let blog_id = Uuid::parse_str(id).map_err(|_| StoreError::not_found("Blog", id))?;
        let owner: Option<(String,)> = sqlx::query_as("SELECT uid FROM blogs WHERE id = $1")
            .bind(blog_id)
            .fetch_optional(self.pool())
            .await?;
        match owner {
            Some((uid,)) => Ok((blog_id, uid)),
            None => Err(StoreError::not_found("Blog", id)),
        }
    }
}

#[async_trait]
impl BlogStore for PgStore {
    async fn create(&self, uid: &str, post: NewBlogPost) -> StoreResult<String> {
        let now = Utc::now();
        let slug = slug::generate(&post.title, now);

        let result = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO blogs (uid, title, content, cover_image, slug, created_at)
            VALUES ($1, $2, $3, $4, $5, now())
            RETURNING id
            "#,
        )
        .bind(uid)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.cover_image.as_ref().map(Json))
        .bind(&slug)
        .fetch_one(self.pool())
        .await;

        match result {
            Ok((id,)) => {
                tracing::info!(blog_id = %id, uid = %uid, slug = %slug, "blog post created");
                Ok(id.to_string())
            }
            Err(e) if unique_violation(&e).is_some() => Err(StoreError::Conflict(format!(
                "slug '{}' already exists",
                slug
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, id: &str, owner: &str, patch: BlogPatch) -> StoreResult<()> {
        let (blog_id, current_owner) = self.owner_of(id).await?;
        if current_owner != owner {
            return Err(StoreError::forbidden("Blog", id));
        }

        let result = sqlx::query(
            r#"
            UPDATE blogs
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                cover_image = CASE WHEN $4 THEN $5 ELSE cover_image END
            WHERE id = $1 AND uid = $6
            "#,
        )
        .bind(blog_id)
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(patch.cover_image.is_some())
        .bind(patch.cover_image.as_ref().and_then(|c| c.as_ref()).map(Json))
        .bind(owner)
        .execute(self.pool())
        .await?;
        ensure_updated(result.rows_affected(), "Blog", id)
    }

    async fn delete(&self, id: &str, owner: &str) -> StoreResult<()> {
        let (blog_id, current_owner) = self.owner_of(id).await?;
        if current_owner != owner {
            return Err(StoreError::forbidden("Blog", id));
        }

        let result = sqlx::query("DELETE FROM blogs WHERE id = $1 AND uid = $2")
            .bind(blog_id)
            .bind(owner)
            .execute(self.pool())
            .await?;
        ensure_updated(result.rows_affected(), "Blog", id)
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<BlogPost>> {
        let Ok(blog_id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            "SELECT {} FROM blogs WHERE id = $1",
            BLOG_COLUMNS
        ))
        .bind(blog_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(BlogPost::from))
    }

    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<BlogPost>> {
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            "SELECT {} FROM blogs WHERE slug = $1",
            BLOG_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(BlogPost::from))
    }

    async fn list_by_owner(&self, uid: &str) -> StoreResult<Vec<BlogPost>> {
        let rows = sqlx::query_as::<_, BlogRow>(&format!(
            "SELECT {} FROM blogs WHERE uid = $1 ORDER BY created_at DESC",
            BLOG_COLUMNS
        ))
        .bind(uid)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(BlogPost::from).collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<BlogPost>> {
        let rows = sqlx::query_as::<_, BlogRow>(&format!(
            "SELECT {} FROM blogs ORDER BY created_at DESC",
            BLOG_COLUMNS
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(BlogPost::from).collect())
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_credentials(&self, credentials: Credentials) -> StoreResult<()> {
        let result =
            sqlx::query("INSERT INTO credentials (uid, email, password_hash) VALUES ($1, $2, $3)")
                .bind(&credentials.uid)
                .bind(&credentials.email)
                .bind(&credentials.password_hash)
                .execute(self.pool())
                .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if unique_violation(&e).is_some() => Err(StoreError::Conflict(format!(
                "email '{}' is already registered",
                credentials.email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_credentials(&self, email: &str) -> StoreResult<Option<Credentials>> {
        let row: Option<(String, String, String)> = sqlx::query_as(
            "SELECT uid, email, password_hash FROM credentials WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email.trim())
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|(uid, email, password_hash)| Credentials {
            uid,
            email,
            password_hash,
        }))
    }
}
