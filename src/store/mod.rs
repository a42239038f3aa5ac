//! Storage traits for principals, blog posts and credentials, with a
//! PostgreSQL backend and an in-memory backend.

mod error;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::db::models::{BlogPatch, BlogPost, NewBlogPost, PortfolioData, PortfolioField, UserRecord};
use crate::templates::TemplateKind;

pub use error::*;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Lookup key for usernames. Usernames are compared case-insensitively.
pub fn username_key(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Lookup key for credential emails; same normalization as usernames.
pub fn email_key(email: &str) -> String {
    username_key(email)
}

/// Identity record store: one profile document per principal.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Writes a fresh record with an empty portfolio.
    async fn create_principal(&self, uid: &str, username: &str, email: &str)
        -> StoreResult<UserRecord>;

    async fn get_by_uid(&self, uid: &str) -> StoreResult<Option<UserRecord>>;

    async fn get_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>>;

    async fn is_username_available(&self, username: &str) -> StoreResult<bool>;

    /// Replaces the whole portfolio document. Last write wins.
    async fn update_whole_profile(&self, uid: &str, data: PortfolioData) -> StoreResult<()>;

    /// Replaces one top-level portfolio field, leaving siblings untouched.
    async fn update_single_field(
        &self,
        uid: &str,
        field: PortfolioField,
        value: serde_json::Value,
    ) -> StoreResult<()>;

    async fn update_template_choice(
        &self,
        uid: &str,
        kind: TemplateKind,
        template_id: &str,
    ) -> StoreResult<()>;
}

/// Content store: blog posts owned by principals.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Creates a post and returns its id.
    async fn create(&self, uid: &str, post: NewBlogPost) -> StoreResult<String>;

    /// Applies `patch` to a post owned by `owner`.
    async fn update(&self, id: &str, owner: &str, patch: BlogPatch) -> StoreResult<()>;

    /// Deletes a post owned by `owner`.
    async fn delete(&self, id: &str, owner: &str) -> StoreResult<()>;

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<BlogPost>>;

    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<BlogPost>>;

    /// Posts of one owner, newest first.
    async fn list_by_owner(&self, uid: &str) -> StoreResult<Vec<BlogPost>>;

    /// Every post, newest first.
    async fn list_all(&self) -> StoreResult<Vec<BlogPost>>;
}

/// Login credentials for a principal.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub uid: String,
    pub email: String,
    pub password_hash: String,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create_credentials(&self, credentials: Credentials) -> StoreResult<()>;

    /// Case-insensitive lookup by email.
    async fn find_credentials(&self, email: &str) -> StoreResult<Option<Credentials>>;
}

/// Everything the service needs from a backend.
pub trait Store: ProfileStore + BlogStore + CredentialStore {}

impl<T: ProfileStore + BlogStore + CredentialStore> Store for T {}
