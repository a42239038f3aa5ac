//! In-memory store, used by tests and when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{BlogPatch, BlogPost, NewBlogPost, PortfolioData, PortfolioField, UserRecord};
use crate::slug;
use crate::templates::TemplateKind;

use super::{
    email_key, username_key, BlogStore, CredentialStore, Credentials, ProfileStore, StoreError, StoreResult,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    /// Insertion order is kept so equal timestamps list newest first.
    blogs: RwLock<Vec<BlogPost>>,
    credentials: RwLock<HashMap<String, Credentials>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(posts: impl DoubleEndedIterator<Item = BlogPost>) -> Vec<BlogPost> {
    let mut posts: Vec<BlogPost> = posts.rev().collect();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn create_principal(
        &self,
        uid: &str,
        username: &str,
        email: &str,
    ) -> StoreResult<UserRecord> {
        let mut users = self.users.write().await;
        if users.contains_key(uid) {
            return Err(StoreError::already_exists("User", uid));
        }
        let key = username_key(username);
        if users.values().any(|u| u.username == key) {
            return Err(StoreError::Conflict(format!("username '{}' is taken", key)));
        }

        let record = UserRecord::new(uid, &key, email);
        users.insert(uid.to_string(), record.clone());
        Ok(record)
    }

    async fn get_by_uid(&self, uid: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(uid).cloned())
    }

    async fn get_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let key = username_key(username);
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == key).cloned())
    }

    async fn is_username_available(&self, username: &str) -> StoreResult<bool> {
        let key = username_key(username);
        let users = self.users.read().await;
        Ok(!users.values().any(|u| u.username == key))
    }

    async fn update_whole_profile(&self, uid: &str, data: PortfolioData) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(uid)
            .ok_or_else(|| StoreError::not_found("User", uid))?;
        user.portfolio_data = data;
        Ok(())
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

        let mut users = self.users.write().await;
        let user = users
            .get_mut(uid)
            .ok_or_else(|| StoreError::not_found("User", uid))?;

        let mut document = serde_json::to_value(&user.portfolio_data)?;
        if let Some(map) = document.as_object_mut() {
            map.insert(field.key().to_string(), value);
        }
        user.portfolio_data = serde_json::from_value(document)?;
        Ok(())
    }

    async fn update_template_choice(
        &self,
        uid: &str,
        kind: TemplateKind,
        template_id: &str,
    ) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(uid)
            .ok_or_else(|| StoreError::not_found("User", uid))?;
        match kind {
            TemplateKind::Portfolio => user.portfolio_template = template_id.to_string(),
            TemplateKind::Blog => user.blog_template = template_id.to_string(),
        }
        Ok(())
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn create(&self, uid: &str, post: NewBlogPost) -> StoreResult<String> {
        let now = Utc::now();
        let record = BlogPost {
            id: Uuid::new_v4().to_string(),
            uid: uid.to_string(),
            slug: slug::generate(&post.title, now),
            title: post.title,
            content: post.content,
            cover_image: post.cover_image,
            created_at: now,
        };

        let mut blogs = self.blogs.write().await;
        if blogs.iter().any(|b| b.slug == record.slug) {
            return Err(StoreError::Conflict(format!(
                "slug '{}' already exists",
                record.slug
            )));
        }
        let id = record.id.clone();
        blogs.push(record);
        Ok(id)
    }

    async fn update(&self, id: &str, owner: &str, patch: BlogPatch) -> StoreResult<()> {
        let mut blogs = self.blogs.write().await;
        let post = blogs
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::not_found("Blog", id))?;
        if post.uid != owner {
            return Err(StoreError::forbidden("Blog", id));
        }
        patch.apply(post);
        Ok(())
    }

    async fn delete(&self, id: &str, owner: &str) -> StoreResult<()> {
        let mut blogs = self.blogs.write().await;
        let index = blogs
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StoreError::not_found("Blog", id))?;
        if blogs[index].uid != owner {
            return Err(StoreError::forbidden("Blog", id));
        }
        blogs.remove(index);
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<BlogPost>> {
        let blogs = self.blogs.read().await;
        Ok(blogs.iter().find(|b| b.id == id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<BlogPost>> {
        let blogs = self.blogs.read().await;
        Ok(blogs.iter().find(|b| b.slug == slug).cloned())
    }

    async fn list_by_owner(&self, uid: &str) -> StoreResult<Vec<BlogPost>> {
        let blogs = self.blogs.read().await;
        Ok(newest_first(blogs.iter().filter(|b| b.uid == uid).cloned()))
    }

    async fn list_all(&self) -> StoreResult<Vec<BlogPost>> {
        let blogs = self.blogs.read().await;
        Ok(newest_first(blogs.iter().cloned()))
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_credentials(&self, credentials: Credentials) -> StoreResult<()> {
        let key = email_key(&credentials.email);
        let mut all = self.credentials.write().await;
        if all.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "email '{}' is already registered",
                credentials.email
            )));
        }
        all.insert(key, credentials);
        Ok(())
    }

    async fn find_credentials(&self, email: &str) -> StoreResult<Option<Credentials>> {
        let all = self.credentials.read().await;
        Ok(all.get(&email_key(email)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Project;
    use crate::image::ImageRef;
    use regex::Regex;

    fn post(title: &str) -> NewBlogPost {
        NewBlogPost {
            title: title.to_string(),
            content: "Body".to_string(),
            cover_image: None,
        }
    }

    #[tokio::test]
    async fn test_registered_username_is_taken_and_found_case_insensitively() {
        let store = MemoryStore::new();
        assert!(store.is_username_available("ada").await.unwrap());

        let created = store.create_principal("uid-1", "ada", "ada@example.com").await.unwrap();

        assert!(!store.is_username_available("ada").await.unwrap());
        assert!(!store.is_username_available("ADA").await.unwrap());
        let found = store.get_by_username("ADA").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.uid, "uid-1");
    }

    #[tokio::test]
    async fn test_create_principal_twice_fails() {
        let store = MemoryStore::new();
        store.create_principal("uid-1", "ada", "a@x.io").await.unwrap();

        let same_uid = store.create_principal("uid-1", "grace", "g@x.io").await;
        assert!(matches!(same_uid, Err(StoreError::AlreadyExists { .. })));

        let same_name = store.create_principal("uid-2", "Ada", "b@x.io").await;
        assert!(matches!(same_name, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_get_by_uid_unknown_is_none() {
        let store = MemoryStore::new();
        assert!(store.get_by_uid("missing").await.unwrap().is_none());
        assert!(store.get_by_username("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_single_field_replaces_whole_array() {
        let store = MemoryStore::new();
        store.create_principal("uid-1", "ada", "a@x.io").await.unwrap();
        store
            .update_single_field("uid-1", PortfolioField::Skills, serde_json::json!(["Rust"]))
            .await
            .unwrap();

        let first = vec![
            Project {
                title: "One".to_string(),
                tech_stack: vec!["Rust".to_string()],
                ..Project::default()
            },
            Project {
                title: "Two".to_string(),
                image: Some(ImageRef::url("/p.png")),
                ..Project::default()
            },
        ];
        store
            .update_single_field("uid-1", PortfolioField::Projects, serde_json::to_value(&first).unwrap())
            .await
            .unwrap();

        let second = vec![Project {
            title: "Only".to_string(),
            ..Project::default()
        }];
        store
            .update_single_field("uid-1", PortfolioField::Projects, serde_json::to_value(&second).unwrap())
            .await
            .unwrap();

        let record = store.get_by_uid("uid-1").await.unwrap().unwrap();
        assert_eq!(record.portfolio_data.projects, second);
        assert_eq!(record.portfolio_data.skills, vec!["Rust"]);
    }

    #[tokio::test]
    async fn test_update_single_field_rejects_bad_shape() {
        let store = MemoryStore::new();
        store.create_principal("uid-1", "ada", "a@x.io").await.unwrap();
        let result = store
            .update_single_field("uid-1", PortfolioField::Skills, serde_json::json!({"a": 1}))
            .await;
        assert!(matches!(result, Err(StoreError::InvalidField(_))));
    }

    #[tokio::test]
    async fn test_update_whole_profile_and_template_choice() {
        let store = MemoryStore::new();
        store.create_principal("uid-1", "ada", "a@x.io").await.unwrap();

        let data = PortfolioData {
            name: "Ada Lovelace".to_string(),
            skills: vec!["Math".to_string()],
            ..PortfolioData::default()
        };
        store.update_whole_profile("uid-1", data.clone()).await.unwrap();
        store
            .update_template_choice("uid-1", TemplateKind::Blog, "9")
            .await
            .unwrap();

        let record = store.get_by_uid("uid-1").await.unwrap().unwrap();
        assert_eq!(record.portfolio_data, data);
        assert_eq!(record.blog_template, "9");
        assert_eq!(record.portfolio_template, "1");

        let missing = store.update_whole_profile("nobody", data).await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_blog_slug_is_stable_across_updates() {
        let store = MemoryStore::new();
        let id = store.create("uid-1", post("Hello, World!")).await.unwrap();
        let created = store.get_by_id(&id).await.unwrap().unwrap();
        assert!(created.slug.starts_with("hello-world-"));
        assert!(Regex::new(r"^[a-z0-9-]+-[0-9a-z]+$").unwrap().is_match(&created.slug));

        store
            .update(
                &id,
                "uid-1",
                BlogPatch {
                    title: Some("Completely different".to_string()),
                    content: Some("New body".to_string()),
                    cover_image: Some(Some(ImageRef::url("/c.png"))),
                },
            )
            .await
            .unwrap();

        let updated = store.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(updated.slug, created.slug);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.title, "Completely different");
        assert_eq!(updated.cover_image, Some(ImageRef::url("/c.png")));
    }

    #[tokio::test]
    async fn test_deleted_post_is_gone_by_slug() {
        let store = MemoryStore::new();
        let id = store.create("uid-1", post("Bye")).await.unwrap();
        let slug = store.get_by_id(&id).await.unwrap().unwrap().slug;

        store.delete(&id, "uid-1").await.unwrap();
        assert!(store.get_by_slug(&slug).await.unwrap().is_none());

        let again = store.delete(&id, "uid-1").await;
        assert!(matches!(again, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_only_owner_can_update_or_delete() {
        let store = MemoryStore::new();
        let id = store.create("uid-1", post("Mine")).await.unwrap();

        let update = store.update(&id, "uid-2", BlogPatch::default()).await;
        assert!(matches!(update, Err(StoreError::Forbidden { .. })));
        let delete = store.delete(&id, "uid-2").await;
        assert!(matches!(delete, Err(StoreError::Forbidden { .. })));
        assert!(store.get_by_id(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lists_are_newest_first() {
        let store = MemoryStore::new();
        let a = store.create("uid-1", post("A")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let b = store.create("uid-2", post("B")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let c = store.create("uid-1", post("C")).await.unwrap();

        let all: Vec<String> = store.list_all().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(all, vec![c.clone(), b, a.clone()]);

        let mine: Vec<String> = store
            .list_by_owner("uid-1")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(mine, vec![c, a]);
    }

    #[tokio::test]
    async fn test_credentials_are_unique_by_email() {
        let store = MemoryStore::new();
        let creds = Credentials {
            uid: "uid-1".to_string(),
            email: "Ada@Example.com".to_string(),
            password_hash: "hash".to_string(),
        };
        store.create_credentials(creds.clone()).await.unwrap();

        let found = store.find_credentials("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.uid, "uid-1");

        let dup = store.create_credentials(creds).await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_credential_email_is_trimmed_on_both_sides() {
        let store = MemoryStore::new();
        store
            .create_credentials(Credentials {
                uid: "uid-1".to_string(),
                email: " Ada@Example.com ".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();

        assert!(store.find_credentials("ada@example.com").await.unwrap().is_some());
        assert!(store.find_credentials("  ADA@example.com").await.unwrap().is_some());

        let dup = store
            .create_credentials(Credentials {
                uid: "uid-2".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));
    }
}
