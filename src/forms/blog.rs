use serde::{Deserialize, Serialize};

use crate::db::models::{BlogPatch, BlogPost, NewBlogPost};
use crate::error::{AppError, AppResult};
use crate::image::ImageRef;
use crate::store::{BlogStore, Store};

use super::require;

/// Fields of the post being written or edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<ImageRef>,
}

/// The owner's posts plus a draft that is either new or an edit of one post.
#[derive(Debug, Clone)]
pub struct BlogForm {
    uid: String,
    posts: Vec<BlogPost>,
    draft: BlogDraft,
    editing: Option<String>,
}

impl BlogForm {
    pub fn new(uid: impl Into<String>, posts: Vec<BlogPost>) -> Self {
        Self {
            uid: uid.into(),
            posts,
            draft: BlogDraft::default(),
            editing: None,
        }
    }

    pub async fn load(store: &dyn Store, uid: &str) -> AppResult<Self> {
        let posts = store.list_by_owner(uid).await?;
        Ok(Self::new(uid, posts))
    }

    pub fn posts(&self) -> &[BlogPost] {
        &self.posts
    }

    pub fn draft(&self) -> &BlogDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut BlogDraft {
        &mut self.draft
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Loads post `id` into the draft.
    pub fn edit(&mut self, id: &str) -> AppResult<()> {
        let post = self
            .posts
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::not_found("Blog not found"))?;
        self.draft = BlogDraft {
            title: post.title.clone(),
            content: post.content.clone(),
            cover_image: post.cover_image.clone(),
        };
        self.editing = Some(id.to_string());
        Ok(())
    }

    pub fn reset(&mut self) {
        self.draft = BlogDraft::default();
        self.editing = None;
    }

    /// Creates a post from the draft or updates the one being edited, then
    /// reloads the owner's list. Returns the post id.
    pub async fn submit(&mut self, store: &dyn Store) -> AppResult<String> {
        require(&self.draft.title, "Title is required")?;
        require(&self.draft.content, "Content is required")?;

        let id = match self.editing.clone() {
            Some(id) => {
                let patch = BlogPatch {
                    title: Some(self.draft.title.clone()),
                    content: Some(self.draft.content.clone()),
                    cover_image: Some(self.draft.cover_image.clone()),
                };
                store.update(&id, &self.uid, patch).await?;
                id
            }
            None => {
                let post = NewBlogPost {
                    title: self.draft.title.clone(),
                    content: self.draft.content.clone(),
                    cover_image: self.draft.cover_image.clone(),
                };
                store.create(&self.uid, post).await?
            }
        };

        tracing::info!(uid = %self.uid, blog_id = %id, "blog post saved");
        self.posts = store.list_by_owner(&self.uid).await?;
        self.reset();
        Ok(id)
    }

    pub async fn delete(&mut self, store: &dyn Store, id: &str) -> AppResult<()> {
        store.delete(id, &self.uid).await?;
        self.posts.retain(|p| p.id != id);
        if self.editing.as_deref() == Some(id) {
            self.reset();
        }
        tracing::info!(uid = %self.uid, blog_id = %id, "blog post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_submit_creates_then_updates_without_touching_slug() {
        let store = MemoryStore::new();
        let mut form = BlogForm::load(&store, "uid-1").await.unwrap();

        form.draft_mut().title = "First Post".into();
        form.draft_mut().content = "Hello".into();
        let id = form.submit(&store).await.unwrap();
        assert_eq!(form.posts().len(), 1);
        let slug = form.posts()[0].slug.clone();
        assert!(slug.starts_with("first-post-"));

        form.edit(&id).unwrap();
        assert_eq!(form.draft().content, "Hello");
        form.draft_mut().title = "Renamed".into();
        form.submit(&store).await.unwrap();

        let post = store.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(post.title, "Renamed");
        assert_eq!(post.slug, slug);
        assert_eq!(form.editing(), None);
    }

    #[tokio::test]
    async fn test_missing_content_is_rejected_before_write() {
        let store = MemoryStore::new();
        let mut form = BlogForm::new("uid-1", Vec::new());
        form.draft_mut().title = "Title only".into();
        assert!(matches!(
            form.submit(&store).await,
            Err(AppError::Validation(_))
        ));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_of_someone_elses_post_is_forbidden() {
        let store = MemoryStore::new();
        let id = store
            .create(
                "uid-2",
                NewBlogPost {
                    title: "Theirs".into(),
                    content: "Body".into(),
                    cover_image: None,
                },
            )
            .await
            .unwrap();

        let mut form = BlogForm::new("uid-1", Vec::new());
        assert!(matches!(
            form.delete(&store, &id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(store.get_by_id(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_removes_from_list() {
        let store = MemoryStore::new();
        let mut form = BlogForm::new("uid-1", Vec::new());
        form.draft_mut().title = "Doomed".into();
        form.draft_mut().content = "Body".into();
        let id = form.submit(&store).await.unwrap();
        let slug = form.posts()[0].slug.clone();

        form.edit(&id).unwrap();
        form.delete(&store, &id).await.unwrap();
        assert!(form.posts().is_empty());
        assert_eq!(form.editing(), None);
        assert!(store.get_by_slug(&slug).await.unwrap().is_none());
    }
}
