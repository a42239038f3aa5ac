/**
 * Blog Routes
 * Public listing and lookup, plus owner-only create, update and delete
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::models::{BlogPatch, BlogPost, NewBlogPost};
use crate::error::{AppError, AppResult};
use crate::session::Session;
use crate::state::SharedState;
use crate::store::BlogStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct BlogListResponse {
    pub posts: Vec<BlogPost>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
    pub post: BlogPost,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub success: bool,
}

fn list(posts: Vec<BlogPost>) -> Json<BlogListResponse> {
    let total = posts.len();
    Json(BlogListResponse { posts, total })
}

fn require_text(value: &str, message: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        Err(AppError::validation(message))
    } else {
        Ok(())
    }
}

/// GET /api/blogs
pub async fn list_all(State(state): State<SharedState>) -> AppResult<Json<BlogListResponse>> {
    Ok(list(state.store.list_all().await?))
}

/// GET /api/me/blogs
pub async fn list_mine(
    State(state): State<SharedState>,
    session: Session,
) -> AppResult<Json<BlogListResponse>> {
    Ok(list(state.store.list_by_owner(&session.uid).await?))
}

/// GET /api/blogs/slug/{slug}
pub async fn get_by_slug(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> AppResult<Json<BlogPost>> {
    state
        .store
        .get_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Blog not found"))
}

/// POST /api/blogs
pub async fn create_post(
    State(state): State<SharedState>,
    session: Session,
    Json(payload): Json<NewBlogPost>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    require_text(&payload.title, "Title is required")?;
    require_text(&payload.content, "Content is required")?;

    let id = state.store.create(&session.uid, payload).await?;
    let post = state
        .store
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::Backend(format!("created post {} vanished", id)))?;

    tracing::info!(uid = %session.uid, blog_id = %id, slug = %post.slug, "blog post created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id, post })))
}

/// PATCH /api/blogs/{id}
/// Only title, content and cover image change; the slug is fixed at creation.
pub async fn update_post(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
    Json(patch): Json<BlogPatch>,
) -> AppResult<Json<BlogPost>> {
    if patch.is_empty() {
        return Err(AppError::validation("Nothing to update"));
    }
    if let Some(title) = &patch.title {
        require_text(title, "Title is required")?;
    }
    if let Some(content) = &patch.content {
        require_text(content, "Content is required")?;
    }

    state.store.update(&id, &session.uid, patch).await?;
    let post = state
        .store
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Blog not found"))?;

    tracing::info!(uid = %session.uid, blog_id = %id, "blog post updated");
    Ok(Json(post))
}

/// DELETE /api/blogs/{id}
pub async fn delete_post(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<DeletedResponse>> {
    state.store.delete(&id, &session.uid).await?;
    tracing::info!(uid = %session.uid, blog_id = %id, "blog post deleted");
    Ok(Json(DeletedResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{get_request, json_request, register, send, test_app};
    use crate::slug::SLUG_REGEX;
    use serde_json::json;

    async fn create(t: &crate::routes::test_support::TestApp, token: &str, title: &str) -> BlogPost {
        let (status, bytes) = send(
            &t.app,
            json_request(
                "POST",
                "/api/blogs",
                Some(token),
                &json!({ "title": title, "content": "Some body text" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let body: CreatedResponse = serde_json::from_slice(&bytes).unwrap();
        body.post
    }

    #[tokio::test]
    async fn test_create_assigns_slug_and_lists() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;
        let post = create(&t, &tokens.access_token, "Hello, World!").await;
        assert!(post.slug.starts_with("hello-world-"));
        assert!(SLUG_REGEX.is_match(&post.slug));

        let (status, bytes) = send(&t.app, get_request("/api/blogs", None)).await;
        assert_eq!(status, StatusCode::OK);
        let body: BlogListResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.total, 1);

        let uri = format!("/api/blogs/slug/{}", post.slug);
        let (status, _) = send(&t.app, get_request(&uri, None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_requires_title_and_content() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;
        let (status, _) = send(
            &t.app,
            json_request(
                "POST",
                "/api/blogs",
                Some(&tokens.access_token),
                &json!({ "title": "No body", "content": "   " }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &t.app,
            json_request("POST", "/api/blogs", None, &json!({ "title": "x", "content": "y" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_keeps_slug() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;
        let post = create(&t, &tokens.access_token, "Original").await;

        let uri = format!("/api/blogs/{}", post.id);
        let (status, bytes) = send(
            &t.app,
            json_request(
                "PATCH",
                &uri,
                Some(&tokens.access_token),
                &json!({ "title": "Renamed", "slug": "ignored" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let updated: BlogPost = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.slug, post.slug);
        assert_eq!(updated.created_at, post.created_at);
    }

    #[tokio::test]
    async fn test_other_users_cannot_edit_or_delete() {
        let t = test_app();
        let ada = register(&t.app, "ada").await;
        let grace = register(&t.app, "grace").await;
        let post = create(&t, &ada.access_token, "Mine").await;
        let uri = format!("/api/blogs/{}", post.id);

        let (status, _) = send(
            &t.app,
            json_request("PATCH", &uri, Some(&grace.access_token), &json!({ "title": "Theirs" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &t.app,
            json_request("DELETE", &uri, Some(&grace.access_token), &json!(null)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, bytes) = send(&t.app, get_request("/api/me/blogs", Some(&grace.access_token))).await;
        let body: BlogListResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.total, 0);
    }

    #[tokio::test]
    async fn test_delete_then_slug_lookup_is_not_found() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;
        let post = create(&t, &tokens.access_token, "Short lived").await;

        let uri = format!("/api/blogs/{}", post.id);
        let (status, _) = send(
            &t.app,
            json_request("DELETE", &uri, Some(&tokens.access_token), &json!(null)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &t.app,
            get_request(&format!("/api/blogs/slug/{}", post.slug), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &t.app,
            json_request("DELETE", &uri, Some(&tokens.access_token), &json!(null)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
