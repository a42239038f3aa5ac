/**
 * Public Pages
 * Server-rendered portfolio, blog post and blog index pages
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::error::{AppError, AppResult};
use crate::render::{
    error_page, not_found_page, render_blog_index, render_blog_post, render_portfolio, IndexEntry,
};
use crate::state::SharedState;
use crate::store::{BlogStore, ProfileStore};

/// Maps a render result onto an HTML response. Missing records become the
/// 404 page, anything else the generic error page.
fn html_page(result: AppResult<String>, what: &str) -> Response {
    match result {
        Ok(html) => Html(html).into_response(),
        Err(AppError::NotFound(reason)) => {
            tracing::debug!(%reason, "page not found");
            (StatusCode::NOT_FOUND, Html(not_found_page(what))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(error_page())).into_response()
        }
    }
}

async fn portfolio_html(state: &SharedState, username: &str) -> AppResult<String> {
    let user = state
        .store
        .get_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found(format!("user {}", username)))?;
    let posts = state.store.list_by_owner(&user.uid).await?;
    Ok(render_portfolio(&user, &posts))
}

async fn blog_post_html(state: &SharedState, slug: &str) -> AppResult<String> {
    let post = state
        .store
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::not_found(format!("blog {}", slug)))?;
    let author = state
        .store
        .get_by_uid(&post.uid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("author {}", post.uid)))?;
    Ok(render_blog_post(&post, &author))
}

async fn blog_index_html(state: &SharedState) -> AppResult<String> {
    let posts = state.store.list_all().await?;

    let mut entries = Vec::with_capacity(posts.len());
    for post in posts {
        match state.store.get_by_uid(&post.uid).await? {
            Some(author) => entries.push(IndexEntry::new(post, &author)),
            None => tracing::warn!(blog_id = %post.id, uid = %post.uid, "skipping post without author"),
        }
    }

    Ok(render_blog_index(&entries, &state.config.site_title))
}

/// GET /u/{username}
pub async fn portfolio_page(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Response {
    html_page(portfolio_html(&state, &username).await, "Portfolio")
}

/// GET /blog/{slug}
pub async fn blog_post_page(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Response {
    html_page(blog_post_html(&state, &slug).await, "Blog")
}

/// GET /blogs
pub async fn blog_index_page(State(state): State<SharedState>) -> Response {
    html_page(blog_index_html(&state).await, "Blogs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewBlogPost, PortfolioField};
    use crate::routes::test_support::{get_request, json_request, register, send, test_app};
    use crate::templates::TemplateKind;
    use serde_json::json;

    fn text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_portfolio_page_uses_chosen_template() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;
        let (status, _) = send(
            &t.app,
            json_request(
                "PUT",
                "/api/me/templates/portfolio",
                Some(&tokens.access_token),
                &json!({ "templateId": "7" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, bytes) = send(&t.app, get_request("/u/ada", None)).await;
        assert_eq!(status, StatusCode::OK);
        let html = text(&bytes);
        assert!(html.contains("template-7"));
    }

    #[tokio::test]
    async fn test_portfolio_page_lookup_ignores_case() {
        let t = test_app();
        register(&t.app, "ada").await;
        let (status, _) = send(&t.app, get_request("/u/ADA", None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_user_and_slug_are_html_404() {
        let t = test_app();
        let (status, bytes) = send(&t.app, get_request("/u/nobody", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(text(&bytes).contains("Portfolio Not Found"));

        let (status, bytes) = send(&t.app, get_request("/blog/missing-0", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(text(&bytes).contains("Blog Not Found"));
    }

    #[tokio::test]
    async fn test_blog_page_uses_author_template_and_name() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;
        let uid = t
            .state
            .store
            .get_by_username("ada")
            .await
            .unwrap()
            .unwrap()
            .uid;
        t.state
            .store
            .update_single_field(&uid, PortfolioField::Name, json!("Lovelace"))
            .await
            .unwrap();
        t.state
            .store
            .update_template_choice(&uid, TemplateKind::Blog, "2")
            .await
            .unwrap();

        let (_, bytes) = send(
            &t.app,
            json_request(
                "POST",
                "/api/blogs",
                Some(&tokens.access_token),
                &json!({ "title": "Engines", "content": "Notes" }),
            ),
        )
        .await;
        let created: crate::routes::blog::CreatedResponse = serde_json::from_slice(&bytes).unwrap();

        let uri = format!("/blog/{}", created.post.slug);
        let (status, bytes) = send(&t.app, get_request(&uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        let html = text(&bytes);
        assert!(html.contains("template-2"));
        assert!(html.contains("Lovelace"));
        assert!(html.contains("1 min read"));
    }

    #[tokio::test]
    async fn test_blog_index_skips_orphaned_posts() {
        let t = test_app();
        register(&t.app, "ada").await;
        let uid = t
            .state
            .store
            .get_by_username("ada")
            .await
            .unwrap()
            .unwrap()
            .uid;
        t.state
            .store
            .create(
                &uid,
                NewBlogPost {
                    title: "Kept".to_string(),
                    content: "Body".to_string(),
                    cover_image: None,
                },
            )
            .await
            .unwrap();
        t.state
            .store
            .create(
                "ghost",
                NewBlogPost {
                    title: "Orphan".to_string(),
                    content: "Body".to_string(),
                    cover_image: None,
                },
            )
            .await
            .unwrap();

        let (status, bytes) = send(&t.app, get_request("/blogs", None)).await;
        assert_eq!(status, StatusCode::OK);
        let html = text(&bytes);
        assert!(html.contains("Kept"));
        assert!(!html.contains("Orphan"));
    }

    #[tokio::test]
    async fn test_empty_blog_index() {
        let t = test_app();
        let (status, bytes) = send(&t.app, get_request("/blogs", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(text(&bytes).contains("No blog posts yet."));
    }
}
