/**
 * Upload Routes
 * Multipart image uploads: inline profile/cover/project images and
 * object-storage blog covers
 */
use axum::{
    extract::{Multipart, Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::forms::{ImageSlot, PortfolioForm};
use crate::image::{ingest, ImageRef, IngestMode, UploadedFile};
use crate::session::Session;
use crate::state::SharedState;

/// Multipart bodies larger than this are refused before ingestion.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Reads the first file part of a multipart body.
pub async fn read_upload(mut multipart: Multipart) -> AppResult<UploadedFile> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(AppError::validation("No file provided")),
            Err(e) => {
                tracing::warn!("Multipart error: {}", e);
                return Err(AppError::validation("Invalid multipart data"));
            }
        };

        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read upload bytes: {}", e);
            AppError::validation("Failed to read file data")
        })?;
        if bytes.is_empty() {
            return Err(AppError::validation("Empty file"));
        }

        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
}

/// POST /api/me/images/{slot}
/// Inlines the image into the profile or cover slot and saves that field.
pub async fn upload_portfolio_image(
    State(state): State<SharedState>,
    session: Session,
    Path(slot): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<ImageRef>> {
    let slot = ImageSlot::parse(&slot)
        .ok_or_else(|| AppError::not_found(format!("Unknown image slot: {}", slot)))?;
    let file = read_upload(multipart).await?;

    let image = ingest(file, IngestMode::Inline, &session.uid, state.images.as_ref()).await?;

    let mut form = PortfolioForm::load(state.store.as_ref(), &session.uid).await?;
    form.set_image(slot, image.clone());
    form.save_field(state.store.as_ref(), slot.field()).await?;

    tracing::info!(uid = %session.uid, slot = ?slot, "portfolio image updated");
    Ok(Json(image))
}

/// POST /api/me/images/project
/// Returns an inline image for a project draft; nothing is stored.
pub async fn upload_project_image(
    State(state): State<SharedState>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Json<ImageRef>> {
    let file = read_upload(multipart).await?;
    let image = ingest(file, IngestMode::Inline, &session.uid, state.images.as_ref()).await?;
    Ok(Json(image))
}

/// POST /api/blogs/cover
/// Stores the file in object storage and returns its URL reference.
pub async fn upload_blog_cover(
    State(state): State<SharedState>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Json<ImageRef>> {
    let file = read_upload(multipart).await?;
    let image = ingest(file, IngestMode::Url, &session.uid, state.images.as_ref()).await?;
    tracing::info!(uid = %session.uid, "blog cover uploaded");
    Ok(Json(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::UserRecord;
    use crate::image::MAX_INLINE_IMAGE_BYTES;
    use crate::routes::test_support::{get_request, multipart_request, register, send, test_app};
    use axum::http::StatusCode;

    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";

    #[tokio::test]
    async fn test_profile_image_is_inlined_and_saved() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;

        let (status, bytes) = send(
            &t.app,
            multipart_request("/api/me/images/profile", &tokens.access_token, "me.gif", "image/gif", GIF),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let image: ImageRef = serde_json::from_slice(&bytes).unwrap();
        assert!(image.src().starts_with("data:image/gif;base64,"));

        let (_, bytes) = send(&t.app, get_request("/api/me", Some(&tokens.access_token))).await;
        let record: UserRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(record.portfolio_data.profile_image, Some(image));
        assert!(record.portfolio_data.cover_image.is_none());
    }

    #[tokio::test]
    async fn test_inline_size_boundary() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;

        let at_limit = vec![0u8; MAX_INLINE_IMAGE_BYTES];
        let (status, _) = send(
            &t.app,
            multipart_request("/api/me/images/cover", &tokens.access_token, "c.png", "image/png", &at_limit),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let over = vec![0u8; MAX_INLINE_IMAGE_BYTES + 1];
        let (status, _) = send(
            &t.app,
            multipart_request("/api/me/images/cover", &tokens.access_token, "c.png", "image/png", &over),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_non_image_is_rejected_for_inline() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;
        let (status, _) = send(
            &t.app,
            multipart_request("/api/me/images/project", &tokens.access_token, "a.txt", "text/plain", b"hello"),
        )
        .await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_unknown_slot_is_not_found() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;
        let (status, _) = send(
            &t.app,
            multipart_request("/api/me/images/avatar", &tokens.access_token, "a.gif", "image/gif", GIF),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blog_cover_goes_to_object_storage() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;
        let (status, bytes) = send(
            &t.app,
            multipart_request("/api/blogs/cover", &tokens.access_token, "cover.gif", "image/gif", GIF),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let image: ImageRef = serde_json::from_slice(&bytes).unwrap();
        let ImageRef::Url { url } = image else {
            panic!("expected url image");
        };
        let key = url.split("/uploads/").nth(1).unwrap();
        assert!(key.starts_with("blogs/"));
        assert!(key.ends_with("_cover.gif"));
        assert!(t._dir.path().join("uploads").join(key).is_file());
    }
}
