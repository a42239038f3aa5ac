//! DevFolio backend: multi-tenant portfolio and blog builder.
//!
//! Users register a unique username, edit a portfolio document and write
//! blog posts; both are rendered publicly through one of eight selectable
//! visual templates.

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod image;
pub mod logging;
pub mod render;
pub mod routes;
pub mod session;
pub mod slug;
pub mod state;
pub mod store;
pub mod templates;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::config::{AppConfig, ConfigError};
use crate::image::LocalObjectStorage;
use crate::state::{AppState, SharedState};
use crate::store::{MemoryStore, PgStore, Store};

/// Request bodies above this are refused; leaves room for multipart framing
/// around the largest accepted upload.
const BODY_LIMIT_BYTES: usize = routes::upload::MAX_UPLOAD_BYTES + 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid bind address: {0}")]
    Address(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

fn configure_cors(config: &AppConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(config.allowed_origins.clone())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: SharedState) -> Router {
    let cors = configure_cors(&state.config);
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/refresh", post(routes::auth::refresh))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/session", get(routes::auth::current_session))
        .route(
            "/api/users/available/{username}",
            get(routes::auth::username_available),
        )
        .route("/api/me", get(routes::dashboard::get_me))
        .route("/api/me/portfolio", put(routes::dashboard::put_portfolio))
        .route(
            "/api/me/portfolio/{field}",
            axum::routing::patch(routes::dashboard::patch_field),
        )
        .route("/api/me/skills", post(routes::dashboard::add_skill))
        .route(
            "/api/me/skills/{skill}",
            delete(routes::dashboard::remove_skill),
        )
        .route(
            "/api/me/certifications",
            post(routes::dashboard::add_certification),
        )
        .route(
            "/api/me/certifications/{index}",
            delete(routes::dashboard::remove_certification),
        )
        .route("/api/me/experience", post(routes::dashboard::add_experience))
        .route(
            "/api/me/experience/{index}",
            put(routes::dashboard::update_experience).delete(routes::dashboard::remove_experience),
        )
        .route("/api/me/education", post(routes::dashboard::add_education))
        .route(
            "/api/me/education/{index}",
            put(routes::dashboard::update_education).delete(routes::dashboard::remove_education),
        )
        .route("/api/me/projects", post(routes::dashboard::create_project))
        .route(
            "/api/me/projects/{index}",
            put(routes::dashboard::update_project).delete(routes::dashboard::delete_project),
        )
        .route(
            "/api/me/templates/{kind}",
            put(routes::dashboard::set_template),
        )
        .route("/api/templates", get(routes::dashboard::list_templates))
        .route(
            "/api/me/images/project",
            post(routes::upload::upload_project_image),
        )
        .route(
            "/api/me/images/{slot}",
            post(routes::upload::upload_portfolio_image),
        )
        .route("/api/me/blogs", get(routes::blog::list_mine))
        .route(
            "/api/blogs",
            get(routes::blog::list_all).post(routes::blog::create_post),
        )
        .route("/api/blogs/cover", post(routes::upload::upload_blog_cover))
        .route("/api/blogs/slug/{slug}", get(routes::blog::get_by_slug))
        .route(
            "/api/blogs/{id}",
            axum::routing::patch(routes::blog::update_post).delete(routes::blog::delete_post),
        )
        .route("/u/{username}", get(routes::pages::portfolio_page))
        .route("/blog/{slug}", get(routes::pages::blog_post_page))
        .route("/blogs", get(routes::pages::blog_index_page))
        .route("/rss.xml", get(routes::rss::rss_feed))
        .route("/robots.txt", get(routes::rss::robots_txt))
        .route("/health", get(routes::health::health_ping))
        .route("/health/ready", get(routes::health::health_ready))
        .nest_service("/uploads", uploads)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Picks PostgreSQL when `DATABASE_URL` is set, the in-memory store otherwise.
async fn build_state(config: AppConfig) -> Result<SharedState, StartupError> {
    let images = Arc::new(LocalObjectStorage::new(
        config.upload_dir.clone(),
        config.public_base_url.clone(),
    ));

    let (store, pool) = match &config.database {
        Some(settings) => {
            let pool = db::init_pool(settings).await?;
            db::run_migrations(&pool).await?;
            let store: Arc<dyn Store> = Arc::new(PgStore::new(pool.clone()));
            (store, Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Using in-memory store; data is lost on restart.");
            let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
            (store, None)
        }
    };

    Ok(Arc::new(AppState::new(config, store, images, pool)))
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    // Dropping the guards stops the background log writers.
    let _log_guards = logging::init(&config);

    routes::health::init_start_time();

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|_| StartupError::Address(config.server_addr()))?;
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let state = build_state(config).await?;
    let app = create_app(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get_request, json_request, register, send, test_app};
    use axum::http::{header, Request, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_register_edit_then_public_page() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;
        let token = Some(tokens.access_token.as_str());

        let (status, _) = send(
            &t.app,
            json_request("PUT", "/api/me/portfolio", token, &json!({ "name": "Lovelace" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &t.app,
            json_request("POST", "/api/me/skills", token, &json!({ "skill": "Analysis" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, bytes) = send(&t.app, get_request("/u/ada", None)).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Lovelace"));
        assert!(html.contains("Analysis"));
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let t = test_app();
        let res = tower::ServiceExt::oneshot(t.app.clone(), get_request("/health", None))
            .await
            .unwrap();
        assert!(res.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let t = test_app();
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/me")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .body(axum::body::Body::empty())
            .unwrap();
        let res = tower::ServiceExt::oneshot(t.app.clone(), req).await.unwrap();
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let t = test_app();
        let (status, _) = send(&t.app, get_request("/nope", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
