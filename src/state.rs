//! Application state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::image::{LocalObjectStorage, ObjectStorage};
use crate::session::SessionManager;
use crate::store::{MemoryStore, Store};

/// Shared application state, built once in `run()`.
pub struct AppState {
    pub config: AppConfig,
    /// Profile, blog and credential records.
    pub store: Arc<dyn Store>,
    /// Object storage for URL-mode image uploads.
    pub images: Arc<dyn ObjectStorage>,
    pub sessions: SessionManager,
    /// Present when running against PostgreSQL; used by readiness checks.
    pub pool: Option<Arc<PgPool>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        images: Arc<dyn ObjectStorage>,
        pool: Option<Arc<PgPool>>,
    ) -> Self {
        let sessions = SessionManager::new(config.jwt_secret.clone());
        Self {
            config,
            store,
            images,
            sessions,
            pool,
        }
    }

    /// Memory store, local uploads under `upload_dir` and a cheap bcrypt cost.
    pub fn for_tests(upload_dir: std::path::PathBuf) -> SharedState {
        let config = AppConfig::for_tests(upload_dir.clone());
        let images = LocalObjectStorage::new(upload_dir, config.public_base_url.clone());
        Arc::new(Self {
            sessions: SessionManager::with_cost(config.jwt_secret.clone(), 4),
            config,
            store: Arc::new(MemoryStore::new()),
            images: Arc::new(images),
            pool: None,
        })
    }
}
