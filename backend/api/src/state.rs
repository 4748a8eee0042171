use prometheus::Registry;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Instant;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub started_at: Instant,
    pub registry: Registry,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(db: SqlitePool, registry: Registry, upload_dir: PathBuf) -> Self {
        Self {
            db,
            started_at: Instant::now(),
            registry,
            upload_dir,
        }
    }
}
