pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod metrics_handler;
pub mod observability;
pub mod routes;
pub mod state;
pub mod uploads;

pub use app::build_router;
pub use config::AppConfig;
pub use state::AppState;
