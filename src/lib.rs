pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;

pub use config::Config;
pub use db::{init_pool, run_migrations, SqliteEventStore};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
