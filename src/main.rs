use std::sync::Arc;

use axum::http::HeaderName;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dalryeok::{create_router, init_pool, run_migrations, AppState, Config, SqliteEventStore};
use dalryeok_core::{AccessPolicy, DenyAll, EmailAllowList};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: DATABASE_URL (default: sqlite://dalryeok.db)");
            eprintln!("Optional: LISTEN_ADDR (default: 0.0.0.0:3000)");
            eprintln!("Optional: DALRYEOK_ORG_ID (default: gw-rehab-center)");
            eprintln!("Optional: DALRYEOK_ADMIN_EMAILS=<a@x.org,b@y.org>");
            eprintln!("Optional: DALRYEOK_IDENTITY_HEADER (default: x-forwarded-email)");
            eprintln!("Optional: DALRYEOK_WATCH_TIMEOUT_SECS (default: 25)");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting Dalryeok server");
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Database: {}", config.database_url);
    tracing::info!("Organization: {}", config.org_id);

    // Connect to database
    let pool = match init_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Database connection error: {}", e);
            std::process::exit(1);
        }
    };

    // Run migrations
    if let Err(e) = run_migrations(&pool).await {
        eprintln!("Migration error: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Database migrations completed");

    let policy: Arc<dyn AccessPolicy> = if config.admin_emails.is_empty() {
        tracing::warn!("No DALRYEOK_ADMIN_EMAILS configured, calendar is read-only");
        Arc::new(DenyAll)
    } else {
        tracing::info!("{} admin(s) configured", config.admin_emails.len());
        Arc::new(EmailAllowList::new(config.admin_emails.iter().cloned()))
    };

    let identity_header = match HeaderName::from_bytes(config.identity_header.as_bytes()) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Create app state
    let store = Arc::new(SqliteEventStore::new(pool));
    let state = AppState::new(store, policy, config.org_id.as_str())
        .with_identity_header(identity_header)
        .with_watch_timeout(config.watch_timeout);

    // Build router
    let app = create_router(state).nest_service("/static", ServeDir::new("static"));

    // Start server
    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
