use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database;
use common::kv::{RedisConfig, RedisPool};
use web::session::SessionConfig;
use web::sweeper::{SweeperConfig, TaskSweeper};
use web::{AppState, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting todo web application");

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool, &sqlx::migrate!()).await?;
    info!("Database migrations applied");

    // Initialize Redis connection pool for session storage
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    let app_state = AppState::new(pool, redis_pool, SessionConfig::from_env());

    // Start the background sweeper for soft-deleted tasks
    let sweeper = TaskSweeper::new(app_state.tasks.clone());
    sweeper.start(&SweeperConfig::from_env()).await?;

    // Start the web server
    let app = routes::create_router(app_state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Todo web application listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
