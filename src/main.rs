use bepviet::{
    api::{handlers::AppState, routes},
    cli::{Cli, Commands},
    config::Settings,
    db, Error, Result,
};
use clap::Parser;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bepviet=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    settings.validate()?;

    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Migrate => {
            migrate(settings).await?;
        }
        Commands::Seed { file } => {
            seed(settings, file).await?;
        }
        Commands::Pantry { ingredients, limit } => {
            bepviet::cli::commands::pantry(&settings.server_url(), &ingredients, limit).await?;
        }
        Commands::Search {
            query,
            difficulty,
            max_time,
            category,
        } => {
            bepviet::cli::commands::search(
                &settings.server_url(),
                &query,
                difficulty,
                max_time,
                category,
            )
            .await?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting Bếp Việt server");
    info!("Database: {}", settings.database.url);

    let pool = db::init_pool_with_config(&settings.database).await?;
    info!(
        "Database connection established (max_connections: {}, min_connections: {})",
        settings.database.max_connections, settings.database.min_connections
    );

    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    info!(
        "Pantry search: {} candidates, default limit {}",
        settings.pantry.candidate_limit, settings.pantry.default_limit
    );

    let state = AppState {
        pool,
        settings: settings.clone(),
    };

    let app = routes::create_router(state, &settings)?;

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

async fn migrate(settings: Settings) -> Result<()> {
    info!("Running database migrations");

    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    println!("✓ Database migrations completed successfully");
    Ok(())
}

async fn seed(settings: Settings, file: String) -> Result<()> {
    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    let inserted = bepviet::cli::seed::seed_from_file(&pool, Path::new(&file)).await?;
    println!("✓ Seeded {inserted} recipes from {file}");

    Ok(())
}
