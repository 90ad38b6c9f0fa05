use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use course_recommender::{
    config::{Config, LoggingConfig, RecommendationConfig},
    create_app,
    db::{self, load_catalog_file, MemoryCourseStore, PgCourseStore},
    models::RecommendationRequest,
    recommend::RecommendationService,
    utils::init_logger,
    AppState,
};

#[derive(Parser)]
#[clap(name = "course-recommender", about = "Content-based course recommendation service")]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve,

    /// Rank a JSON catalog file against a set of interests and print the result
    Rank {
        /// Path to a JSON array of course objects
        #[clap(short, long)]
        catalog: PathBuf,

        /// Interest term or phrase; repeat for more
        #[clap(short, long = "interest")]
        interests: Vec<String>,

        /// Course id to leave out (enrolled or completed); repeat for more
        #[clap(short, long = "exclude")]
        excluded: Vec<String>,

        /// Number of recommendations to return
        #[clap(short = 'n', long)]
        top_n: Option<i64>,

        /// User id echoed in the output
        #[clap(short, long, default_value = "cli")]
        user_id: String,
    },

    /// Load a JSON catalog file into the database, replacing courses by id
    Import {
        /// Path to a JSON array of course objects
        #[clap(short, long)]
        catalog: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_logger(&LoggingConfig::from_env());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Rank {
            catalog,
            interests,
            excluded,
            top_n,
            user_id,
        } => rank(catalog, interests, excluded, top_n, user_id).await,
        Command::Import { catalog } => import(catalog).await,
    }
}

async fn serve() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    // Connect to database
    let pool = db::create_pool(&config.database).await?;

    info!("Running database migrations...");
    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    let store = Arc::new(PgCourseStore::new(pool));
    let service = RecommendationService::new(store, config.recommendation.clone());
    let app = create_app(AppState::new(service), &config.server.cors_allowed_origins);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

async fn rank(
    catalog: PathBuf,
    interests: Vec<String>,
    excluded: Vec<String>,
    top_n: Option<i64>,
    user_id: String,
) -> anyhow::Result<()> {
    let store = MemoryCourseStore::from_json_file(&catalog).await?;
    info!(courses = store.len().await, "Catalog loaded from {}", catalog.display());

    let service = RecommendationService::new(Arc::new(store), RecommendationConfig::from_env()?);
    let request = RecommendationRequest {
        user_id,
        user_interests: interests,
        completed_courses: excluded,
        enrolled_courses: Vec::new(),
        top_n,
    };

    let response = service.recommend_for_user(request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn import(catalog: PathBuf) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let courses = load_catalog_file(&catalog).await?;

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let written = PgCourseStore::new(pool).upsert_courses(&courses).await?;
    info!(written, "Imported catalog from {}", catalog.display());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
