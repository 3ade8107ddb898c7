use std::env;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use recipe_api::db::migrator::Migrator;
use recipe_api::db::services::user_service;
use recipe_api::server::config::ServerConfig;
use recipe_api::web::create_axum_router;

#[derive(Parser)]
#[command(name = "recipe-api", about = "Recipe management REST API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default).
    Serve,
    /// Create a staff/superuser account.
    CreateSuperuser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

fn init_logging() {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily("logs", "recipe-api.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn connect_database() -> Result<DatabaseConnection, Box<dyn std::error::Error + Send + Sync>>
{
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL must be set in the environment or .env file")?;
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(10);

    let db_pool = Database::connect(opt).await?;
    Migrator::up(&db_pool, None).await?;
    Ok(db_pool)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    init_logging();
    dotenv().ok();

    let db_pool = connect_database().await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::CreateSuperuser { email, password } => {
            match user_service::create_superuser(&db_pool, &email, &password).await {
                Ok(user) => {
                    info!(user_id = user.id, email = %user.email, "Superuser created.");
                }
                Err(e) => {
                    error!(error = %e, "Failed to create superuser.");
                    return Err(e.to_string().into());
                }
            }
        }
        Command::Serve => {
            let config = match ServerConfig::from_env() {
                Ok(config) => Arc::new(config),
                Err(e) => {
                    error!("Failed to load server configuration: {}", e);
                    return Err(e.into());
                }
            };

            let app = create_axum_router(db_pool, config.clone());
            let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
            info!("Recipe API listening on {}", config.listen_addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
