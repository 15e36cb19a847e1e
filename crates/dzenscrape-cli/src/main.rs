mod scrape;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dzenscrape")]
#[command(about = "Scrape dzen.ru channels into Postgres")]
struct Cli {
    /// Targets file (overrides DZEN_TARGETS_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every configured channel and store its profile and posts
    Scrape {
        /// Restrict the run to the target with this id
        #[arg(long)]
        user: Option<String>,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check that the database is reachable
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut config = dzenscrape_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    if let Some(path) = cli.config {
        config.targets_path = path;
    }

    match cli.command {
        Some(Commands::Scrape { user }) => scrape::run_scrape(&config, user.as_deref()).await,
        Some(Commands::Db { command }) => run_db(&config, command).await,
        None => {
            println!("nothing to do; try `dzenscrape scrape` or `dzenscrape --help`");
            Ok(())
        }
    }
}

async fn run_db(config: &dzenscrape_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    // The targets file is only needed for its database section.
    let targets = if config.database_url.is_none() {
        Some(dzenscrape_core::load_targets(&config.targets_path)?)
    } else {
        None
    };
    let file_db = targets.as_ref().and_then(|t| t.database.as_ref());
    let pool = store::connect(config, file_db).await?;
    match command {
        DbCommands::Migrate => {
            let applied = dzenscrape_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Ping => {
            dzenscrape_db::ping(&pool).await?;
            println!("database reachable");
        }
    }
    pool.close().await;
    Ok(())
}
