mod block_cmds;
mod config;
mod customer_cmds;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use clap::{Parser, Subcommand};

use plotkeeper_db::pool;

use config::PlotkeeperConfig;

#[derive(Parser)]
#[command(name = "plotkeeper", about = "Plot and block registry service")]
struct Cli {
    /// Database URL (overrides PLOTKEEPER_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a plotkeeper config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/plotkeeper")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the database if needed and apply migrations
    DbInit,
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides PLOTKEEPER_BIND and the config file)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides PLOTKEEPER_PORT and the config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Block management
    Block {
        #[command(subcommand)]
        command: BlockCommands,
    },
    /// Customer management
    Customer {
        #[command(subcommand)]
        command: CustomerCommands,
    },
}

#[derive(Subcommand)]
pub enum BlockCommands {
    /// Add a new block
    Add {
        /// Unique block name (e.g. "Block C")
        name: String,
    },
    /// List all blocks
    List,
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Add a new customer
    Add {
        /// Customer name
        name: String,
        /// Contact phone number
        #[arg(long)]
        phone: Option<String>,
    },
    /// List all customers
    List,
}

/// Execute the `plotkeeper init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        server: config::ServerSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  server.bind  = {}", cfg.server.bind);
    println!("  server.port  = {}", cfg.server.port);
    println!();
    println!("Next: run `plotkeeper db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `plotkeeper db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = PlotkeeperConfig::resolve(cli_db_url)?;

    println!("Initializing plotkeeper database...");

    pool::ensure_database_exists(&resolved.db_config).await?;

    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in counts.rows() {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("plotkeeper db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved = PlotkeeperConfig::resolve(cli.database_url.as_deref())?;
            let bind = bind.unwrap_or(resolved.bind);
            let port = port.unwrap_or(resolved.port);
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = serve_cmd::run_serve(db_pool.clone(), &bind, port).await;
            db_pool.close().await;
            result?;
        }
        Commands::Block { command } => {
            let resolved = PlotkeeperConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = block_cmds::run_block_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Customer { command } => {
            let resolved = PlotkeeperConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = customer_cmds::run_customer_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
