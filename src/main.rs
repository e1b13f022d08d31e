use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use enigma::store::sqlite::SqliteStore;
use enigma::{api, auth, cli, config, jobs, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "enigma=debug,tower_http=debug".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);
    if cfg.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(cli::Commands::User { command }) => {
            let db = SqliteStore::connect(&cfg.database_url).await?;
            db.migrate().await?;
            handle_user_command(&db, command).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = SqliteStore::connect(&cfg.database_url).await?;

    tracing::info!("Creating tables...");
    db.migrate().await?;

    let addr: SocketAddr = format!("{}:{}", cfg.host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.host, port))?;
    let sweep_secs = cfg.token_sweep_secs;

    let state = Arc::new(AppState::new(db));

    if sweep_secs > 0 {
        jobs::sweep::spawn(state.tokens.clone(), Duration::from_secs(sweep_secs));
        tracing::info!(every_secs = sweep_secs, "Expired-token sweep started");
    } else {
        tracing::info!("Expired-token sweep disabled, tokens expire lazily on lookup");
    }

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Enigma API listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_user_command(db: &SqliteStore, cmd: cli::UserCommands) -> anyhow::Result<()> {
    match cmd {
        cli::UserCommands::Add {
            username,
            public_key,
        } => {
            if username.is_empty() {
                anyhow::bail!("username must not be empty");
            }
            let pem = std::fs::read_to_string(&public_key)
                .with_context(|| format!("failed to read {}", public_key.display()))?;
            auth::crypto::parse_public_key(&pem)
                .with_context(|| format!("{} is not a usable RSA public key", public_key.display()))?;

            match db.create_user(&username, &pem).await? {
                Some(id) => println!("User created:\n  ID:       {}\n  Username: {}", id, username),
                None => anyhow::bail!("username '{}' already exists", username),
            }
        }
        cli::UserCommands::List => {
            let users = db.list_users().await?;
            if users.is_empty() {
                println!("No users found.");
            } else {
                println!("{:<8} {:<32}", "ID", "USERNAME");
                for u in users {
                    println!("{:<8} {:<32}", u.id, u.username);
                }
            }
        }
    }
    Ok(())
}
