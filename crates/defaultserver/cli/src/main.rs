//! DefaultServer host
//!
//! Boots the preference store and policy the way a proxy plugin would, and
//! exposes the routing operations on the command line:
//! - `route`: where a connecting player would be sent
//! - `set`: record a player's default server
//! - `servers`: list the allowed servers
//! - `reload`: reload and validate the policy file
//! - `console`: interactive stand-in for the proxy

use clap::{Parser, Subcommand};
use defaultserver_engine::{ChooseInitialServer, CommandSource};
use defaultserver_types::PlayerId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod config;
mod console;
mod error;

use app::App;
use config::AppConfig;
use error::AppResult;

/// DefaultServer CLI
#[derive(Parser)]
#[command(name = "defaultserver")]
#[command(about = "Per-player default server routing", long_about = None)]
#[command(version)]
struct Cli {
    /// Host configuration file path
    #[arg(short, long, env = "DEFAULTSERVER_CONFIG")]
    config: Option<String>,

    /// Data directory holding the database and policy file
    #[arg(short, long, env = "DEFAULTSERVER_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level
    #[arg(long, env = "DEFAULTSERVER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "DEFAULTSERVER_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show where a connecting player would be placed
    Route {
        /// Player UUID
        player: String,
    },
    /// Set a player's default server
    Set {
        /// Player UUID
        player: String,
        /// Server name
        server: String,
    },
    /// List allowed servers
    Servers,
    /// Reload the policy file and report the result
    Reload,
    /// Read commands from stdin
    Console,
}

fn init_tracing(config: &AppConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load(cli.config.as_deref())?;

    // Override with CLI args
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    init_tracing(&config);

    let app = App::bootstrap(&config).await?;
    let result = run(&app, cli.command).await;
    app.shutdown().await;
    result
}

async fn run(app: &App, command: Command) -> AppResult<()> {
    match command {
        Command::Route { player } => {
            let player_id: PlayerId = player.parse()?;
            let mut event = ChooseInitialServer::new(player_id, None);
            app.hooks.on_choose_initial_server(&mut event).await;
            match event.initial_server {
                Some(server) => println!("{server}"),
                None => println!("no default server, the proxy decides"),
            }
        }
        Command::Set { player, server } => {
            let player_id: PlayerId = player.parse()?;
            let reply = app
                .default_server
                .execute(&CommandSource::Player(player_id), &[server.as_str()])
                .await;
            println!("{reply}");
        }
        Command::Servers => {
            println!("{}", console::describe(&app.policy.current()));
            println!("{}", console::list(&app.engine.suggest_destinations()));
        }
        Command::Reload => println!("{}", app.reload.execute()),
        Command::Console => console::run(app).await?,
    }
    Ok(())
}
