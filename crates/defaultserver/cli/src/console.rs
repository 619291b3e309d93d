//! Line-oriented stand-in for the proxy.
//!
//! Reads one command per line from stdin and prints replies to stdout:
//!
//! ```text
//! login <uuid> [proxy-default]
//! defaultserver [<uuid>] <server>
//! servers
//! reloadserver
//! quit
//! ```

use crate::app::App;
use crate::error::AppResult;
use defaultserver_engine::{ChooseInitialServer, CommandSource, DefaultServerCommand, ReloadCommand};
use defaultserver_policy::{PolicySnapshot, SnapshotOrigin};
use defaultserver_types::{PlayerId, ServerName};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "commands: login <uuid> [proxy-default] | defaultserver [<uuid>] <server> | servers | reloadserver | quit";

/// Run until `quit` or end of input.
pub async fn run(app: &App) -> AppResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            continue;
        };
        debug!(command, "console input");

        match command {
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "login" => println!("{}", login(app, args).await),
            DefaultServerCommand::NAME => {
                let (source, rest) = split_sender(args);
                println!("{}", app.default_server.execute(&source, rest).await);
            }
            "servers" => {
                println!("{}", describe(&app.policy.current()));
                println!("{}", list(&app.default_server.suggest()));
            }
            ReloadCommand::NAME => println!("{}", app.reload.execute()),
            other => println!("unknown command '{other}'. {HELP}"),
        }
    }
    Ok(())
}

/// A leading UUID marks the sender as that player; otherwise the console.
fn split_sender<'a, 'b>(args: &'a [&'b str]) -> (CommandSource, &'a [&'b str]) {
    match args.split_first() {
        Some((first, rest)) => match first.parse::<PlayerId>() {
            Ok(player_id) => (CommandSource::Player(player_id), rest),
            Err(_) => (CommandSource::Console, args),
        },
        None => (CommandSource::Console, args),
    }
}

async fn login(app: &App, args: &[&str]) -> String {
    let (player, proxy_default) = match args {
        [player] => (*player, None),
        [player, proxy_default] => (*player, Some(*proxy_default)),
        _ => return "Usage: login <uuid> [proxy-default]".to_string(),
    };
    let player_id = match player.parse::<PlayerId>() {
        Ok(id) => id,
        Err(e) => return e.to_string(),
    };
    let proxy_default = match proxy_default.map(ServerName::new).transpose() {
        Ok(server) => server,
        Err(e) => return e.to_string(),
    };

    let mut event = ChooseInitialServer::new(player_id, proxy_default);
    app.hooks.on_choose_initial_server(&mut event).await;
    let follow_up = app.hooks.on_post_login(&player_id).await;

    let placed = event
        .initial_server
        .map(|s| s.to_string())
        .unwrap_or_else(|| "<proxy default>".to_string());
    match follow_up {
        Some(request) => format!("{player_id} -> {placed} (then connect to {})", request.target),
        None => format!("{player_id} -> {placed}"),
    }
}

pub(crate) fn list(servers: &[ServerName]) -> String {
    if servers.is_empty() {
        "no servers are allowed".to_string()
    } else {
        servers
            .iter()
            .map(ServerName::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One line on where the active policy came from and when.
pub(crate) fn describe(snapshot: &PolicySnapshot) -> String {
    let at = snapshot.loaded_at().format("%Y-%m-%d %H:%M:%S UTC");
    match snapshot.origin() {
        SnapshotOrigin::Initial => format!("policy not loaded yet ({at})"),
        SnapshotOrigin::Loaded { source } => format!("policy from {source}, loaded {at}"),
        SnapshotOrigin::FailSafe { source, reason } => {
            format!("policy from {source} could not be loaded at {at}, allowing nothing: {reason}")
        }
    }
}
