mod cli;
mod context;
mod handlers;
mod output;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, UserAction};
use context::CliContext;
use taskboard_core::{logging::init_tracing, AppConfig};

#[tokio::main]
async fn main() {
    let debug_log = std::env::var_os("TASKBOARD_DEBUG_LOG").map(PathBuf::from);
    if let Err(e) = init_tracing(debug_log.as_deref()) {
        eprintln!("Could not open debug log: {}", e);
    }

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::debug!("Command failed: {:?}", e);
        output::output_error(&e.to_string());
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "taskboard",
                &mut std::io::stdout(),
            );
            return Ok(());
        }
        other => other,
    };

    let config = AppConfig::load();
    let file_path = cli
        .file
        .or_else(|| config.default_file.clone())
        .ok_or_else(|| anyhow::anyhow!("--file is required (or set TASKBOARD_FILE)"))?;
    let ctx = CliContext::load(&file_path, &config).await?;
    let actor = cli.actor.as_deref();

    match command {
        Commands::User(user_cmd) => match user_cmd.action {
            UserAction::Register { name, email, role } => {
                handlers::user::handle_register(&ctx, name, email, role).await?;
            }
            UserAction::List => {
                ctx.actor(actor).await?;
                handlers::user::handle_list(&ctx).await?;
            }
        },
        Commands::Board(board_cmd) => {
            let actor = ctx.actor(actor).await?;
            handlers::board::handle(&ctx, &actor, board_cmd.action).await?;
        }
        Commands::Column(column_cmd) => {
            let actor = ctx.actor(actor).await?;
            handlers::column::handle(&ctx, &actor, column_cmd.action).await?;
        }
        Commands::Ticket(ticket_cmd) => {
            let actor = ctx.actor(actor).await?;
            handlers::ticket::handle(&ctx, &actor, ticket_cmd.action).await?;
        }
        Commands::Comment(comment_cmd) => {
            let actor = ctx.actor(actor).await?;
            handlers::comment::handle(&ctx, &actor, comment_cmd.action).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
