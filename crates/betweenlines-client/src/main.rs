use anyhow::Context;
use betweenlines_client::cli::{Cli, Commands, HistoryCommand};
use betweenlines_client::{commands, LetterClient};
use betweenlines_shared::LetterDraft;
use betweenlines_store::{Database, HistoryLedger};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "betweenlines_client=debug,betweenlines_store=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let db = match &cli.db {
        Some(path) => Database::open_at(path),
        None => Database::new(),
    }
    .context("Failed to open local history database")?;
    let ledger = HistoryLedger::new(db);
    let client = LetterClient::new(&cli.server)?;

    match cli.command {
        Commands::Send {
            body,
            title,
            to,
            envelope,
            theme,
            music,
            audio,
        } => {
            let draft = LetterDraft {
                title,
                body: Some(body),
                recipient_name: to,
                envelope_theme: envelope,
                letter_theme: theme,
                music_url: music,
            };
            let created = commands::send(&client, &ledger, draft, audio.as_deref()).await?;
            println!("{}", created.url);
        }

        Commands::Read {
            letter,
            mark_opened,
        } => match commands::read(&client, &letter, mark_opened).await? {
            Some(letter) => println!("{}", commands::render_letter(&letter)),
            None => anyhow::bail!("Letter not found: {letter}"),
        },

        Commands::History { action } => match action.unwrap_or(HistoryCommand::List) {
            HistoryCommand::List => println!("{}", commands::render_history(&ledger.list())),
            HistoryCommand::Delete { id } => ledger.delete(&id),
            HistoryCommand::Clear => ledger.clear(),
            HistoryCommand::Count => println!("{}", ledger.count()),
        },
    }

    Ok(())
}
