//! confsync - keep a conference schedule in sync and browse it offline.
//!
//! A thin front end over `confsync-core`: every command builds one
//! `ScheduleManager` from the saved configuration and prints what it finds.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use confsync_core::dates::age_display;
use confsync_core::{Config, Conference, ScheduleManager, SyncFailure, SyncOutcome, Votes};

#[derive(Parser)]
#[command(name = "confsync", version, about = "Conference schedule sync and offline cache")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the schedule if it is due (or always, with --force)
    Refresh {
        #[arg(long)]
        force: bool,
    },
    /// Show the data source and sync bookkeeping
    Status,
    /// List the conferences in the cached schedule
    Conferences,
    /// List the events of a conference
    Schedule {
        /// Conference index, as shown by `conferences`
        #[arg(long, default_value_t = 0)]
        conference: usize,
    },
    /// Mark or unmark an event as favorite
    Favorite {
        conference_id: i64,
        event_id: i64,
        #[arg(long)]
        remove: bool,
    },
    /// Manage locally stored votes
    Votes {
        #[command(subcommand)]
        action: VotesCommand,
    },
    /// Update the saved configuration
    Config {
        /// Schedule URL or local file path
        #[arg(long)]
        data_url: Option<String>,
        /// Minimum minutes between network attempts
        #[arg(long)]
        interval: Option<i64>,
    },
}

#[derive(Subcommand)]
enum VotesCommand {
    /// Merge votes from a JSON file keyed by vote key
    Import { file: PathBuf },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _guard = init_tracing();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Command::Config { data_url, interval } => update_config(config, data_url, interval),
        command => {
            let manager = ScheduleManager::from_config(&config)?;
            run(command, &manager, &config).await
        }
    }
}

async fn run(command: Command, manager: &ScheduleManager, config: &Config) -> Result<()> {
    match command {
        Command::Refresh { force } => refresh(manager, force).await,
        Command::Status => status(manager, config),
        Command::Conferences => {
            list_conferences(manager);
            Ok(())
        }
        Command::Schedule { conference } => {
            manager.select_conference(conference);
            match manager.current_conference() {
                Some(conference) => {
                    print_schedule(manager, &conference);
                    Ok(())
                }
                None => bail!(
                    "No conference at index {} - run `confsync refresh` or `confsync conferences`",
                    conference
                ),
            }
        }
        Command::Favorite {
            conference_id,
            event_id,
            remove,
        } => {
            manager.toggle_favorite(conference_id, event_id, remove)?;
            let state = if manager.is_favorited(conference_id, event_id) {
                "favorited"
            } else {
                "not favorited"
            };
            let title = manager
                .current_dataset()
                .and_then(|dataset| {
                    let conference = dataset.conference_by_id(conference_id)?;
                    conference.event(event_id).map(|event| event.title.clone())
                })
                .unwrap_or_else(|| format!("Event {}", event_id));
            println!("{} in conference {} is {}", title, conference_id, state);
            Ok(())
        }
        Command::Votes {
            action: VotesCommand::Import { file },
        } => import_votes(manager, &file),
        Command::Config { data_url, interval } => update_config(config.clone(), data_url, interval),
    }
}

async fn refresh(manager: &ScheduleManager, force: bool) -> Result<()> {
    info!(force, "Refreshing schedule");
    let outcome = manager.refresh(force).await;
    println!("{}", outcome);

    let SyncOutcome::Failed(failure) = outcome else {
        return Ok(());
    };
    if let SyncFailure::Transport(ref e) = failure {
        if e.is_retryable() {
            println!("The server could not be reached right now, try again later");
        }
    }
    if manager.current_dataset().is_none() {
        bail!("No schedule available: {}", failure);
    }
    Ok(())
}

fn parse_votes(contents: &str) -> Result<Votes> {
    serde_json::from_str(contents).context("Votes file is not a JSON object of votes")
}

fn import_votes(manager: &ScheduleManager, file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read votes file: {}", file.display()))?;
    let votes = parse_votes(&contents)?;
    let imported = votes.len();
    let total = manager.import_votes(votes)?;
    println!("Imported {} votes ({} stored)", imported, total);
    Ok(())
}

fn status(manager: &ScheduleManager, config: &Config) -> Result<()> {
    let now = Utc::now();
    let state = manager.sync_state();

    match manager.locator() {
        Some(url) => println!("Source:         {}", url),
        None => println!("Source:         (not configured)"),
    }
    println!(
        "Last attempt:   {}",
        state
            .last_attempt
            .map(|t| age_display(t, now))
            .unwrap_or_else(|| "never".to_string())
    );
    println!(
        "Last modified:  {}",
        state
            .last_modified
            .map(|t| t.to_rfc2822())
            .unwrap_or_else(|| "unknown".to_string())
    );

    let age = manager
        .dataset_saved_at()
        .map(|t| age_display(t, now))
        .unwrap_or_else(|| "never".to_string());
    match manager.current_dataset() {
        Some(dataset) => println!("Cached data:    {} conferences, saved {}", dataset.len(), age),
        None => println!("Cached data:    none"),
    }
    println!("Min interval:   {}m", config.freshness_policy().min_interval().num_minutes());
    Ok(())
}

fn list_conferences(manager: &ScheduleManager) {
    let Some(dataset) = manager.current_dataset() else {
        println!("No cached schedule - run `confsync refresh`");
        return;
    };
    for (index, conference) in dataset.conferences.iter().enumerate() {
        let favorites = manager.favorites_for(conference.id()).len();
        println!(
            "[{}] {} (id {}, {} events, {} favorites)",
            index,
            conference.info.display_name(),
            conference.id(),
            conference.schedule.len(),
            favorites
        );
    }
}

fn print_schedule(manager: &ScheduleManager, conference: &Conference) {
    let now = Utc::now();
    println!("{}", conference.info.display_name());

    for event in &conference.schedule {
        let time = event
            .starts_at()
            .map(|t| t.format("%a %H:%M").to_string())
            .unwrap_or_else(|| "TBD".to_string());
        let favorite = if manager.is_favorited(conference.id(), event.id) {
            "*"
        } else {
            " "
        };
        let mut line = format!("{} {:>9}  {:>5}  {}", favorite, time, event.id, event.title);

        if let Some(ref track) = event.track {
            line.push_str(&format!(" [{}]", track.name));
        }
        if let Some(ref location) = event.location {
            line.push_str(&format!(" @ {}", location.name));
        }
        if !event.speakers.is_empty() {
            line.push_str(&format!(" - {}", event.speaker_names()));
        }
        if event.is_active_at(now) {
            line.push_str(" (now)");
        }
        match manager.lookup_vote(conference.id(), event.id) {
            Some(vote) => {
                if let Some(vote_type) = vote.vote_type() {
                    line.push_str(&format!(" (voted: {})", vote_type));
                }
            }
            None if event.is_votable_at(now) => line.push_str(" (vote open)"),
            None => {}
        }
        println!("{}", line);
    }
}

fn update_config(mut config: Config, data_url: Option<String>, interval: Option<i64>) -> Result<()> {
    if let Some(url) = data_url {
        config.data_url = Some(url);
    }
    if let Some(minutes) = interval {
        if minutes < 0 {
            bail!("Interval must not be negative");
        }
        config.min_fetch_interval_minutes = minutes;
    }
    config.save()?;

    match config.locator() {
        Some(url) => println!("Schedule source: {}", url),
        None => println!("Schedule source is not configured or cannot be resolved"),
    }
    println!("Minimum interval: {}m", config.min_fetch_interval_minutes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::try_parse_from(["confsync", "refresh", "--force"]).unwrap();
        assert!(matches!(cli.command, Command::Refresh { force: true }));

        let cli = Cli::try_parse_from(["confsync", "favorite", "7", "12", "--remove"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Favorite {
                conference_id: 7,
                event_id: 12,
                remove: true
            }
        ));

        let cli = Cli::try_parse_from(["confsync", "schedule"]).unwrap();
        assert!(matches!(cli.command, Command::Schedule { conference: 0 }));

        let cli = Cli::try_parse_from(["confsync", "votes", "import", "votes.json"]).unwrap();
        match cli.command {
            Command::Votes {
                action: VotesCommand::Import { file },
            } => assert_eq!(file, PathBuf::from("votes.json")),
            _ => panic!("expected votes import"),
        }
    }

    #[test]
    fn test_parse_votes() {
        let votes = parse_votes(
            r#"{"7-12": {"conferenceId": 7, "talkId": 12, "voteValue": 2, "message": "great"}}"#,
        )
        .unwrap();
        assert_eq!(votes["7-12"].talk_id, 12);

        assert!(parse_votes("[]").is_err());
        assert!(parse_votes(r#"{"7-12": {"talkId": 12}}"#).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["confsync", "sync-everything"]).is_err());
    }
}
