//! tracksync CLI - page through GitHub repositories, pull requests and
//! issues one resumable step at a time.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;
use tracksync::{IssueState, NewIssue, ResourceKind};

use crate::commands::shared::{FilterArgs, OutputFormat, parse_state};

#[derive(Parser)]
#[command(name = "tracksync")]
#[command(version)]
#[command(about = "Resumable sync of GitHub repositories, pull requests and issues")]
#[command(
    long_about = "tracksync fetches GitHub list endpoints one page per step. Each step \
prints its rows together with an opaque continuation token; pass the token back \
to fetch the next page, from any machine, at any later time."
)]
#[command(after_long_help = r#"EXAMPLES
    Fetch the first page of open issues:
        $ tracksync step issues https://github.com/acme/widgets

    Fetch the next page using the token printed by the previous step:
        $ tracksync step issues --continuation 'https://api.github.com/repositories/1/issues?page=2'

    Fetch every closed pull request against main:
        $ tracksync sync pulls https://github.com/acme/widgets --state closed --base main

    Find one of your repositories:
        $ tracksync repos search widg

    Close an issue:
        $ tracksync issue update https://github.com/acme/widgets 42 --state closed

CONFIGURATION
    tracksync reads configuration from:
      1. ~/.config/tracksync/config.toml (or $XDG_CONFIG_HOME/tracksync/config.toml)
      2. ./tracksync.toml
      3. Environment variables (TRACKSYNC_* prefix)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    TRACKSYNC_GITHUB_TOKEN       GitHub personal access token
    TRACKSYNC_GITHUB_API_URL     API base (default: https://api.github.com)
    TRACKSYNC_GITHUB_WEB_HOST    Host of repository URLs (default: github.com)
    RUST_LOG                     Log filter (default: tracksync=info,tracksync_cli=info)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch exactly one page and print it with its continuation token
    Step {
        /// Resource to list: repos, pulls or issues
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Repository URL (required for pulls and issues on the first step)
        repo_url: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Token printed by the previous step; repository and filters are ignored
        #[arg(short, long)]
        continuation: Option<String>,
    },
    /// Fetch every page, retrying rate limits and transient failures
    Sync {
        /// Resource to list: repos, pulls or issues
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Repository URL (required for pulls and issues)
        repo_url: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output format (default: table on a terminal, JSON otherwise)
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },
    /// Repository lookup
    Repos {
        #[command(subcommand)]
        action: ReposAction,
    },
    /// Create or update issues
    Issue {
        #[command(subcommand)]
        action: IssueAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ReposAction {
    /// Search your repositories by owner/name (case-insensitive substring)
    Search {
        /// Text to look for; empty lists everything
        #[arg(default_value = "")]
        text: String,

        /// Output format (default: table on a terminal, JSON otherwise)
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },
}

#[derive(Subcommand)]
enum IssueAction {
    /// Open a new issue
    Create {
        /// Repository URL
        repo_url: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        body: Option<String>,

        /// Label to apply (repeatable)
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// Login to assign (repeatable)
        #[arg(short, long = "assignee")]
        assignees: Vec<String>,

        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },
    /// Change an existing issue; only the given fields are sent
    Update {
        /// Repository URL
        repo_url: String,

        /// Issue number
        number: u64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        body: Option<String>,

        /// open or closed
        #[arg(short, long, value_parser = parse_state)]
        state: Option<IssueState>,

        /// Replace labels with these (repeatable)
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// Remove every label
        #[arg(long, conflicts_with = "labels")]
        clear_labels: bool,

        /// Replace assignees with these (repeatable)
        #[arg(short, long = "assignee")]
        assignees: Vec<String>,

        /// Remove every assignee
        #[arg(long, conflicts_with = "assignees")]
        clear_assignees: bool,

        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },
}

fn parse_kind(s: &str) -> Result<ResourceKind, String> {
    s.parse().map_err(|e: tracksync::SyncError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable.
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("tracksync=info,tracksync_cli=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(Term::stderr().is_term())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        _ => {}
    }

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    match cli.command {
        Commands::Step {
            kind,
            repo_url,
            filters,
            continuation,
        } => {
            commands::step::handle_step(kind, repo_url, filters, continuation, &config).await?;
        }
        Commands::Sync {
            kind,
            repo_url,
            filters,
            output,
        } => {
            commands::sync::handle_sync(kind, repo_url, filters, output, &config).await?;
        }
        Commands::Repos {
            action: ReposAction::Search { text, output },
        } => {
            commands::repos::handle_search(&text, output, &config).await?;
        }
        Commands::Issue { action } => match action {
            IssueAction::Create {
                repo_url,
                title,
                body,
                labels,
                assignees,
                output,
            } => {
                let issue = NewIssue {
                    title,
                    body,
                    labels,
                    assignees,
                };
                commands::issue::handle_create(&repo_url, issue, output, &config).await?;
            }
            IssueAction::Update {
                repo_url,
                number,
                title,
                body,
                state,
                labels,
                clear_labels,
                assignees,
                clear_assignees,
                output,
            } => {
                let update = commands::issue::build_update(
                    title,
                    body,
                    state,
                    labels,
                    clear_labels,
                    assignees,
                    clear_assignees,
                );
                commands::issue::handle_update(&repo_url, number, update, output, &config)
                    .await?;
            }
        },
        Commands::Completions { .. } | Commands::Man { .. } => {}
    }

    Ok(())
}
