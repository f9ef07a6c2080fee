use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use tako_dashboard::access::{self, Unlock};
use tako_dashboard::api::AccessRequest;
use tako_dashboard::render::{render_board, render_filters};
use tako_dashboard::{Config, Dashboard, FilterField, HttpTaskService, TaskService, TaskView};

#[derive(Parser)]
#[command(name = "tako")]
#[command(about = "Tako Tasks dashboard client", long_about = None)]
struct Cli {
    /// Task service base URL (overrides TAKO_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request an early-access key by email
    RequestAccess {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        team_size: String,
    },
    /// Verify an unlock key and print the Slack install URL
    Unlock { key: String },
    /// Sign in to a workspace and print its tasks
    Tasks {
        /// Slack team id, e.g. T012345
        #[arg(long)]
        workspace: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Interactive dashboard that reloads as filters change
    Watch {
        #[arg(long)]
        workspace: String,
    },
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    priority: Option<String>,
    #[arg(long)]
    assignee: Option<String>,
    #[arg(long)]
    search: Option<String>,
}

impl FilterArgs {
    fn into_pairs(self) -> Vec<(FilterField, String)> {
        [
            (FilterField::Status, self.status),
            (FilterField::Priority, self.priority),
            (FilterField::Assignee, self.assignee),
            (FilterField::Search, self.search),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout is the dashboard itself.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url)?;
    }
    tracing::debug!("Using task service at {}", config.api_url);

    let api: Arc<dyn TaskService> = Arc::new(HttpTaskService::new(config.clone())?);

    let succeeded = match cli.command {
        Commands::RequestAccess {
            name,
            email,
            company,
            team_size,
        } => {
            let profile = AccessRequest {
                name,
                email,
                company,
                team_size,
            };
            let outcome = access::request_access(api.as_ref(), &profile).await;
            println!("{}", outcome.status);
            outcome.succeeded
        }
        Commands::Unlock { key } => {
            let mut unlock = Unlock::new();
            let verified = unlock.verify(api.as_ref(), &key).await;
            if let Some(status) = unlock.status() {
                println!("{}", status);
            }
            if let Some(url) = unlock.install_url() {
                println!("Install Tako Tasks to Slack: {}", url);
            }
            verified
        }
        Commands::Tasks { workspace, filters } => {
            show_tasks(api, &config, &workspace, filters.into_pairs()).await
        }
        Commands::Watch { workspace } => watch(api, &config, &workspace).await?,
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

async fn show_tasks(
    api: Arc<dyn TaskService>,
    config: &Config,
    workspace: &str,
    filters: Vec<(FilterField, String)>,
) -> bool {
    let mut dashboard = Dashboard::new(api, config);
    for (field, value) in filters {
        dashboard.set_filter(field, value);
    }

    if !dashboard.login(workspace).await {
        eprintln!("{}", dashboard.session().error().unwrap_or("Login failed"));
        return false;
    }

    let view = dashboard.settled_view().await;
    println!("{}", render_filters(&dashboard.filters()));
    println!();
    println!("{}", render_board(true, &view));
    view.error.is_none()
}

#[derive(Debug, PartialEq, Eq)]
enum WatchCommand {
    Set(FilterField, String),
    Clear(FilterField),
    Reset,
    Refresh,
    Help,
    Quit,
}

fn parse_watch_command(line: &str) -> Result<WatchCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "reset" => Ok(WatchCommand::Reset),
        "refresh" | "r" => Ok(WatchCommand::Refresh),
        "help" | "?" | "" => Ok(WatchCommand::Help),
        "quit" | "exit" | "q" => Ok(WatchCommand::Quit),
        "clear" => rest
            .parse::<FilterField>()
            .map(WatchCommand::Clear)
            .map_err(|e| e.to_string()),
        field => field
            .parse::<FilterField>()
            .map(|f| WatchCommand::Set(f, rest.to_string()))
            .map_err(|e| e.to_string()),
    }
}

const WATCH_HELP: &str = "Commands: <status|priority|assignee|search> <value>, \
                          clear <field>, reset, refresh, help, quit";

fn redraw(dashboard: &Dashboard, view: &TaskView) {
    println!("────────────────────────────────────────");
    println!("{}", render_filters(&dashboard.filters()));
    println!();
    println!("{}", render_board(dashboard.session().is_authenticated(), view));
}

async fn watch(api: Arc<dyn TaskService>, config: &Config, workspace: &str) -> Result<bool> {
    let mut dashboard = Dashboard::new(api, config);
    if !dashboard.login(workspace).await {
        eprintln!("{}", dashboard.session().error().unwrap_or("Login failed"));
        return Ok(false);
    }

    let mut views = dashboard.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", WATCH_HELP);

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if !view.loading {
                    redraw(&dashboard, &view);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match parse_watch_command(&line) {
                    Ok(WatchCommand::Set(field, value)) => {
                        dashboard.set_filter(field, value);
                    }
                    Ok(WatchCommand::Clear(field)) => {
                        dashboard.set_filter(field, "");
                    }
                    Ok(WatchCommand::Reset) => {
                        dashboard.reset_filters();
                    }
                    Ok(WatchCommand::Refresh) => dashboard.refresh(),
                    Ok(WatchCommand::Help) => println!("{}", WATCH_HELP),
                    Ok(WatchCommand::Quit) => break,
                    Err(message) => eprintln!("{}", message),
                }
            }
        }
    }

    Ok(true)
}
