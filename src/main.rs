use clap::Parser;
use dotenv::dotenv;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use jira_summarizer::{
    Auth, Coordinator, DEFAULT_MAX_PARALLEL, DEFAULT_TIMEOUT, DateWindow, Error, IssueSource, JiraClient,
    JiraConfig, OutputFormat, Result, SummarizerConfig, render,
};

/// Summarize Jira status transitions and comments per user and day.
#[derive(Parser, Debug)]
#[command(name = "jira-summarizer", version)]
struct Cli {
    /// If set, print the Jira account ID for this email and exit
    #[arg(long = "get-id", value_name = "EMAIL")]
    get_id: Option<String>,

    /// Users (emails or account IDs, separated by ',') to search for
    #[arg(long, env = "JIRA_USERS", default_value = "")]
    users: String,

    /// Email username for the Jira server (basic auth)
    #[arg(long, env = "JIRA_EMAIL")]
    email: Option<String>,

    /// URL of the Jira server
    #[arg(long, env = "JIRA_URL")]
    url: String,

    /// Jira API token (basic auth)
    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Bearer token; takes precedence over email and API token
    #[arg(long, env = "JIRA_BEARER_TOKEN", hide_env_values = true)]
    bearer_token: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Start of the date range (MM/DD/YYYY)
    #[arg(long)]
    start: Option<String>,

    /// End of the date range (MM/DD/YYYY)
    #[arg(long)]
    end: Option<String>,

    /// Output template: slack or json
    #[arg(long, default_value_t = OutputFormat::Slack)]
    template: OutputFormat,

    /// Maximum number of users processed concurrently
    #[arg(long, default_value_t = DEFAULT_MAX_PARALLEL)]
    max_parallel: usize,
}

/// カンマ区切りのユーザー一覧を分割（空要素は除く）
fn parse_users(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .map(str::to_string)
        .collect()
}

fn required<'a>(value: &'a Option<String>, flag: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("--{} cannot be empty", flag)))
}

/// フラグ（または対応する環境変数）から接続設定を組み立てる
fn build_config(cli: &Cli) -> Result<JiraConfig> {
    let auth = match cli.bearer_token.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(token) => Auth::Bearer {
            token: token.to_string(),
        },
        None => Auth::Basic {
            username: required(&cli.email, "email")?.to_string(),
            api_token: required(&cli.api_token, "api-token")?.to_string(),
        },
    };

    Ok(JiraConfig::new(cli.url.as_str(), auth)?.with_timeout(Duration::from_secs(cli.timeout_secs)))
}

async fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    let client = Arc::new(JiraClient::new(config)?);

    if let Some(email) = cli.get_id.as_deref() {
        let account_id = client.resolve_account_id(email).await?;
        println!("User: '{}' has Jira account ID: '{}'", email, account_id);
        return Ok(());
    }

    let window = DateWindow::from_input_dates(required(&cli.start, "start")?, required(&cli.end, "end")?)?;
    let users = parse_users(&cli.users);
    if users.is_empty() {
        return Err(Error::InvalidInput("no users were passed in input".to_string()));
    }

    let coordinator = Coordinator::new(client, SummarizerConfig::new().max_parallel(cli.max_parallel));
    let summaries = coordinator.aggregate_for_users(&window, &users).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&mut out, cli.template, &summaries)?;
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
