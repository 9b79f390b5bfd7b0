pub mod bootstrap;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use scrumwatch_agent::RunReport;
use scrumwatch_core::config::{ConfigOverrides, LoadOptions};

/// Query used by `--example`.
pub const EXAMPLE_QUERY: &str = "Get top 2 delayed tasks?";

const CONFIG_FAILURE_EXIT_CODE: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "scrumwatch",
    about = "Report overdue work items to a chat webhook",
    long_about = "Checks Azure DevOps for overdue tasks, posts an alert to the configured \
                  Teams webhook, and optionally answers a free-text query about them.",
    after_help = "Examples:\n  scrumwatch\n  scrumwatch \"Get top 3 delayed tasks\"\n  scrumwatch --example"
)]
pub struct Cli {
    #[arg(help = "Free-text query answered after the delayed-task check")]
    pub query: Option<String>,
    #[arg(long, conflicts_with = "query", help = "Answer the built-in example query")]
    pub example: bool,
    #[arg(long, value_name = "PATH", help = "Read settings from this TOML file")]
    pub config: Option<PathBuf>,
    #[arg(long, value_name = "LEVEL", help = "Override the log level (trace|debug|info|warn|error)")]
    pub log_level: Option<String>,
    #[arg(long, value_name = "MODEL", help = "Override the OpenRouter model used for intent extraction")]
    pub model: Option<String>,
    #[arg(long, value_name = "DAYS", help = "Override how many days past target a task counts as delayed")]
    pub overdue_days: Option<u32>,
    #[arg(long, value_name = "URL", help = "Override the Teams webhook URL")]
    pub webhook_url: Option<String>,
}

impl Cli {
    pub fn user_query(&self) -> Option<&str> {
        if self.example {
            Some(EXAMPLE_QUERY)
        } else {
            self.query.as_deref().filter(|query| !query.trim().is_empty())
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                log_level: self.log_level.clone(),
                llm_model: self.model.clone(),
                webhook_url: self.webhook_url.clone(),
                overdue_days: self.overdue_days,
            },
        }
    }
}

pub async fn run() -> ExitCode {
    // A missing .env file is normal outside local development.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match execute(&cli).await {
        Ok(report) => {
            println!("{}", serde_json::to_string(&report).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("scrumwatch: {error:#}");
            ExitCode::from(CONFIG_FAILURE_EXIT_CODE)
        }
    }
}

/// Performs one run. Only configuration problems are returned as errors; every
/// remote failure is absorbed into the report.
pub async fn execute(cli: &Cli) -> anyhow::Result<RunReport> {
    let config = bootstrap::load_config(cli.load_options())?;
    logging::init_logging(&config);

    info!(
        event_name = "system.run.start",
        has_query = cli.user_query().is_some(),
        "starting scrumwatch run"
    );

    let app = bootstrap::bootstrap_with_config(config);
    Ok(app.agent.run(cli.user_query()).await)
}
