use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, info};

use scrumwatch_agent::{IntentExtractor, OpenRouterClient, ScrumBoardAgent};
use scrumwatch_core::config::{AppConfig, ConfigError, LoadOptions};
use scrumwatch_devops::AzureDevOpsClient;
use scrumwatch_notify::TeamsWebhook;

pub struct Application {
    pub config: AppConfig,
    pub agent: ScrumBoardAgent,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub fn load_config(options: LoadOptions) -> Result<AppConfig, BootstrapError> {
    Ok(AppConfig::load(options)?)
}

/// Wires the remote clients from an already loaded configuration.
pub fn bootstrap_with_config(config: AppConfig) -> Application {
    debug!(
        event_name = "system.bootstrap.credentials",
        organization = %config.devops.organization,
        project = %config.devops.project,
        devops_credentials = config.devops.has_credentials(),
        devops_pat = secret_state(Some(&config.devops.personal_access_token)),
        llm_api_key = secret_state(config.llm.api_key.as_ref()),
        webhook = if config.notify.webhook_url.is_some() { "set" } else { "missing" },
        "resolved integration settings"
    );

    let agent = ScrumBoardAgent::new(
        Arc::new(AzureDevOpsClient::new(&config.devops)),
        Arc::new(IntentExtractor::new(OpenRouterClient::new(&config.llm))),
        Arc::new(TeamsWebhook::new(&config.notify)),
    );

    info!(
        event_name = "system.bootstrap.ready",
        model = %config.llm.model,
        overdue_days = config.devops.overdue_days,
        "agent wired"
    );

    Application { config, agent }
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    Ok(bootstrap_with_config(load_config(options)?))
}

fn secret_state(secret: Option<&SecretString>) -> &'static str {
    match secret {
        Some(value) if !value.expose_secret().trim().is_empty() => "set",
        _ => "missing",
    }
}
