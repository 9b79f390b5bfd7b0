use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DEVOPS_BASE_URL: &str = "https://dev.azure.com";
pub const DEFAULT_LLM_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "deepseek/deepseek-r1:free";

const MAX_OVERDUE_DAYS: u32 = 3650;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub devops: DevOpsConfig,
    pub llm: LlmConfig,
    pub notify: NotifyConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DevOpsConfig {
    pub organization: String,
    pub project: String,
    pub personal_access_token: SecretString,
    pub base_url: String,
    pub api_version: String,
    pub work_item_type: String,
    pub done_state: String,
    pub overdue_days: u32,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub api_url: String,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub llm_model: Option<String>,
    pub webhook_url: Option<String>,
    pub overdue_days: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            devops: DevOpsConfig {
                organization: String::new(),
                project: String::new(),
                personal_access_token: String::new().into(),
                base_url: DEFAULT_DEVOPS_BASE_URL.to_string(),
                api_version: "7.1".to_string(),
                work_item_type: "Task".to_string(),
                done_state: "Done".to_string(),
                overdue_days: 10,
            },
            llm: LlmConfig {
                api_key: None,
                api_url: DEFAULT_LLM_API_URL.to_string(),
                model: DEFAULT_LLM_MODEL.to_string(),
            },
            notify: NotifyConfig { webhook_url: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("scrumwatch.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.logging.level = normalize_level(&config.logging.level);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(devops) = patch.devops {
            if let Some(organization) = devops.organization {
                self.devops.organization = organization;
            }
            if let Some(project) = devops.project {
                self.devops.project = project;
            }
            if let Some(pat_value) = devops.personal_access_token {
                self.devops.personal_access_token = secret_value(pat_value);
            }
            if let Some(base_url) = devops.base_url {
                self.devops.base_url = base_url;
            }
            if let Some(api_version) = devops.api_version {
                self.devops.api_version = api_version;
            }
            if let Some(work_item_type) = devops.work_item_type {
                self.devops.work_item_type = work_item_type;
            }
            if let Some(done_state) = devops.done_state {
                self.devops.done_state = done_state;
            }
            if let Some(overdue_days) = devops.overdue_days {
                self.devops.overdue_days = overdue_days;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(api_key_value));
            }
            if let Some(api_url) = llm.api_url {
                self.llm.api_url = api_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
        }

        if let Some(notify) = patch.notify {
            if let Some(webhook_url) = notify.webhook_url {
                self.notify.webhook_url = Some(webhook_url);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("AZURE_DEVOPS_ORG") {
            self.devops.organization = value;
        }
        if let Some(value) = read_env("AZURE_DEVOPS_PROJECT") {
            self.devops.project = value;
        }
        if let Some(value) = read_env("AZURE_DEVOPS_PAT") {
            self.devops.personal_access_token = secret_value(value);
        }
        if let Some(value) = read_env("AZURE_DEVOPS_BASE_URL") {
            self.devops.base_url = value;
        }
        if let Some(value) = read_env("SCRUMWATCH_OVERDUE_DAYS") {
            self.devops.overdue_days = parse_u32("SCRUMWATCH_OVERDUE_DAYS", &value)?;
        }

        if let Some(value) = read_env("OPENROUTER_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("OPENROUTER_API_URL") {
            self.llm.api_url = value;
        }
        if let Some(value) = read_env("OPENROUTER_MODEL") {
            self.llm.model = value;
        }

        if let Some(value) = read_env("TEAMS_WEBHOOK") {
            self.notify.webhook_url = Some(value);
        }

        if let Some(value) = read_env("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(webhook_url) = overrides.webhook_url {
            self.notify.webhook_url = Some(webhook_url);
        }
        if let Some(overdue_days) = overrides.overdue_days {
            self.devops.overdue_days = overdue_days;
        }
    }

    /// Checks value formats only. Absent credentials are left to fail at call
    /// time as authentication errors from the remote services.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_devops(&self.devops)?;
        validate_llm(&self.llm)?;
        validate_notify(&self.notify)?;
        Ok(())
    }
}

impl DevOpsConfig {
    pub fn has_credentials(&self) -> bool {
        !self.organization.trim().is_empty()
            && !self.project.trim().is_empty()
            && !self.personal_access_token.expose_secret().trim().is_empty()
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("scrumwatch.toml"), PathBuf::from("config/scrumwatch.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_devops(devops: &DevOpsConfig) -> Result<(), ConfigError> {
    if !is_http_url(&devops.base_url) {
        return Err(ConfigError::Validation(
            "devops.base_url must start with http:// or https://".to_string(),
        ));
    }

    if devops.api_version.trim().is_empty() {
        return Err(ConfigError::Validation("devops.api_version must not be empty".to_string()));
    }

    if devops.work_item_type.trim().is_empty() || devops.done_state.trim().is_empty() {
        return Err(ConfigError::Validation(
            "devops.work_item_type and devops.done_state must not be empty".to_string(),
        ));
    }

    // Both values are spliced into a WIQL string literal.
    if devops.work_item_type.contains('\'') || devops.done_state.contains('\'') {
        return Err(ConfigError::Validation(
            "devops.work_item_type and devops.done_state must not contain `'`".to_string(),
        ));
    }

    if devops.overdue_days > MAX_OVERDUE_DAYS {
        return Err(ConfigError::Validation(format!(
            "devops.overdue_days must be in range 0..={MAX_OVERDUE_DAYS}"
        )));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if !is_http_url(&llm.api_url) {
        return Err(ConfigError::Validation(
            "llm.api_url must start with http:// or https://".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    Ok(())
}

fn validate_notify(notify: &NotifyConfig) -> Result<(), ConfigError> {
    if let Some(webhook_url) = &notify.webhook_url {
        if !webhook_url.trim().is_empty() && !is_http_url(webhook_url) {
            return Err(ConfigError::Validation(
                "notify.webhook_url must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(())
}

/// Lowercases the level and folds the `WARNING`/`CRITICAL` spellings into the
/// tracing level names. Unrecognized names pass through; the logger falls back
/// to `info` for them.
fn normalize_level(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    match level.as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        _ => level,
    }
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("http://") || value.starts_with("https://")
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    devops: Option<DevOpsPatch>,
    llm: Option<LlmPatch>,
    notify: Option<NotifyPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DevOpsPatch {
    organization: Option<String>,
    project: Option<String>,
    personal_access_token: Option<String>,
    base_url: Option<String>,
    api_version: Option<String>,
    work_item_type: Option<String>,
    done_state: Option<String>,
    overdue_days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    api_url: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NotifyPatch {
    webhook_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
