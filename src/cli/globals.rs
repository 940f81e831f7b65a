use crate::{
    app_lib::{AppConfig, FileStore, KeyValueStore},
    features::{
        auth::{AccountGateway, AuthOrchestrator, SessionStore},
        profile::ProfileStore,
    },
};
use anyhow::{anyhow, Context, Result};
use std::{path::PathBuf, sync::Arc};
use url::Url;

const STATE_DIR: &str = "chatgate";
const STATE_FILE: &str = "session.json";

/// Arguments shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_base_url: String,
    pub state_file: PathBuf,
    pub timeout: u64,
    pub completion_base_url: String,
    pub completion_model: String,
}

impl GlobalArgs {
    /// Builds the arguments from parsed matches, checking that both base URLs parse.
    ///
    /// # Errors
    /// Returns an error if a URL is invalid or no state file location can be found.
    pub fn from_matches(matches: &clap::ArgMatches) -> Result<Self> {
        let api_base_url = url_arg(matches, crate::cli::commands::ARG_API_URL)?;
        let completion_base_url = url_arg(matches, crate::cli::commands::ARG_COMPLETION_URL)?;

        let state_file = match matches.get_one::<String>(crate::cli::commands::ARG_STATE_FILE) {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_state_file()?,
        };

        Ok(Self {
            api_base_url,
            state_file,
            timeout: matches
                .get_one::<u64>(crate::cli::commands::ARG_TIMEOUT)
                .copied()
                .unwrap_or(10),
            completion_base_url,
            completion_model: matches
                .get_one::<String>(crate::cli::commands::ARG_COMPLETION_MODEL)
                .cloned()
                .unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> AppConfig {
        AppConfig::new()
            .with_api_base_url(&self.api_base_url)
            .with_completion_base_url(&self.completion_base_url)
            .with_completion_model(&self.completion_model)
            .with_timeout_seconds(self.timeout)
            .normalize()
    }

    /// # Errors
    /// Returns an error if the state file exists but cannot be read.
    pub fn open_storage(&self) -> Result<Arc<FileStore>> {
        let store = FileStore::open(&self.state_file)
            .with_context(|| format!("could not open {}", self.state_file.display()))?;
        Ok(Arc::new(store))
    }

    /// Wires the gateway and both stores over the given storage.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn orchestrator(&self, storage: Arc<dyn KeyValueStore>) -> Result<AuthOrchestrator> {
        let gateway = AccountGateway::new(&self.config(), storage)?;
        Ok(AuthOrchestrator::new(
            gateway,
            SessionStore::new(),
            ProfileStore::new(),
        ))
    }
}

fn url_arg(matches: &clap::ArgMatches, name: &str) -> Result<String> {
    let value = matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))?;
    Url::parse(&value).with_context(|| format!("invalid --{name}: {value}"))?;
    Ok(value)
}

fn default_state_file() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join(STATE_DIR).join(STATE_FILE))
        .ok_or_else(|| anyhow!("could not determine a data directory, use --state-file"))
}
