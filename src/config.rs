use crate::llm::LlmSettings;
use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Key looked up in the secrets file and the environment.
pub const CREDENTIAL_KEY: &str = "GOOGLE_API_KEY";

/// Secondary environment variable accepted for the credential.
pub const FALLBACK_CREDENTIAL_ENV: &str = "LLM_API_KEY";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Secrets file holding GOOGLE_API_KEY
    #[arg(long, env = "SECRETS_FILE")]
    pub secrets: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub upload: UploadConfig,
    pub secrets: SecretsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub max_files: usize,
    pub max_file_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretsConfig {
    pub path: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 8501)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.request_timeout_secs", 600)?
            .set_default("llm.base_url", "https://generativelanguage.googleapis.com")?
            .set_default("llm.model", "gemini-2.5-pro")?
            .set_default("llm.timeout_secs", 300)?
            .set_default("upload.max_files", 10)?
            .set_default("upload.max_file_size", 50 * 1024 * 1024)?
            .set_default("secrets.path", ".streamlit/secrets.toml")?;

        // 2. Config file: explicit path must exist, ./config.* is optional
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // 3. Environment variables prefixed with PDFA_, e.g. PDFA_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("PDFA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags (and their clap env fallbacks) win
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(secrets) = cli.secrets {
            builder = builder.set_override("secrets.path", secrets)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Model settings for this configuration and the resolved credential.
    #[must_use]
    pub fn llm_settings(&self, api_key: Option<Credential>) -> LlmSettings {
        let mut settings = LlmSettings::new(&self.llm.base_url, &self.llm.model, api_key);
        settings.request_timeout = Duration::from_secs(self.llm.timeout_secs);
        settings
    }
}

/// An API key. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for request headers only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Wrap `value` unless it is blank.
    fn non_blank(value: String) -> Option<Self> {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Where the credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    SecretsFile,
    Environment,
}

/// Whether the model API can be reached, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    CredentialConfigured,
    CredentialAbsent,
}

impl SystemStatus {
    pub fn from_credential(credential: Option<&Credential>) -> Self {
        if credential.is_some() {
            Self::CredentialConfigured
        } else {
            Self::CredentialAbsent
        }
    }

    pub fn is_configured(self) -> bool {
        matches!(self, Self::CredentialConfigured)
    }
}

/// Resolve the credential: secrets file first, then the environment.
///
/// Absence is not an error. An unreadable secrets file is logged and skipped.
pub fn resolve_credential(secrets_path: &Path) -> Option<(Credential, CredentialSource)> {
    match read_secrets_file(secrets_path) {
        Ok(Some(key)) => return Some((key, CredentialSource::SecretsFile)),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(
                path = %secrets_path.display(),
                error = %e,
                "Ignoring unreadable secrets file"
            );
        }
    }

    [CREDENTIAL_KEY, FALLBACK_CREDENTIAL_ENV]
        .iter()
        .find_map(|name| std::env::var(name).ok().and_then(Credential::non_blank))
        .map(|key| (key, CredentialSource::Environment))
}

/// Look up [`CREDENTIAL_KEY`] in a TOML secrets file, if the file exists.
pub fn read_secrets_file(path: &Path) -> Result<Option<Credential>, config::ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let secrets = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml))
        .build()?;

    // Older `config` releases lowercase keys on load.
    let value = secrets
        .get_string(CREDENTIAL_KEY)
        .or_else(|_| secrets.get_string(&CREDENTIAL_KEY.to_lowercase()))
        .ok();

    Ok(value.and_then(Credential::non_blank))
}
