//! Configuration for composer-rs
//!
//! Loaded once at start-up from an optional TOML file plus `COMPOSER_*`
//! environment overrides, validated, then shared read-only.

use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ComposerError, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Editor auth service
    pub auth: AuthConfig,
    /// HTML/JSON conversion service
    pub conversion: ConversionConfig,
    /// SMTP transport; test sends go to the preview mailbox when absent
    pub smtp: Option<SmtpConfig>,
    /// Preview mailbox
    pub preview: PreviewConfig,
    /// Managed editor sessions
    pub sessions: SessionConfig,
    /// Row and template library
    pub library: LibraryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:3001")
    pub listen_addr: String,
    /// Externally reachable base URL, used to build preview links
    pub public_base_url: String,
    /// Timeout applied to every outbound call (auth, conversion, SMTP)
    pub upstream_timeout_seconds: u64,
}

/// Auth service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token endpoint
    pub url: String,
    /// Client identity, never returned to callers
    pub client_id: Option<String>,
    /// Client secret, never returned to callers
    pub client_secret: Option<String>,
    /// User id sent when the caller supplies none
    pub default_uid: String,
}

/// Conversion service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Base URL; `/v1/conversion/...` paths are appended
    pub base_url: String,
    /// Bearer API key
    pub api_key: Option<String>,
}

/// SMTP transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Implicit TLS (usually port 465); opportunistic STARTTLS otherwise
    #[serde(default)]
    pub secure: bool,
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Sender address, defaults to `user`
    pub from: Option<String>,
}

/// Preview mailbox configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Messages kept before the oldest is evicted
    pub capacity: usize,
    /// Sender shown on preview messages
    pub from: String,
}

/// Managed session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Live sessions kept before the oldest is evicted
    pub capacity: usize,
}

/// Library configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// JSON base template; the built-in frame is used when unset
    pub base_template_path: Option<PathBuf>,
    /// Extra row sources listed in the editor's rows panel
    pub external_rows: Vec<ExternalRowsConfig>,
}

/// External row source
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExternalRowsConfig {
    pub name: String,
    pub url: String,
}

fn default_smtp_port() -> u16 {
    587
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3001".to_string(),
            public_base_url: "http://localhost:3001".to_string(),
            upstream_timeout_seconds: 30,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            url: "https://auth.getbee.io/loginV2".to_string(),
            client_id: None,
            client_secret: None,
            default_uid: "default-uid".to_string(),
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.getbee.io".to_string(),
            api_key: None,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            from: "Composer Preview <preview@localhost>".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Self::environment())
    }

    /// `COMPOSER_SECTION__KEY` environment overrides
    fn environment() -> Environment {
        Environment::with_prefix("COMPOSER")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with(path: Option<&Path>, environment: Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        builder
            .add_source(environment)
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| ComposerError::Config(format!("Failed to load config: {}", e)))
    }

    /// Development defaults (no credentials, preview mailbox)
    pub fn development() -> Self {
        Self::default()
    }

    /// Validate configuration; missing secrets are a start-up error
    pub fn validate(&self) -> Result<()> {
        if is_blank(&self.auth.client_id) || is_blank(&self.auth.client_secret) {
            return Err(ComposerError::MissingCredentialsConfig(
                "auth.client_id and auth.client_secret must be set".to_string(),
            ));
        }
        if is_blank(&self.conversion.api_key) {
            return Err(ComposerError::MissingCredentialsConfig(
                "conversion.api_key must be set".to_string(),
            ));
        }

        for (name, value) in [
            ("auth.url", &self.auth.url),
            ("conversion.base_url", &self.conversion.base_url),
            ("server.public_base_url", &self.server.public_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| ComposerError::Config(format!("Invalid {} '{}': {}", name, value, e)))?;
        }

        if self.server.upstream_timeout_seconds == 0 {
            return Err(ComposerError::Config(
                "server.upstream_timeout_seconds must be greater than zero".to_string(),
            ));
        }

        if let Some(smtp) = &self.smtp {
            if smtp.host.trim().is_empty() {
                return Err(ComposerError::Config("smtp.host must not be empty".to_string()));
            }
            if smtp.user.is_some() != smtp.pass.is_some() {
                return Err(ComposerError::Config(
                    "smtp.user and smtp.pass must be set together".to_string(),
                ));
            }
            if smtp.sender().is_none() {
                return Err(ComposerError::Config(
                    "smtp.from or smtp.user must provide a sender address".to_string(),
                ));
            }
        }

        if self.preview.capacity == 0 {
            return Err(ComposerError::Config(
                "preview.capacity must be greater than zero".to_string(),
            ));
        }
        if self.sessions.capacity == 0 {
            return Err(ComposerError::Config(
                "sessions.capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Timeout for outbound calls
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.server.upstream_timeout_seconds)
    }
}

impl SmtpConfig {
    /// Sender address: `from`, falling back to `user`
    pub fn sender(&self) -> Option<&str> {
        self.from
            .as_deref()
            .or(self.user.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn configured() -> AppConfig {
        let mut config = AppConfig::development();
        config.auth.client_id = Some("client".to_string());
        config.auth.client_secret = Some("secret".to_string());
        config.conversion.api_key = Some("key".to_string());
        config
    }

    fn no_env() -> Environment {
        AppConfig::environment().source(Some(HashMap::new()))
    }

    #[test]
    fn test_development_config_needs_credentials() {
        let err = AppConfig::development().validate().unwrap_err();
        assert!(matches!(err, ComposerError::MissingCredentialsConfig(_)));
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_missing_conversion_key() {
        let mut config = configured();
        config.conversion.api_key = Some("  ".to_string());
        assert!(matches!(
            config.validate(),
            Err(ComposerError::MissingCredentialsConfig(_))
        ));
    }

    #[test]
    fn test_partial_smtp_is_rejected() {
        let mut config = configured();
        config.smtp = Some(SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            secure: false,
            user: Some("mailer@example.com".to_string()),
            pass: None,
            from: None,
        });
        assert!(matches!(config.validate(), Err(ComposerError::Config(_))));

        config.smtp.as_mut().unwrap().pass = Some("pw".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.smtp.as_ref().unwrap().sender(), Some("mailer@example.com"));
    }

    #[test]
    fn test_parse_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[server]
listen_addr = "127.0.0.1:4000"

[auth]
client_id = "abc"
client_secret = "def"

[conversion]
api_key = "ghi"

[smtp]
host = "smtp.example.com"
user = "mailer@example.com"
pass = "pw"
"#
        )
        .unwrap();

        let config = AppConfig::load_with(Some(file.path()), no_env()).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:4000");
        assert_eq!(config.server.upstream_timeout_seconds, 30);
        assert_eq!(config.auth.default_uid, "default-uid");
        assert_eq!(config.smtp.as_ref().unwrap().port, 587);
        assert_eq!(config.sessions.capacity, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_session_capacity_is_rejected() {
        let mut config = configured();
        config.sessions.capacity = 0;
        assert!(matches!(config.validate(), Err(ComposerError::Config(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let env = AppConfig::environment().source(Some(HashMap::from([
            ("COMPOSER_AUTH__CLIENT_ID".to_string(), "from-env".to_string()),
            ("COMPOSER_SERVER__UPSTREAM_TIMEOUT_SECONDS".to_string(), "5".to_string()),
        ])));

        let config = AppConfig::load_with(None, env).unwrap();
        assert_eq!(config.auth.client_id.as_deref(), Some("from-env"));
        assert_eq!(config.upstream_timeout(), Duration::from_secs(5));
    }
}
