use serde::{Deserialize, Serialize};
use tessera_auth::config::AuthConfig;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tessera.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Token issuance configuration
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Users seeded into the in-memory user store
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// A user known to the CLI. Without an `id`, one is generated on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
}

pub mod loader {
    use super::{AppConfig, DEFAULT_CONFIG_FILE};
    use anyhow::{Context, Result};
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    /// Loads configuration from `path` (or `tessera.toml` if present), with
    /// `TESSERA__...` environment overrides, e.g.
    /// `TESSERA__AUTH__SIGNING__ALGORITHM=ES256`.
    pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                anyhow::ensure!(p.exists(), "config file {} not found", p.display());
                builder = builder.add_source(File::from(p.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        builder = builder.add_source(
            Environment::with_prefix("TESSERA")
                .prefix_separator("__")
                .separator("__"),
        );
        let cfg = builder.build().context("config build error")?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .context("config deserialize error")?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::loader::load_config;
    use std::io::Write;
    use std::time::Duration;

    use tessera_auth::config::RefreshStrategy;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[auth.signing]
algorithm = "HS384"
key = "file-secret"
key_id = "k1"

[auth.token]
access_token_lifetime = "15m"
issue_refresh_tokens = false

[auth.token.refresh]
strategy = "keyed"
key = "refresh-secret"

[auth.scopes]
default_scopes = ["read"]
strict = true

[auth.scopes.user_scopes]
u1 = ["write"]

[logging]
level = "debug"

[[users]]
id = "u1"
email = "a@example.com"

[[users]]
email = "b@example.com"
"#
        )
        .unwrap();

        let cfg = load_config(Some(file.path())).unwrap();

        assert_eq!(cfg.auth.signing.algorithm, "HS384");
        assert_eq!(cfg.auth.signing.key.as_deref(), Some("file-secret"));
        assert_eq!(cfg.auth.signing.key_id.as_deref(), Some("k1"));
        assert_eq!(
            cfg.auth.token.access_token_lifetime,
            Duration::from_secs(15 * 60)
        );
        assert!(!cfg.auth.token.issue_refresh_tokens);
        assert_eq!(cfg.auth.token.refresh.strategy, RefreshStrategy::Keyed);
        assert!(cfg.auth.scopes.strict);
        assert_eq!(cfg.auth.scopes.user_scopes["u1"], vec!["write".to_string()]);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.users.len(), 2);
        assert_eq!(cfg.users[0].id.as_deref(), Some("u1"));
        assert!(cfg.users[1].id.is_none());
        assert!(cfg.auth.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[auth.signing]\nkey = \"s\"").unwrap();

        let cfg = load_config(Some(file.path())).unwrap();

        assert_eq!(cfg.auth.signing.algorithm, "HS256");
        assert_eq!(cfg.auth.token.access_token_lifetime, Duration::from_secs(3600));
        assert!(cfg.auth.token.issue_refresh_tokens);
        assert_eq!(cfg.logging.level, "warn");
        assert!(cfg.users.is_empty());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_config(Some(&missing)).is_err());
    }
}
