/*
[INPUT]:  YAML configuration file, WALLET_AUTH_PRIVATE_KEY env var
[OUTPUT]: Parsed and validated CLI configuration
[POS]:    Configuration layer - backend, wallet and session settings
[UPDATE]: When adding new configuration options
*/

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use wallet_auth_adapter::auth::{DEFAULT_MESSAGE_TEMPLATE, NONCE_PLACEHOLDER};
use wallet_auth_adapter::{ClientConfig, Endpoints, ExpiryPolicy, ProfileFailurePolicy};

pub const PRIVATE_KEY_ENV: &str = "WALLET_AUTH_PRIVATE_KEY";

/// Top-level configuration for the wallet auth CLI
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub backend: BackendConfig,
    /// Text signed by the wallet; `{nonce}` is replaced with the server nonce
    #[serde(default = "default_message_template")]
    pub message_template: String,
    /// JSON file holding the persisted token and address
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub expiry_policy: ExpiryPolicy,
    #[serde(default)]
    pub profile_failure_policy: ProfileFailurePolicy,
}

/// Authentication backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_nonce_path")]
    pub nonce_path: String,
    #[serde(default = "default_verify_path")]
    pub verify_path: String,
    #[serde(default = "default_profile_path")]
    pub profile_path: String,
}

/// Local signing wallet
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WalletConfig {
    /// Hex private key; falls back to `WALLET_AUTH_PRIVATE_KEY`
    #[serde(default)]
    pub private_key: Option<String>,
    /// Brand flag the local provider reports
    #[serde(default = "default_is_metamask")]
    pub is_metamask: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            is_metamask: default_is_metamask(),
        }
    }
}

fn default_message_template() -> String {
    DEFAULT_MESSAGE_TEMPLATE.to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".wallet-auth").join("session.json")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_nonce_path() -> String {
    Endpoints::default().nonce
}

fn default_verify_path() -> String {
    Endpoints::default().verify
}

fn default_profile_path() -> String {
    Endpoints::default().profile
}

fn default_is_metamask() -> bool {
    true
}

impl AuthConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("read config file {path}"))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("parse yaml config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend.base_url.trim().is_empty() {
            bail!("backend.base_url cannot be empty");
        }
        url_check(&self.backend.base_url)?;
        if !self.message_template.contains(NONCE_PLACEHOLDER) {
            bail!("message_template must contain {NONCE_PLACEHOLDER}");
        }
        if self.backend.timeout_secs == 0 {
            bail!("backend.timeout_secs must be positive");
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.backend.timeout_secs),
            connect_timeout: Duration::from_secs(self.backend.connect_timeout_secs),
            endpoints: Endpoints {
                nonce: self.backend.nonce_path.clone(),
                verify: self.backend.verify_path.clone(),
                profile: self.backend.profile_path.clone(),
            },
        }
    }

    /// Private key from the config file, else from the environment
    pub fn private_key(&self) -> Option<String> {
        self.wallet
            .private_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                std::env::var(PRIVATE_KEY_ENV)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
    }
}

fn url_check(base_url: &str) -> anyhow::Result<()> {
    wallet_auth_adapter::ApiClient::new(base_url)
        .map(|_| ())
        .with_context(|| format!("invalid backend.base_url {base_url}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AuthConfig::from_yaml("backend:\n  base_url: https://api.example.com\n").unwrap();
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.backend.nonce_path, "/auth/nonce");
        assert_eq!(config.session_file, PathBuf::from(".wallet-auth/session.json"));
        assert_eq!(config.expiry_policy, ExpiryPolicy::Advisory);
        assert_eq!(config.profile_failure_policy, ProfileFailurePolicy::KeepToken);
        assert!(config.wallet.is_metamask);
        assert!(config.message_template.contains("{nonce}"));
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
backend:
  base_url: http://localhost:8080
  timeout_secs: 5
  nonce_path: /api/auth/nonce
message_template: "Casino login {nonce}"
session_file: /tmp/session.json
wallet:
  private_key: "0xabc"
  is_metamask: false
expiry_policy: enforce
profile_failure_policy: clear_token
"#;
        let config = AuthConfig::from_yaml(yaml).unwrap();
        let client_config = config.client_config();
        assert_eq!(client_config.timeout, Duration::from_secs(5));
        assert_eq!(client_config.endpoints.nonce, "/api/auth/nonce");
        assert_eq!(client_config.endpoints.verify, "/auth/verify");
        assert_eq!(config.private_key(), Some("0xabc".to_string()));
        assert!(!config.wallet.is_metamask);
        assert_eq!(config.expiry_policy, ExpiryPolicy::Enforce);
        assert_eq!(config.profile_failure_policy, ProfileFailurePolicy::ClearToken);
    }

    #[test]
    fn test_template_without_placeholder_is_rejected() {
        let yaml = "backend:\n  base_url: http://localhost\nmessage_template: sign me\n";
        let err = AuthConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("{nonce}"));
    }

    #[test]
    fn test_empty_or_invalid_base_url_is_rejected() {
        assert!(AuthConfig::from_yaml("backend:\n  base_url: \"\"\n").is_err());
        assert!(AuthConfig::from_yaml("backend:\n  base_url: not-a-url\n").is_err());
    }
}
