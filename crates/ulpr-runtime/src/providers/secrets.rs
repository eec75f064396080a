//! Secure credential handling for model backends.
//!
//! Credentials are wrapped in [`ApiCredential`]:
//! - Debug and Display print `[REDACTED]`
//! - The value is zeroed on drop by `secrecy`
//! - Access requires an explicit `.expose()` at the point of use
//!
//! ```ignore
//! let token = ApiCredential::optional_from_config_or_env(&config, "api_key", "HF_TOKEN", "Hugging Face token");
//! if let Some(token) = &token {
//!     request = request.bearer_auth(token.expose());
//! }
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from configuration file/JSON
    Config,
    /// Loaded from environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Create a new credential from a string value.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load a credential from JSON config, falling back to an environment
    /// variable. `None` when neither is set.
    pub fn optional_from_config_or_env(
        config: &JsonValue,
        config_key: &str,
        env_var: &str,
        name: &'static str,
    ) -> Option<Self> {
        if let Some(value) = config[config_key].as_str() {
            return Some(Self::new(value, CredentialSource::Config, name));
        }

        std::env::var(env_var)
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| Self::new(v, CredentialSource::Environment, name))
    }

    /// Expose the credential value. Call only where the value is sent.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let cred = ApiCredential::new("hf_super_secret", CredentialSource::Programmatic, "token");
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("hf_super_secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_display_is_redacted() {
        let cred = ApiCredential::new("hf_super_secret", CredentialSource::Config, "token");
        let shown = cred.to_string();
        assert_eq!(shown, "token from config [REDACTED]");
    }

    #[test]
    fn test_config_value_wins() {
        let config = serde_json::json!({"api_key": "from-config"});
        let cred = ApiCredential::optional_from_config_or_env(
            &config,
            "api_key",
            "ULPR_TEST_UNSET_TOKEN",
            "token",
        )
        .unwrap();
        assert_eq!(cred.expose(), "from-config");
        assert_eq!(cred.source, CredentialSource::Config);
    }

    #[test]
    fn test_missing_credential() {
        let config = serde_json::json!({});
        assert!(ApiCredential::optional_from_config_or_env(
            &config,
            "api_key",
            "ULPR_TEST_UNSET_TOKEN",
            "token"
        )
        .is_none());
    }
}
