//! Service configuration.
//!
//! Read from the environment at startup. The secret key has no default: a
//! process without one refuses to start rather than storing content it could
//! never open again.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use burnlink_core::{MessageCodec, SecretKey};
use thiserror::Error;
use zeroize::Zeroizing;

/// Environment variable holding the content key.
pub const SECRET_KEY_VAR: &str = "BURNLINK_SECRET_KEY";
/// Environment variable holding the database file path.
pub const DATABASE_PATH_VAR: &str = "BURNLINK_DATABASE_PATH";
/// Environment variable holding the sweep period in seconds. `0` disables it.
pub const SWEEP_INTERVAL_VAR: &str = "BURNLINK_SWEEP_INTERVAL_SECS";

/// Default period between expiry sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Secrets with this prefix are a raw 32-byte key in hex rather than a passphrase.
const HEX_KEY_PREFIX: &str = "hex:";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{SECRET_KEY_VAR} is not set")]
    MissingSecretKey,

    #[error("{SECRET_KEY_VAR} is invalid: {0}")]
    InvalidSecretKey(String),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Configuration for a Burnlink runtime.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Content key material. Required. Wiped from memory on drop.
    pub secret_key: Option<Zeroizing<String>>,
    /// Database file. `None` keeps everything in memory.
    pub database_path: Option<PathBuf>,
    /// Expiry sweep period. `None` disables the sweeper.
    pub sweep_interval: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            database_path: None,
            sweep_interval: Some(DEFAULT_SWEEP_INTERVAL),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.secret_key = lookup(SECRET_KEY_VAR)
            .map(Zeroizing::new)
            .filter(|s| !s.trim().is_empty());
        config.database_path = lookup(DATABASE_PATH_VAR)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        if let Some(raw) = lookup(SWEEP_INTERVAL_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: SWEEP_INTERVAL_VAR,
                value: raw.clone(),
            })?;
            config.sweep_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_secret_key(mut self, secret: impl Into<String>) -> Self {
        self.secret_key = Some(Zeroizing::new(secret.into()));
        self
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn with_sweep_interval(mut self, interval: Option<Duration>) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Build the content codec. Fails when no usable key is configured.
    pub fn codec(&self) -> Result<MessageCodec, ConfigError> {
        let secret = self
            .secret_key
            .as_deref()
            .ok_or(ConfigError::MissingSecretKey)?;

        let key = match secret.strip_prefix(HEX_KEY_PREFIX) {
            Some(hex) => SecretKey::from_hex(hex),
            None => SecretKey::from_secret(secret),
        }
        .map_err(|e| match e {
            burnlink_core::CodecError::MissingKey => ConfigError::MissingSecretKey,
            other => ConfigError::InvalidSecretKey(other.to_string()),
        })?;

        Ok(MessageCodec::new(&key))
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("database_path", &self.database_path)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.secret_key.is_none());
        assert!(config.database_path.is_none());
        assert_eq!(config.sweep_interval, Some(DEFAULT_SWEEP_INTERVAL));
    }

    #[test]
    fn test_missing_key_fails_closed() {
        let config = ServiceConfig::from_lookup(lookup(&[(SECRET_KEY_VAR, "   ")])).unwrap();
        assert!(matches!(config.codec(), Err(ConfigError::MissingSecretKey)));
    }

    #[test]
    fn test_reads_all_vars() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (SECRET_KEY_VAR, "correct horse"),
            (DATABASE_PATH_VAR, "/var/lib/burnlink/messages.db"),
            (SWEEP_INTERVAL_VAR, "60"),
        ]))
        .unwrap();

        assert_eq!(config.sweep_interval, Some(Duration::from_secs(60)));
        assert_eq!(
            config.database_path,
            Some(PathBuf::from("/var/lib/burnlink/messages.db"))
        );
        assert!(config.codec().is_ok());
    }

    #[test]
    fn test_zero_interval_disables_sweeper() {
        let config = ServiceConfig::from_lookup(lookup(&[(SWEEP_INTERVAL_VAR, "0")])).unwrap();
        assert!(config.sweep_interval.is_none());
    }

    #[test]
    fn test_bad_interval() {
        let err = ServiceConfig::from_lookup(lookup(&[(SWEEP_INTERVAL_VAR, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_hex_key() {
        let hex_key = format!("hex:{}", "ab".repeat(32));
        assert!(ServiceConfig::default().with_secret_key(hex_key).codec().is_ok());

        let bad = ServiceConfig::default().with_secret_key("hex:zz");
        assert!(matches!(bad.codec(), Err(ConfigError::InvalidSecretKey(_))));
    }

    #[test]
    fn test_secret_is_held_zeroizing() {
        let config = ServiceConfig::from_lookup(lookup(&[(SECRET_KEY_VAR, "wipe me")])).unwrap();
        let held: &Zeroizing<String> = config.secret_key.as_ref().unwrap();
        assert_eq!(held.as_str(), "wipe me");

        let built = ServiceConfig::default().with_secret_key("also wiped");
        let held: &Zeroizing<String> = built.secret_key.as_ref().unwrap();
        assert_eq!(held.as_str(), "also wiped");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ServiceConfig::default().with_secret_key("hunter2");
        let out = format!("{:?}", config);
        assert!(!out.contains("hunter2"));
        assert!(out.contains("redacted"));
    }
}
