//! Session store settings.
//!
//! Loads the `session_store` section of a YAML settings file and merges:
//! - System defaults file
//! - User overrides file
//! - Process environment (`VALKEY_URL`, `OMNI_SESSION_STORE_PREFIX`,
//!   `OMNI_SESSION_STORE_SCAN_COUNT`)
//!
//! Merge precedence is env over user over system. Missing or unreadable files
//! fall back to defaults with a warning.

use std::path::Path;

use serde::Deserialize;

use crate::observability::SessionStoreEvent;

/// Prefix used when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "scs:session:";
/// Keys requested per `SCAN` round trip when none is configured.
pub const DEFAULT_SCAN_COUNT: usize = 100;

/// Env var holding the Valkey URL.
pub const VALKEY_URL_ENV: &str = "VALKEY_URL";
/// Env var overriding the key prefix.
pub const KEY_PREFIX_ENV: &str = "OMNI_SESSION_STORE_PREFIX";
/// Env var overriding the scan batch size.
pub const SCAN_COUNT_ENV: &str = "OMNI_SESSION_STORE_SCAN_COUNT";

/// Resolution used when turning an absolute expiry into a TTL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPrecision {
    /// `EXPIRE` with `expiry - now` truncated to whole seconds.
    Seconds,
    /// `PEXPIRE` with `expiry - now` truncated to whole milliseconds.
    #[default]
    Milliseconds,
}

/// Resolved, immutable store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStoreConfig {
    /// Namespace prepended to every token.
    pub key_prefix: String,
    /// Keys requested per `SCAN` round trip (at least 1).
    pub scan_count: usize,
    /// TTL resolution for commits.
    pub expiry_precision: ExpiryPrecision,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            scan_count: DEFAULT_SCAN_COUNT,
            expiry_precision: ExpiryPrecision::default(),
        }
    }
}

impl SessionStoreConfig {
    /// Replace the key prefix, taken verbatim.
    #[must_use]
    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    /// Replace the scan batch size; zero is raised to one.
    #[must_use]
    pub fn with_scan_count(mut self, scan_count: usize) -> Self {
        self.scan_count = scan_count.max(1);
        self
    }

    /// Replace the TTL resolution.
    #[must_use]
    pub fn with_expiry_precision(mut self, expiry_precision: ExpiryPrecision) -> Self {
        self.expiry_precision = expiry_precision;
        self
    }
}

/// `session_store` section of the settings file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionStoreSettings {
    /// Valkey URL using Redis protocol (for example `redis://127.0.0.1:6379/0`).
    pub valkey_url: Option<String>,
    /// Key prefix; blank values fall back to [`DEFAULT_KEY_PREFIX`].
    pub key_prefix: Option<String>,
    /// Scan batch size; zero falls back to [`DEFAULT_SCAN_COUNT`].
    pub scan_count: Option<usize>,
    /// TTL resolution.
    pub expiry_precision: Option<ExpiryPrecision>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    session_store: SessionStoreSettings,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SessionStoreSettings {
    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            valkey_url: non_blank(overrides.valkey_url).or_else(|| non_blank(self.valkey_url)),
            key_prefix: non_blank(overrides.key_prefix).or_else(|| non_blank(self.key_prefix)),
            scan_count: overrides.scan_count.or(self.scan_count),
            expiry_precision: overrides.expiry_precision.or(self.expiry_precision),
        }
    }

    /// Layer environment values read through `lookup` on top of `self`.
    ///
    /// Unparseable or zero scan counts are ignored with a warning.
    #[must_use]
    pub fn with_env_overrides<F>(self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let scan_count = lookup(SCAN_COUNT_ENV).and_then(|raw| match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => Some(value),
            _ => {
                tracing::warn!(
                    event = SessionStoreEvent::SettingsEnvInvalid.as_str(),
                    env_var = SCAN_COUNT_ENV,
                    value = %raw,
                    "invalid session store scan count env value; using settings/default"
                );
                None
            }
        });
        self.merge(Self {
            valkey_url: lookup(VALKEY_URL_ENV),
            key_prefix: lookup(KEY_PREFIX_ENV),
            scan_count,
            expiry_precision: None,
        })
    }

    /// Layer the current process environment on top of `self`.
    #[must_use]
    pub fn with_process_env(self) -> Self {
        self.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Configured Valkey URL, if any.
    #[must_use]
    pub fn valkey_url(&self) -> Option<&str> {
        self.valkey_url
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Resolve into a store configuration, filling defaults.
    #[must_use]
    pub fn config(&self) -> SessionStoreConfig {
        let defaults = SessionStoreConfig::default();
        SessionStoreConfig {
            key_prefix: non_blank(self.key_prefix.clone()).unwrap_or(defaults.key_prefix),
            scan_count: self
                .scan_count
                .filter(|v| *v > 0)
                .unwrap_or(defaults.scan_count),
            expiry_precision: self.expiry_precision.unwrap_or(defaults.expiry_precision),
        }
    }
}

/// Load the `session_store` section from one YAML file.
///
/// A missing file yields defaults; unreadable or malformed files are logged
/// and ignored.
pub fn load_session_store_settings(path: &Path) -> SessionStoreSettings {
    if !path.exists() {
        return SessionStoreSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                event = SessionStoreEvent::SettingsFileIgnored.as_str(),
                path = %path.display(),
                error = %error,
                "failed to read session store settings file; ignoring"
            );
            return SessionStoreSettings::default();
        }
    };
    match serde_yaml::from_str::<Option<SettingsFile>>(&raw) {
        Ok(file) => {
            tracing::debug!(
                event = SessionStoreEvent::SettingsLoaded.as_str(),
                path = %path.display(),
                "session store settings loaded"
            );
            file.unwrap_or_default().session_store
        }
        Err(error) => {
            tracing::warn!(
                event = SessionStoreEvent::SettingsFileIgnored.as_str(),
                path = %path.display(),
                error = %error,
                "failed to parse session store settings yaml; ignoring file"
            );
            SessionStoreSettings::default()
        }
    }
}

/// Load system then user settings files; user values win.
pub fn load_session_store_settings_from_paths(system: &Path, user: &Path) -> SessionStoreSettings {
    load_session_store_settings(system).merge(load_session_store_settings(user))
}
