//! Validator configuration.
//!
//! Defaults suit most acceptance suites; override through environment
//! variables (`NETASSERT_*`) or a TOML file.

use std::str::FromStr;
use std::time::Duration;

use netassert_state::OutputKey;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_LIST_MODE: &str = "NETASSERT_LIST_MODE";
pub const ENV_LOOKUP_TIMEOUT_SECS: &str = "NETASSERT_LOOKUP_TIMEOUT_SECS";
pub const ENV_MAX_CONCURRENT: &str = "NETASSERT_MAX_CONCURRENT";
pub const ENV_OUTPUT_PREFIX: &str = "NETASSERT_OUTPUT_PREFIX";

/// How a declared list is compared with an observed list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMode {
    /// Same elements with the same multiplicity; order is ignored.
    Exact,
    /// Every declared element appears in the observed list. Tolerates
    /// defaults the provider adds on its own.
    #[default]
    ContainsAll,
}

impl FromStr for ListMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(ListMode::Exact),
            "contains_all" | "containsall" | "contains-all" => Ok(ListMode::ContainsAll),
            _ => Err(ConfigError::InvalidValue {
                name: ENV_LIST_MODE.to_string(),
                value: s.to_string(),
                reason: "expected 'exact' or 'contains_all'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    pub list_mode: ListMode,
    /// Upper bound on a single observed-state lookup; `None` waits forever.
    pub lookup_timeout: Option<Duration>,
    /// Top-level networks validated at the same time.
    pub max_concurrent: usize,
    /// Prepended to every lookup key, e.g. the terraform output name.
    pub output_prefix: OutputKey,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            list_mode: ListMode::ContainsAll,
            lookup_timeout: Some(Duration::from_secs(60)),
            max_concurrent: 4,
            output_prefix: OutputKey::default(),
        }
    }
}

/// On-disk form; every field optional and overlaid on the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    list_mode: Option<ListMode>,
    lookup_timeout_secs: Option<u64>,
    max_concurrent: Option<usize>,
    output_prefix: Option<String>,
}

impl ValidatorConfig {
    pub fn with_list_mode(mut self, mode: ListMode) -> Self {
        self.list_mode = mode;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    pub fn with_output_prefix(mut self, prefix: OutputKey) -> Self {
        self.output_prefix = prefix;
        self
    }

    /// Read overrides from `NETASSERT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ValidatorConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_LIST_MODE) {
            config.list_mode = raw.parse()?;
        }
        if let Some(raw) = lookup(ENV_LOOKUP_TIMEOUT_SECS) {
            let secs = parse_number::<u64>(ENV_LOOKUP_TIMEOUT_SECS, &raw)?;
            config.lookup_timeout = timeout_from_secs(secs);
        }
        if let Some(raw) = lookup(ENV_MAX_CONCURRENT) {
            config.max_concurrent = parse_concurrency(ENV_MAX_CONCURRENT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_OUTPUT_PREFIX) {
            config.output_prefix = OutputKey::parse_dotted(&raw);
        }

        Ok(config)
    }

    /// Parse a TOML document such as:
    ///
    /// ```toml
    /// list_mode = "exact"
    /// lookup_timeout_secs = 30
    /// max_concurrent = 2
    /// output_prefix = "vnets"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(mode) = file.list_mode {
            config.list_mode = mode;
        }
        if let Some(secs) = file.lookup_timeout_secs {
            config.lookup_timeout = timeout_from_secs(secs);
        }
        if let Some(max) = file.max_concurrent {
            config.max_concurrent = parse_concurrency("max_concurrent", &max.to_string())?;
        }
        if let Some(prefix) = file.output_prefix {
            config.output_prefix = OutputKey::parse_dotted(&prefix);
        }

        Ok(config)
    }
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
        reason: "expected a non-negative integer".to_string(),
    })
}

fn parse_concurrency(name: &str, raw: &str) -> Result<usize, ConfigError> {
    match parse_number::<usize>(name, raw)? {
        0 => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            reason: "must be at least 1".to_string(),
        }),
        n => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ValidatorConfig::default();
        assert_eq!(config.list_mode, ListMode::ContainsAll);
        assert_eq!(config.lookup_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.max_concurrent, 4);
        assert!(config.output_prefix.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let env = vars(&[
            (ENV_LIST_MODE, "Exact"),
            (ENV_LOOKUP_TIMEOUT_SECS, "0"),
            (ENV_MAX_CONCURRENT, "8"),
            (ENV_OUTPUT_PREFIX, "vnets"),
        ]);
        let config = ValidatorConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.list_mode, ListMode::Exact);
        assert_eq!(config.lookup_timeout, None);
        assert_eq!(config.max_concurrent, 8);
        assert_eq!(config.output_prefix, OutputKey::new(["vnets"]));
    }

    #[test]
    fn test_env_rejects_zero_concurrency() {
        let env = vars(&[(ENV_MAX_CONCURRENT, "0")]);
        let err = ValidatorConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_env_rejects_unknown_list_mode() {
        let env = vars(&[(ENV_LIST_MODE, "subset")]);
        assert!(ValidatorConfig::from_lookup(|k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn test_toml_overlay() {
        let config = ValidatorConfig::from_toml_str(
            r#"
            list_mode = "exact"
            lookup_timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.list_mode, ListMode::Exact);
        assert_eq!(config.lookup_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.max_concurrent, 4);
    }

    #[test]
    fn test_toml_unknown_key_rejected() {
        let err = ValidatorConfig::from_toml_str("strict = true").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
