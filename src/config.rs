//! Action Configuration Module
//!
//! Settings for how the action reaches the engine. Migration parameters
//! themselves come from action inputs, not from here.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. CLI flags (`--atlas-bin`, `--timeout`, `--working-dir`)
//! 2. Environment variables (`ATLAS_ACTION_BIN`, `ATLAS_ACTION_TIMEOUT`,
//!    `ATLAS_ACTION_WORKING_DIR`)
//! 3. Defaults

use std::path::PathBuf;
use std::time::Duration;

use crate::engine::AtlasCli;
use crate::error::ActionError;

pub const ENV_BIN: &str = "ATLAS_ACTION_BIN";
pub const ENV_TIMEOUT: &str = "ATLAS_ACTION_TIMEOUT";
pub const ENV_WORKING_DIR: &str = "ATLAS_ACTION_WORKING_DIR";

const DEFAULT_BIN: &str = "atlas";

#[derive(Debug, Clone, PartialEq)]
pub struct ActionConfig {
    /// Path to the atlas binary
    pub atlas_bin: String,
    /// Deadline for the whole run, none by default
    pub timeout: Option<Duration>,
    /// Directory atlas runs in
    pub working_dir: Option<PathBuf>,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            atlas_bin: DEFAULT_BIN.to_string(),
            timeout: None,
            working_dir: None,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub atlas_bin: Option<String>,
    pub timeout_secs: Option<u64>,
    pub working_dir: Option<PathBuf>,
}

impl ActionConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ActionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a custom environment lookup.
    ///
    /// Empty variables count as unset.
    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Result<Self, ActionError> {
        let var = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(bin) = var(ENV_BIN) {
            config.atlas_bin = bin;
        }
        if let Some(raw) = var(ENV_TIMEOUT) {
            let secs = raw.parse::<u64>().map_err(|_| {
                ActionError::Config(format!("{ENV_TIMEOUT} must be a number of seconds, got '{raw}'"))
            })?;
            config.timeout = Some(parse_timeout(secs)?);
        }
        if let Some(dir) = var(ENV_WORKING_DIR) {
            config.working_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Apply CLI flags on top
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ActionError> {
        if let Some(bin) = overrides.atlas_bin {
            self.atlas_bin = bin;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout = Some(parse_timeout(secs)?);
        }
        if let Some(dir) = overrides.working_dir {
            self.working_dir = Some(dir);
        }
        Ok(self)
    }

    /// Engine configured from these settings
    pub fn engine(&self) -> AtlasCli {
        let engine = AtlasCli::new().with_bin(&self.atlas_bin);
        match &self.working_dir {
            Some(dir) => engine.with_working_dir(dir),
            None => engine,
        }
    }
}

fn parse_timeout(secs: u64) -> Result<Duration, ActionError> {
    if secs == 0 {
        return Err(ActionError::Config("timeout must be greater than zero".to_string()));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ActionConfig, ActionError> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        ActionConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_without_env() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ActionConfig::default());
        assert_eq!(config.atlas_bin, "atlas");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn reads_env() {
        let config = load(&[
            (ENV_BIN, "/opt/atlas/bin/atlas"),
            (ENV_TIMEOUT, "300"),
            (ENV_WORKING_DIR, "db"),
        ])
        .unwrap();

        assert_eq!(config.atlas_bin, "/opt/atlas/bin/atlas");
        assert_eq!(config.timeout, Some(Duration::from_secs(300)));
        assert_eq!(config.working_dir, Some(PathBuf::from("db")));
    }

    #[test]
    fn empty_env_is_unset() {
        let config = load(&[(ENV_BIN, ""), (ENV_TIMEOUT, "  ")]).unwrap();
        assert_eq!(config, ActionConfig::default());
    }

    #[test]
    fn malformed_timeout_is_config_error() {
        let err = load(&[(ENV_TIMEOUT, "5m")]).unwrap_err();
        assert!(matches!(err, ActionError::Config(_)));
        assert!(err.to_string().contains("ATLAS_ACTION_TIMEOUT"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(load(&[(ENV_TIMEOUT, "0")]).is_err());
        let err = ActionConfig::default()
            .with_overrides(ConfigOverrides {
                timeout_secs: Some(0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ActionError::Config(_)));
    }

    #[test]
    fn overrides_win_over_env() {
        let config = load(&[(ENV_BIN, "/env/atlas"), (ENV_TIMEOUT, "10")])
            .unwrap()
            .with_overrides(ConfigOverrides {
                atlas_bin: Some("/flag/atlas".into()),
                timeout_secs: None,
                working_dir: Some(PathBuf::from("migrations")),
            })
            .unwrap();

        assert_eq!(config.atlas_bin, "/flag/atlas");
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.working_dir, Some(PathBuf::from("migrations")));
    }

    #[test]
    fn builds_engine() {
        let config = ActionConfig {
            atlas_bin: "/usr/local/bin/atlas".into(),
            ..Default::default()
        };
        assert_eq!(config.engine().bin(), "/usr/local/bin/atlas");
    }
}
