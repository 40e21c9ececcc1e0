//! `linecrew.toml` configuration
//!
//! ```toml
//! parallel = true
//!
//! [policy]
//! max_load = 3
//! exempt_families = ["ipm", "cml", "tote_cleaning", "print_and_apply"]
//!
//! [[policy.variant_rules]]
//! process = "form_fold"
//! marker = "4blade"
//!
//! [limits]
//! max_backtracks = 100000
//! time_limit_ms = 5000
//! ```
//!
//! Every key is optional. Command-line flags override `[limits]` and
//! `parallel`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use linecrew_core::AssignmentPolicy;
use linecrew_solver::SearchLimits;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "linecrew.toml";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub policy: AssignmentPolicy,
    pub limits: LimitsConfig,
    pub parallel: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_backtracks: Option<u64>,
    pub time_limit_ms: Option<u64>,
}

impl LimitsConfig {
    pub fn to_search_limits(self) -> SearchLimits {
        SearchLimits {
            max_backtracks: self.max_backtracks,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load `explicit` if given (it must exist), otherwise `linecrew.toml`
    /// in the data directory if present, otherwise defaults.
    pub fn resolve(explicit: Option<&Path>, data_dir: &Path) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = data_dir.join(CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config =
            Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linecrew_core::VariantRule;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.policy.max_load, 3);
        assert_eq!(config.limits.to_search_limits(), SearchLimits::unlimited());
    }

    #[test]
    fn full_file() {
        let config = Config::parse(
            r#"
parallel = true

[policy]
max_load = 2
exempt_families = ["ipm"]
variant_rules = [{ process = "plasma", marker = "3lam" }]

[limits]
max_backtracks = 10
time_limit_ms = 250
"#,
        )
        .unwrap();

        assert!(config.parallel);
        assert_eq!(config.policy.max_load, 2);
        assert!(config.policy.is_exempt("ipm"));
        assert!(!config.policy.is_exempt("cml"));
        assert_eq!(config.policy.variant_rules, vec![VariantRule::new("plasma", "3lam")]);
        assert_eq!(
            config.limits.to_search_limits(),
            SearchLimits::unlimited()
                .max_backtracks(10)
                .time_limit(Duration::from_millis(250))
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("max_lod = 2").is_err());
    }

    #[test]
    fn missing_default_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::resolve(None, dir.path()).unwrap(), Config::default());
        assert!(Config::resolve(Some(&dir.path().join("nope.toml")), dir.path()).is_err());
    }
}
