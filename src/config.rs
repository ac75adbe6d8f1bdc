//! File and environment configuration.
//!
//! ```toml
//! levels = ["info", "flow_checker"]
//! color = "never"
//! sampling = "unwind-only"
//! max_depth = 8
//! ```

use crate::application::recorder::SamplingMode;
use crate::error::ConfigError;
use crate::infrastructure::ColorMode;
use serde::Deserialize;
use std::path::Path;

/// Environment variable overriding `levels`, comma separated.
pub const LEVELS_ENV: &str = "CALLFLOW_LEVELS";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CallflowConfig {
    /// Category tokens passed to the level gate. Empty keeps all enabled.
    pub levels: Vec<String>,
    pub color: ColorMode,
    pub sampling: SamplingMode,
    /// Deepest level the flow tree descends to; unlimited when absent.
    pub max_depth: Option<usize>,
}

impl CallflowConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    /// Replace `levels` with `CALLFLOW_LEVELS` when it is set.
    pub fn apply_env(&mut self) {
        if let Ok(raw) = std::env::var(LEVELS_ENV) {
            self.apply_levels_str(&raw);
        }
    }

    /// Replace `levels` from a comma-separated list. Blank input is ignored.
    pub fn apply_levels_str(&mut self, raw: &str) {
        let levels: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if !levels.is_empty() {
            self.levels = levels;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = CallflowConfig::from_toml_str("").unwrap();
        assert!(cfg.levels.is_empty());
        assert_eq!(cfg.color, ColorMode::Auto);
        assert_eq!(cfg.sampling, SamplingMode::EntryAndUnwind);
        assert_eq!(cfg.max_depth, None);
    }

    #[test]
    fn test_full_document() {
        let cfg = CallflowConfig::from_toml_str(
            r#"
            levels = ["info", "FLOW_CHECKER"]
            color = "never"
            sampling = "unwind-only"
            max_depth = 4
            "#,
        )
        .unwrap();
        assert_eq!(cfg.levels, vec!["info", "FLOW_CHECKER"]);
        assert_eq!(cfg.color, ColorMode::Never);
        assert_eq!(cfg.sampling, SamplingMode::UnwindOnly);
        assert_eq!(cfg.max_depth, Some(4));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = CallflowConfig::from_toml_str("colour = \"never\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "levels = [\"warn\"]").unwrap();
        let cfg = CallflowConfig::from_path(file.path()).unwrap();
        assert_eq!(cfg.levels, vec!["warn"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CallflowConfig::from_path(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_levels_str() {
        let mut cfg = CallflowConfig::default();
        cfg.apply_levels_str(" info , res,,");
        assert_eq!(cfg.levels, vec!["info", "res"]);
        cfg.apply_levels_str(" , ");
        assert_eq!(cfg.levels, vec!["info", "res"]);
    }
}
