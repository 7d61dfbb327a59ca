use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, Result};

const CONFIG_FILE: &str = "config.json";

/// Policy for templates whose cursor lags multiple periods behind the
/// reference date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CatchUpMode {
    /// Advance exactly one step per invocation; callers invoke repeatedly
    /// for a full backfill.
    #[default]
    SingleStep,
    /// Materialize every missed occurrence up to the reference date in one
    /// invocation.
    FullCatchUp,
}

/// Engine configuration persisted alongside the data files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub catch_up_mode: CatchUpMode,
}

/// Loads and saves the configuration file under a base directory,
/// falling back to defaults when no file exists yet.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let base = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recurrence_core");
        Self::with_base_dir(base)
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)
                .map_err(|err| EngineError::Config(format!("{}: {}", self.path.display(), err)))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_single_step() {
        assert_eq!(Config::default().catch_up_mode, CatchUpMode::SingleStep);
    }

    #[test]
    fn catch_up_mode_serializes_kebab_case() {
        let json = serde_json::to_string(&Config {
            catch_up_mode: CatchUpMode::FullCatchUp,
        })
        .unwrap();
        assert!(json.contains("full-catch-up"));
        let parsed: Config = serde_json::from_str(r#"{"catch_up_mode":"single-step"}"#).unwrap();
        assert_eq!(parsed.catch_up_mode, CatchUpMode::SingleStep);
    }
}
