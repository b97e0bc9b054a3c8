use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralConfig {
    #[serde(alias = "state-dir")]
    pub state_dir: String,
    #[serde(alias = "namespace-check-timeout-secs")]
    pub namespace_check_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { state_dir: String::new(), namespace_check_timeout_secs: 10 }
    }
}

impl GeneralConfig {
    pub fn state_dir(&self) -> Option<PathBuf> {
        let trimmed = self.state_dir.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => Some(PathBuf::from(trimmed)),
        }
    }

    pub fn namespace_check_timeout(&self) -> Duration {
        Duration::from_secs(self.namespace_check_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListConfig {
    pub color: bool,
    #[serde(alias = "current-fg")]
    pub current_fg: String,
    #[serde(alias = "current-bg")]
    pub current_bg: String,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self { color: true, current_fg: "yellow".into(), current_bg: String::new() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PickerConfig {
    pub enabled: bool,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
