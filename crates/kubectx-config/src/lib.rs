pub mod general;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use general::{GeneralConfig, ListConfig, PickerConfig};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub picker: PickerConfig,
}

pub const DEFAULT_CONFIG: &str = include_str!("defaults.toml");

impl AppConfig {
    /// Embedded defaults overlaid with the user's file, if one exists and parses.
    pub fn load() -> Self {
        let mut config = Self::defaults();

        if let Some(path) = Self::user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                        Ok(user) => config.merge(user),
                        Err(e) => eprintln!("Warning: invalid config at {}: {e}", path.display()),
                    },
                    Err(e) => eprintln!("Warning: could not read {}: {e}", path.display()),
                }
            }
        }

        config
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::defaults();
        let contents = std::fs::read_to_string(path)?;
        let user: AppConfig = toml::from_str(&contents)?;
        config.merge(user);
        Ok(config)
    }

    pub fn defaults() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("kubectx").join("config.toml"))
    }

    fn merge(&mut self, user: AppConfig) {
        self.general = user.general;
        self.list = user.list;
        self.picker = user.picker;
    }

    /// Colors are on unless turned off in the file or through `NO_COLOR`.
    pub fn color_enabled(&self) -> bool {
        self.list.color && std::env::var_os("NO_COLOR").map_or(true, |v| v.is_empty())
    }

    /// The picker can be disabled per invocation with `KUBECTX_IGNORE_PICKER`.
    pub fn picker_enabled(&self) -> bool {
        self.picker.enabled && std::env::var_os("KUBECTX_IGNORE_PICKER").map_or(true, |v| v.is_empty())
    }
}
