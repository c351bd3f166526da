use crate::domain::{config::SerViewConfig, error::{SerViewError, SerViewResult}};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR: &str = ".serview";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> SerViewResult<Self> {
        let global_config_path = Self::default_global_config_path()?;
        let project_config_path = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_project_config_path(&dir));

        Ok(Self {
            global_config_path,
            project_config_path,
        })
    }

    /// Manager with explicit locations
    pub fn with_paths(global_config_path: PathBuf, project_config_path: Option<PathBuf>) -> Self {
        Self {
            global_config_path,
            project_config_path,
        }
    }

    /// Load the effective configuration. A project file takes precedence over
    /// the global file; with neither present the defaults apply.
    pub fn load_config(&self) -> SerViewResult<SerViewConfig> {
        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                debug!("Loading project configuration from {}", project_path.display());
                return self.load_config_from_path(project_path);
            }
        }

        if self.global_config_path.exists() {
            debug!("Loading global configuration from {}", self.global_config_path.display());
            return self.load_config_from_path(&self.global_config_path);
        }

        Ok(SerViewConfig::default())
    }

    /// Get global configuration path
    fn default_global_config_path() -> SerViewResult<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SerViewError::config("Could not determine home directory"))?;

        Ok(home.join(".config").join("serview").join(CONFIG_FILE))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path(start: &Path) -> Option<PathBuf> {
        let mut path = start;

        loop {
            let config_path = path.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Load and validate configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> SerViewResult<SerViewConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            SerViewError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: SerViewConfig = toml::from_str(&content).map_err(|e| {
            SerViewError::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to specific path, creating parent directories
    pub fn save_config_to_path(&self, path: &Path, config: &SerViewConfig) -> SerViewResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SerViewError::config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(config)
            .map_err(|e| SerViewError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content).map_err(|e| {
            SerViewError::config(format!("Failed to write config file {}: {}", path.display(), e))
        })
    }

    /// Write default configuration into `<dir>/.serview/config.toml`
    pub fn init_project_config(&self, dir: &Path) -> SerViewResult<PathBuf> {
        let config_file = dir.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_file.exists() {
            return Err(SerViewError::config("Project configuration already exists"));
        }

        self.save_config_to_path(&config_file, &SerViewConfig::default())?;
        Ok(config_file)
    }

    /// Get the current project config path (if any)
    pub fn project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    /// Get the global config path
    pub fn global_config_path(&self) -> &PathBuf {
        &self.global_config_path
    }
}
