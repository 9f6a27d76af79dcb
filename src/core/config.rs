use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::playback::AutoplayPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Accumulated wheel delta below this is treated as noise
    pub wheel_threshold: f64,
    /// Touch swipe distance (px) below this is treated as noise
    pub touch_threshold: f64,
    pub cooldown_ms: u64,
    /// Trailing window that coalesces one physical scroll gesture
    pub wheel_settle_ms: u64,
    /// Seconds scrubbed per wheel notch over the seek bar
    pub wheel_scrub_seconds: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            wheel_threshold: 20.0,
            touch_threshold: 50.0,
            cooldown_ms: 500,
            wheel_settle_ms: 150,
            wheel_scrub_seconds: 5.0,
        }
    }
}

impl NavigationConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn wheel_settle(&self) -> Duration {
        Duration::from_millis(self.wheel_settle_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub autoplay_on_load: bool,
    pub unmute_delay_ms: u64,
    /// Policy applied by the built-in clock media element
    pub simulated_autoplay_policy: AutoplayPolicy,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            autoplay_on_load: true,
            unmute_delay_ms: 100,
            simulated_autoplay_policy: AutoplayPolicy::MutedOnly,
        }
    }
}

impl PlaybackConfig {
    pub fn unmute_delay(&self) -> Duration {
        Duration::from_millis(self.unmute_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub last_item_id: Option<String>,
    /// Identity used for likes and comments
    #[serde(default = "default_viewer_name")]
    pub viewer_name: String,
    #[serde(default = "default_watch_catalog")]
    pub watch_catalog: bool,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

fn default_viewer_name() -> String {
    "viewer".to_string()
}

fn default_watch_catalog() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("./feed.json"),
            last_item_id: None,
            viewer_name: default_viewer_name(),
            watch_catalog: default_watch_catalog(),
            navigation: NavigationConfig::default(),
            playback: PlaybackConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| anyhow::anyhow!("Failed to read config file at {}: {}", config_path.display(), e))?;

            // Unparsable files are replaced rather than blocking startup
            match serde_json::from_str::<Self>(&content) {
                Ok(config) => {
                    log::info!("Loaded existing config from {}", config_path.display());
                    Ok(config)
                }
                Err(e) => {
                    log::warn!("Config file exists but has issues ({}), creating new one with defaults", e);
                    let new_config = Self::default();
                    new_config.save()
                        .map_err(|save_err| anyhow::anyhow!("Failed to save new config: {}", save_err))?;
                    log::info!("Created new config file at {}", config_path.display());
                    Ok(new_config)
                }
            }
        } else {
            log::info!("No config file found, creating default config");
            let config = Self::default();
            config.save()
                .map_err(|e| anyhow::anyhow!("Failed to save default config: {}", e))?;
            log::info!("Created new config file at {}", config_path.display());
            Ok(config)
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clip-feed")
            .join("config.json")
    }

    /// Command line catalog path wins over the persisted one.
    pub fn apply_cli_override(&mut self, catalog_arg: Option<String>) {
        if let Some(path) = catalog_arg {
            log::info!("Using catalog from command line: {}", path);
            self.catalog_path = PathBuf::from(path);
        }
    }
}
