use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Easing curve for inset animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump to the end value on the last frame
    None,
    Linear,
    #[default]
    Cubic,
    Quintic,
    EaseOut,
}

/// Predicate deciding when a pull turns into a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Host is decelerating and the sentinel is fully revealed
    #[default]
    Decelerating,
    /// Host is not being dragged and the sentinel is fully revealed
    Released,
}

impl TriggerPolicy {
    /// Whether a sample with the given flags and distance starts loading
    pub fn should_trigger(self, dragging: bool, decelerating: bool, distance: f64, threshold: f64) -> bool {
        let past = distance < -threshold;
        match self {
            TriggerPolicy::Decelerating => decelerating && past,
            TriggerPolicy::Released => !dragging && past,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullLoadConfig {
    /// Headroom added to the pulling threshold so the release message shows
    /// before the physical trigger point
    #[serde(default = "default_margin")]
    pub margin: f64,
    /// Inset animation duration in milliseconds (0 = apply instantly)
    #[serde(default = "default_inset_animation_ms")]
    pub inset_animation_ms: u64,
    /// Easing used for inset animations
    #[serde(default)]
    pub easing: EasingType,
    /// When a pull becomes a load
    #[serde(default)]
    pub trigger: TriggerPolicy,
}

impl Default for PullLoadConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            inset_animation_ms: default_inset_animation_ms(),
            easing: EasingType::default(),
            trigger: TriggerPolicy::default(),
        }
    }
}

fn default_margin() -> f64 {
    12.0
}

fn default_inset_animation_ms() -> u64 {
    200
}

impl PullLoadConfig {
    /// Configuration with inset changes applied in the same call
    pub fn instant() -> Self {
        Self {
            inset_animation_ms: 0,
            ..Default::default()
        }
    }

    pub fn inset_animation(&self) -> Duration {
        Duration::from_millis(self.inset_animation_ms)
    }

    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path` or return defaults if it is missing
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/pullload/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("pullload")
            .join("config.toml")
    }

    fn validate(&self) -> crate::Result<()> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(crate::Error::Config(format!(
                "margin must be a non-negative number, got {}",
                self.margin
            )));
        }
        Ok(())
    }
}
