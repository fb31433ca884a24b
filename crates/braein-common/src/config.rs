//! Site Configuration
//!
//! Every section falls back to the values the live site uses, so an empty
//! JSON object is a valid configuration.

use crate::error::{SiteError, SiteResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Site configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Contact form settings
    pub forms: FormsConfig,
    /// Navigation menu settings
    pub navigation: NavigationConfig,
    /// Header scroll styling
    pub header: HeaderConfig,
    /// Fade-in animation settings
    pub animations: AnimationConfig,
    /// In-page anchor scrolling
    pub smooth_scroll: SmoothScrollConfig,
}

impl SiteConfig {
    /// Load from a JSON file and validate it
    pub fn load(path: impl AsRef<Path>) -> SiteResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no page could work with
    pub fn validate(&self) -> SiteResult<()> {
        if self.forms.form_selector.trim().is_empty() {
            return Err(SiteError::ConfigError(
                "forms.form_selector must not be empty".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.animations.threshold) {
            return Err(SiteError::ConfigError(format!(
                "animations.threshold must be within 0..=1, got {}",
                self.animations.threshold
            )));
        }
        Ok(())
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> SiteResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Contact form settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Selector of the form element
    pub form_selector: String,
    /// How long a success message stays visible
    pub message_auto_hide_ms: u64,
    /// Delay of the simulated transport
    pub simulated_latency_ms: u64,
    /// Make the simulated transport fail with this message
    pub simulated_failure: Option<String>,
}

impl FormsConfig {
    /// Success message lifetime
    pub fn message_auto_hide(&self) -> Duration {
        Duration::from_millis(self.message_auto_hide_ms)
    }

    /// Simulated transport delay
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            form_selector: "#contact-form".into(),
            message_auto_hide_ms: 10_000,
            simulated_latency_ms: 1_500,
            simulated_failure: None,
        }
    }
}

/// Navigation menu settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Viewport width at which the menu is always expanded
    pub desktop_breakpoint_px: u32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            desktop_breakpoint_px: 1024,
        }
    }
}

/// Header scroll styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Scroll offset past which the header is marked `scrolled`
    pub scroll_threshold_px: f64,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            scroll_threshold_px: 50.0,
        }
    }
}

/// Fade-in animation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Elements animated when they enter the viewport
    pub selectors: Vec<String>,
    /// Class added on entry
    pub fade_class: String,
    /// Visible fraction that counts as entering
    pub threshold: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            selectors: vec![
                ".service-card".into(),
                ".feature-item".into(),
                ".value-card".into(),
                ".project-card".into(),
                ".section-header".into(),
            ],
            fade_class: "animate-fade-in-up".into(),
            threshold: 0.1,
        }
    }
}

/// In-page anchor scrolling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothScrollConfig {
    /// Height of the fixed header kept clear above the target
    pub header_offset_px: f64,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            header_offset_px: 100.0,
        }
    }
}
