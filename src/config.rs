use crate::anim::{Easing, SpringParams, Transition};
use crate::scroll::Margin;
use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,

    /// When false every animation jumps straight to its final state.
    #[serde(default = "default_animations_enabled")]
    pub animations_enabled: bool,

    #[serde(default)]
    pub spring: SpringParams,

    #[serde(default)]
    pub counter: CounterConfig,

    #[serde(default)]
    pub reveal: RevealConfig,

    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Seconds from start to end value.
    pub duration: f32,
    pub easing: Easing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub margin: Margin,
    pub threshold: f32,
    pub once: bool,
    /// Extra delay per list item, in seconds.
    pub stagger: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub viewport_height: f32,
    /// Pixels per second.
    pub scroll_speed: f32,
    /// Maximum random deviation added to each scroll step, in pixels.
    pub jitter: f32,
    /// Seconds to run the simulated session for.
    pub duration: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps_cap: default_fps_cap(),
            animations_enabled: default_animations_enabled(),
            spring: SpringParams::default(),
            counter: CounterConfig::default(),
            reveal: RevealConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            duration: 2.0,
            easing: Easing::EaseOutCubic,
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            margin: Margin::Pixels(-100.0),
            threshold: 0.0,
            once: true,
            stagger: 0.1,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            viewport_height: 900.0,
            scroll_speed: 600.0,
            jitter: 12.0,
            duration: 10.0,
        }
    }
}

fn default_fps_cap() -> u32 {
    60
}

fn default_animations_enabled() -> bool {
    true
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join("reveal").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&contents)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config.sanitized())
    }

    /// Replaces demo values the scroll simulation cannot run with.
    fn sanitized(mut self) -> Self {
        let defaults = DemoConfig::default();
        let demo = &mut self.demo;
        if !(demo.viewport_height.is_finite() && demo.viewport_height > 0.0) {
            warn!("demo.viewport_height {} is unusable, using {}", demo.viewport_height, defaults.viewport_height);
            demo.viewport_height = defaults.viewport_height;
        }
        if !demo.scroll_speed.is_finite() {
            warn!("demo.scroll_speed {} is not finite, using {}", demo.scroll_speed, defaults.scroll_speed);
            demo.scroll_speed = defaults.scroll_speed;
        }
        if !demo.jitter.is_finite() {
            warn!("demo.jitter {} is not finite, disabling jitter", demo.jitter);
            demo.jitter = 0.0;
        }
        demo.jitter = demo.jitter.abs();
        if !demo.duration.is_finite() {
            warn!("demo.duration {} is not finite, using {}", demo.duration, defaults.duration);
            demo.duration = defaults.duration;
        }
        if !self.reveal.stagger.is_finite() || self.reveal.stagger < 0.0 {
            self.reveal.stagger = 0.0;
        }
        self
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::path()?;
        if let Some(config_dir) = config_path.parent() {
            std::fs::create_dir_all(config_dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Spring used for scroll smoothing; degenerate when animations are off
    /// so values pass straight through.
    pub fn smoothing(&self) -> SpringParams {
        if self.animations_enabled {
            self.spring
        } else {
            SpringParams {
                stiffness: 0.0,
                ..self.spring
            }
        }
    }

    /// Timing for reveal tweens; instant when animations are off.
    pub fn reveal_transition(&self) -> Transition {
        if self.animations_enabled {
            Transition::default()
        } else {
            Transition::new(0.0, Easing::Linear)
        }
    }

    /// Per-item reveal delay; no stagger when animations are off.
    pub fn reveal_stagger(&self) -> f32 {
        if self.animations_enabled {
            self.reveal.stagger
        } else {
            0.0
        }
    }

    pub fn counter_duration(&self) -> f32 {
        if self.animations_enabled {
            self.counter.duration
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn partial_tables_fill_in_defaults() {
        let config = Config::from_toml(
            r#"
            fps_cap = 120

            [spring]
            stiffness = 300.0
            damping = 30.0

            [counter]
            easing = "ease_in_out"

            [reveal]
            margin = "-20%"
            "#,
        )
        .unwrap();
        assert_eq!(config.fps_cap, 120);
        assert_eq!(config.spring.mass, 1.0);
        assert_eq!(config.counter.easing, Easing::EaseInOut);
        assert_eq!(config.counter.duration, 2.0);
        assert_eq!(config.reveal.margin, Margin::Percent(-20.0));
        assert!(config.reveal.once);
        assert!(config.animations_enabled);
    }

    #[test]
    fn unknown_easing_is_an_error() {
        assert!(Config::from_toml("[counter]\neasing = \"wobble\"").is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn disabled_animations_collapse_timing() {
        let config = Config {
            animations_enabled: false,
            ..Config::default()
        };
        assert_eq!(config.counter_duration(), 0.0);
        assert!(!config.smoothing().is_valid());
        assert_eq!(config.reveal_transition().duration, 0.0);
        assert_eq!(config.reveal_stagger(), 0.0);
    }

    #[test]
    fn non_finite_demo_values_are_replaced() {
        let config = Config::from_toml(
            r#"
            [demo]
            jitter = inf
            scroll_speed = nan
            viewport_height = -10.0
            "#,
        )
        .unwrap();
        assert_eq!(config.demo.jitter, 0.0);
        assert_eq!(config.demo.scroll_speed, DemoConfig::default().scroll_speed);
        assert_eq!(config.demo.viewport_height, DemoConfig::default().viewport_height);
    }

    #[test]
    fn negative_jitter_becomes_its_magnitude() {
        let config = Config::from_toml("[demo]\njitter = -5.0").unwrap();
        assert_eq!(config.demo.jitter, 5.0);
    }
}
