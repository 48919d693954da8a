use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Tunable constants for the whole comparison and training pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub normalization: NormalizationConfig,

    #[serde(default)]
    pub comparison: ComparisonConfig,

    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub positioning: PositioningConfig,
}

/// Vertical origin of incoming detector coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrigin {
    BottomLeft,
    TopLeft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationConfig {
    /// Detector joints below this confidence are dropped
    #[serde(default = "default_normalization_min_confidence")]
    pub min_confidence: f64,

    #[serde(default = "default_source_origin")]
    pub source_origin: CoordinateOrigin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Either side below this confidence excludes the joint from scoring
    #[serde(default = "default_comparison_min_confidence")]
    pub min_confidence: f64,

    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Distance above which a correction message is produced
    #[serde(default = "default_joint_distance_threshold")]
    pub joint_distance_threshold: f64,

    #[serde(default = "default_important_joint_weight")]
    pub important_joint_weight: f64,

    #[serde(default = "default_max_feedback_messages")]
    pub max_feedback_messages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Shoulders and neck below this confidence are not used as the tracking point
    #[serde(default = "default_centroid_min_confidence")]
    pub centroid_min_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_hold_duration_ms")]
    pub hold_duration_ms: u64,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Pause between a completed pose and the next reference being installed
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: u64,

    /// How long a confirmed person may be missing before the session resets
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Minimum spacing between correction hints
    #[serde(default = "default_feedback_cooldown_ms")]
    pub feedback_cooldown_ms: u64,

    #[serde(default = "default_true")]
    pub require_positioning: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositioningConfig {
    #[serde(default = "default_min_body_height_ratio")]
    pub min_body_height_ratio: f64,

    #[serde(default = "default_max_body_height_ratio")]
    pub max_body_height_ratio: f64,

    /// Allowed horizontal offset of the body center from the frame center
    #[serde(default = "default_center_tolerance")]
    pub center_tolerance: f64,

    #[serde(default = "default_key_joint_min_confidence")]
    pub key_joint_min_confidence: f64,

    #[serde(default = "default_min_visible_key_joints")]
    pub min_visible_key_joints: usize,

    /// Nose and ankle confidence needed to measure height from joints
    #[serde(default = "default_height_joint_min_confidence")]
    pub height_joint_min_confidence: f64,

    #[serde(default = "default_stabilization_ms")]
    pub stabilization_ms: u64,
}

// Default value functions
fn default_normalization_min_confidence() -> f64 {
    0.1
}

fn default_source_origin() -> CoordinateOrigin {
    CoordinateOrigin::BottomLeft
}

fn default_comparison_min_confidence() -> f64 {
    0.3
}

fn default_similarity_threshold() -> f64 {
    0.75
}

fn default_joint_distance_threshold() -> f64 {
    0.1
}

fn default_important_joint_weight() -> f64 {
    2.0
}

fn default_max_feedback_messages() -> usize {
    2
}

fn default_centroid_min_confidence() -> f64 {
    0.3
}

fn default_hold_duration_ms() -> u64 {
    3000
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_advance_delay_ms() -> u64 {
    1000
}

fn default_grace_period_ms() -> u64 {
    2000
}

fn default_feedback_cooldown_ms() -> u64 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_min_body_height_ratio() -> f64 {
    0.25
}

fn default_max_body_height_ratio() -> f64 {
    0.85
}

fn default_center_tolerance() -> f64 {
    0.15
}

fn default_key_joint_min_confidence() -> f64 {
    0.2
}

fn default_min_visible_key_joints() -> usize {
    4
}

fn default_height_joint_min_confidence() -> f64 {
    0.3
}

fn default_stabilization_ms() -> u64 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            normalization: NormalizationConfig::default(),
            comparison: ComparisonConfig::default(),
            selection: SelectionConfig::default(),
            training: TrainingConfig::default(),
            positioning: PositioningConfig::default(),
        }
    }
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_normalization_min_confidence(),
            source_origin: default_source_origin(),
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_comparison_min_confidence(),
            similarity_threshold: default_similarity_threshold(),
            joint_distance_threshold: default_joint_distance_threshold(),
            important_joint_weight: default_important_joint_weight(),
            max_feedback_messages: default_max_feedback_messages(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            centroid_min_confidence: default_centroid_min_confidence(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            hold_duration_ms: default_hold_duration_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            advance_delay_ms: default_advance_delay_ms(),
            grace_period_ms: default_grace_period_ms(),
            feedback_cooldown_ms: default_feedback_cooldown_ms(),
            require_positioning: default_true(),
        }
    }
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            min_body_height_ratio: default_min_body_height_ratio(),
            max_body_height_ratio: default_max_body_height_ratio(),
            center_tolerance: default_center_tolerance(),
            key_joint_min_confidence: default_key_joint_min_confidence(),
            min_visible_key_joints: default_min_visible_key_joints(),
            height_joint_min_confidence: default_height_joint_min_confidence(),
            stabilization_ms: default_stabilization_ms(),
        }
    }
}

impl TrainingConfig {
    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_duration_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn feedback_cooldown(&self) -> Duration {
        Duration::from_millis(self.feedback_cooldown_ms)
    }
}

impl PositioningConfig {
    pub fn stabilization(&self) -> Duration {
        Duration::from_millis(self.stabilization_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check ranges and cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_fields = [
            ("normalization.min_confidence", self.normalization.min_confidence),
            ("comparison.min_confidence", self.comparison.min_confidence),
            ("comparison.similarity_threshold", self.comparison.similarity_threshold),
            ("comparison.joint_distance_threshold", self.comparison.joint_distance_threshold),
            ("selection.centroid_min_confidence", self.selection.centroid_min_confidence),
            ("positioning.min_body_height_ratio", self.positioning.min_body_height_ratio),
            ("positioning.max_body_height_ratio", self.positioning.max_body_height_ratio),
            ("positioning.center_tolerance", self.positioning.center_tolerance),
            ("positioning.key_joint_min_confidence", self.positioning.key_joint_min_confidence),
            ("positioning.height_joint_min_confidence", self.positioning.height_joint_min_confidence),
        ];

        for (name, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.comparison.important_joint_weight <= 0.0 {
            return Err(ConfigError::Invalid(
                "comparison.important_joint_weight must be positive".to_string(),
            ));
        }

        if self.positioning.min_body_height_ratio > self.positioning.max_body_height_ratio {
            return Err(ConfigError::Invalid(
                "positioning.min_body_height_ratio exceeds max_body_height_ratio".to_string(),
            ));
        }

        if self.positioning.min_visible_key_joints > crate::models::POSITIONING_KEY_JOINTS.len() {
            return Err(ConfigError::Invalid(format!(
                "positioning.min_visible_key_joints cannot exceed {}",
                crate::models::POSITIONING_KEY_JOINTS.len()
            )));
        }

        if self.training.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "training.tick_interval_ms must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.comparison.similarity_threshold, 0.75);
        assert_eq!(config.training.hold_duration(), Duration::from_secs(3));
        assert_eq!(config.training.grace_period(), Duration::from_secs(2));
        assert_eq!(config.normalization.source_origin, CoordinateOrigin::BottomLeft);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [comparison]
            similarity_threshold = 0.85

            [training]
            hold_duration_ms = 10000
            "#,
        )
        .unwrap();

        assert_eq!(config.comparison.similarity_threshold, 0.85);
        assert_eq!(config.comparison.min_confidence, 0.3);
        assert_eq!(config.training.hold_duration(), Duration::from_secs(10));
        assert_eq!(config.training.tick_interval_ms, 100);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let result = Config::from_toml_str("[comparison]\nsimilarity_threshold = 1.5\n");
        assert_matches!(result, Err(ConfigError::Invalid(msg)) if msg.contains("similarity_threshold"));
    }

    #[test]
    fn test_inverted_height_ratio_rejected() {
        let result = Config::from_toml_str(
            "[positioning]\nmin_body_height_ratio = 0.9\nmax_body_height_ratio = 0.5\n",
        );
        assert_matches!(result, Err(ConfigError::Invalid(_)));
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.training.grace_period_ms = 2500;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let loaded = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }
}
