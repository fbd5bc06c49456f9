use crate::math::unit_dquat;
use crate::sample::Hand;
use derive_more::{Display, From};
use glam::{DQuat, DVec3};
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;
use vrdriver as vr;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum OrientationMode {
    /// The tracker rides on the headset; hands are anchored to its moving frame.
    #[default]
    #[serde(rename = "hmd")]
    HeadRelative,
    /// The tracker sits on the desk; the headset frame is ignored.
    #[serde(rename = "desktop")]
    DesktopRelative,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingLevel {
    Partial,
    #[default]
    Full,
}

impl From<TrackingLevel> for vr::SkeletalTrackingLevel {
    fn from(value: TrackingLevel) -> Self {
        match value {
            TrackingLevel::Partial => Self::Partial,
            TrackingLevel::Full => Self::Full,
        }
    }
}

/// Where the finger chains' root bones are placed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnuckleLayout {
    /// A fixed spread scaled by palm width.
    #[default]
    Canonical,
    /// The tracker's metacarpal joints, expressed in the reconstructed hand basis.
    Tracked,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub orientation_mode: OrientationMode,
    pub left_hand_offset: DVec3,
    pub right_hand_offset: DVec3,
    /// [x, y, z, w]
    pub left_hand_offset_rotation: DQuat,
    /// [x, y, z, w]
    pub right_hand_offset_rotation: DQuat,
    pub desktop_offset: DVec3,
    pub use_velocity: bool,
    /// Report hands as out of range when tracking is lost instead of freezing them in place.
    pub hands_reset: bool,
    pub tracking_level: TrackingLevel,
    pub knuckle_layout: KnuckleLayout,
    /// Negotiate hand roles against other drivers' controllers.
    pub arbitration: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            orientation_mode: OrientationMode::HeadRelative,
            left_hand_offset: DVec3::ZERO,
            right_hand_offset: DVec3::ZERO,
            left_hand_offset_rotation: DQuat::IDENTITY,
            right_hand_offset_rotation: DQuat::IDENTITY,
            desktop_offset: DVec3::ZERO,
            use_velocity: false,
            hands_reset: false,
            tracking_level: TrackingLevel::Full,
            knuckle_layout: KnuckleLayout::Canonical,
            arbitration: true,
        }
    }
}

#[derive(Debug, Display, From)]
pub enum ConfigError {
    #[display("failed to read config: {_0}")]
    Io(std::io::Error),
    #[display("invalid config: {_0}")]
    Json(serde_json::Error),
}

impl std::error::Error for ConfigError {}

impl DriverConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.left_hand_offset_rotation = unit_dquat(config.left_hand_offset_rotation);
        config.right_hand_offset_rotation = unit_dquat(config.right_hand_offset_rotation);
        debug!("parsed config: {config:?}");
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!("loaded config from {path:?}");
        Ok(config)
    }

    #[inline]
    pub fn hand_offset(&self, hand: Hand) -> DVec3 {
        match hand {
            Hand::Left => self.left_hand_offset,
            Hand::Right => self.right_hand_offset,
        }
    }

    #[inline]
    pub fn hand_offset_rotation(&self, hand: Hand) -> DQuat {
        match hand {
            Hand::Left => self.left_hand_offset_rotation,
            Hand::Right => self.right_hand_offset_rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(DriverConfig::from_json_str("{}").unwrap(), DriverConfig::default());
    }

    #[test]
    fn parses_every_option() {
        let config = DriverConfig::from_json_str(
            r#"{
                "orientation_mode": "desktop",
                "left_hand_offset": [0.1, -0.2, 0.3],
                "right_hand_offset": [-0.1, -0.2, 0.3],
                "left_hand_offset_rotation": [0.0, 0.0, 0.0, 2.0],
                "right_hand_offset_rotation": [0.0, 1.0, 0.0, 0.0],
                "desktop_offset": [0.0, 1.0, -0.5],
                "use_velocity": true,
                "hands_reset": true,
                "tracking_level": "partial",
                "knuckle_layout": "tracked",
                "arbitration": false,
                "some_future_option": 12
            }"#,
        )
        .unwrap();

        assert_eq!(config.orientation_mode, OrientationMode::DesktopRelative);
        assert_eq!(config.hand_offset(Hand::Left), DVec3::new(0.1, -0.2, 0.3));
        assert_eq!(config.hand_offset(Hand::Right), DVec3::new(-0.1, -0.2, 0.3));
        // normalized on load
        assert_eq!(config.hand_offset_rotation(Hand::Left), DQuat::IDENTITY);
        assert_eq!(
            config.hand_offset_rotation(Hand::Right),
            DQuat::from_xyzw(0.0, 1.0, 0.0, 0.0)
        );
        assert_eq!(config.desktop_offset, DVec3::new(0.0, 1.0, -0.5));
        assert!(config.use_velocity);
        assert!(config.hands_reset);
        assert_eq!(config.tracking_level, TrackingLevel::Partial);
        assert_eq!(config.knuckle_layout, KnuckleLayout::Tracked);
        assert!(!config.arbitration);
    }

    #[test]
    fn degenerate_rotation_becomes_identity() {
        let config =
            DriverConfig::from_json_str(r#"{"left_hand_offset_rotation": [0, 0, 0, 0]}"#).unwrap();
        assert_eq!(config.left_hand_offset_rotation, DQuat::IDENTITY);
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = DriverConfig::from_json_str(r#"{"orientation_mode": "sideways"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)), "{err}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = DriverConfig::load("/nonexistent/handrig.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
