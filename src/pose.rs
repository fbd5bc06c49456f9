use crate::config::{DriverConfig, OrientationMode};
use crate::math::{
    desktop_tracker_to_meters, hmd_tracker_to_meters, unit_dquat, HALF_PI_Z_F64,
    NEG_HALF_PI_Z_F64, REVERSE_ROTATION,
};
use crate::reference::ReferenceFrame;
use crate::sample::{Hand, HandSample};
use glam::{DQuat, DVec3};
use vrdriver::{self as vr, TrackingResult};

/// The rigid pose a hand presents to the host.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pose {
    pub position: DVec3,
    pub orientation: DQuat,
    pub velocity: DVec3,
    pub result: TrackingResult,
    pub valid: bool,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            velocity: DVec3::ZERO,
            result: TrackingResult::Uninitialized,
            valid: false,
        }
    }
}

impl Pose {
    /// Advances the pose by one frame. Without a sample the last position and orientation
    /// are kept and the pose is either frozen or reported out of range.
    pub fn update(
        &mut self,
        hand: Hand,
        sample: Option<&HandSample>,
        reference: &ReferenceFrame,
        config: &DriverConfig,
    ) {
        let Some(sample) = sample else {
            self.velocity = DVec3::ZERO;
            if config.hands_reset {
                self.result = TrackingResult::RunningOutOfRange;
                self.valid = false;
            } else {
                self.result = TrackingResult::RunningOk;
                self.valid = true;
            }
            return;
        };

        match config.orientation_mode {
            OrientationMode::HeadRelative => {
                self.update_head_relative(hand, sample, reference, config)
            }
            OrientationMode::DesktopRelative => self.update_desktop(hand, sample, config),
        }
        self.result = TrackingResult::RunningOk;
        self.valid = true;
    }

    fn update_head_relative(
        &mut self,
        hand: Hand,
        sample: &HandSample,
        reference: &ReferenceFrame,
        config: &DriverConfig,
    ) {
        let local = hmd_tracker_to_meters(sample.wrist) + config.hand_offset(hand);
        self.position = reference.to_world(local);

        let palm = sample.palm.orientation.as_dquat();
        self.orientation = unit_dquat(
            reference.orientation
                * (REVERSE_ROTATION * palm * config.hand_offset_rotation(hand)),
        );

        self.velocity = if config.use_velocity {
            reference.orientation * hmd_tracker_to_meters(sample.palm.velocity)
        } else {
            DVec3::ZERO
        };
    }

    fn update_desktop(&mut self, hand: Hand, sample: &HandSample, config: &DriverConfig) {
        self.position = desktop_tracker_to_meters(sample.palm.position)
            + config.hand_offset(hand)
            + config.desktop_offset;

        let side = match hand {
            Hand::Left => NEG_HALF_PI_Z_F64,
            Hand::Right => HALF_PI_Z_F64,
        };
        let palm = sample.palm.orientation.as_dquat();
        self.orientation = unit_dquat(palm * side * config.hand_offset_rotation(hand));

        self.velocity = if config.use_velocity {
            desktop_tracker_to_meters(sample.palm.velocity)
        } else {
            DVec3::ZERO
        };
    }

    /// Takes the pose out of play for this frame.
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.result = TrackingResult::RunningOutOfRange;
    }

    pub fn to_driver_pose(&self, connected: bool) -> vr::DriverPose {
        vr::DriverPose {
            pose_time_offset: 0.0,
            position: self.position.to_array(),
            rotation: self.orientation.into(),
            velocity: self.velocity.to_array(),
            result: self.result,
            pose_is_valid: self.valid,
            device_is_connected: connected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::fixtures::{open_hand, translated};
    use glam::{Quat, Vec3};

    fn config(mode: OrientationMode) -> DriverConfig {
        DriverConfig {
            orientation_mode: mode,
            left_hand_offset: DVec3::new(0.1, -0.05, 0.02),
            right_hand_offset: DVec3::new(-0.1, -0.05, 0.02),
            ..Default::default()
        }
    }

    fn at_origin(hand: Hand) -> HandSample {
        let sample = open_hand(hand);
        translated(sample, -sample.wrist)
    }

    #[test]
    fn head_relative_wrist_at_origin_lands_on_offset() {
        let config = config(OrientationMode::HeadRelative);
        let mut pose = Pose::default();
        pose.update(
            Hand::Left,
            Some(&at_origin(Hand::Left)),
            &ReferenceFrame::default(),
            &config,
        );
        assert_eq!(pose.position, config.left_hand_offset);
        assert_eq!(pose.result, TrackingResult::RunningOk);
        assert!(pose.valid);
        assert_eq!(pose.velocity, DVec3::ZERO);
        assert!(pose.orientation.is_normalized());
    }

    #[test]
    fn head_relative_follows_the_headset() {
        let config = config(OrientationMode::HeadRelative);
        let mut reference = ReferenceFrame::default();
        reference.position = DVec3::new(0.0, 1.7, 0.0);
        reference.orientation = DQuat::from_rotation_y(std::f64::consts::PI);
        reference.transform =
            glam::DMat4::from_rotation_translation(reference.orientation, reference.position);

        let mut sample = at_origin(Hand::Right);
        // 100mm along the tracker's x, which is the headset's -x
        sample = translated(sample, Vec3::new(100.0, 0.0, 0.0));

        let mut pose = Pose::default();
        pose.update(Hand::Right, Some(&sample), &reference, &config);
        let local = DVec3::new(-0.1, 0.0, 0.0) + config.right_hand_offset;
        let expected = reference.orientation * local + reference.position;
        assert!(pose.position.abs_diff_eq(expected, 1e-9), "{:?}", pose.position);

        let rot = reference.orientation * REVERSE_ROTATION;
        assert!(pose.orientation.abs_diff_eq(rot, 1e-9));
    }

    #[test]
    fn velocity_only_when_enabled() {
        let mut config = config(OrientationMode::HeadRelative);
        let mut sample = at_origin(Hand::Left);
        sample.palm.velocity = Vec3::new(0.0, 0.0, -500.0);

        let mut pose = Pose::default();
        pose.update(Hand::Left, Some(&sample), &ReferenceFrame::default(), &config);
        assert_eq!(pose.velocity, DVec3::ZERO);

        config.use_velocity = true;
        pose.update(Hand::Left, Some(&sample), &ReferenceFrame::default(), &config);
        assert!(pose.velocity.abs_diff_eq(DVec3::new(0.0, 0.5, 0.0), 1e-9));
    }

    #[test]
    fn desktop_ignores_reference_frame() {
        let mut config = config(OrientationMode::DesktopRelative);
        config.desktop_offset = DVec3::new(0.0, 1.0, -0.3);
        let mut reference = ReferenceFrame::default();
        reference.position = DVec3::new(5.0, 5.0, 5.0);
        reference.orientation = DQuat::from_rotation_x(1.0);

        let sample = translated(open_hand(Hand::Left), Vec3::new(0.0, 200.0, 0.0));
        let mut pose = Pose::default();
        pose.update(Hand::Left, Some(&sample), &reference, &config);
        let expected = DVec3::new(0.0, 0.2, 0.0) + config.left_hand_offset + config.desktop_offset;
        assert!(pose.position.abs_diff_eq(expected, 1e-9));
        assert!(pose.orientation.abs_diff_eq(NEG_HALF_PI_Z_F64, 1e-9));

        pose.update(Hand::Right, Some(&sample), &reference, &config);
        assert!(pose.orientation.abs_diff_eq(HALF_PI_Z_F64, 1e-9));
    }

    #[test]
    fn lost_hand_freezes_in_place() {
        let mut config = config(OrientationMode::HeadRelative);
        config.use_velocity = true;
        let mut sample = at_origin(Hand::Left);
        sample.palm.velocity = Vec3::ONE * 100.0;
        sample.palm.orientation = Quat::from_rotation_z(0.4);

        let mut pose = Pose::default();
        pose.update(Hand::Left, Some(&sample), &ReferenceFrame::default(), &config);
        let tracked = pose;
        assert_ne!(tracked.velocity, DVec3::ZERO);

        pose.update(Hand::Left, None, &ReferenceFrame::default(), &config);
        assert_eq!(pose.velocity, DVec3::ZERO);
        assert_eq!(pose.position, tracked.position);
        assert_eq!(pose.orientation, tracked.orientation);
        assert_eq!(pose.result, TrackingResult::RunningOk);
        assert!(pose.valid);
    }

    #[test]
    fn lost_hand_with_reset_goes_out_of_range() {
        let mut config = config(OrientationMode::HeadRelative);
        config.hands_reset = true;
        let mut pose = Pose::default();
        pose.update(
            Hand::Right,
            Some(&at_origin(Hand::Right)),
            &ReferenceFrame::default(),
            &config,
        );
        let tracked = pose;

        pose.update(Hand::Right, None, &ReferenceFrame::default(), &config);
        assert_eq!(pose.result, TrackingResult::RunningOutOfRange);
        assert!(!pose.valid);
        assert_eq!(pose.position, tracked.position);
    }

    #[test]
    fn orientation_stays_unit_for_unnormalized_input() {
        let config = config(OrientationMode::HeadRelative);
        let mut sample = at_origin(Hand::Left);
        sample.palm.orientation = Quat::from_xyzw(0.3, 0.9, -0.2, 1.4);
        let mut pose = Pose::default();
        pose.update(Hand::Left, Some(&sample), &ReferenceFrame::default(), &config);
        assert!((pose.orientation.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn driver_pose_carries_connection() {
        let pose = Pose {
            position: DVec3::new(1.0, 2.0, 3.0),
            result: TrackingResult::RunningOk,
            valid: true,
            ..Default::default()
        };
        let out = pose.to_driver_pose(false);
        assert_eq!(out.position, [1.0, 2.0, 3.0]);
        assert!(out.pose_is_valid);
        assert!(!out.device_is_connected);
        assert_eq!(out.rotation, vr::HmdQuaternion::IDENTITY);
    }
}
