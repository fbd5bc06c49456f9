use crate::math::unit_dquat;
use crate::warn_once;
use glam::{DMat4, DQuat, DVec3};
use log::trace;
use vrdriver::{self as vr, ServerDriverHost};

/// The headset's world pose, captured once per frame and shared by both hands.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReferenceFrame {
    pub position: DVec3,
    pub orientation: DQuat,
    pub transform: DMat4,
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            transform: DMat4::IDENTITY,
        }
    }
}

impl ReferenceFrame {
    /// Re-reads the headset pose. An invalid pose leaves the previous values in place.
    /// Returns whether the frame was updated.
    pub fn refresh(&mut self, host: &(impl ServerDriverHost + ?Sized)) -> bool {
        let mut poses = [vr::TrackedDevicePose::default(); 1];
        host.get_raw_tracked_device_poses(&mut poses);
        let [pose] = poses;

        if !pose.pose_is_valid {
            warn_once!("headset pose unavailable, keeping last reference frame");
            return false;
        }

        let affine = vr::matrix34_to_affine(&pose.device_to_absolute_tracking);
        let (_, rotation, translation) = affine.to_scale_rotation_translation();
        self.position = translation;
        self.orientation = unit_dquat(rotation);
        self.transform = DMat4::from(affine);
        trace!("reference frame: {:?} {:?}", self.position, self.orientation);
        true
    }

    /// Moves a point given in headset space into world space.
    #[inline]
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.transform.transform_point3(local)
    }
}
