//! Per-frame negotiation of which device gets to be the left or right hand.
//!
//! Every hand decides on its own from a snapshot of all devices taken at the start of the
//! frame. A hand that finds another driver's controller for the same side (or one that opted
//! out of a side) within [`CONFLICT_DISTANCE`] of itself steps down and hands the role to that
//! controller. Nothing carries over between frames.

use crate::sample::Hand;
use glam::DVec3;
use log::debug;
use vrdriver::{
    self as vr, ControllerRole, Properties, ServerDriverHost, TrackedDeviceIndex,
    MAX_TRACKED_DEVICE_COUNT,
};

/// Meters.
pub const CONFLICT_DISTANCE: f64 = 0.28;

#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotEntry {
    pub index: TrackedDeviceIndex,
    pub position: DVec3,
    pub role: ControllerRole,
    pub resource_root: Option<String>,
    pub pose_is_valid: bool,
}

/// Poses, role hints and resource roots of every connected device at one instant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviceSnapshot {
    entries: Vec<SnapshotEntry>,
}

impl DeviceSnapshot {
    pub fn capture(host: &(impl ServerDriverHost + Properties + ?Sized)) -> Self {
        let mut poses = [vr::TrackedDevicePose::default(); MAX_TRACKED_DEVICE_COUNT];
        host.get_raw_tracked_device_poses(&mut poses);

        let entries = poses
            .iter()
            .enumerate()
            .filter(|(_, pose)| pose.device_is_connected || pose.pose_is_valid)
            .map(|(idx, pose)| {
                let index = idx as TrackedDeviceIndex;
                SnapshotEntry {
                    index,
                    position: vr::matrix34_to_affine(&pose.device_to_absolute_tracking)
                        .translation,
                    role: host.controller_role_hint(index),
                    resource_root: host.resource_root(index),
                    pose_is_valid: pose.pose_is_valid,
                }
            })
            .collect();

        Self { entries }
    }

    pub fn from_entries(entries: Vec<SnapshotEntry>) -> Self {
        Self { entries }
    }

    #[inline]
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RoleClaim {
    pub role: ControllerRole,
    pub priority: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arbitration {
    pub claim: RoleClaim,
    /// Role hints to push onto other devices.
    pub nudges: Vec<(TrackedDeviceIndex, ControllerRole)>,
}

impl Arbitration {
    /// Whether this hand lost its role to another device this frame.
    #[inline]
    pub fn conceded(&self) -> bool {
        self.claim.role == ControllerRole::Invalid
    }
}

pub fn arbitrate(
    hand: Hand,
    position: DVec3,
    snapshot: &DeviceSnapshot,
    own_resource_root: &str,
) -> Arbitration {
    let role = hand.role();
    let nudges: Vec<_> = snapshot
        .entries()
        .iter()
        .filter(|entry| {
            entry.pose_is_valid && entry.resource_root.as_deref() != Some(own_resource_root)
        })
        .filter(|entry| entry.role == role || entry.role == ControllerRole::OptOut)
        .filter(|entry| entry.position.distance(position) < CONFLICT_DISTANCE)
        .map(|entry| (entry.index, role))
        .collect();

    if nudges.is_empty() {
        return Arbitration {
            claim: RoleClaim {
                role,
                priority: i32::MAX,
            },
            nudges,
        };
    }

    debug!(
        "{} hand conceding to device(s) {:?}",
        hand.as_str(),
        nudges.iter().map(|(idx, _)| idx).collect::<Vec<_>>()
    );
    Arbitration {
        claim: RoleClaim {
            role: ControllerRole::Invalid,
            priority: i32::MIN,
        },
        nudges,
    }
}
