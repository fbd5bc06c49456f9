//! Raw hand data as delivered by the hand tracker, in tracker space (millimeters).

use glam::{Quat, Vec3};
use vrdriver::ControllerRole;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// The controller role this hand presents as when nothing else claims it.
    #[inline]
    pub fn role(self) -> ControllerRole {
        match self {
            Self::Left => ControllerRole::LeftHand,
            Self::Right => ControllerRole::RightHand,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Finger {
    Thumb = 0,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bone {
    pub prev_joint: Vec3,
    pub next_joint: Vec3,
    pub rotation: Quat,
}

impl Bone {
    #[inline]
    pub fn length(&self) -> f32 {
        self.prev_joint.distance(self.next_joint)
    }

    /// Unit vector from the previous joint to the next one, zero for degenerate bones.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        (self.next_joint - self.prev_joint).normalize_or_zero()
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.prev_joint + self.next_joint) * 0.5
    }
}

/// Metacarpal, proximal, intermediate, distal. The thumb's metacarpal has zero length.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Digit {
    pub bones: [Bone; 4],
}

impl Digit {
    #[inline]
    pub fn tip(&self) -> Vec3 {
        self.bones[3].next_joint
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Palm {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Rotation of the basis {normal x direction, -normal, -direction}.
    pub orientation: Quat,
    pub width: f32,
}

impl Palm {
    /// Unit vector pointing out of the palm.
    #[inline]
    pub fn normal(&self) -> Vec3 {
        -(self.orientation * Vec3::Y)
    }

    /// Unit vector from the palm towards the fingers.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        -(self.orientation * Vec3::Z)
    }

    #[inline]
    pub fn lateral(&self) -> Vec3 {
        self.orientation * Vec3::X
    }
}

/// One frame of tracking data for one hand.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HandSample {
    pub side: Hand,
    pub palm: Palm,
    /// The forearm's next joint.
    pub wrist: Vec3,
    pub digits: [Digit; 5],
}

impl HandSample {
    #[inline]
    pub fn digit(&self, finger: Finger) -> &Digit {
        &self.digits[finger as usize]
    }

    #[inline]
    pub fn fingertip(&self, finger: Finger) -> Vec3 {
        self.digit(finger).tip()
    }
}
