//! Continuous gesture intensities computed from one frame of joint geometry.

use crate::math::normalize_range;
use crate::sample::{Digit, Finger, HandSample};
use glam::Vec3;
use std::f32::consts::{FRAC_PI_4, PI};
use std::ops::Index;

/// Summed joint angle at which a finger starts to count as bent, radians.
const BEND_START: f32 = FRAC_PI_4;
const BEND_FULL: f32 = PI;

/// Thumb tip to palm center distances, millimeters.
const THUMB_PRESS_FAR: f32 = 70.0;
const THUMB_PRESS_NEAR: f32 = 30.0;

/// Other hand's index tip to a touch target, millimeters.
const TOUCH_FAR: f32 = 60.0;
const TOUCH_NEAR: f32 = 20.0;

/// How far in front of (or behind) the palm center the palm touch targets sit.
const PALM_SURFACE: f32 = 20.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    Trigger = 0,
    Grab,
    ThumbPress,
    /// Other hand's index on the back of this hand.
    OpisthenarTouch,
    PalmTouch,
    MiddleCrossTouch,
    ThumbCrossTouch,
    IndexBend,
    MiddleBend,
    RingBend,
    PinkyBend,
    PalmPointX,
    PalmPointY,
}

impl Gesture {
    pub const COUNT: usize = 13;
    pub const ALL: [Gesture; Self::COUNT] = [
        Gesture::Trigger,
        Gesture::Grab,
        Gesture::ThumbPress,
        Gesture::OpisthenarTouch,
        Gesture::PalmTouch,
        Gesture::MiddleCrossTouch,
        Gesture::ThumbCrossTouch,
        Gesture::IndexBend,
        Gesture::MiddleBend,
        Gesture::RingBend,
        Gesture::PinkyBend,
        Gesture::PalmPointX,
        Gesture::PalmPointY,
    ];
}

/// One value in [0, 1] per [`Gesture`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GestureVector([f32; Gesture::COUNT]);

impl Index<Gesture> for GestureVector {
    type Output = f32;

    fn index(&self, gesture: Gesture) -> &f32 {
        &self.0[gesture as usize]
    }
}

impl GestureVector {
    /// Builds a vector from explicit values, clamped into [0, 1].
    pub fn from_values(values: impl IntoIterator<Item = (Gesture, f32)>) -> Self {
        let mut ret = Self::default();
        for (gesture, value) in values {
            ret.set(gesture, value);
        }
        ret
    }

    #[inline]
    fn set(&mut self, gesture: Gesture, value: f32) {
        self.0[gesture as usize] = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Extracts every gesture from `hand`. Two handed gestures read zero without `other`.
    pub fn extract(hand: &HandSample, other: Option<&HandSample>) -> Self {
        let mut ret = Self::default();

        let bends = [
            Finger::Index,
            Finger::Middle,
            Finger::Ring,
            Finger::Pinky,
        ]
        .map(|finger| finger_bend(hand.digit(finger)));
        let [index, middle, ring, pinky] = bends;

        ret.set(Gesture::IndexBend, index);
        ret.set(Gesture::MiddleBend, middle);
        ret.set(Gesture::RingBend, ring);
        ret.set(Gesture::PinkyBend, pinky);
        ret.set(Gesture::Trigger, index);
        ret.set(Gesture::Grab, (middle + ring + pinky) / 3.0);

        let palm = &hand.palm;
        let thumb_tip = hand.fingertip(Finger::Thumb);
        ret.set(
            Gesture::ThumbPress,
            normalize_range(
                thumb_tip.distance(palm.position),
                THUMB_PRESS_FAR,
                THUMB_PRESS_NEAR,
            ),
        );

        let width = palm.width.max(1.0);
        let from_palm = thumb_tip - palm.position;
        ret.set(
            Gesture::PalmPointX,
            0.5 + from_palm.dot(palm.lateral()) / width,
        );
        ret.set(
            Gesture::PalmPointY,
            0.5 + from_palm.dot(palm.direction()) / width,
        );

        if let Some(other) = other {
            let pointer = other.fingertip(Finger::Index);
            let touch = |target: Vec3| {
                normalize_range(pointer.distance(target), TOUCH_FAR, TOUCH_NEAR)
            };
            let normal = palm.normal();
            ret.set(
                Gesture::OpisthenarTouch,
                touch(palm.position - normal * PALM_SURFACE),
            );
            ret.set(
                Gesture::PalmTouch,
                touch(palm.position + normal * PALM_SURFACE),
            );
            ret.set(
                Gesture::MiddleCrossTouch,
                touch(hand.digit(Finger::Middle).bones[1].center()),
            );
            ret.set(
                Gesture::ThumbCrossTouch,
                touch(hand.digit(Finger::Thumb).bones[2].center()),
            );
        }

        ret
    }
}

/// Angle between two bone directions; zero when either bone is degenerate.
fn joint_angle(a: Vec3, b: Vec3) -> f32 {
    if a == Vec3::ZERO || b == Vec3::ZERO {
        return 0.0;
    }
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Total flexion along a digit, mapped onto [0, 1].
fn finger_bend(digit: &Digit) -> f32 {
    let total: f32 = digit
        .bones
        .windows(2)
        .map(|pair| joint_angle(pair[0].direction(), pair[1].direction()))
        .sum();
    normalize_range(total, BEND_START, BEND_FULL)
}
