#[path = "skeleton_generated.rs"]
mod gen;

use crate::config::KnuckleLayout;
use crate::math::{
    apply_ops, hand_basis, skeleton_tracker_to_meters, unit_quat, BasisOp, HALF_PI_X, HALF_PI_Y,
    HALF_PI_Z, NEG_QUARTER_PI_Y,
};
use crate::sample::{Finger, Hand, HandSample};
use crate::{tracy_span, warn_once};
use glam::{Affine3A, Quat, Vec3};
use vrdriver::BoneTransform;
use HandSkeletonBone::*;

pub const BONE_COUNT: usize = HandSkeletonBone::Count as usize;

/// Depth of each chain's root joint in front of the wrist, meters.
const ROOT_DEPTH: [f32; 5] = [0.02, 0.005, 0.01, 0.012, 0.007];
const THUMB_ROOT_LATERAL: f32 = 0.025;

#[repr(usize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HandSkeletonBone {
    Root = 0,
    Wrist,
    Thumb0,
    Thumb1,
    Thumb2,
    Thumb3,
    IndexFinger0,
    IndexFinger1,
    IndexFinger2,
    IndexFinger3,
    IndexFinger4,
    MiddleFinger0,
    MiddleFinger1,
    MiddleFinger2,
    MiddleFinger3,
    MiddleFinger4,
    RingFinger0,
    RingFinger1,
    RingFinger2,
    RingFinger3,
    RingFinger4,
    PinkyFinger0,
    PinkyFinger1,
    PinkyFinger2,
    PinkyFinger3,
    PinkyFinger4,
    AuxThumb,
    AuxIndexFinger,
    AuxMiddleFinger,
    AuxRingFinger,
    AuxPinkyFinger,
    Count,
}

/// First bone of each finger's chain, thumb first.
static CHAIN_ROOTS: [HandSkeletonBone; 5] =
    [Thumb0, IndexFinger0, MiddleFinger0, RingFinger0, PinkyFinger0];

/// Aux bone, its chain root, and how many chain bones lead up to the fingertip's last joint.
static AUX_BONES: [(HandSkeletonBone, HandSkeletonBone, usize); 5] = [
    (AuxThumb, Thumb0, 3),
    (AuxIndexFinger, IndexFinger0, 4),
    (AuxMiddleFinger, MiddleFinger0, 4),
    (AuxRingFinger, RingFinger0, 4),
    (AuxPinkyFinger, PinkyFinger0, 4),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Segment {
    FingerRoot,
    Finger,
    ThumbRoot,
    Thumb,
}

/// Basis corrections from the tracker's bone frames into the skeleton's, per hand.
struct Recipe {
    left: &'static [BasisOp],
    right: &'static [BasisOp],
}

impl Recipe {
    fn ops(&self, hand: Hand) -> &'static [BasisOp] {
        match hand {
            Hand::Left => self.left,
            Hand::Right => self.right,
        }
    }
}

const X: BasisOp = BasisOp::Then(HALF_PI_X);
const Y: BasisOp = BasisOp::Then(HALF_PI_Y);
const Z: BasisOp = BasisOp::Then(HALF_PI_Z);
const NEG_QUARTER_Y: BasisOp = BasisOp::Then(NEG_QUARTER_PI_Y);

fn recipe(segment: Segment) -> &'static Recipe {
    use BasisOp::*;

    static FINGER_ROOT: Recipe = Recipe {
        left: &[Z, Z, Y, Y],
        right: &[],
    };
    static FINGER: Recipe = Recipe {
        left: &[SwapXZ, NegZ, NegX, NegY],
        right: &[SwapXZ, NegZ],
    };
    static THUMB_ROOT: Recipe = Recipe {
        left: &[NegZ, NegX, SwapXZ, Y, Y, Z, X, X, Y, NegZ, Z, Z, Y, Y],
        right: &[SwapXZ, NegZ, X, X, Y, Y, Z, NEG_QUARTER_Y, NegZ],
    };
    static THUMB: Recipe = Recipe {
        left: &[SwapXZ, NegZ, NegX, NegY],
        right: &[SwapXZ, NegZ, NegY],
    };

    match segment {
        Segment::FingerRoot => &FINGER_ROOT,
        Segment::Finger => &FINGER,
        Segment::ThumbRoot => &THUMB_ROOT,
        Segment::Thumb => &THUMB,
    }
}

/// Rotation of the wrist bone relative to the skeleton root.
pub fn wrist_rotation(hand: Hand) -> Quat {
    let rot = HALF_PI_Z * HALF_PI_Z * HALF_PI_Z * HALF_PI_X * HALF_PI_X;
    match hand {
        Hand::Left => rot * HALF_PI_Z * HALF_PI_Z,
        Hand::Right => rot,
    }
}

#[inline]
fn bone_to_glam(transform: &BoneTransform) -> (Vec3, Quat) {
    (transform.position.into(), transform.orientation.into())
}

/// Child bones sit along the parent's x axis, which points the other way on the right hand.
#[inline]
fn segment_offset(hand: Hand, length: f32) -> Vec3 {
    match hand {
        Hand::Left => Vec3::new(length, 0.0, 0.0),
        Hand::Right => Vec3::new(-length, 0.0, 0.0),
    }
}

/// Chain roots on a fixed spread scaled by palm width (millimeters).
fn canonical_roots(hand: Hand, palm_width: f32) -> [Vec3; 5] {
    let knuckle = palm_width * 0.001 / 5.0;
    let thumb_x = match hand {
        Hand::Left => -THUMB_ROOT_LATERAL,
        Hand::Right => THUMB_ROOT_LATERAL,
    };
    std::array::from_fn(|i| {
        if i == Finger::Thumb as usize {
            Vec3::new(thumb_x, 2.0 * knuckle, ROOT_DEPTH[i])
        } else {
            let lateral = -2.5 * knuckle + (5 - i) as f32 * knuckle;
            Vec3::new(0.0, lateral, ROOT_DEPTH[i])
        }
    })
}

/// Index of the first meaningful bone in a digit; the thumb's metacarpal is degenerate.
#[inline]
fn first_segment(finger: Finger) -> usize {
    match finger {
        Finger::Thumb => 1,
        _ => 0,
    }
}

/// Chain roots at the tracked metacarpal bases, in the hand basis rebuilt from the knuckles.
fn tracked_roots(sample: &HandSample) -> Option<[Vec3; 5]> {
    let middle = sample.digit(Finger::Middle);
    let ring = sample.digit(Finger::Ring);
    let basis = hand_basis(
        middle.bones[0].prev_joint,
        middle.bones[1].prev_joint,
        ring.bones[0].prev_joint,
        ring.bones[1].prev_joint,
        sample.wrist,
    )?;
    let to_hand = basis.transpose();

    Some(Finger::ALL.map(|finger| {
        let base = sample.digit(finger).bones[first_segment(finger)].prev_joint;
        skeleton_tracker_to_meters(to_hand * (base - sample.wrist))
    }))
}

/// The 31 parent-relative bone transforms of one hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Skeleton {
    bones: [BoneTransform; BONE_COUNT],
}

impl Skeleton {
    pub fn open_hand(hand: Hand) -> Self {
        let bones = match hand {
            Hand::Left => gen::LEFT_OPEN_HAND,
            Hand::Right => mirror_open_hand(&gen::LEFT_OPEN_HAND),
        };
        Self { bones }
    }

    #[inline]
    pub fn transforms(&self) -> &[BoneTransform; BONE_COUNT] {
        &self.bones
    }

    #[inline]
    pub fn bone(&self, bone: HandSkeletonBone) -> (Vec3, Quat) {
        bone_to_glam(&self.bones[bone as usize])
    }

    #[inline]
    fn set(&mut self, idx: usize, position: Vec3, orientation: Quat) {
        self.bones[idx] = BoneTransform {
            position: position.into(),
            orientation: unit_quat(orientation).into(),
        };
    }

    /// Rebuilds every bone from `sample`, or falls back to the open hand without one.
    pub fn update(&mut self, hand: Hand, sample: Option<&HandSample>, layout: KnuckleLayout) {
        tracy_span!("Skeleton::update");
        match sample {
            Some(sample) => self.retarget(hand, sample, layout),
            None => *self = Self::open_hand(hand),
        }
    }

    fn retarget(&mut self, hand: Hand, sample: &HandSample, layout: KnuckleLayout) {
        self.bones = [BoneTransform::default(); BONE_COUNT];

        let wrist = wrist_rotation(hand);
        self.set(Wrist as usize, Vec3::ZERO, wrist);

        let roots = match layout {
            KnuckleLayout::Canonical => canonical_roots(hand, sample.palm.width),
            KnuckleLayout::Tracked => tracked_roots(sample).unwrap_or_else(|| {
                warn_once!("degenerate knuckles, using canonical finger roots");
                canonical_roots(hand, sample.palm.width)
            }),
        };

        // Frame the first segment of every chain is measured against.
        let chain_parent = sample.palm.orientation * wrist * HALF_PI_X * HALF_PI_X * HALF_PI_X;

        for (finger, chain_root) in Finger::ALL.into_iter().zip(CHAIN_ROOTS) {
            let digit = sample.digit(finger);
            let first = first_segment(finger);
            let is_thumb = finger == Finger::Thumb;
            let mut parent = chain_parent;

            for (slot, j) in (first..4).enumerate() {
                let bone = &digit.bones[j];
                let local = parent.inverse() * bone.rotation;
                parent = bone.rotation;

                let segment = match (is_thumb, slot) {
                    (true, 0) => Segment::ThumbRoot,
                    (true, _) => Segment::Thumb,
                    (false, 0) => Segment::FingerRoot,
                    (false, _) => Segment::Finger,
                };
                let orientation = apply_ops(local, recipe(segment).ops(hand));

                let position = if slot == 0 {
                    roots[finger as usize]
                } else {
                    let length = skeleton_tracker_to_meters(bone.prev_joint)
                        .distance(skeleton_tracker_to_meters(digit.bones[j - 1].prev_joint));
                    segment_offset(hand, length)
                };

                self.set(chain_root as usize + slot, position, orientation);
            }

            let last = &digit.bones[3];
            let tip_length = skeleton_tracker_to_meters(last.next_joint)
                .distance(skeleton_tracker_to_meters(last.prev_joint));
            self.set(
                chain_root as usize + (4 - first),
                segment_offset(hand, tip_length),
                Quat::IDENTITY,
            );
        }

        self.fill_aux(hand);
    }

    /// Aux bones hold each finger's last joint relative to the wrist's parent.
    fn fill_aux(&mut self, hand: Hand) {
        let wrist = Affine3A::from(self.bones[Wrist as usize]);
        for (aux, chain_root, len) in AUX_BONES {
            let start = chain_root as usize;
            let chain = self.bones[start..start + len]
                .iter()
                .fold(wrist, |acc, bone| acc * Affine3A::from(*bone));

            let (_, mut rot, pos) = chain.to_scale_rotation_translation();
            if hand == Hand::Left {
                rot = rot * HALF_PI_Z * HALF_PI_Z * HALF_PI_Y * HALF_PI_Y;
            }
            self.set(aux as usize, pos, rot);
        }
    }
}

/// Reflects a left hand skeleton into a right hand one.
fn mirror_open_hand(left: &[BoneTransform; BONE_COUNT]) -> [BoneTransform; BONE_COUNT] {
    use BasisOp::*;
    const ROOT_OPS: &[BasisOp] = &[NegY, NegZ];
    const CHAIN_OPS: &[BasisOp] = &[NegZ, SwapXW, NegW, SwapYZ];

    std::array::from_fn(|idx| {
        let (mut pos, rot) = bone_to_glam(&left[idx]);
        pos.x = -pos.x;

        let is_chain_root = CHAIN_ROOTS.iter().any(|b| *b as usize == idx);
        let ops = if idx <= Wrist as usize {
            ROOT_OPS
        } else if is_chain_root || idx >= AuxThumb as usize {
            CHAIN_OPS
        } else {
            &[]
        };

        BoneTransform {
            position: pos.into(),
            orientation: apply_ops(rot, ops).into(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::fixtures::{hand, mirrored, open_hand};

    const NON_AUX: std::ops::Range<usize> = 0..AuxThumb as usize;

    fn assert_unit(skeleton: &Skeleton) {
        for (idx, bone) in skeleton.transforms().iter().enumerate() {
            let q = Quat::from(bone.orientation);
            assert!((q.length() - 1.0).abs() < 1e-5, "bone {idx}: {q:?}");
            assert_eq!(bone.position.v[3], 1.0);
            assert!(Vec3::from(bone.position).is_finite(), "bone {idx}");
        }
    }

    fn same_rotation(a: Quat, b: Quat, eps: f32) -> bool {
        a.abs_diff_eq(b, eps) || a.abs_diff_eq(-b, eps)
    }

    #[test]
    fn bone_count() {
        assert_eq!(BONE_COUNT, 31);
        assert_eq!(gen::LEFT_OPEN_HAND.len(), BONE_COUNT);
    }

    #[test]
    fn right_open_hand_is_mirrored() {
        let right = Skeleton::open_hand(Hand::Right);

        let (pos, rot) = right.bone(Root);
        assert_eq!(pos, Vec3::ZERO);
        assert!(same_rotation(rot, Quat::from_xyzw(0.0, 1.0, 0.0, 0.0), 1e-6));

        let (pos, rot) = right.bone(Thumb0);
        assert!(pos.abs_diff_eq(Vec3::new(0.01791, 0.02918, 0.02530), 1e-6));
        let expected = Quat::from_xyzw(-0.43792, 0.68663, -0.11983, 0.56781);
        assert!(same_rotation(rot, expected, 1e-4), "{rot:?}");

        let (pos, rot) = right.bone(IndexFinger0);
        assert!(pos.abs_diff_eq(Vec3::new(0.00156, 0.02107, 0.01479), 1e-6));
        let expected = Quat::from_xyzw(-0.55075, 0.53958, 0.35143, 0.53106);
        assert!(same_rotation(rot, expected, 1e-4), "{rot:?}");

        // inner segments keep their rotation, only the offset flips
        let (pos, rot) = right.bone(IndexFinger1);
        assert!(pos.abs_diff_eq(Vec3::new(-0.07380, 0.0, 0.0), 1e-6));
        assert_eq!(rot, Skeleton::open_hand(Hand::Left).bone(IndexFinger1).1);

        let (pos, rot) = right.bone(AuxPinkyFinger);
        assert!(pos.abs_diff_eq(Vec3::new(0.00586, -0.05994, 0.11671), 1e-6));
        let expected = Quat::from_xyzw(-0.46974, 0.24892, 0.70428, 0.47050);
        assert!(same_rotation(rot, expected, 1e-4), "{rot:?}");
    }

    #[test]
    fn absent_hand_falls_back_every_time() {
        for side in [Hand::Left, Hand::Right] {
            let mut skeleton = Skeleton::open_hand(side);
            for curl in [0.0, 1.0, 0.4] {
                let sample = hand(side, curl);
                skeleton.update(side, Some(&sample), KnuckleLayout::Canonical);
                assert_ne!(skeleton, Skeleton::open_hand(side));
                skeleton.update(side, None, KnuckleLayout::Canonical);
                assert_eq!(skeleton, Skeleton::open_hand(side), "{side:?} after curl {curl}");
            }
        }
    }

    #[test]
    fn orientations_are_unit() {
        for side in [Hand::Left, Hand::Right] {
            assert_unit(&Skeleton::open_hand(side));
            for layout in [KnuckleLayout::Canonical, KnuckleLayout::Tracked] {
                for curl in [0.0, 0.3, 0.7, 1.0] {
                    let mut skeleton = Skeleton::open_hand(side);
                    skeleton.update(side, Some(&hand(side, curl)), layout);
                    assert_unit(&skeleton);
                }
            }
        }
    }

    #[test]
    fn wrist_gets_hand_specific_rotation() {
        let mut left = Skeleton::open_hand(Hand::Left);
        left.update(Hand::Left, Some(&open_hand(Hand::Left)), KnuckleLayout::Canonical);
        let mut right = Skeleton::open_hand(Hand::Right);
        right.update(Hand::Right, Some(&open_hand(Hand::Right)), KnuckleLayout::Canonical);

        let (pos, rot) = left.bone(Wrist);
        assert_eq!(pos, Vec3::ZERO);
        assert!(same_rotation(rot, wrist_rotation(Hand::Right) * HALF_PI_Z * HALF_PI_Z, 1e-6));
        assert!(same_rotation(right.bone(Wrist).1, wrist_rotation(Hand::Right), 1e-6));
        assert_eq!(left.bone(Root), (Vec3::ZERO, Quat::IDENTITY));
    }

    #[test]
    fn canonical_roots_follow_palm_width() {
        let mut sample = open_hand(Hand::Right);
        sample.palm.width = 100.0;
        let mut skeleton = Skeleton::open_hand(Hand::Right);
        skeleton.update(Hand::Right, Some(&sample), KnuckleLayout::Canonical);

        // 20mm per knuckle
        let (thumb, _) = skeleton.bone(Thumb0);
        assert!(thumb.abs_diff_eq(Vec3::new(0.025, 0.04, 0.02), 1e-6));
        let (index, _) = skeleton.bone(IndexFinger0);
        assert!(index.abs_diff_eq(Vec3::new(0.0, 0.03, 0.005), 1e-6));
        let (pinky, _) = skeleton.bone(PinkyFinger0);
        assert!(pinky.abs_diff_eq(Vec3::new(0.0, -0.03, 0.007), 1e-6));

        let mut left = Skeleton::open_hand(Hand::Left);
        sample.side = Hand::Left;
        left.update(Hand::Left, Some(&sample), KnuckleLayout::Canonical);
        assert!(left.bone(Thumb0).0.abs_diff_eq(Vec3::new(-0.025, 0.04, 0.02), 1e-6));
    }

    #[test]
    fn segment_offsets_are_bone_lengths() {
        let sample = hand(Hand::Left, 0.5);
        let mut skeleton = Skeleton::open_hand(Hand::Left);
        skeleton.update(Hand::Left, Some(&sample), KnuckleLayout::Canonical);

        // index: proximal is 40mm, intermediate 25mm, distal 20mm
        for (bone, length) in [
            (IndexFinger2, 0.040),
            (IndexFinger3, 0.025),
            (IndexFinger4, 0.020),
        ] {
            let (pos, _) = skeleton.bone(bone);
            assert!(pos.abs_diff_eq(Vec3::new(length, 0.0, 0.0), 1e-5), "{bone:?}: {pos:?}");
        }
        // fingertips carry no rotation
        assert_eq!(skeleton.bone(Thumb3).1, Quat::IDENTITY);
        assert_eq!(skeleton.bone(PinkyFinger4).1, Quat::IDENTITY);
    }

    #[test]
    fn straight_right_chain_is_identity() {
        let mut sample = open_hand(Hand::Right);
        let straight = sample.palm.orientation
            * wrist_rotation(Hand::Right)
            * HALF_PI_X
            * HALF_PI_X
            * HALF_PI_X;
        for bone in sample.digits.iter_mut().flat_map(|d| d.bones.iter_mut()) {
            bone.rotation = straight;
        }
        let mut skeleton = Skeleton::open_hand(Hand::Right);
        skeleton.update(Hand::Right, Some(&sample), KnuckleLayout::Canonical);

        for chain_root in &CHAIN_ROOTS[1..] {
            for idx in *chain_root as usize..*chain_root as usize + 5 {
                let rot = Quat::from(skeleton.transforms()[idx].orientation);
                assert!(same_rotation(rot, Quat::IDENTITY, 1e-5), "bone {idx}: {rot:?}");
            }
        }
    }

    #[test]
    fn mirrored_sample_keeps_bone_lengths() {
        for curl in [0.0, 0.5, 0.9] {
            let left_sample = hand(Hand::Left, curl);
            let right_sample = mirrored(left_sample);

            let mut left = Skeleton::open_hand(Hand::Left);
            left.update(Hand::Left, Some(&left_sample), KnuckleLayout::Canonical);
            let mut right = Skeleton::open_hand(Hand::Right);
            right.update(Hand::Right, Some(&right_sample), KnuckleLayout::Canonical);

            for idx in NON_AUX {
                let l = Vec3::from(left.transforms()[idx].position);
                let r = Vec3::from(right.transforms()[idx].position);
                assert!((l.length() - r.length()).abs() < 1e-6, "bone {idx}: {l:?} vs {r:?}");
                // lateral offsets flip with the hand
                if idx > Wrist as usize && !CHAIN_ROOTS.iter().any(|b| *b as usize == idx) {
                    assert!((l.x + r.x).abs() < 1e-6, "bone {idx}");
                }
            }
        }
    }

    #[test]
    fn tracked_roots_use_metacarpal_bases() {
        let sample = open_hand(Hand::Left);
        let mut skeleton = Skeleton::open_hand(Hand::Left);
        skeleton.update(Hand::Left, Some(&sample), KnuckleLayout::Tracked);

        for (finger, chain_root) in Finger::ALL.into_iter().zip(CHAIN_ROOTS) {
            let base = sample.digit(finger).bones[first_segment(finger)].prev_joint;
            let expected = (base - sample.wrist).length() * 0.001;
            let (pos, _) = skeleton.bone(chain_root);
            assert!((pos.length() - expected).abs() < 1e-6, "{finger:?}");
        }

        let mut canonical = Skeleton::open_hand(Hand::Left);
        canonical.update(Hand::Left, Some(&sample), KnuckleLayout::Canonical);
        assert_ne!(skeleton.bone(IndexFinger0).0, canonical.bone(IndexFinger0).0);
    }

    #[test]
    fn tracked_roots_sit_in_front_of_the_wrist() {
        for side in [Hand::Left, Hand::Right] {
            let sample = open_hand(side);
            let mut tracked = Skeleton::open_hand(side);
            tracked.update(side, Some(&sample), KnuckleLayout::Tracked);
            let mut canonical = Skeleton::open_hand(side);
            canonical.update(side, Some(&sample), KnuckleLayout::Canonical);
            let open = Skeleton::open_hand(side);

            for chain_root in CHAIN_ROOTS {
                let (pos, _) = tracked.bone(chain_root);
                let (reference, _) = canonical.bone(chain_root);
                assert!(pos.z > 0.0, "{side:?} {chain_root:?}: {pos:?}");
                assert!(open.bone(chain_root).0.z > 0.0);
                assert_eq!(
                    pos.y.signum(),
                    reference.y.signum(),
                    "{side:?} {chain_root:?}: {pos:?} vs {reference:?}"
                );
            }

            // bases 10mm ahead of the wrist, 7.2mm to the thumb side of the middle line
            let (index, _) = tracked.bone(IndexFinger0);
            assert!(index.abs_diff_eq(Vec3::new(0.0, 0.0072, 0.01), 1e-6), "{index:?}");
            let (pinky, _) = tracked.bone(PinkyFinger0);
            assert!(pinky.abs_diff_eq(Vec3::new(0.0, -0.0072, 0.01), 1e-6), "{pinky:?}");
            let (thumb, _) = tracked.bone(Thumb0);
            assert!(thumb.abs_diff_eq(Vec3::new(0.0, 0.02, 0.02), 1e-6), "{thumb:?}");
        }
    }

    #[test]
    fn recipes_per_segment_and_hand() {
        let raw = Quat::from_xyzw(1.0, 2.0, 3.0, 4.0);
        for (segment, hand, expected) in [
            (Segment::FingerRoot, Hand::Left, [-4.0, -3.0, 2.0, 1.0]),
            (Segment::FingerRoot, Hand::Right, [1.0, 2.0, 3.0, 4.0]),
            (Segment::Finger, Hand::Left, [-3.0, -2.0, -1.0, 4.0]),
            (Segment::Finger, Hand::Right, [3.0, 2.0, -1.0, 4.0]),
            (Segment::ThumbRoot, Hand::Left, [0.0, -1.0, -5.0, 2.0]),
            (
                Segment::ThumbRoot,
                Hand::Right,
                [0.69971, -2.45461, -3.53701, -3.31283],
            ),
            (Segment::Thumb, Hand::Left, [-3.0, -2.0, -1.0, 4.0]),
            (Segment::Thumb, Hand::Right, [3.0, -2.0, -1.0, 4.0]),
        ] {
            let q = apply_ops(raw, recipe(segment).ops(hand));
            assert!(
                q.abs_diff_eq(Quat::from_array(expected), 1e-4),
                "{segment:?} {hand:?}: {q:?}"
            );
            // every recipe is a rotation, so the norm survives
            assert!((q.length() - raw.length()).abs() < 1e-4);
        }
    }

    #[test]
    fn mirrored_sample_flips_orientation_signs() {
        for curl in [0.0, 0.5, 0.9] {
            let left_sample = hand(Hand::Left, curl);
            let right_sample = mirrored(left_sample);

            let mut left = Skeleton::open_hand(Hand::Left);
            left.update(Hand::Left, Some(&left_sample), KnuckleLayout::Canonical);
            let mut right = Skeleton::open_hand(Hand::Right);
            right.update(Hand::Right, Some(&right_sample), KnuckleLayout::Canonical);

            // finger segments past the root come out identical
            for chain_root in &CHAIN_ROOTS[1..] {
                for idx in *chain_root as usize + 1..*chain_root as usize + 5 {
                    let l = Quat::from(left.transforms()[idx].orientation);
                    let r = Quat::from(right.transforms()[idx].orientation);
                    assert!(l.abs_diff_eq(r, 1e-5), "bone {idx}: {l:?} vs {r:?}");
                }
            }

            // thumb segments past the root differ only in the sign of y
            for bone in [Thumb1, Thumb2] {
                let l = left.bone(bone).1;
                let r = right.bone(bone).1;
                let flipped = Quat::from_xyzw(l.x, -l.y, l.z, l.w);
                assert!(r.abs_diff_eq(flipped, 1e-5), "{bone:?} at {curl}: {l:?} vs {r:?}");
            }
            assert_eq!(left.bone(Thumb3).1, Quat::IDENTITY);
            assert_eq!(right.bone(Thumb3).1, Quat::IDENTITY);
        }
    }

    #[test]
    fn collapsed_knuckles_fall_back_to_canonical() {
        let mut sample = open_hand(Hand::Right);
        for bone in sample.digits.iter_mut().flat_map(|d| d.bones.iter_mut()) {
            bone.prev_joint = Vec3::ZERO;
            bone.next_joint = Vec3::ZERO;
        }
        let mut tracked = Skeleton::open_hand(Hand::Right);
        tracked.update(Hand::Right, Some(&sample), KnuckleLayout::Tracked);
        let mut canonical = Skeleton::open_hand(Hand::Right);
        canonical.update(Hand::Right, Some(&sample), KnuckleLayout::Canonical);
        assert_eq!(tracked, canonical);
        assert_unit(&tracked);
    }
}
