use super::HandSkeletonBone;
use vrdriver::{BoneTransform, HmdQuaternionf, HmdVector4};

// Parent space, same as what the skeleton publishes. Orientations are [w, x, y, z].
const fn bone(position: [f32; 3], orientation: [f32; 4]) -> BoneTransform {
    let [x, y, z] = position;
    let [qw, qx, qy, qz] = orientation;
    BoneTransform {
        position: HmdVector4 { v: [x, y, z, 1.0] },
        orientation: HmdQuaternionf {
            w: qw,
            x: qx,
            y: qy,
            z: qz,
        },
    }
}

pub static LEFT_OPEN_HAND: [BoneTransform; HandSkeletonBone::Count as usize] = [
    // Root
    bone([0.00000, 0.00000, 0.00000], [0.00000, -0.00000, -1.00000, -0.00000]),
    // Wrist
    bone([0.00016, -0.00003, -0.00063], [1.00000, 0.00000, -0.00000, 0.00000]),
    // Thumb0
    bone([-0.01791, 0.02918, 0.02530], [0.43792, 0.56781, 0.11983, 0.68663]),
    // Thumb1
    bone([0.04041, 0.00000, 0.00000], [0.99031, 0.04887, 0.05609, 0.11728]),
    // Thumb2
    bone([0.03252, 0.00000, 0.00000], [0.99493, 0.08159, 0.04521, -0.03764]),
    // Thumb3
    bone([0.03046, 0.00000, 0.00000], [1.00000, 0.00000, 0.00000, 0.00000]),
    // IndexFinger0
    bone([-0.00156, 0.02107, 0.01479], [0.55075, 0.53106, -0.35143, 0.53958]),
    // IndexFinger1
    bone([0.07380, 0.00000, 0.00000], [0.99318, 0.06183, 0.04100, 0.08997]),
    // IndexFinger2
    bone([0.04329, 0.00000, 0.00000], [0.98958, -0.14077, -0.01481, -0.02620]),
    // IndexFinger3
    bone([0.02828, 0.00000, 0.00000], [0.99707, 0.00003, -0.00117, 0.07646]),
    // IndexFinger4
    bone([0.02282, 0.00000, 0.00000], [1.00000, 0.00000, 0.00000, 0.00000]),
    // MiddleFinger0
    bone([0.00218, 0.00712, 0.01632], [0.53342, 0.56175, -0.41974, 0.47299]),
    // MiddleFinger1
    bone([0.07089, 0.00000, 0.00000], [0.99087, -0.03929, -0.01545, 0.12805]),
    // MiddleFinger2
    bone([0.04311, 0.00000, 0.00000], [0.99882, -0.04623, -0.01254, -0.00778]),
    // MiddleFinger3
    bone([0.03327, 0.00000, 0.00000], [0.99920, -0.03577, 0.00817, 0.01562]),
    // MiddleFinger4
    bone([0.02589, 0.00000, 0.00000], [1.00000, 0.00000, 0.00000, 0.00000]),
    // RingFinger0
    bone([0.00051, -0.00655, 0.01635], [0.51669, 0.55014, -0.49555, 0.42989]),
    // RingFinger1
    bone([0.06597, 0.00000, 0.00000], [0.98958, -0.04109, -0.08942, 0.10511]),
    // RingFinger2
    bone([0.04033, 0.00000, 0.00000], [0.99475, -0.07026, 0.04928, -0.05571]),
    // RingFinger3
    bone([0.02849, 0.00000, 0.00000], [0.99079, 0.00020, -0.00426, 0.13535]),
    // RingFinger4
    bone([0.02243, 0.00000, 0.00000], [1.00000, 0.00000, 0.00000, 0.00000]),
    // PinkyFinger0
    bone([-0.00248, -0.01898, 0.01521], [0.48576, 0.51533, -0.61502, 0.34675]),
    // PinkyFinger1
    bone([0.06286, 0.00000, 0.00000], [0.99505, 0.00921, -0.09085, 0.03929]),
    // PinkyFinger2
    bone([0.02987, 0.00000, 0.00000], [0.99406, -0.09116, -0.01704, -0.05688]),
    // PinkyFinger3
    bone([0.01798, 0.00000, 0.00000], [0.99768, -0.02291, 0.01686, 0.06191]),
    // PinkyFinger4
    bone([0.01802, 0.00000, 0.00000], [1.00000, 0.00000, 0.00000, 0.00000]),
    // AuxThumb
    bone([-0.02218, 0.07865, 0.07720], [0.29496, 0.54402, 0.20688, 0.75779]),
    // AuxIndexFinger
    bone([0.01112, 0.05525, 0.15428], [0.51341, 0.42038, -0.45372, 0.59483]),
    // AuxMiddleFinger
    bone([0.01291, 0.00792, 0.16137], [0.51675, 0.44600, -0.55996, 0.46957]),
    // AuxRingFinger
    bone([0.00763, -0.02903, 0.14747], [0.47395, 0.40717, -0.65043, 0.43188]),
    // AuxPinkyFinger
    bone([-0.00586, -0.05994, 0.11671], [0.46974, 0.47051, -0.70428, 0.24892]),
];
