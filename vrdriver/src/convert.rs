use super::*;
use glam::{Affine3A, DAffine3, DMat3, DQuat, DVec3, Quat, Vec3};

/// HmdMatrix34 is row major, glam matrices are column major.
pub fn matrix34_to_affine(matrix: &HmdMatrix34) -> DAffine3 {
    let m = &matrix.m;
    let col = |c: usize| DVec3::new(m[0][c] as f64, m[1][c] as f64, m[2][c] as f64);
    DAffine3::from_mat3_translation(DMat3::from_cols(col(0), col(1), col(2)), col(3))
}

impl From<DAffine3> for HmdMatrix34 {
    fn from(value: DAffine3) -> Self {
        let rot = value.matrix3.transpose();
        let gen_array = |translation: f64, rot_axis: DVec3| {
            std::array::from_fn(|i| (if i == 3 { translation } else { rot_axis[i] }) as f32)
        };

        Self {
            m: [
                gen_array(value.translation.x, rot.x_axis),
                gen_array(value.translation.y, rot.y_axis),
                gen_array(value.translation.z, rot.z_axis),
            ],
        }
    }
}

impl From<Vec3> for HmdVector4 {
    fn from(value: Vec3) -> Self {
        let mut v = [0.0; 4];
        v[..3].copy_from_slice(&value.to_array());
        v[3] = 1.0;
        Self { v }
    }
}

impl From<HmdVector4> for Vec3 {
    fn from(value: HmdVector4) -> Self {
        Vec3::from_slice(&value.v[..3])
    }
}

impl From<Quat> for HmdQuaternionf {
    fn from(value: Quat) -> Self {
        Self {
            x: value.x,
            y: value.y,
            z: value.z,
            w: value.w,
        }
    }
}

impl From<HmdQuaternionf> for Quat {
    fn from(value: HmdQuaternionf) -> Self {
        Quat::from_xyzw(value.x, value.y, value.z, value.w)
    }
}

impl From<DQuat> for HmdQuaternion {
    fn from(value: DQuat) -> Self {
        Self {
            x: value.x,
            y: value.y,
            z: value.z,
            w: value.w,
        }
    }
}

impl From<HmdQuaternion> for DQuat {
    fn from(value: HmdQuaternion) -> Self {
        DQuat::from_xyzw(value.x, value.y, value.z, value.w)
    }
}

impl From<Affine3A> for BoneTransform {
    fn from(value: Affine3A) -> Self {
        let (_, rot, pos) = value.to_scale_rotation_translation();
        Self {
            position: pos.into(),
            orientation: rot.into(),
        }
    }
}

impl From<BoneTransform> for Affine3A {
    fn from(value: BoneTransform) -> Self {
        Affine3A::from_rotation_translation(value.orientation.into(), value.position.into())
    }
}
