//! Math type aliases and helper functions.
//!
//! All model-space math is `f32`. Matrices follow the column-vector
//! convention: a point is transformed as `m * p`.

pub use nalgebra;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
/// Use [`quat_from_array`] or `Quaternion::new(w, x, y, z)` to construct.
pub type Quat = nalgebra::Quaternion<f32>;

/// Build a 4x4 TRS matrix from scale, rotation (quaternion), and translation.
pub fn mat4_from_scale_rotation_translation(
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
) -> Mat4 {
    let r = nalgebra::UnitQuaternion::from_quaternion(rotation);
    let m = r.to_rotation_matrix();
    let rm = m.matrix();
    #[rustfmt::skip]
    let result = Mat4::new(
        rm[(0, 0)] * scale.x, rm[(0, 1)] * scale.y, rm[(0, 2)] * scale.z, translation.x,
        rm[(1, 0)] * scale.x, rm[(1, 1)] * scale.y, rm[(1, 2)] * scale.z, translation.y,
        rm[(2, 0)] * scale.x, rm[(2, 1)] * scale.y, rm[(2, 2)] * scale.z, translation.z,
        0.0,                  0.0,                  0.0,                  1.0,
    );
    result
}

/// Build a translation-only 4x4 matrix.
pub fn mat4_from_translation(t: Vec3) -> Mat4 {
    Mat4::new_translation(&t)
}

/// Create a quaternion from a `[x, y, z, w]` array.
pub fn quat_from_array(a: [f32; 4]) -> Quat {
    nalgebra::Quaternion::new(a[3], a[0], a[1], a[2])
}

/// Create a quaternion from rotation around the Y axis.
pub fn quat_from_rotation_y(angle: f32) -> Quat {
    nalgebra::UnitQuaternion::from_axis_angle(&nalgebra::Vector3::y_axis(), angle).into_inner()
}

/// Transform a point (w = 1) by a 4x4 matrix.
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    m.transform_point(&nalgebra::Point3::from(p)).coords
}

/// Transform a direction (w = 0) by a 4x4 matrix.
pub fn transform_vector(m: &Mat4, v: Vec3) -> Vec3 {
    m.transform_vector(&v)
}

/// Matrix used to transform normals: inverse-transpose of the upper 3x3.
///
/// Falls back to the plain upper 3x3 when the matrix is singular.
pub fn normal_matrix(m: &Mat4) -> Mat3 {
    let upper = m.fixed_view::<3, 3>(0, 0).into_owned();
    match upper.try_inverse() {
        Some(inv) => inv.transpose(),
        None => upper,
    }
}

/// Largest axis scale factor of a 4x4 matrix's upper 3x3.
pub fn max_axis_scale(m: &Mat4) -> f32 {
    let col0 = Vec3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]);
    let col1 = Vec3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]);
    let col2 = Vec3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]);
    col0.norm().max(col1.norm()).max(col2.norm())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn identity_trs_matrix() {
        let m = mat4_from_scale_rotation_translation(
            Vec3::new(1.0, 1.0, 1.0),
            Quat::identity(),
            Vec3::zeros(),
        );
        assert!((m - Mat4::identity()).norm() < 1e-6);
    }

    #[test]
    fn translation_matrix() {
        let t = Vec3::new(1.0, 2.0, 3.0);
        let m = mat4_from_translation(t);
        assert_eq!(m[(0, 3)], 1.0);
        assert_eq!(m[(1, 3)], 2.0);
        assert_eq!(m[(2, 3)], 3.0);
    }

    #[test]
    fn points_and_vectors_differ_by_translation() {
        let m = mat4_from_translation(Vec3::new(5.0, 0.0, 0.0));
        let p = transform_point(&m, Vec3::new(1.0, 1.0, 1.0));
        let v = transform_vector(&m, Vec3::new(1.0, 1.0, 1.0));
        assert!((p - Vec3::new(6.0, 1.0, 1.0)).norm() < 1e-6);
        assert!((v - Vec3::new(1.0, 1.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn rotation_y_90() {
        let m = mat4_from_scale_rotation_translation(
            Vec3::new(1.0, 1.0, 1.0),
            quat_from_rotation_y(FRAC_PI_2),
            Vec3::zeros(),
        );
        let v = transform_point(&m, Vec3::new(1.0, 0.0, 0.0));
        assert!(v.x.abs() < 1e-5);
        assert!((v.z - (-1.0)).abs() < 1e-5);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let m = mat4_from_scale_rotation_translation(
            Vec3::new(2.0, 1.0, 1.0),
            Quat::identity(),
            Vec3::zeros(),
        );
        let n = normal_matrix(&m) * Vec3::new(1.0, 1.0, 0.0);
        assert!((n - Vec3::new(0.5, 1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn max_axis_scale_picks_largest() {
        let m = mat4_from_scale_rotation_translation(
            Vec3::new(2.0, 3.0, 0.5),
            quat_from_rotation_y(1.0),
            Vec3::new(9.0, 9.0, 9.0),
        );
        assert!((max_axis_scale(&m) - 3.0).abs() < 1e-5);
    }
}
