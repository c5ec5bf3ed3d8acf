//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the handful of OpenGL-convention matrix
//! builders the renderer needs (right-handed, clip space depth in [-1, 1]).

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    #[must_use]
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    #[must_use]
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    #[must_use]
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }
}

/// Extension trait for Mat4 with OpenGL-convention builders
pub trait Mat4Ext {
    /// Create a translation matrix
    fn translation(x: f32, y: f32, z: f32) -> Mat4;

    /// Create a uniform or non-uniform scale matrix
    fn scaling(x: f32, y: f32, z: f32) -> Mat4;

    /// Create a rotation matrix around an arbitrary axis (angle in radians)
    fn rotation(axis: Vec3, angle: f32) -> Mat4;

    /// Create a perspective projection matrix (OpenGL depth range)
    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create an orthographic projection matrix (OpenGL depth range)
    fn orthographic_gl(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at_gl(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Compute `transpose(inverse(self))`
    ///
    /// Falls back to the identity matrix when `self` is singular.
    fn normal_matrix(&self) -> Mat4;

    /// Transform a point, applying the perspective divide
    fn transform_point_h(&self, point: Vec3) -> Vec3;

    /// Transform a direction (w = 0)
    fn transform_direction(&self, direction: Vec3) -> Vec3;

    /// Column-major array view suitable for GL uniform upload
    fn to_cols_array(&self) -> [f32; 16];
}

impl Mat4Ext for Mat4 {
    fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::new_translation(&Vec3::new(x, y, z))
    }

    fn scaling(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::new_nonuniform_scaling(&Vec3::new(x, y, z))
    }

    fn rotation(axis: Vec3, angle: f32) -> Mat4 {
        let axis = nalgebra::Unit::try_new(axis, f32::EPSILON)
            .unwrap_or_else(Vec3::z_axis);
        Mat4::from_axis_angle(&axis, angle)
    }

    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        nalgebra::Perspective3::new(aspect, fov_y, near, far).to_homogeneous()
    }

    fn orthographic_gl(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        nalgebra::Orthographic3::new(left, right, bottom, top, near, far).to_homogeneous()
    }

    fn look_at_gl(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn normal_matrix(&self) -> Mat4 {
        self.try_inverse()
            .map_or_else(Mat4::identity, |inverse| inverse.transpose())
    }

    fn transform_point_h(&self, point: Vec3) -> Vec3 {
        let p = self * Vec4::new(point.x, point.y, point.z, 1.0);
        if p.w.abs() > f32::EPSILON {
            Vec3::new(p.x / p.w, p.y / p.w, p.z / p.w)
        } else {
            p.xyz()
        }
    }

    fn transform_direction(&self, direction: Vec3) -> Vec3 {
        (self * Vec4::new(direction.x, direction.y, direction.z, 0.0)).xyz()
    }

    fn to_cols_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.as_slice());
        out
    }
}
