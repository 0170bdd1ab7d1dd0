//! Math utilities and types
//!
//! Provides the fundamental math types used by the scene graph and the entity layer.

use approx::{AbsDiffEq, RelativeEq};

pub use nalgebra::{Matrix4, Quaternion, Unit, UnitQuaternion, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Local transform of a scene node: position, Euler rotation and scale.
///
/// Rotation is stored as pitch (x), yaw (y) and roll (z) in radians. The
/// rotation is applied roll first, then pitch, then yaw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in parent space
    pub position: Vec3,

    /// Euler rotation in radians (pitch, yaw, roll)
    pub rotation: Vec3,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with explicit position, rotation and scale
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and Euler rotation
    pub fn from_position_rotation(position: Vec3, rotation: Vec3) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Builder pattern: set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder pattern: set uniform scale
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Rotation as a quaternion (roll, then pitch, then yaw)
    pub fn orientation(&self) -> Quat {
        euler_to_quat(self.rotation)
    }

    /// Convert to a transformation matrix (scale, then rotate, then translate)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.orientation().to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Rotation converted to degrees
    pub fn rotation_degrees(&self) -> Vec3 {
        self.rotation.map(utils::rad_to_deg)
    }
}

impl AbsDiffEq for Transform {
    type Epsilon = f32;

    fn default_epsilon() -> Self::Epsilon {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.position.abs_diff_eq(&other.position, epsilon)
            && self.rotation.abs_diff_eq(&other.rotation, epsilon)
            && self.scale.abs_diff_eq(&other.scale, epsilon)
    }
}

impl RelativeEq for Transform {
    fn default_max_relative() -> Self::Epsilon {
        f32::EPSILON
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.position.relative_eq(&other.position, epsilon, max_relative)
            && self.rotation.relative_eq(&other.rotation, epsilon, max_relative)
            && self.scale.relative_eq(&other.scale, epsilon, max_relative)
    }
}

/// Build a quaternion from pitch (x), yaw (y) and roll (z) in radians.
pub fn euler_to_quat(rotation: Vec3) -> Quat {
    let yaw = Quat::from_axis_angle(&Vec3::y_axis(), rotation.y);
    let pitch = Quat::from_axis_angle(&Vec3::x_axis(), rotation.x);
    let roll = Quat::from_axis_angle(&Vec3::z_axis(), rotation.z);
    yaw * pitch * roll
}

/// Translation part of an affine matrix
pub fn matrix_translation(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
}

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
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Convert every component of a vector from degrees to radians
    pub fn vec_deg_to_rad(degrees: Vec3) -> Vec3 {
        degrees.map(deg_to_rad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_identity_matrix() {
        let transform = Transform::identity();
        assert_relative_eq!(transform.to_matrix(), Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_translation_matrix() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let matrix = transform.to_matrix();
        assert_relative_eq!(matrix_translation(&matrix), Vec3::new(1.0, 2.0, 3.0), epsilon = EPSILON);
    }

    #[test]
    fn test_scale_applied_before_translation() {
        let transform = Transform::from_position(Vec3::new(10.0, 0.0, 0.0)).with_uniform_scale(2.0);
        let point = transform.to_matrix().transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(point.coords, Vec3::new(12.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_yaw_rotation() {
        // 90 degrees of yaw turns +X into -Z in a right-handed Y-up frame
        let rotation = Vec3::new(0.0, constants::PI / 2.0, 0.0);
        let rotated = euler_to_quat(rotation) * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(rotated, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_degree_roundtrip() {
        let degrees = Vec3::new(45.0, -90.0, 180.0);
        let radians = utils::vec_deg_to_rad(degrees);
        let transform = Transform::from_position_rotation(Vec3::zeros(), radians);
        assert_relative_eq!(transform.rotation_degrees(), degrees, epsilon = 1e-3);
    }
}
