//! # Orbit Camera
//!
//! A camera that always orbits the world origin. Its eye position is given in
//! spherical coordinates with +Z as the up axis:
//!
//! - `radius`: distance from the origin, clamped to [`MIN_RADIUS`, `MAX_RADIUS`]
//! - `phi`: longitude in degrees, unbounded
//! - `theta`: polar angle from +Z in degrees, clamped to [`MIN_THETA`, `MAX_THETA`]
//!   so the eye never reaches the pole where the look-at basis degenerates
//!
//! The projection is stored separately and is whichever of
//! [`Camera::set_perspective`] or [`Camera::set_orthographic`] was called last.

use crate::ecs::Entity;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Smallest orbit radius
pub const MIN_RADIUS: f32 = 1.0;
/// Largest orbit radius
pub const MAX_RADIUS: f32 = 5000.0;
/// Smallest polar angle in degrees
pub const MIN_THETA: f32 = 1.0;
/// Largest polar angle in degrees
pub const MAX_THETA: f32 = 179.0;

/// Orbit camera attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    entity: Entity,
    radius: f32,
    phi: f32,
    theta: f32,
    zoom_sensitivity: f32,
    drag_sensitivity: f32,
    projection: Mat4,
}

impl Camera {
    /// Camera with the default orbit and a 45° perspective projection
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            radius: 4.0,
            phi: -90.0,
            theta: 80.0,
            zoom_sensitivity: 5.0,
            drag_sensitivity: 0.5,
            projection: Mat4::perspective_gl(utils::deg_to_rad(45.0), 1.0, 0.1, 100.0),
        }
    }

    /// Entity this camera belongs to
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Orbit by a pointer drag offset
    ///
    /// Longitude decreases by `dx` and the polar angle by `dy`, both scaled by
    /// the drag sensitivity.
    pub fn relative_drag(&mut self, dx: f32, dy: f32) {
        let phi = self.phi - dx * self.drag_sensitivity;
        if phi.is_finite() {
            self.phi = phi;
        }
        self.set_latitude_angle(self.theta - dy * self.drag_sensitivity);
    }

    /// Move towards the origin by `amount` scaled by the zoom sensitivity
    pub fn relative_zoom(&mut self, amount: f32) {
        self.set_radius(self.radius - amount * self.zoom_sensitivity);
    }

    /// Set the orbit radius, clamped
    pub fn set_radius(&mut self, radius: f32) {
        if let Some(radius) = clamp_finite(radius, MIN_RADIUS, MAX_RADIUS) {
            self.radius = radius;
        }
    }

    /// Set the longitude in degrees
    pub fn set_longitude_angle(&mut self, phi: f32) {
        if phi.is_finite() {
            self.phi = phi;
        }
    }

    /// Set the polar angle in degrees, clamped
    pub fn set_latitude_angle(&mut self, theta: f32) {
        if let Some(theta) = clamp_finite(theta, MIN_THETA, MAX_THETA) {
            self.theta = theta;
        }
    }

    /// Scale applied to zoom amounts
    pub fn set_zoom_sensitivity(&mut self, sensitivity: f32) {
        if sensitivity.is_finite() {
            self.zoom_sensitivity = sensitivity;
        }
    }

    /// Scale applied to drag offsets
    pub fn set_drag_sensitivity(&mut self, sensitivity: f32) {
        if sensitivity.is_finite() {
            self.drag_sensitivity = sensitivity;
        }
    }

    /// Orbit radius
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Longitude in degrees
    pub const fn longitude_angle(&self) -> f32 {
        self.phi
    }

    /// Polar angle in degrees
    pub const fn latitude_angle(&self) -> f32 {
        self.theta
    }

    /// Zoom sensitivity
    pub const fn zoom_sensitivity(&self) -> f32 {
        self.zoom_sensitivity
    }

    /// Drag sensitivity
    pub const fn drag_sensitivity(&self) -> f32 {
        self.drag_sensitivity
    }

    /// Use a perspective projection
    ///
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect` - Viewport width over height
    /// * `near`, `far` - Clip plane distances
    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Mat4::perspective_gl(fov_y, aspect, near, far);
    }

    /// Use an orthographic projection
    pub fn set_orthographic(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.projection = Mat4::orthographic_gl(left, right, bottom, top, near, far);
    }

    /// Current projection matrix
    pub const fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// World-space eye position
    pub fn eye(&self) -> Vec3 {
        let theta = utils::deg_to_rad(self.theta);
        let phi = utils::deg_to_rad(self.phi);
        Vec3::new(
            self.radius * theta.sin() * phi.cos(),
            self.radius * theta.sin() * phi.sin(),
            self.radius * theta.cos(),
        )
    }

    /// Look-at matrix from the eye towards the origin with +Z up
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_gl(self.eye(), Vec3::zeros(), Vec3::z())
    }
}

fn clamp_finite(value: f32, min: f32, max: f32) -> Option<f32> {
    if value.is_nan() {
        return None;
    }
    Some(utils::clamp(value, min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::ecs::EntityManager;

    fn camera() -> Camera {
        Camera::new(EntityManager::new().create())
    }

    #[test]
    fn test_defaults() {
        let camera = camera();
        assert_relative_eq!(camera.radius(), 4.0);
        assert_relative_eq!(camera.longitude_angle(), -90.0);
        assert_relative_eq!(camera.latitude_angle(), 80.0);
        assert_relative_eq!(*camera.projection(), Mat4::perspective_gl(utils::deg_to_rad(45.0), 1.0, 0.1, 100.0));
    }

    #[test]
    fn test_default_eye_position() {
        let eye = camera().eye();
        let theta = utils::deg_to_rad(80.0);
        assert_relative_eq!(eye.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(eye.y, -4.0 * theta.sin(), epsilon = 1e-5);
        assert_relative_eq!(eye.z, 4.0 * theta.cos(), epsilon = 1e-5);
    }

    #[test]
    fn test_view_matrix_maps_origin_onto_view_axis() {
        let camera = camera();
        let origin = camera.view_matrix().transform_point_h(Vec3::zeros());
        assert_relative_eq!(origin.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(origin.z, -camera.radius(), epsilon = 1e-4);
    }

    #[test]
    fn test_drag_moves_angles() {
        let mut camera = camera();
        camera.relative_drag(10.0, 20.0);
        assert_relative_eq!(camera.longitude_angle(), -95.0);
        assert_relative_eq!(camera.latitude_angle(), 70.0);
    }

    #[test]
    fn test_zoom_moves_radius() {
        let mut camera = camera();
        camera.set_radius(100.0);
        camera.relative_zoom(2.0);
        assert_relative_eq!(camera.radius(), 90.0);
    }

    #[test]
    fn test_clamps_hold_for_extreme_inputs() {
        let mut camera = camera();
        for value in [f32::MAX, f32::MIN, 1e30, -1e30, f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            camera.relative_zoom(value);
            assert!((MIN_RADIUS..=MAX_RADIUS).contains(&camera.radius()));
            camera.set_radius(value);
            assert!((MIN_RADIUS..=MAX_RADIUS).contains(&camera.radius()));
            camera.relative_drag(value, value);
            assert!((MIN_THETA..=MAX_THETA).contains(&camera.latitude_angle()));
            assert!(camera.longitude_angle().is_finite());
            camera.set_latitude_angle(value);
            assert!((MIN_THETA..=MAX_THETA).contains(&camera.latitude_angle()));
        }
    }

    #[test]
    fn test_last_projection_wins() {
        let mut camera = camera();
        camera.set_orthographic(-1.0, 1.0, -1.0, 1.0, 0.1, 10.0);
        assert_relative_eq!(*camera.projection(), Mat4::orthographic_gl(-1.0, 1.0, -1.0, 1.0, 0.1, 10.0));
        camera.set_perspective(1.0, 2.0, 0.5, 50.0);
        assert_relative_eq!(*camera.projection(), Mat4::perspective_gl(1.0, 2.0, 0.5, 50.0));
    }
}
