/// Viewport mapping, project/unproject, and a look-at camera
use crate::matrix::Matrix4;
use crate::stack::{MatrixMode, TransformStack};
use crate::vector::Vector3;

/// Target pixel rectangle reported by the rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 0, 800, 600)
    }
}

/// Maps an object-space point to window coordinates.
///
/// `x`/`y` land in viewport pixels and `z` is depth in `[0, 1]` for points
/// inside the clip volume.
pub fn project(point: Vector3, modelview: &Matrix4, projection: &Matrix4, viewport: Viewport) -> Vector3 {
    let clip = projection.transform_point(modelview.transform_point(point));
    Vector3::new(
        viewport.x as f64 + viewport.width as f64 * (clip.x * 0.5 + 0.5),
        viewport.y as f64 + viewport.height as f64 * (clip.y * 0.5 + 0.5),
        clip.z * 0.5 + 0.5,
    )
}

/// Maps window coordinates (with depth in `[0, 1]`) back to object space.
pub fn unproject(point: Vector3, modelview: &Matrix4, projection: &Matrix4, viewport: Viewport) -> Vector3 {
    let ndc = Vector3::new(
        (point.x - viewport.x as f64) / viewport.width as f64 * 2.0 - 1.0,
        (point.y - viewport.y as f64) / viewport.height as f64 * 2.0 - 1.0,
        point.z * 2.0 - 1.0,
    );
    projection.multiply(modelview).inverse().transform_point(ndc)
}

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Look-at camera that loads its matrices into a [`TransformStack`]
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vector3,
    pub center: Vector3,
    pub up: Vector3,
    /// Vertical field of view in degrees.
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(distance: f64) -> Self {
        Self {
            eye: Vector3::new(0.0, 0.0, distance),
            center: Vector3::zero(),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Projection matrix for the given aspect ratio.
    pub fn projection_matrix(&self, aspect: f64) -> Matrix4 {
        match self.mode {
            ProjectionMode::Perspective => Matrix4::perspective(self.fov, aspect, self.near, self.far),
            ProjectionMode::Orthographic => {
                let height = (self.eye - self.center).length();
                let width = height * aspect;
                Matrix4::ortho(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    pub fn view_matrix(&self) -> Matrix4 {
        Matrix4::look_at(self.eye, self.center, self.up)
    }

    /// Replaces both registers of `stack` with this camera's matrices and
    /// leaves the stack in modelview mode.
    pub fn apply(&self, stack: &mut TransformStack) {
        let aspect = stack.viewport().aspect();
        stack.set_mode(MatrixMode::Projection);
        stack.load_matrix(&self.projection_matrix(aspect));
        stack.set_mode(MatrixMode::Modelview);
        stack.load_matrix(&self.view_matrix());
    }

    /// Swings the eye around the center. Angles in degrees; pitch stays
    /// short of the poles so `up` never lines up with the view direction.
    pub fn orbit(&mut self, yaw: f64, pitch: f64) {
        let offset = self.eye - self.center;
        let distance = offset.length();
        let angles = offset.to_angles();
        let limit = 89f64.to_radians();
        let theta = angles.theta + yaw.to_radians();
        let phi = (angles.phi + pitch.to_radians()).clamp(-limit, limit);
        self.eye = self.center + Vector3::from_angles(theta, phi) * distance;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(5.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vector3, b: Vector3) {
        assert!((a - b).length() < 1e-9, "{:?} vs {:?}", a, b);
    }

    #[test]
    fn test_project_identity_maps_ndc_to_pixels() {
        let viewport = Viewport::new(10, 20, 100, 50);
        let id = Matrix4::identity();
        assert_close(project(Vector3::new(-1.0, -1.0, -1.0), &id, &id, viewport), Vector3::new(10.0, 20.0, 0.0));
        assert_close(project(Vector3::new(1.0, 1.0, 1.0), &id, &id, viewport), Vector3::new(110.0, 70.0, 1.0));
    }

    #[test]
    fn test_unproject_inverts_project() {
        let viewport = Viewport::new(0, 0, 640, 480);
        let modelview = Matrix4::look_at(Vector3::new(1.0, 2.0, 6.0), Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
        let projection = Matrix4::perspective(60.0, viewport.aspect(), 0.5, 50.0);
        let point = Vector3::new(0.3, -0.2, 0.7);
        let win = project(point, &modelview, &projection, viewport);
        assert!(win.z > 0.0 && win.z < 1.0);
        assert_close(unproject(win, &modelview, &projection, viewport), point);
    }

    #[test]
    fn test_camera_apply_loads_both_registers() {
        let mut stack = TransformStack::new(Viewport::new(0, 0, 400, 200));
        let camera = Camera::default();
        stack.set_mode(MatrixMode::Projection);
        camera.apply(&mut stack);
        assert_eq!(stack.mode(), MatrixMode::Modelview);
        assert_eq!(stack.projection(), camera.projection_matrix(2.0));
        assert_eq!(stack.modelview(), camera.view_matrix());
    }

    #[test]
    fn test_orthographic_extent_follows_distance() {
        let mut camera = Camera::new(4.0);
        camera.mode = ProjectionMode::Orthographic;
        let p = camera.projection_matrix(1.0);
        // half-height is 2, so y = 2 maps to the top of NDC
        assert!((p.transform_point(Vector3::new(0.0, 2.0, -1.0)).y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_orbit_keeps_distance_and_clamps_pitch() {
        let mut camera = Camera::new(5.0);
        camera.orbit(90.0, 0.0);
        assert!(((camera.eye - camera.center).length() - 5.0).abs() < 1e-9);
        assert_close(camera.eye, Vector3::new(-5.0, 0.0, 0.0));
        camera.orbit(0.0, 180.0);
        assert!(camera.eye.y < 5.0 && camera.eye.y > 4.99);
    }
}
