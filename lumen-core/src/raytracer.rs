/// Camera ray reconstruction and analytic ray/primitive intersection
use crate::matrix::Matrix4;
use crate::projection::{self, Viewport};
use crate::stack::TransformStack;
use crate::vector::Vector3;

/// Inset applied to box bounds when classifying which face was hit.
pub const DEFAULT_BOX_EPSILON: f64 = 1.0e-6;

/// A ray; `direction` is not necessarily unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f64) -> Vector3 {
        self.origin + self.direction * t
    }
}

/// Result of an intersection test.
///
/// `t` is the ray parameter of the hit; `+inf` means nothing was recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTest {
    pub t: f64,
    pub hit: Option<Vector3>,
    pub normal: Option<Vector3>,
}

impl HitTest {
    pub fn new(t: f64, hit: Vector3, normal: Vector3) -> Self {
        Self {
            t,
            hit: Some(hit),
            normal: Some(normal),
        }
    }

    /// Identity element for [`HitTest::merge_with`].
    pub fn none() -> Self {
        Self {
            t: f64::INFINITY,
            hit: None,
            normal: None,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.hit.is_some()
    }

    /// Keeps `other` if it is in front of the origin and strictly closer.
    /// Ties keep the current hit.
    pub fn merge_with(&mut self, other: &HitTest) {
        if other.t > 0.0 && other.t < self.t {
            *self = *other;
        }
    }
}

impl Default for HitTest {
    fn default() -> Self {
        Self::none()
    }
}

/// Per-pixel ray generator for the current camera.
///
/// Built from a modelview matrix whose upper-left 3x3 block is a pure
/// rotation: the eye position is recovered with the transpose, so scale or
/// shear in the modelview gives a wrong eye. Per-pixel rays bilinearly blend
/// the four far-plane corner rays, which is exact for standard perspective
/// and orthographic frusta only.
#[derive(Debug, Clone)]
pub struct Raytracer {
    eye: Vector3,
    ray00: Vector3,
    ray10: Vector3,
    ray01: Vector3,
    ray11: Vector3,
    viewport: Viewport,
}

impl Raytracer {
    /// Snapshots the stack's modelview, projection and viewport.
    pub fn new(stack: &TransformStack) -> Self {
        Self::from_matrices(&stack.modelview(), &stack.projection(), stack.viewport())
    }

    pub fn from_matrices(modelview: &Matrix4, projection: &Matrix4, viewport: Viewport) -> Self {
        let m = &modelview.m;
        if !is_rotation(modelview) {
            log::warn!("modelview has scale or shear; reconstructed eye will be wrong");
        }

        let axis_x = Vector3::new(m[0], m[4], m[8]);
        let axis_y = Vector3::new(m[1], m[5], m[9]);
        let axis_z = Vector3::new(m[2], m[6], m[10]);
        let offset = Vector3::new(m[3], m[7], m[11]);
        let eye = Vector3::new(-offset.dot(axis_x), -offset.dot(axis_y), -offset.dot(axis_z));

        let min_x = viewport.x as f64;
        let max_x = min_x + viewport.width as f64;
        let min_y = viewport.y as f64;
        let max_y = min_y + viewport.height as f64;
        let corner = |x: f64, y: f64| {
            projection::unproject(Vector3::new(x, y, 1.0), modelview, projection, viewport) - eye
        };

        Self {
            eye,
            ray00: corner(min_x, min_y),
            ray10: corner(max_x, min_y),
            ray01: corner(min_x, max_y),
            ray11: corner(max_x, max_y),
            viewport,
        }
    }

    pub fn eye(&self) -> Vector3 {
        self.eye
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Unit direction through window pixel `(x, y)`, with `y` growing
    /// downward as in window coordinates.
    pub fn get_ray_for_pixel(&self, x: f64, y: f64) -> Vector3 {
        let x = (x - self.viewport.x as f64) / self.viewport.width as f64;
        let y = 1.0 - (y - self.viewport.y as f64) / self.viewport.height as f64;
        let ray0 = Vector3::lerp(self.ray00, self.ray10, x);
        let ray1 = Vector3::lerp(self.ray01, self.ray11, x);
        Vector3::lerp(ray0, ray1, y).unit()
    }

    /// Ray from the eye through window pixel `(x, y)`.
    pub fn pixel_ray(&self, x: f64, y: f64) -> Ray {
        Ray::new(self.eye, self.get_ray_for_pixel(x, y))
    }

    /// Axis-aligned box test using the slab method.
    pub fn hit_test_box(origin: Vector3, ray: Vector3, min: Vector3, max: Vector3) -> Option<HitTest> {
        Self::hit_test_box_with_epsilon(origin, ray, min, max, DEFAULT_BOX_EPSILON)
    }

    /// Box test with a custom inset for the face classification. The normal
    /// has one nonzero component on a face, two or three on edges/corners.
    pub fn hit_test_box_with_epsilon(
        origin: Vector3,
        ray: Vector3,
        min: Vector3,
        max: Vector3,
        epsilon: f64,
    ) -> Option<HitTest> {
        let t_min = (min - origin) / ray;
        let t_max = (max - origin) / ray;
        let t1 = Vector3::min(t_min, t_max);
        let t2 = Vector3::max(t_min, t_max);
        let t_near = t1.max_component();
        let t_far = t2.min_component();

        if t_near > 0.0 && t_near < t_far {
            let hit = origin + ray * t_near;
            let min = min + epsilon;
            let max = max - epsilon;
            let normal = Vector3::new(
                face_sign(hit.x, min.x, max.x),
                face_sign(hit.y, min.y, max.y),
                face_sign(hit.z, min.z, max.z),
            );
            return Some(HitTest::new(t_near, hit, normal));
        }
        None
    }

    /// Sphere test reporting the entry root only.
    ///
    /// The returned `t` can be negative when the sphere is behind the origin
    /// or contains it; [`HitTest::merge_with`] discards those.
    pub fn hit_test_sphere(origin: Vector3, ray: Vector3, center: Vector3, radius: f64) -> Option<HitTest> {
        let offset = origin - center;
        let a = ray.dot(ray);
        let b = 2.0 * ray.dot(offset);
        let c = offset.dot(offset) - radius * radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant > 0.0 {
            let t = (-b - discriminant.sqrt()) / (2.0 * a);
            let hit = origin + ray * t;
            return Some(HitTest::new(t, hit, (hit - center) / radius));
        }
        None
    }

    /// Triangle test; edges count as inside. A ray parallel to the plane
    /// gives a non-finite `t` and misses.
    pub fn hit_test_triangle(origin: Vector3, ray: Vector3, a: Vector3, b: Vector3, c: Vector3) -> Option<HitTest> {
        let ab = b - a;
        let ac = c - a;
        let normal = ab.cross(ac).unit();
        let t = normal.dot(a - origin) / normal.dot(ray);

        if t > 0.0 {
            let hit = origin + ray * t;
            let to_hit = hit - a;
            let dot00 = ac.dot(ac);
            let dot01 = ac.dot(ab);
            let dot02 = ac.dot(to_hit);
            let dot11 = ab.dot(ab);
            let dot12 = ab.dot(to_hit);
            let divide = dot00 * dot11 - dot01 * dot01;
            let u = (dot11 * dot02 - dot01 * dot12) / divide;
            let v = (dot00 * dot12 - dot01 * dot02) / divide;
            if u >= 0.0 && v >= 0.0 && u + v <= 1.0 {
                return Some(HitTest::new(t, hit, normal));
            }
        }
        None
    }
}

fn face_sign(value: f64, min: f64, max: f64) -> f64 {
    (value > max) as i32 as f64 - (value < min) as i32 as f64
}

fn is_rotation(m: &Matrix4) -> bool {
    let rows = [
        Vector3::new(m.m[0], m.m[1], m.m[2]),
        Vector3::new(m.m[4], m.m[5], m.m[6]),
        Vector3::new(m.m[8], m.m[9], m.m[10]),
    ];
    for i in 0..3 {
        for j in 0..3 {
            let expected = if i == j { 1.0 } else { 0.0 };
            if (rows[i].dot(rows[j]) - expected).abs() > 1e-4 {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::MatrixMode;

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn assert_close(a: Vector3, b: Vector3, eps: f64) {
        assert!((a - b).length() < eps, "{:?} vs {:?}", a, b);
    }

    #[test]
    fn test_sphere_hit() {
        let hit = Raytracer::hit_test_sphere(v(0.0, 0.0, -5.0), v(0.0, 0.0, 1.0), Vector3::zero(), 1.0).unwrap();
        assert_eq!(hit.t, 4.0);
        assert_eq!(hit.hit, Some(v(0.0, 0.0, -1.0)));
        assert_eq!(hit.normal, Some(v(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_sphere_miss() {
        let result = Raytracer::hit_test_sphere(v(0.0, 3.0, -5.0), v(0.0, 0.0, 1.0), Vector3::zero(), 1.0);
        assert!(result.is_none());
        // grazing ray has a zero discriminant and is not a hit
        let grazing = Raytracer::hit_test_sphere(v(0.0, 1.0, -5.0), v(0.0, 0.0, 1.0), Vector3::zero(), 1.0);
        assert!(grazing.is_none());
    }

    #[test]
    fn test_sphere_from_inside_is_discarded_by_merge() {
        let inside = Raytracer::hit_test_sphere(Vector3::zero(), v(0.0, 0.0, 1.0), Vector3::zero(), 1.0).unwrap();
        assert!(inside.t < 0.0);
        let mut best = HitTest::none();
        best.merge_with(&inside);
        assert!(!best.is_hit());
        assert_eq!(best.t, f64::INFINITY);
    }

    #[test]
    fn test_box_hit_face_normal() {
        let hit = Raytracer::hit_test_box(v(-5.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(-1.0, -1.0, -1.0), v(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(hit.t, 4.0);
        assert_eq!(hit.hit, Some(v(-1.0, 0.0, 0.0)));
        assert_eq!(hit.normal, Some(v(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_box_negative_direction() {
        let hit = Raytracer::hit_test_box(v(0.0, 0.0, 5.0), v(0.0, 0.0, -2.0), v(-1.0, -1.0, -1.0), v(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(hit.t, 2.0);
        assert_eq!(hit.normal, Some(v(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_box_edge_normal() {
        let hit = Raytracer::hit_test_box(v(-2.0, -2.0, 0.0), v(1.0, 1.0, 0.0), v(-1.0, -1.0, -1.0), v(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(hit.normal, Some(v(-1.0, -1.0, 0.0)));
    }

    #[test]
    fn test_box_miss_and_behind() {
        let min = v(-1.0, -1.0, -1.0);
        let max = v(1.0, 1.0, 1.0);
        assert!(Raytracer::hit_test_box(v(-5.0, 3.0, 0.0), v(1.0, 0.0, 0.0), min, max).is_none());
        assert!(Raytracer::hit_test_box(v(5.0, 0.0, 0.0), v(1.0, 0.0, 0.0), min, max).is_none());
        // starting inside gives a negative near distance
        assert!(Raytracer::hit_test_box(Vector3::zero(), v(1.0, 0.0, 0.0), min, max).is_none());
    }

    #[test]
    fn test_box_custom_epsilon() {
        let hit = Raytracer::hit_test_box_with_epsilon(
            v(-5.0, 0.95, 0.0),
            v(1.0, 0.0, 0.0),
            v(-1.0, -1.0, -1.0),
            v(1.0, 1.0, 1.0),
            0.1,
        )
        .unwrap();
        assert_eq!(hit.normal, Some(v(-1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_triangle_hit() {
        let hit = Raytracer::hit_test_triangle(
            v(0.25, 0.25, 1.0),
            v(0.0, 0.0, -1.0),
            Vector3::zero(),
            v(1.0, 0.0, 0.0),
            v(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert_eq!(hit.t, 1.0);
        assert_close(hit.hit.unwrap(), v(0.25, 0.25, 0.0), 1e-12);
        assert_eq!(hit.normal, Some(v(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_triangle_edge_inclusive_and_outside() {
        let (a, b, c) = (Vector3::zero(), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0));
        let down = v(0.0, 0.0, -1.0);
        assert!(Raytracer::hit_test_triangle(v(0.5, 0.0, 1.0), down, a, b, c).is_some());
        assert!(Raytracer::hit_test_triangle(v(0.75, 0.75, 1.0), down, a, b, c).is_none());
    }

    #[test]
    fn test_triangle_parallel_ray_misses() {
        let result = Raytracer::hit_test_triangle(
            v(0.25, 0.25, 1.0),
            v(1.0, 0.0, 0.0),
            Vector3::zero(),
            v(1.0, 0.0, 0.0),
            v(0.0, 1.0, 0.0),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_merge_keeps_closest_and_ties() {
        let near = HitTest::new(2.0, v(0.0, 0.0, 2.0), v(0.0, 0.0, -1.0));
        let far = HitTest::new(5.0, v(0.0, 0.0, 5.0), v(0.0, 0.0, -1.0));
        let tie = HitTest::new(2.0, v(9.0, 9.0, 9.0), v(1.0, 0.0, 0.0));

        let mut best = HitTest::none();
        best.merge_with(&far);
        best.merge_with(&near);
        assert_eq!(best, near);
        best.merge_with(&far);
        assert_eq!(best, near);
        best.merge_with(&tie);
        assert_eq!(best, near);
    }

    #[test]
    fn test_pixel_rays_through_perspective_camera() {
        let mut stack = TransformStack::new(Viewport::new(0, 0, 100, 100));
        stack.set_mode(MatrixMode::Projection);
        stack.perspective(90.0, 1.0, 0.1, 100.0);
        stack.set_mode(MatrixMode::Modelview);
        stack.translate(0.0, 0.0, -5.0);

        let tracer = Raytracer::new(&stack);
        assert_close(tracer.eye(), v(0.0, 0.0, 5.0), 1e-9);

        let center = tracer.get_ray_for_pixel(50.0, 50.0);
        assert_close(center, v(0.0, 0.0, -1.0), 1e-9);

        // top-left window pixel looks up and to the left
        let corner = tracer.get_ray_for_pixel(0.0, 0.0);
        assert_close(corner, v(-1.0, 1.0, -1.0).unit(), 1e-6);

        let ray = tracer.pixel_ray(50.0, 50.0);
        let hit = Raytracer::hit_test_sphere(ray.origin, ray.direction, Vector3::zero(), 1.0).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-9);
        assert_close(ray.at(hit.t), v(0.0, 0.0, 1.0), 1e-9);
    }

    #[test]
    fn test_eye_reconstruction_with_rotation() {
        let eye = v(3.0, 4.0, 5.0);
        let modelview = Matrix4::look_at(eye, Vector3::zero(), v(0.0, 1.0, 0.0));
        let tracer = Raytracer::from_matrices(&modelview, &Matrix4::perspective(45.0, 1.0, 0.1, 50.0), Viewport::new(0, 0, 64, 64));
        assert_close(tracer.eye(), eye, 1e-9);
        assert!(is_rotation(&modelview));
        assert!(!is_rotation(&Matrix4::scale(2.0, 1.0, 1.0)));
    }
}
