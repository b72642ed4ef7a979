/// Primitives the terminal raytracer knows how to hit
use std::fs;
use std::io;
use std::path::Path;

use lumen_core::{obj, HitTest, Matrix4, Mesh, Raytracer, Vector3};

/// A single traceable object
#[derive(Debug, Clone)]
pub enum Shape {
    Sphere { center: Vector3, radius: f64 },
    Box { min: Vector3, max: Vector3 },
    Mesh(Mesh),
}

impl Shape {
    pub fn hit_test(&self, origin: Vector3, ray: Vector3) -> Option<HitTest> {
        match self {
            Shape::Sphere { center, radius } => Raytracer::hit_test_sphere(origin, ray, *center, *radius),
            Shape::Box { min, max } => Raytracer::hit_test_box(origin, ray, *min, *max),
            Shape::Mesh(mesh) => Some(mesh.hit_test(origin, ray)).filter(HitTest::is_hit),
        }
    }
}

/// Collection of shapes traced as one
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// A box and a sphere standing on a ground plane.
    pub fn demo() -> Self {
        let mut ground = Mesh::plane(4, 4);
        ground.transform(
            &Matrix4::translate(0.0, -1.0, 0.0)
                .multiply(&Matrix4::rotate(-90.0, 1.0, 0.0, 0.0))
                .multiply(&Matrix4::scale(4.0, 4.0, 1.0)),
        );

        let mut scene = Self::new();
        scene.add(Shape::Mesh(ground));
        scene.add(Shape::Box {
            min: Vector3::new(-1.6, -1.0, -0.6),
            max: Vector3::new(-0.4, 0.2, 0.6),
        });
        scene.add(Shape::Sphere {
            center: Vector3::new(1.0, -0.2, 0.0),
            radius: 0.8,
        });
        scene
    }

    /// Wraps a loaded mesh, centered and scaled to fit a 2-unit cube.
    pub fn from_mesh(mut mesh: Mesh) -> Self {
        mesh.center();
        if let Some((min, max)) = mesh.bounding_box() {
            let extent = (max - min).max_component();
            if extent > 0.0 {
                let s = 2.0 / extent;
                let lift = (max.y - min.y) * s / 2.0;
                mesh.transform(&Matrix4::translate(0.0, -lift, 0.0).multiply(&Matrix4::scale(s, s, s)));
            }
        }
        if mesh.vertices.iter().any(|v| v.normal == Vector3::zero()) {
            mesh.compute_normals();
        }
        let mut scene = Self::new();
        scene.add(Shape::Mesh(mesh));
        scene
    }

    /// Scene for the viewer: the OBJ file at `path` fitted to view, or the
    /// demo scene when no path is given.
    pub fn load(path: Option<&Path>) -> io::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::demo());
        };
        let text = fs::read_to_string(path).map_err(|e| {
            io::Error::new(e.kind(), format!("failed to read {}: {}", path.display(), e))
        })?;
        let mesh = obj::parse_obj(&text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("failed to parse {}: {}", path.display(), e)))?;
        log::info!("loaded {} triangles from {}", mesh.triangles.len(), path.display());
        Ok(Self::from_mesh(mesh))
    }

    /// Closest hit over every shape.
    pub fn trace(&self, origin: Vector3, ray: Vector3) -> HitTest {
        let mut result = HitTest::none();
        for shape in &self.shapes {
            if let Some(hit) = shape.hit_test(origin, ray) {
                result.merge_with(&hit);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_scene_hits_sphere_before_ground() {
        let scene = Scene::demo();
        let hit = scene.trace(Vector3::new(1.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!((hit.t - (5.0 - (-0.2) - 0.8)).abs() < 1e-9);
        assert!((hit.normal.unwrap() - Vector3::new(0.0, 1.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_demo_scene_ground_plane() {
        let scene = Scene::demo();
        let hit = scene.trace(Vector3::new(2.7, 5.0, 1.3), Vector3::new(0.0, -1.0, 0.0));
        assert!((hit.t - 6.0).abs() < 1e-9);
        assert!((hit.normal.unwrap() - Vector3::new(0.0, 1.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_empty_scene_misses() {
        let hit = Scene::new().trace(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));
        assert!(!hit.is_hit());
    }

    #[test]
    fn test_from_mesh_fits_unit_extent() {
        let mut cube = Mesh::cube();
        cube.transform(&Matrix4::scale(5.0, 5.0, 5.0));
        let scene = Scene::from_mesh(cube);
        let Shape::Mesh(mesh) = &scene.shapes[0] else {
            panic!("expected a mesh shape");
        };
        let (min, max) = mesh.bounding_box().unwrap();
        assert!((min - Vector3::splat(-1.0)).length() < 1e-9);
        assert!((max - Vector3::splat(1.0)).length() < 1e-9);
    }

    #[test]
    fn test_load_without_path_is_demo() {
        let scene = Scene::load(None).unwrap();
        assert_eq!(scene.shapes.len(), Scene::demo().shapes.len());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let path = std::env::temp_dir().join("lumen-terminal-missing.obj");
        let _ = fs::remove_file(&path);
        let err = Scene::load(Some(&path)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_load_obj_file() {
        let path = std::env::temp_dir().join(format!("lumen-terminal-{}.obj", std::process::id()));
        fs::write(&path, "v 0 0 0\nv 4 0 0\nv 0 4 0\nf 1 2 3\n").unwrap();
        let scene = Scene::load(Some(&path));
        let _ = fs::remove_file(&path);
        let scene = scene.unwrap();
        assert_eq!(scene.shapes.len(), 1);
        let Shape::Mesh(mesh) = &scene.shapes[0] else {
            panic!("expected a mesh shape");
        };
        assert_eq!(mesh.triangles.len(), 1);
        assert!(mesh.vertices.iter().all(|v| v.normal != Vector3::zero()));
    }

    #[test]
    fn test_load_bad_obj_is_invalid_data() {
        let path = std::env::temp_dir().join(format!("lumen-terminal-bad-{}.obj", std::process::id()));
        fs::write(&path, "v 0 zero 0\n").unwrap();
        let err = Scene::load(Some(&path)).unwrap_err();
        let _ = fs::remove_file(&path);
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
