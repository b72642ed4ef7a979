/// Lumen Web - WASM bindings for browser-side picking
///
/// The page owns the WebGL context and reports its viewport and matrices
/// here; picks come back as flat `Float64Array`s.

use lumen_core::{HitTest, Matrix4, Raytracer, StackError, TransformStack, Vector3, Viewport};
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Primitive {
    Sphere { center: Vector3, radius: f64 },
    Box { min: Vector3, max: Vector3 },
    Triangle { a: Vector3, b: Vector3, c: Vector3 },
}

fn matrix_from_slice(entries: &[f64]) -> Result<Matrix4, String> {
    let m: [f64; 16] = entries
        .try_into()
        .map_err(|_| format!("expected 16 matrix entries, got {}", entries.len()))?;
    Ok(Matrix4::new(m))
}

fn stack_error(e: StackError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// `[t, hit.x, hit.y, hit.z, normal.x, normal.y, normal.z]`, or empty on a miss.
fn flatten(hit: &HitTest) -> Vec<f64> {
    match (hit.hit, hit.normal) {
        (Some(p), Some(n)) => vec![hit.t, p.x, p.y, p.z, n.x, n.y, n.z],
        _ => Vec::new(),
    }
}

#[wasm_bindgen]
pub struct WebPicker {
    stack: TransformStack,
    primitives: Vec<Primitive>,
}

#[wasm_bindgen]
impl WebPicker {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebPicker {
        WebPicker {
            stack: TransformStack::default(),
            primitives: Vec::new(),
        }
    }

    pub fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.stack.set_viewport(Viewport::new(x, y, width, height));
    }

    /// Selects the active register by GL enum (`MODELVIEW` / `PROJECTION`).
    pub fn matrix_mode(&mut self, mode: u32) -> Result<(), JsValue> {
        self.stack.set_mode_raw(mode).map_err(stack_error)
    }

    /// Replaces the active register with 16 row-major entries.
    pub fn load_matrix(&mut self, entries: &[f64]) -> Result<(), JsValue> {
        let m = matrix_from_slice(entries).map_err(|e| JsValue::from_str(&e))?;
        self.stack.load_matrix(&m);
        Ok(())
    }

    pub fn load_identity(&mut self) {
        self.stack.load_identity();
    }

    pub fn push_matrix(&mut self) {
        self.stack.push();
    }

    pub fn pop_matrix(&mut self) -> Result<(), JsValue> {
        self.stack.pop().map_err(stack_error)
    }

    pub fn perspective(&mut self, fov: f64, aspect: f64, near: f64, far: f64) {
        self.stack.perspective(fov, aspect, near, far);
    }

    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.stack.translate(x, y, z);
    }

    pub fn rotate(&mut self, angle: f64, x: f64, y: f64, z: f64) {
        self.stack.rotate(angle, x, y, z);
    }

    pub fn scale(&mut self, x: f64, y: f64, z: f64) {
        self.stack.scale(x, y, z);
    }

    /// Active register as 16 row-major entries.
    pub fn current_matrix(&self) -> Vec<f64> {
        self.stack.current().m.to_vec()
    }

    pub fn project(&self, x: f64, y: f64, z: f64) -> Vec<f64> {
        self.stack.project(Vector3::new(x, y, z)).to_array().to_vec()
    }

    pub fn unproject(&self, x: f64, y: f64, z: f64) -> Vec<f64> {
        self.stack.unproject(Vector3::new(x, y, z)).to_array().to_vec()
    }

    pub fn add_sphere(&mut self, x: f64, y: f64, z: f64, radius: f64) {
        self.primitives.push(Primitive::Sphere {
            center: Vector3::new(x, y, z),
            radius,
        });
    }

    pub fn add_box(&mut self, min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64, max_z: f64) {
        self.primitives.push(Primitive::Box {
            min: Vector3::new(min_x, min_y, min_z),
            max: Vector3::new(max_x, max_y, max_z),
        });
    }

    /// Adds a triangle from 9 coordinates `[ax, ay, az, bx, ..., cz]`.
    pub fn add_triangle(&mut self, coords: &[f64]) -> Result<(), JsValue> {
        if coords.len() != 9 {
            return Err(JsValue::from_str("expected 9 triangle coordinates"));
        }
        let corner = |i: usize| Vector3::new(coords[i], coords[i + 1], coords[i + 2]);
        self.primitives.push(Primitive::Triangle {
            a: corner(0),
            b: corner(3),
            c: corner(6),
        });
        Ok(())
    }

    pub fn clear_primitives(&mut self) {
        self.primitives.clear();
    }

    /// Picks the nearest primitive under window pixel `(x, y)`, with `y`
    /// counted from the top as mouse events report it.
    pub fn pick(&self, x: f64, y: f64) -> Vec<f64> {
        flatten(&self.pick_hit(x, y))
    }
}

impl WebPicker {
    fn pick_hit(&self, x: f64, y: f64) -> HitTest {
        let tracer = Raytracer::new(&self.stack);
        let origin = tracer.eye();
        let ray = tracer.get_ray_for_pixel(x, y);

        let mut result = HitTest::none();
        for primitive in &self.primitives {
            let hit = match *primitive {
                Primitive::Sphere { center, radius } => Raytracer::hit_test_sphere(origin, ray, center, radius),
                Primitive::Box { min, max } => Raytracer::hit_test_box(origin, ray, min, max),
                Primitive::Triangle { a, b, c } => Raytracer::hit_test_triangle(origin, ray, a, b, c),
            };
            if let Some(hit) = hit {
                result.merge_with(&hit);
            }
        }
        log::debug!("pick ({}, {}) -> t = {}", x, y, result.t);
        result
    }
}

impl Default for WebPicker {
    fn default() -> Self {
        Self::new()
    }
}
