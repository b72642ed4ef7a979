/// Lumen Core Library - transform algebra and ray picking
///
/// This library provides the stateless math behind a fixed-function style
/// renderer: vectors, 4x4 matrices, a modelview/projection transform stack,
/// project/unproject, and analytic ray intersection for picking and simple
/// raytracing. Meshes and an OBJ reader supply triangle geometry.

pub mod error;
pub mod matrix;
pub mod mesh;
pub mod obj;
pub mod projection;
pub mod raytracer;
pub mod stack;
pub mod vector;

// Re-export commonly used types
pub use error::{MatrixError, ObjError, StackError};
pub use matrix::Matrix4;
pub use mesh::{Mesh, Vertex};
pub use projection::{project, unproject, Camera, ProjectionMode, Viewport};
pub use raytracer::{HitTest, Ray, Raytracer, DEFAULT_BOX_EPSILON};
pub use stack::{MatrixMode, TransformStack, GL_MODELVIEW, GL_PROJECTION};
pub use vector::Vector3;
