/// Modelview/projection matrix registers with push/pop stacks
use std::fmt;
use std::str::FromStr;

use crate::error::StackError;
use crate::matrix::Matrix4;
use crate::projection::{self, Viewport};
use crate::vector::Vector3;

/// GL enum value selecting the modelview register.
pub const GL_MODELVIEW: u32 = 0x1700;
/// GL enum value selecting the projection register.
pub const GL_PROJECTION: u32 = 0x1701;

/// Which register the matrix calls operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixMode {
    #[default]
    Modelview,
    Projection,
}

impl fmt::Display for MatrixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixMode::Modelview => write!(f, "modelview"),
            MatrixMode::Projection => write!(f, "projection"),
        }
    }
}

impl TryFrom<u32> for MatrixMode {
    type Error = StackError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            GL_MODELVIEW => Ok(MatrixMode::Modelview),
            GL_PROJECTION => Ok(MatrixMode::Projection),
            other => Err(StackError::InvalidMode(format!("{:#x}", other))),
        }
    }
}

impl FromStr for MatrixMode {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "modelview" => Ok(MatrixMode::Modelview),
            "projection" => Ok(MatrixMode::Projection),
            _ => Err(StackError::InvalidMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Register {
    current: Matrix4,
    saved: Vec<Matrix4>,
}

/// Fixed-function style transform state for one rendering context.
///
/// Owns the modelview and projection registers, each with its own stack of
/// saved snapshots, the active-register selector, and the viewport last
/// reported by the host. Not meant to be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    modelview: Register,
    projection: Register,
    mode: MatrixMode,
    viewport: Viewport,
}

impl TransformStack {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> MatrixMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: MatrixMode) {
        log::trace!("matrix mode -> {}", mode);
        self.mode = mode;
    }

    /// Selects the active register from a raw GL enum value.
    pub fn set_mode_raw(&mut self, raw: u32) -> Result<(), StackError> {
        self.set_mode(MatrixMode::try_from(raw)?);
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn modelview(&self) -> Matrix4 {
        self.modelview.current
    }

    pub fn projection(&self) -> Matrix4 {
        self.projection.current
    }

    /// Matrix held by the active register.
    pub fn current(&self) -> Matrix4 {
        self.active_ref().current
    }

    /// Depth of the active register's saved stack.
    pub fn depth(&self) -> usize {
        self.active_ref().saved.len()
    }

    fn active_ref(&self) -> &Register {
        match self.mode {
            MatrixMode::Modelview => &self.modelview,
            MatrixMode::Projection => &self.projection,
        }
    }

    fn active(&mut self) -> &mut Register {
        match self.mode {
            MatrixMode::Modelview => &mut self.modelview,
            MatrixMode::Projection => &mut self.projection,
        }
    }

    pub fn load_identity(&mut self) {
        log::trace!("load identity into {}", self.mode);
        self.active().current = Matrix4::identity();
    }

    pub fn load_matrix(&mut self, m: &Matrix4) {
        log::trace!("load {:?} into {}", m.m, self.mode);
        self.active().current = *m;
    }

    /// Right-multiplies the active register: the most recent call transforms
    /// object space first.
    pub fn multiply(&mut self, m: &Matrix4) {
        log::trace!("multiply {} by {:?}", self.mode, m.m);
        let register = self.active();
        register.current = register.current.multiply(m);
    }

    pub fn push(&mut self) {
        let mode = self.mode;
        let register = self.active();
        register.saved.push(register.current);
        log::trace!("push {} (depth {})", mode, register.saved.len());
    }

    pub fn pop(&mut self) -> Result<(), StackError> {
        let mode = self.mode;
        let register = self.active();
        register.current = register
            .saved
            .pop()
            .ok_or(StackError::StackUnderflow(mode))?;
        log::trace!("pop {} (depth {})", mode, register.saved.len());
        Ok(())
    }

    pub fn perspective(&mut self, fov: f64, aspect: f64, near: f64, far: f64) {
        self.multiply(&Matrix4::perspective(fov, aspect, near, far));
    }

    pub fn frustum(&mut self, l: f64, r: f64, b: f64, t: f64, n: f64, f: f64) {
        self.multiply(&Matrix4::frustum(l, r, b, t, n, f));
    }

    pub fn ortho(&mut self, l: f64, r: f64, b: f64, t: f64, n: f64, f: f64) {
        self.multiply(&Matrix4::ortho(l, r, b, t, n, f));
    }

    pub fn scale(&mut self, x: f64, y: f64, z: f64) {
        self.multiply(&Matrix4::scale(x, y, z));
    }

    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.multiply(&Matrix4::translate(x, y, z));
    }

    pub fn rotate(&mut self, angle: f64, x: f64, y: f64, z: f64) {
        self.multiply(&Matrix4::rotate(angle, x, y, z));
    }

    pub fn look_at(&mut self, eye: Vector3, center: Vector3, up: Vector3) {
        self.multiply(&Matrix4::look_at(eye, center, up));
    }

    /// Object space to window space using the current registers.
    pub fn project(&self, point: Vector3) -> Vector3 {
        projection::project(point, &self.modelview(), &self.projection(), self.viewport)
    }

    /// Window space back to object space using the current registers.
    pub fn unproject(&self, point: Vector3) -> Vector3 {
        projection::unproject(point, &self.modelview(), &self.projection(), self.viewport)
    }
}
