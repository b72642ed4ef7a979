/// ASCII raytracer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use lumen_core::{Raytracer, TransformStack, Vector3, Viewport};
use std::io::Write;

use crate::scene::Scene;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Light contribution that every lit surface receives.
const AMBIENT: f64 = 0.15;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: i32 = 2;

/// Renders a scene into a grid of terminal characters, one primary ray per cell
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
    light: Vector3,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            char_buffer: vec![' '; width * height],
            light: Vector3::new(0.5, 1.0, 0.8).unit(),
        }
    }

    /// Viewport in square "pixels" matching this character grid.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(0, 0, self.width as i32, self.height as i32 * CELL_ASPECT)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.char_buffer = vec![' '; width * height];
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    /// Traces the scene as seen through the stack's current matrices.
    pub fn render_scene(&mut self, scene: &Scene, stack: &TransformStack) {
        let tracer = Raytracer::new(stack);
        let eye = tracer.eye();
        let scale = CELL_ASPECT as f64;

        for y in 0..self.height {
            for x in 0..self.width {
                let ray = tracer.get_ray_for_pixel(x as f64 + 0.5, (y as f64 + 0.5) * scale);
                let hit = scene.trace(eye, ray);
                let character = match hit.normal {
                    Some(normal) => {
                        let brightness = AMBIENT + (1.0 - AMBIENT) * normal.dot(self.light).max(0.0);
                        shade(brightness)
                    }
                    None => ' ',
                };
                self.char_buffer[y * self.width + x] = character;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.char_at(x, y);

                // Color based on character intensity
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Maps a brightness in `[0, 1]` onto the luminosity ramp, skipping the
/// blank so lit geometry is never invisible.
fn shade(brightness: f64) -> char {
    let steps = (LUMINOSITY_RAMP.len() - 1) as f64;
    let index = (brightness.clamp(0.0, 1.0) * steps).round() as usize;
    LUMINOSITY_RAMP[index.clamp(1, LUMINOSITY_RAMP.len() - 1)]
}
