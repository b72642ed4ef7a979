/// Terminal front-end: raytraces a scene into ASCII art
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use lumen_core::{Camera, MatrixMode, TransformStack};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;
pub mod scene;

pub use renderer::AsciiRenderer;
pub use scene::{Scene, Shape};

/// Settings for the terminal viewer
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Vertical field of view in degrees
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    /// Distance from the camera to the scene origin
    pub distance: f64,
    pub target_fps: u32,
    /// Degrees per key press
    pub orbit_step: f64,
    /// Degrees of scene spin per frame
    pub spin_speed: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            distance: 5.0,
            target_fps: 30,
            orbit_step: 5.0,
            spin_speed: 1.0,
        }
    }
}

/// Main application struct for terminal raytracing
pub struct TerminalApp {
    scene: Scene,
    camera: Camera,
    stack: TransformStack,
    renderer: AsciiRenderer,
    config: AppConfig,
    spin: f64,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Scene, config: AppConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let renderer = AsciiRenderer::new(width as usize, height as usize);

        let mut camera = Camera::new(config.distance);
        camera.fov = config.fov;
        camera.near = config.near;
        camera.far = config.far;
        camera.orbit(0.0, 20.0);

        log::info!("terminal {}x{}, {} shapes", width, height, scene.shapes.len());

        Ok(Self {
            scene,
            camera,
            stack: TransformStack::new(renderer.viewport()),
            renderer,
            config,
            spin: 0.0,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / self.config.target_fps.max(1) as u64);

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            // Update
            self.spin = (self.spin + self.config.spin_speed) % 360.0;

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let step = self.config.orbit_step;
        match event::read()? {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char('w') | KeyCode::Up => self.camera.orbit(0.0, step),
                KeyCode::Char('s') | KeyCode::Down => self.camera.orbit(0.0, -step),
                KeyCode::Char('a') | KeyCode::Left => self.camera.orbit(-step, 0.0),
                KeyCode::Char('d') | KeyCode::Right => self.camera.orbit(step, 0.0),
                KeyCode::Char('e') => self.zoom(0.9),
                KeyCode::Char('r') => self.zoom(1.1),
                _ => {}
            },
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
                self.stack.set_viewport(self.renderer.viewport());
                log::debug!("resized to {}x{}", width, height);
            }
            _ => {}
        }
        Ok(())
    }

    fn zoom(&mut self, factor: f64) {
        let offset = self.camera.eye - self.camera.center;
        self.camera.eye = self.camera.center + offset * factor;
    }

    /// Loads the camera, spins the scene about Y inside a push/pop pair, and
    /// traces a frame.
    fn prepare_frame(&mut self) {
        self.camera.apply(&mut self.stack);
        self.stack.set_mode(MatrixMode::Modelview);
        self.stack.push();
        self.stack.rotate(self.spin, 0.0, 1.0, 0.0);
        self.renderer.clear();
        self.renderer.render_scene(&self.scene, &self.stack);
        if let Err(e) = self.stack.pop() {
            log::error!("{}", e);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.prepare_frame();

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Lumen Terminal Raytracer | FPS: {:.1} | Controls: WASD/Arrows=Orbit E/R=Zoom Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
