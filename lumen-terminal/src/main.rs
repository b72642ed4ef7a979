/// Lumen Terminal Demo - Raytraced Scene
///
/// Raytraces an OBJ model, or a box and a sphere on a ground plane when no
/// model is given, into ASCII characters.
///
/// Usage: lumen-terminal [path/to/model.obj]
///
/// Controls:
///   - WASD / Arrow Keys: Orbit the camera
///   - E/R: Zoom in/out
///   - Q/ESC: Quit
///
/// Set RUST_LOG=debug for diagnostics on stderr.

use std::env;
use std::io;
use std::path::PathBuf;
use lumen_terminal::{AppConfig, Scene, TerminalApp};

fn main() -> io::Result<()> {
    env_logger::init();
    println!("Lumen Terminal Raytracer - Loading...");

    let path = env::args().nth(1).map(PathBuf::from);
    let scene = Scene::load(path.as_deref())?;

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    // Run the terminal app
    let mut app = TerminalApp::new(scene, AppConfig::default())?;
    app.run()?;

    println!("Thank you for using Lumen Terminal Raytracer!");
    Ok(())
}
