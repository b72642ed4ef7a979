/// Example: Load and raytrace an OBJ file in the terminal
///
/// Usage: cargo run --example load_obj -- path/to/model.obj

use std::env;
use std::io;
use std::path::Path;
use lumen_terminal::{AppConfig, Scene, TerminalApp};

fn main() -> io::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <obj-file>", args[0]);
        eprintln!("\nNo OBJ file provided, using the demo scene...");
    }

    let scene = Scene::load(args.get(1).map(Path::new))?;
    println!("Scene ready with {} shapes", scene.shapes.len());

    let mut app = TerminalApp::new(scene, AppConfig::default())?;
    app.run()
}
