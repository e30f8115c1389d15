/// Example: Load an STL file and print what a renderer would consume
///
/// Usage: cargo run --example inspect_stl -- path/to/file.stl

use std::env;
use std::process::ExitCode;

use stlmodel_core::Model;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stlmodel_core=debug")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <stl-file>", args[0]);
        return ExitCode::FAILURE;
    }

    let model = match Model::open(&args[1]) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Failed to load {}: {}", args[1], e);
            return ExitCode::FAILURE;
        }
    };

    let bounds = model.bounds();
    let center = model.center();

    println!("Name:      {}", model.name());
    println!("Faces:     {}", model.face_count());
    println!("Draw size: {}", model.triangle_count());
    println!("Bounds:    x {:?} y {:?} z {:?}", bounds.x, bounds.y, bounds.z);
    println!("Center:    ({}, {}, {})", center.x, center.y, center.z);

    ExitCode::SUCCESS
}
