//! Generate a capsule `blockMeshDict`.
//!
//! Usage: `capsule-mesh [--diameter D] [--config FILE] [--output FILE] [--dump-points FILE]`

use std::path::PathBuf;

use clap::Parser;

use capsule_mesh::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "capsule-mesh", version)]
#[command(about = "Write an OpenFOAM blockMeshDict for the flow around a capsule")]
struct Args {
    /// Body diameter in meters, overrides the config file
    #[arg(long)]
    diameter: Option<f64>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output path, overrides the config file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write the 2D control points as JSON
    #[arg(long = "dump-points")]
    dump_points: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CapsuleMeshConfig::from_json_file(path)?,
        None => CapsuleMeshConfig::default(),
    };
    if let Some(diameter) = args.diameter {
        config = config.with_diameter(diameter);
    }
    if let Some(output) = args.output {
        config = config.with_output_path(output);
    }

    let pipeline = CapsuleMeshPipeline::new(config);
    let written = match &args.dump_points {
        Some(dump) => pipeline.run_with_dump(dump)?,
        None => pipeline.run()?,
    };
    println!("{}", written.display());
    Ok(())
}
