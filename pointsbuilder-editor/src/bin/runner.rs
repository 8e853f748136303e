//! PointsBuilder Runner
//!
//! Loads a project file and evaluates, emits, exports, verifies or
//! simulates it headlessly.
//!
//! Usage: `pointsbuilder-runner <COMMAND> project.json`
//!
//! Logging follows `RUST_LOG`, for example `RUST_LOG=debug`.

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

use pointsbuilder::command::Command;
use pointsbuilder::eval::evaluate;
use pointsbuilder::geometry::Geometry;
use pointsbuilder::kotlin::emit_tree;
use pointsbuilder::simulation::Simulation;
use pointsbuilder::DVec3;
use pointsbuilder_editor::code_export::{generate_code, ExportOptions};
use pointsbuilder_editor::kotlin_validate::{verify_commands, verify_geometry};
use pointsbuilder_editor::project::{ProjectFile, Tool};

#[derive(Parser)]
#[command(name = "pointsbuilder-runner")]
#[command(version)]
#[command(about = "Evaluate, emit and simulate PointsBuilder projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the points a geometry project produces
    Eval {
        /// Project file (.json)
        project: PathBuf,
    },

    /// Print the emitted Kotlin program
    Emit {
        /// Project file (.json)
        project: PathBuf,
    },

    /// Write a complete Kotlin source file
    Export {
        /// Project file (.json)
        project: PathBuf,
        /// Output file (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Kotlin package of the generated file
        #[arg(long)]
        package: Option<String>,
        /// Package of the particle runtime to import
        #[arg(long)]
        runtime_package: Option<String>,
        /// Name of the generated function
        #[arg(long)]
        function: Option<String>,
    },

    /// Check that the emitted program reproduces the evaluation
    Verify {
        /// Project file (.json)
        project: PathBuf,
    },

    /// Run a particle project headlessly
    Simulate {
        /// Project file (.json)
        project: PathBuf,
        /// Number of frames to run
        #[arg(short, long, default_value = "200")]
        frames: u32,
        /// Frame rate driving the tick clock
        #[arg(long, default_value = "60.0")]
        fps: f64,
        /// Override the emitter seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// A project of either tool.
enum Loaded {
    Geometry(ProjectFile<Geometry>),
    Commands(ProjectFile<Command>),
}

fn load(path: &PathBuf) -> Result<Loaded, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&json)?;
    let loaded = match Tool::detect(&document) {
        Tool::PointsBuilder => Loaded::Geometry(ProjectFile::from_value(document)?),
        Tool::ParticleEmitter => Loaded::Commands(ProjectFile::from_value(document)?),
    };
    log::info!("loaded {:?}", path);
    Ok(loaded)
}

fn format_point(p: DVec3) -> String {
    format!("{:.6} {:.6} {:.6}", p.x, p.y, p.z)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Eval { project } => {
            let Loaded::Geometry(project) = load(&project)? else {
                return Err("eval needs a geometry project".into());
            };
            let result = evaluate(project.tree.roots(), DVec3::Y);
            for point in &result.points {
                println!("{}", format_point(*point));
            }
            if let Some(bounds) = result.bounds() {
                eprintln!(
                    "{} points, bounds {} .. {}",
                    result.points.len(),
                    format_point(bounds.min),
                    format_point(bounds.max)
                );
            }
        }

        Commands::Emit { project } => {
            let program = match load(&project)? {
                Loaded::Geometry(project) => emit_tree(&project.tree),
                Loaded::Commands(project) => emit_tree(&project.tree),
            };
            println!("{}", program);
        }

        Commands::Export {
            project,
            output,
            package,
            runtime_package,
            function,
        } => {
            let options = ExportOptions {
                package,
                runtime_package,
                function_name: function,
            };
            let code = match load(&project)? {
                Loaded::Geometry(project) => generate_code(&project.tree, &options),
                Loaded::Commands(project) => generate_code(&project.tree, &options),
            };
            match output {
                Some(path) => {
                    fs::write(&path, code)?;
                    eprintln!("Wrote {:?}", path);
                }
                None => print!("{}", code),
            }
        }

        Commands::Verify { project } => {
            let report = match load(&project)? {
                Loaded::Geometry(project) => verify_geometry(&project.tree)?,
                Loaded::Commands(project) => verify_commands(&project.tree)?,
            };
            if report.values_compared {
                println!("ok: {} item(s) match", report.items);
            } else {
                println!("ok: {} item(s), values not compared (unseeded random nodes)", report.items);
            }
        }

        Commands::Simulate {
            project,
            frames,
            fps,
            seed,
        } => {
            let Loaded::Commands(project) = load(&project)? else {
                return Err("simulate needs a particle project".into());
            };
            let mut config = project.emitter.clone().unwrap_or_default();
            if seed.is_some() {
                config.seed = seed;
            }
            log::info!("simulating {} frames from a {} emitter", frames, config.shape.name());
            let mut sim = Simulation::new(config);
            let dt = if fps > 0.0 { 1.0 / fps } else { 1.0 / 60.0 };
            for frame in 0..frames {
                let ticks = sim.advance(dt, &project.tree);
                if ticks > 0 {
                    log::debug!("frame {}: {} tick(s), {} particles", frame, ticks, sim.len());
                }
            }
            println!("{} ticks, {} live particles", sim.ticks(), sim.len());
            for vertex in sim.render_vertices() {
                let [x, y, z] = vertex.position;
                println!("{:.6} {:.6} {:.6} size={:.4} life={:.3}", x, y, z, vertex.size, vertex.life);
            }
        }
    }

    Ok(())
}
