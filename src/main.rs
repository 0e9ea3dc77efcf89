use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use log::info;

use particle_shading::{
    evaluate_frame, init_logging, print_report, FrameState, LoggingConfig, Mesh, SceneDescription,
    ShadingConfig, ShadingStrategy,
};

const USAGE: &str =
    "Usage: particle-shade <scene.xml> [--strategy flat|lit|textured] [--markers] [--fail-on-nan]";

fn main() {
    init_logging(LoggingConfig::default());
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let scene = SceneDescription::load(&options.path)?;

    println!(
        "Loaded scene with {} particles ({} lights)",
        scene.particles.len(),
        scene.lights.len()
    );

    let config = ShadingConfig {
        strategy: options
            .strategy
            .or(scene.strategy)
            .unwrap_or_default(),
        draw_markers: options.markers,
        fail_on_nan: options.fail_on_nan,
    };
    info!("shading with {config:?}");

    let frame = FrameState::new(scene.frame_inputs());
    let inputs = frame.snapshot();
    let mesh = Mesh::cube(0.5);
    let report = evaluate_frame(&inputs, &mesh, &config, scene.texture.as_ref())
        .with_context(|| format!("cannot shade with the {} strategy", config.strategy))?;
    print_report(&report);

    let nan = report.nan_samples();
    if config.fail_on_nan && nan > 0 {
        bail!("{nan} of {} shaded samples are NaN", report.samples());
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
struct CliOptions {
    path: PathBuf,
    strategy: Option<ShadingStrategy>,
    markers: bool,
    fail_on_nan: bool,
}

impl CliOptions {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut path = None;
        let mut strategy = None;
        let mut markers = false;
        let mut fail_on_nan = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--strategy" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--strategy needs a value. {USAGE}"))?;
                    strategy = Some(value.parse::<ShadingStrategy>()?);
                }
                "--markers" => markers = true,
                "--fail-on-nan" => fail_on_nan = true,
                other if other.starts_with("--") => {
                    bail!("Unknown argument: {other}. {USAGE}");
                }
                other => {
                    if path.replace(PathBuf::from(other)).is_some() {
                        bail!("Only one scene path may be given. {USAGE}");
                    }
                }
            }
        }
        let path = path.ok_or_else(|| anyhow!(USAGE))?;
        Ok(Self {
            path,
            strategy,
            markers,
            fail_on_nan,
        })
    }
}
