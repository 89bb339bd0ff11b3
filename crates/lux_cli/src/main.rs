use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

mod cli;

use cli::Args;

/// Initialize the logger; `RUST_LOG` filters refine the chosen level.
fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("Failed to configure the worker thread pool")?;
    }

    let mut scene = lux_core::load_scene(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    args.apply_overrides(&mut scene.settings);

    let camera_def = scene.camera(args.camera.as_deref())?;
    let camera = lux_renderer::build_camera(&camera_def.def);
    log::info!(
        "Rendering through camera '{}' looking along {:.3}",
        camera_def.name,
        camera.forward()
    );

    let world = lux_renderer::build_world(&scene);
    if world.is_empty() {
        log::warn!("Scene '{}' has no renderable geometry", scene.name);
    }
    let config = lux_renderer::render_config(&scene.settings);

    let image = lux_renderer::render_buckets(&camera, &world, &config);
    image
        .save_png(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
