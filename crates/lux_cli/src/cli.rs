use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lux_core::RenderSettings;
use std::path::PathBuf;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "lux")]
#[command(about = "Render a JSON scene with the LUX path tracer")]
pub struct Args {
    /// Scene description (.json)
    pub scene: PathBuf,

    /// Output image (.png)
    #[arg(short, long, default_value = "output.png")]
    pub output: PathBuf,

    /// Samples per pixel (overrides the scene)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub samples: Option<u32>,

    /// Maximum bounces per path (overrides the scene)
    #[arg(short = 'd', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_depth: Option<u32>,

    /// Random seed (overrides the scene)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Camera to render through; defaults to the first by name
    #[arg(long)]
    pub camera: Option<String>,

    /// Worker threads; 0 uses every core
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Args {
    /// Apply command line overrides on top of the scene's settings.
    pub fn apply_overrides(&self, settings: &mut RenderSettings) {
        if let Some(samples) = self.samples {
            settings.samples = samples;
        }
        if let Some(max_depth) = self.max_depth {
            settings.max_depth = max_depth;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["lux", "scene.json"]).unwrap();

        assert_eq!(args.scene, PathBuf::from("scene.json"));
        assert_eq!(args.output, PathBuf::from("output.png"));
        assert_eq!(args.threads, 0);
        assert_eq!(args.log_level, LogLevel::Info);
        assert!(args.samples.is_none() && args.camera.is_none());
    }

    #[test]
    fn test_overrides_only_given_flags() {
        let args = Args::try_parse_from([
            "lux", "scene.json", "-s", "16", "--seed", "9", "--log-level", "debug",
        ])
        .unwrap();
        let mut settings = RenderSettings::default();
        args.apply_overrides(&mut settings);

        assert_eq!(settings.samples, 16);
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.max_depth, RenderSettings::default().max_depth);
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }

    #[test]
    fn test_scene_is_required() {
        assert!(Args::try_parse_from(["lux"]).is_err());
    }

    #[test]
    fn test_zero_samples_rejected() {
        assert!(Args::try_parse_from(["lux", "scene.json", "-s", "0"]).is_err());
        assert!(Args::try_parse_from(["lux", "scene.json", "-d", "0"]).is_err());
    }
}
