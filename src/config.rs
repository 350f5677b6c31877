//! Game settings, from the command line and the environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::GenerationError;

pub const DEFAULT_GRID_SIZE: usize = 10;
pub const DEFAULT_WALL_PROBABILITY: f64 = 0.3;
pub const DEFAULT_VISION_RADIUS: usize = 1;
pub const DEFAULT_CPU_TICK_MS: u64 = 500;
pub const DEFAULT_REPEAT_MS: u64 = 100;
pub const DEFAULT_RENDER_FPS: u64 = 60;
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;
pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: usize = 10_000;
const MIN_GRID_SIZE: usize = 5;
pub const MAX_GRID_SIZE: usize = 255;

/// Race a CPU through a foggy forest maze to the book.
#[derive(Parser, Debug)]
#[command(name = "maze-race", about, long_about = None, version)]
pub struct Args {
    /// Width and height of the square maze, borders included
    #[arg(short = 's', long, default_value_t = DEFAULT_GRID_SIZE)]
    pub size: usize,

    /// Probability that an interior cell is a wall
    #[arg(short = 'w', long, default_value_t = DEFAULT_WALL_PROBABILITY)]
    pub wall_probability: f64,

    /// How many cells around the player become visible
    #[arg(short = 'r', long, default_value_t = DEFAULT_VISION_RADIUS)]
    pub vision_radius: usize,

    /// Play without the CPU opponent
    #[arg(long, default_value_t = false)]
    pub no_cpu: bool,

    /// Play without the axe
    #[arg(long, default_value_t = false)]
    pub no_axe: bool,

    /// Seed for the maze generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enable debug messages
    #[arg(short, long, default_value_t = false)]
    pub debug: bool,

    /// File receiving log messages
    #[arg(long, default_value = "maze-race.log")]
    pub log_file: PathBuf,
}

/// Everything that shapes a game. Fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub grid_size: usize,
    pub wall_probability: f64,
    pub vision_radius: usize,
    pub cpu_enabled: bool,
    pub tool_enabled: bool,
    pub cpu_tick: Duration,
    pub repeat_interval: Duration,
    pub max_attempts: usize,
    pub max_placement_attempts: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            wall_probability: DEFAULT_WALL_PROBABILITY,
            vision_radius: DEFAULT_VISION_RADIUS,
            cpu_enabled: true,
            tool_enabled: true,
            cpu_tick: Duration::from_millis(DEFAULT_CPU_TICK_MS),
            repeat_interval: Duration::from_millis(DEFAULT_REPEAT_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_placement_attempts: DEFAULT_MAX_PLACEMENT_ATTEMPTS,
        }
    }
}

impl Settings {
    pub fn from_args(args: &Args) -> Self {
        Self {
            grid_size: args.size,
            wall_probability: args.wall_probability,
            vision_radius: args.vision_radius,
            cpu_enabled: !args.no_cpu,
            tool_enabled: !args.no_axe,
            cpu_tick: Duration::from_millis(read_cpu_tick_ms()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(GenerationError::InvalidSettings(format!(
                "grid size {} is below the minimum of {MIN_GRID_SIZE}",
                self.grid_size
            )));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(GenerationError::InvalidSettings(format!(
                "grid size {} is above the maximum of {MAX_GRID_SIZE}",
                self.grid_size
            )));
        }
        if !(0.0..1.0).contains(&self.wall_probability) {
            return Err(GenerationError::InvalidSettings(format!(
                "wall probability {} is outside [0, 1)",
                self.wall_probability
            )));
        }
        if self.max_attempts == 0 || self.max_placement_attempts == 0 {
            return Err(GenerationError::InvalidSettings(
                "attempt limits must be positive".to_string(),
            ));
        }
        if self.cpu_tick.is_zero() || self.repeat_interval.is_zero() {
            return Err(GenerationError::InvalidSettings(
                "timer intervals must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_env_ms(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn read_cpu_tick_ms() -> u64 {
    read_env_ms("MAZE_CPU_TICK_MS", DEFAULT_CPU_TICK_MS)
}

pub fn read_render_fps() -> u64 {
    read_env_ms("MAZE_FPS", DEFAULT_RENDER_FPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Settings::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_small_grid() {
        let settings = Settings {
            grid_size: 4,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(GenerationError::InvalidSettings(_))
        ));
    }

    #[test]
    fn rejects_huge_grid() {
        let settings = Settings {
            grid_size: MAX_GRID_SIZE + 1,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(GenerationError::InvalidSettings(_))
        ));
        let settings = Settings {
            grid_size: MAX_GRID_SIZE,
            ..Settings::default()
        };
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn rejects_certain_walls() {
        for p in [1.0, -0.1, f64::NAN] {
            let settings = Settings {
                wall_probability: p,
                ..Settings::default()
            };
            assert!(settings.validate().is_err(), "accepted {p}");
        }
    }

    #[test]
    fn args_map_onto_settings() {
        let args = Args::parse_from(["maze-race", "-s", "12", "-w", "0.1", "--no-cpu"]);
        let settings = Settings::from_args(&args);
        assert_eq!(settings.grid_size, 12);
        assert_eq!(settings.wall_probability, 0.1);
        assert!(!settings.cpu_enabled);
        assert!(settings.tool_enabled);
        assert_eq!(settings.vision_radius, DEFAULT_VISION_RADIUS);
    }
}
