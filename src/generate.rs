//! Random maze generation.
//!
//! Each attempt fills the interior with random walls, opens the cells the game
//! depends on, places the CPU and the axe by rejection sampling, then checks
//! with [`path_exists`] that every entity can reach what it needs to. A failed
//! attempt is thrown away whole. Attempts are bounded by
//! [`Settings::max_attempts`].

use log::{debug, warn};
use rand::Rng;

use crate::config::Settings;
use crate::error::GenerationError;
use crate::game::{Game, PLAYER_START};
use crate::grid::{Grid, Pos, Tile};
use crate::path::path_exists;

/// Generate a game whose maze satisfies every reachability requirement.
///
/// # Errors
///
/// [`GenerationError::InvalidSettings`] when the settings cannot describe a
/// playable maze, and [`GenerationError::ExhaustedRetries`] when no valid maze
/// was produced within the attempt limit.
pub fn generate(settings: &Settings, rng: &mut impl Rng) -> Result<Game, GenerationError> {
    settings.validate()?;

    for attempt in 1..=settings.max_attempts {
        if let Some(game) = try_generate(settings, rng) {
            debug!("Maze generated after {attempt} attempt(s)");
            return Ok(game);
        }
    }
    warn!(
        "Giving up on a {0}x{0} maze with wall probability {1}",
        settings.grid_size, settings.wall_probability
    );
    Err(GenerationError::ExhaustedRetries {
        attempts: settings.max_attempts,
    })
}

fn try_generate(settings: &Settings, rng: &mut impl Rng) -> Option<Game> {
    let size = settings.grid_size;
    let mut grid = random_fill(size, settings.wall_probability, rng);

    let player = PLAYER_START;
    let exit = Pos::new(size - 2, size - 2);
    for pos in [player, Pos::new(2, 1), Pos::new(1, 2), exit] {
        grid.set(pos, Tile::Path);
    }

    let cpu = if settings.cpu_enabled {
        let cpu = sample_cell(&grid, settings.max_placement_attempts, rng, |pos| {
            2 * pos.manhattan(player) >= size && pos != exit
        });
        let Some(cpu) = cpu else {
            debug!("No room for the CPU, retrying");
            return None;
        };
        grid.set(cpu, Tile::Path);
        Some(cpu)
    } else {
        None
    };

    let tool = if settings.tool_enabled {
        let tool = sample_cell(&grid, settings.max_placement_attempts, rng, |pos| {
            pos != player && Some(pos) != cpu && pos != exit
        });
        if tool.is_none() {
            debug!("No room for the axe, retrying");
            return None;
        }
        tool
    } else {
        None
    };

    if !path_exists(&grid, player, exit) {
        return None;
    }
    if let Some(cpu) = cpu {
        if !path_exists(&grid, cpu, exit) {
            return None;
        }
    }
    if let Some(tool) = tool {
        if !path_exists(&grid, player, tool) {
            return None;
        }
    }

    Some(Game::new(grid, player, exit, cpu, tool, settings.vision_radius))
}

fn random_fill(size: usize, wall_probability: f64, rng: &mut impl Rng) -> Grid {
    let mut grid = Grid::filled(size, Tile::Wall);
    for y in 1..size - 1 {
        for x in 1..size - 1 {
            if rng.gen::<f64>() >= wall_probability {
                grid.set(Pos::new(x, y), Tile::Path);
            }
        }
    }
    grid
}

/// Draw interior cells uniformly until one is a path and satisfies `accept`.
fn sample_cell(
    grid: &Grid,
    max_draws: usize,
    rng: &mut impl Rng,
    accept: impl Fn(Pos) -> bool,
) -> Option<Pos> {
    let size = grid.size();
    (0..max_draws)
        .map(|_| Pos::new(rng.gen_range(1..size - 1), rng.gen_range(1..size - 1)))
        .find(|pos| !grid.is_wall(*pos) && accept(*pos))
}
