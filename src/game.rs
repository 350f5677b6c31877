//! Game state and the rules that move it forward.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::fog::Fog;
use crate::grid::{Dir, Grid, Pos, Tile};
use crate::path::find_path;

pub const PLAYER_START: Pos = Pos::new(1, 1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner {
    Player,
    Cpu,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Player {
    pub pos: Pos,
    pub steps: u32,
    pub has_tool: bool,
}

/// The axe. Lets the player clear one wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tool {
    pub pos: Pos,
    pub collected: bool,
}

#[derive(Clone, Debug)]
pub struct Game {
    grid: Grid,
    fog: Fog,
    vision_radius: usize,
    player: Player,
    cpu: Option<Pos>,
    exit: Pos,
    tool: Option<Tool>,
    winner: Option<Winner>,
}

impl Game {
    /// Set up a game on an already validated grid and reveal the player's
    /// surroundings.
    pub fn new(
        grid: Grid,
        player: Pos,
        exit: Pos,
        cpu: Option<Pos>,
        tool: Option<Pos>,
        vision_radius: usize,
    ) -> Self {
        let mut fog = Fog::new(grid.size());
        fog.reveal(player, vision_radius);
        Self {
            grid,
            fog,
            vision_radius,
            player: Player {
                pos: player,
                steps: 0,
                has_tool: false,
            },
            cpu,
            exit,
            tool: tool.map(|pos| Tool {
                pos,
                collected: false,
            }),
            winner: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn fog(&self) -> &Fog {
        &self.fog
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn cpu(&self) -> Option<Pos> {
        self.cpu
    }

    pub fn exit(&self) -> Pos {
        self.exit
    }

    pub fn tool(&self) -> Option<Tool> {
        self.tool
    }

    pub fn steps(&self) -> u32 {
        self.player.steps
    }

    pub fn has_tool(&self) -> bool {
        self.player.has_tool
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Step the player one cell. Returns `false`, leaving the state untouched,
    /// when the game is over or the target is outside the grid or a wall.
    pub fn move_player(&mut self, dir: Dir) -> bool {
        if self.is_over() {
            return false;
        }
        let Some(next) = self.grid.open_neighbor(self.player.pos, dir) else {
            return false;
        };

        self.player.pos = next;
        self.player.steps += 1;
        self.fog.reveal(next, self.vision_radius);
        self.pick_up_tool();

        if next == self.exit {
            debug!("Player reached the exit in {} steps", self.player.steps);
            self.winner = Some(Winner::Player);
        }
        true
    }

    fn pick_up_tool(&mut self) {
        if let Some(tool) = self.tool.as_mut() {
            if !tool.collected && tool.pos == self.player.pos {
                tool.collected = true;
                self.player.has_tool = true;
                debug!("Axe collected at {:?}", tool.pos);
            }
        }
    }

    /// Whether the held axe could clear the wall at `pos` right now.
    pub fn can_use_tool_at(&self, pos: Pos) -> bool {
        !self.is_over()
            && self.player.has_tool
            && self.grid.contains(pos)
            && !self.grid.is_border(pos)
            && self.player.pos.is_adjacent(pos)
            && self.fog.is_discovered(pos)
            && self.grid.is_wall(pos)
    }

    /// Clear a discovered wall next to the player, consuming the axe.
    pub fn use_tool_at(&mut self, pos: Pos) -> bool {
        if !self.can_use_tool_at(pos) {
            return false;
        }
        self.grid.set(pos, Tile::Path);
        self.player.has_tool = false;
        debug!("Wall at {pos:?} cleared");
        true
    }

    /// Use the axe on the wall next to the player in `dir`.
    pub fn use_tool_toward(&mut self, dir: Dir) -> bool {
        match self.grid.neighbor(self.player.pos, dir) {
            Some(pos) => self.use_tool_at(pos),
            None => false,
        }
    }

    /// Move the CPU one cell toward the exit, or to a random open neighbour
    /// when the exit is out of reach.
    pub fn tick_cpu(&mut self, rng: &mut impl Rng) {
        if self.is_over() {
            return;
        }
        let Some(cpu) = self.cpu else {
            return;
        };

        let path = find_path(&self.grid, cpu, self.exit);
        let next = if path.len() > 1 {
            path[1]
        } else {
            self.grid
                .open_neighbors(cpu)
                .choose(rng)
                .copied()
                .unwrap_or(cpu)
        };
        self.cpu = Some(next);

        if next == self.exit {
            debug!("CPU reached the exit");
            self.winner = Some(Winner::Cpu);
        }
    }
}
