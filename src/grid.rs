//! Maze grid: tiles, positions and directions.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Path,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Pos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Whether `other` is one orthogonal step away.
    pub fn is_adjacent(self, other: Pos) -> bool {
        self.manhattan(other) == 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Expansion order used by the search and the CPU fallback: +x, -x, +y, -y.
    pub const SEARCH_ORDER: [Dir; 4] = [Dir::Right, Dir::Left, Dir::Down, Dir::Up];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// Square matrix of tiles, indexed `cells[y][x]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<Tile>>,
}

impl Grid {
    pub fn filled(size: usize, tile: Tile) -> Self {
        Self {
            size,
            cells: vec![vec![tile; size]; size],
        }
    }

    /// Build a grid from text rows, `#` for walls and anything else for paths.
    ///
    /// Returns `None` unless the rows form a non-empty square.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let size = rows.len();
        if size == 0 {
            return None;
        }
        let mut cells = Vec::with_capacity(size);
        for row in rows {
            let line: Vec<Tile> = row
                .chars()
                .map(|c| if c == '#' { Tile::Wall } else { Tile::Path })
                .collect();
            if line.len() != size {
                return None;
            }
            cells.push(line);
        }
        Some(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, pos: Pos) -> Tile {
        self.cells[pos.y][pos.x]
    }

    pub fn set(&mut self, pos: Pos, tile: Tile) {
        self.cells[pos.y][pos.x] = tile;
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.get(pos) == Tile::Wall
    }

    pub fn is_border(&self, pos: Pos) -> bool {
        pos.x == 0 || pos.y == 0 || pos.x == self.size - 1 || pos.y == self.size - 1
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    /// Cell one step from `pos` in `dir`, if it lies inside the grid.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x as isize + dx;
        let ny = pos.y as isize + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let next = Pos::new(nx as usize, ny as usize);
        self.contains(next).then_some(next)
    }

    /// In-bounds, non-wall neighbour in `dir`.
    pub fn open_neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        self.neighbor(pos, dir).filter(|next| !self.is_wall(*next))
    }

    /// Open neighbours of `pos` in search order.
    pub fn open_neighbors(&self, pos: Pos) -> Vec<Pos> {
        Dir::SEARCH_ORDER
            .iter()
            .filter_map(|dir| self.open_neighbor(pos, *dir))
            .collect()
    }
}
