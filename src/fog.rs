//! Fog of war: cells the player has ever seen.

use crate::grid::Pos;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fog {
    size: usize,
    seen: Vec<Vec<bool>>,
}

impl Fog {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            seen: vec![vec![false; size]; size],
        }
    }

    /// Mark every cell within Chebyshev distance `radius` of `center`,
    /// clipped to the grid. Cells are never hidden again. A center outside
    /// the grid reveals nothing.
    pub fn reveal(&mut self, center: Pos, radius: usize) {
        if center.x >= self.size || center.y >= self.size {
            return;
        }
        let y0 = center.y.saturating_sub(radius);
        let y1 = center.y.saturating_add(radius).min(self.size - 1);
        let x0 = center.x.saturating_sub(radius);
        let x1 = center.x.saturating_add(radius).min(self.size - 1);
        for row in &mut self.seen[y0..=y1] {
            for cell in &mut row[x0..=x1] {
                *cell = true;
            }
        }
    }

    pub fn is_discovered(&self, pos: Pos) -> bool {
        pos.x < self.size && pos.y < self.size && self.seen[pos.y][pos.x]
    }

    pub fn discovered_count(&self) -> usize {
        self.seen.iter().flatten().filter(|seen| **seen).count()
    }

    /// Whether every cell discovered in `other` is also discovered here.
    pub fn covers(&self, other: &Fog) -> bool {
        self.seen
            .iter()
            .flatten()
            .zip(other.seen.iter().flatten())
            .all(|(mine, theirs)| *mine || !*theirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_marks_square_neighbourhood() {
        let mut fog = Fog::new(10);
        fog.reveal(Pos::new(4, 4), 1);
        assert_eq!(fog.discovered_count(), 9);
        assert!(fog.is_discovered(Pos::new(3, 3)));
        assert!(fog.is_discovered(Pos::new(5, 5)));
        assert!(!fog.is_discovered(Pos::new(6, 4)));
    }

    #[test]
    fn reveal_clips_at_edges() {
        let mut fog = Fog::new(10);
        fog.reveal(Pos::new(0, 0), 2);
        assert_eq!(fog.discovered_count(), 9);
        fog.reveal(Pos::new(9, 9), 1);
        assert_eq!(fog.discovered_count(), 13);
    }

    #[test]
    fn zero_radius_reveals_only_center() {
        let mut fog = Fog::new(5);
        fog.reveal(Pos::new(2, 3), 0);
        assert_eq!(fog.discovered_count(), 1);
        assert!(fog.is_discovered(Pos::new(2, 3)));
    }

    #[test]
    fn center_outside_grid_reveals_nothing() {
        let mut fog = Fog::new(5);
        fog.reveal(Pos::new(9, 1), 1);
        fog.reveal(Pos::new(2, 40), 3);
        assert_eq!(fog.discovered_count(), 0);
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut once = Fog::new(8);
        once.reveal(Pos::new(3, 2), 1);
        let mut twice = once.clone();
        twice.reveal(Pos::new(3, 2), 1);
        assert_eq!(once, twice);
    }

    #[test]
    fn reveal_only_grows() {
        let mut fog = Fog::new(8);
        fog.reveal(Pos::new(1, 1), 1);
        let before = fog.clone();
        fog.reveal(Pos::new(2, 1), 1);
        assert!(fog.covers(&before));
        assert!(!before.covers(&fog));
    }
}
