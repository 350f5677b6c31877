//! Breadth-first shortest paths on the maze grid.

use std::collections::VecDeque;

use crate::grid::{Dir, Grid, Pos};

/// One shortest path from `start` to `target`, both included.
///
/// Neighbours are expanded in [`Dir::SEARCH_ORDER`], which fixes the choice
/// between paths of equal length. When `target` cannot be reached the result
/// is `[start]`; callers tell the cases apart with `len() > 1`.
pub fn find_path(grid: &Grid, start: Pos, target: Pos) -> Vec<Pos> {
    let size = grid.size();
    let mut parent: Vec<Vec<Option<Pos>>> = vec![vec![None; size]; size];
    let mut visited = vec![vec![false; size]; size];
    let mut q = VecDeque::new();
    visited[start.y][start.x] = true;
    q.push_back(start);

    while let Some(pos) = q.pop_front() {
        if pos == target {
            return trace_back(&parent, start, target);
        }
        for dir in Dir::SEARCH_ORDER {
            let Some(next) = grid.open_neighbor(pos, dir) else {
                continue;
            };
            if visited[next.y][next.x] {
                continue;
            }
            visited[next.y][next.x] = true;
            parent[next.y][next.x] = Some(pos);
            q.push_back(next);
        }
    }
    vec![start]
}

pub fn path_exists(grid: &Grid, start: Pos, target: Pos) -> bool {
    find_path(grid, start, target).len() > 1
}

fn trace_back(parent: &[Vec<Option<Pos>>], start: Pos, target: Pos) -> Vec<Pos> {
    let mut path = vec![target];
    let mut cur = target;
    while cur != start {
        match parent[cur.y][cur.x] {
            Some(prev) => {
                path.push(prev);
                cur = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
