//! Maze race: find the book in a foggy forest maze before the CPU does.
//!
//! [`generate::generate`] builds a random maze that is guaranteed to be
//! solvable, [`path::find_path`] answers shortest-path queries on it, and
//! [`game::Game`] applies the rules. [`session::Session`] owns a game together
//! with its timers and is what a front end drives.

pub mod config;
pub mod error;
pub mod fog;
pub mod game;
pub mod generate;
pub mod grid;
pub mod path;
pub mod schedule;
pub mod session;

pub use error::{Error, GenerationError};
