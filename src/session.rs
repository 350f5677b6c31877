//! A play session: the current game, its timers and the running score.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::info;
use rand::rngs::StdRng;

use crate::config::Settings;
use crate::error::GenerationError;
use crate::game::{Game, Winner};
use crate::generate::generate;
use crate::grid::{Dir, Pos};
use crate::schedule::{Scheduler, TaskToken};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionTask {
    CpuTick,
    RepeatMove(Dir),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub player_wins: u32,
    pub cpu_wins: u32,
}

/// Owns the game and everything allowed to change it. All mutations go
/// through here.
pub struct Session {
    settings: Settings,
    rng: StdRng,
    game: Game,
    scheduler: Scheduler<SessionTask>,
    cpu_timer: Option<TaskToken>,
    held: HashMap<Dir, TaskToken>,
    scoreboard: Scoreboard,
    recorded: bool,
}

impl Session {
    pub fn new(settings: Settings, mut rng: StdRng, now: Instant) -> Result<Self, GenerationError> {
        let game = generate(&settings, &mut rng)?;
        let mut session = Self {
            settings,
            rng,
            game,
            scheduler: Scheduler::new(),
            cpu_timer: None,
            held: HashMap::new(),
            scoreboard: Scoreboard::default(),
            recorded: false,
        };
        session.start_cpu_timer(now);
        Ok(session)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    pub fn cpu_timer(&self) -> Option<TaskToken> {
        self.cpu_timer
    }

    /// Throw the current game away and start a new one. Pending timers are
    /// cancelled before the new game is installed. When no maze can be
    /// generated the current game and its timers are left as they were.
    pub fn restart(&mut self, now: Instant) -> Result<(), GenerationError> {
        let game = generate(&self.settings, &mut self.rng)?;

        self.scheduler.cancel_all();
        self.cpu_timer = None;
        self.held.clear();

        self.game = game;
        self.recorded = false;
        self.start_cpu_timer(now);
        info!("New game started");
        Ok(())
    }

    fn start_cpu_timer(&mut self, now: Instant) {
        if self.settings.cpu_enabled {
            self.cpu_timer = Some(self.scheduler.every(
                SessionTask::CpuTick,
                self.settings.cpu_tick,
                now,
            ));
        }
    }

    pub fn move_player(&mut self, dir: Dir) -> bool {
        let moved = self.game.move_player(dir);
        self.settle();
        moved
    }

    pub fn use_tool_at(&mut self, pos: Pos) -> bool {
        self.game.use_tool_at(pos)
    }

    pub fn use_tool_toward(&mut self, dir: Dir) -> bool {
        self.game.use_tool_toward(dir)
    }

    pub fn tick_cpu(&mut self) {
        self.game.tick_cpu(&mut self.rng);
        self.settle();
    }

    /// Start holding a direction: move now, then again every repeat interval
    /// until [`Session::release`].
    pub fn hold(&mut self, dir: Dir, now: Instant) {
        self.hold_after(dir, now, self.settings.repeat_interval);
    }

    /// Like [`Session::hold`], but the first repeat waits `first_repeat`.
    pub fn hold_after(&mut self, dir: Dir, now: Instant, first_repeat: Duration) {
        if self.held.contains_key(&dir) {
            return;
        }
        self.move_player(dir);
        if self.game.is_over() {
            return;
        }
        let token = self.scheduler.every_after(
            SessionTask::RepeatMove(dir),
            first_repeat,
            self.settings.repeat_interval,
            now,
        );
        self.held.insert(dir, token);
    }

    pub fn release(&mut self, dir: Dir) {
        if let Some(token) = self.held.remove(&dir) {
            self.scheduler.cancel(token);
        }
    }

    pub fn is_held(&self, dir: Dir) -> bool {
        self.held.contains_key(&dir)
    }

    /// Run every timer that came due by `now`.
    pub fn advance(&mut self, now: Instant) {
        for (token, task) in self.scheduler.due(now) {
            // An earlier task in this batch may have ended the game.
            if !self.scheduler.is_active(token) {
                continue;
            }
            match task {
                SessionTask::CpuTick => self.tick_cpu(),
                SessionTask::RepeatMove(dir) => {
                    self.move_player(dir);
                }
            }
        }
    }

    /// Record a finished game once and stop its timers.
    fn settle(&mut self) {
        let Some(winner) = self.game.winner() else {
            return;
        };
        if self.recorded {
            return;
        }
        self.recorded = true;
        match winner {
            Winner::Player => self.scoreboard.player_wins += 1,
            Winner::Cpu => self.scoreboard.cpu_wins += 1,
        }
        info!(
            "{winner:?} won after {} player steps; score {} - {}",
            self.game.steps(),
            self.scoreboard.player_wins,
            self.scoreboard.cpu_wins
        );
        self.scheduler.cancel_all();
        self.cpu_timer = None;
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn open_settings() -> Settings {
        Settings {
            wall_probability: 0.0,
            ..Settings::default()
        }
    }

    fn session(settings: Settings, now: Instant) -> Session {
        Session::new(settings, StdRng::seed_from_u64(42), now).unwrap()
    }

    #[test]
    fn cpu_timer_drives_the_cpu() {
        let t0 = Instant::now();
        let mut s = session(open_settings(), t0);
        let start = s.game().cpu().unwrap();
        s.advance(t0 + Duration::from_millis(499));
        assert_eq!(s.game().cpu(), Some(start));
        s.advance(t0 + Duration::from_millis(500));
        assert_ne!(s.game().cpu(), Some(start));
    }

    #[test]
    fn restart_invalidates_old_cpu_timer() {
        let t0 = Instant::now();
        let mut s = session(open_settings(), t0);
        let old = s.cpu_timer().unwrap();

        let t1 = t0 + Duration::from_millis(400);
        s.restart(t1).unwrap();
        let new = s.cpu_timer().unwrap();
        assert_ne!(old, new);
        let start = s.game().cpu().unwrap();

        // The old timer would have fired at t0 + 500ms.
        s.advance(t0 + Duration::from_millis(600));
        assert_eq!(s.game().cpu(), Some(start));
        s.advance(t1 + Duration::from_millis(500));
        assert_ne!(s.game().cpu(), Some(start));
    }

    #[test]
    fn finished_game_stops_timers_and_scores_once() {
        let t0 = Instant::now();
        let settings = Settings {
            cpu_enabled: false,
            tool_enabled: false,
            ..open_settings()
        };
        let mut s = session(settings, t0);
        for _ in 0..7 {
            s.move_player(Dir::Right);
        }
        for _ in 0..7 {
            s.move_player(Dir::Down);
        }
        assert_eq!(s.game().winner(), Some(Winner::Player));
        assert_eq!(s.scoreboard().player_wins, 1);
        s.move_player(Dir::Up);
        assert_eq!(s.scoreboard().player_wins, 1);

        s.restart(t0).unwrap();
        assert!(!s.game().is_over());
        assert_eq!(s.scoreboard().player_wins, 1);
    }

    #[test]
    fn cpu_win_is_counted() {
        let t0 = Instant::now();
        let mut s = session(open_settings(), t0);
        let mut now = t0;
        while !s.game().is_over() {
            now += Duration::from_millis(500);
            s.advance(now);
        }
        assert_eq!(s.game().winner(), Some(Winner::Cpu));
        assert_eq!(s.scoreboard(), Scoreboard { player_wins: 0, cpu_wins: 1 });
        assert_eq!(s.cpu_timer(), None);
    }

    #[test]
    fn held_direction_repeats_until_released() {
        let t0 = Instant::now();
        let settings = Settings {
            cpu_enabled: false,
            tool_enabled: false,
            ..open_settings()
        };
        let mut s = session(settings, t0);
        s.hold(Dir::Right, t0);
        assert_eq!(s.game().steps(), 1);
        assert!(s.is_held(Dir::Right));
        s.advance(t0 + Duration::from_millis(100));
        s.advance(t0 + Duration::from_millis(250));
        assert_eq!(s.game().steps(), 3);

        s.release(Dir::Right);
        assert!(!s.is_held(Dir::Right));
        s.advance(t0 + Duration::from_millis(1000));
        assert_eq!(s.game().steps(), 3);
    }

    #[test]
    fn holding_into_a_wall_keeps_position() {
        let t0 = Instant::now();
        let settings = Settings {
            cpu_enabled: false,
            tool_enabled: false,
            ..open_settings()
        };
        let mut s = session(settings, t0);
        s.hold(Dir::Up, t0);
        s.advance(t0 + Duration::from_millis(500));
        assert_eq!(s.game().player().pos, Pos::new(1, 1));
        assert_eq!(s.game().steps(), 0);
    }

    #[test]
    fn failed_restart_keeps_current_game() {
        let t0 = Instant::now();
        let mut s = session(open_settings(), t0);
        let timer = s.cpu_timer();
        let cpu = s.game().cpu();
        let player = s.game().player();

        // No maze this dense can be solved in a single attempt.
        s.settings.grid_size = 12;
        s.settings.wall_probability = 0.99;
        s.settings.max_attempts = 1;
        s.settings.max_placement_attempts = 5;
        assert_eq!(
            s.restart(t0),
            Err(GenerationError::ExhaustedRetries { attempts: 1 })
        );

        assert_eq!(s.cpu_timer(), timer);
        assert!(s.cpu_timer().is_some_and(|t| s.scheduler.is_active(t)));
        assert_eq!(s.game().cpu(), cpu);
        assert_eq!(s.game().player(), player);
        assert!(!s.game().is_over());

        s.advance(t0 + Duration::from_millis(500));
        assert_ne!(s.game().cpu(), cpu);
    }

    #[test]
    fn delayed_hold_waits_before_repeating() {
        let t0 = Instant::now();
        let settings = Settings {
            cpu_enabled: false,
            tool_enabled: false,
            ..open_settings()
        };
        let mut s = session(settings, t0);
        s.hold_after(Dir::Right, t0, Duration::from_millis(300));
        assert_eq!(s.game().steps(), 1);
        s.advance(t0 + Duration::from_millis(250));
        assert_eq!(s.game().steps(), 1);
        s.advance(t0 + Duration::from_millis(300));
        assert_eq!(s.game().steps(), 2);
        s.advance(t0 + Duration::from_millis(400));
        assert_eq!(s.game().steps(), 3);
    }
}
