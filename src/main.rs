mod render;

use std::fs::File;
use std::io::{self, Stdout};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEventKind, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use log::{info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;

use maze_race::config::{read_render_fps, Args, Settings};
use maze_race::grid::Dir;
use maze_race::session::Session;
use maze_race::Error;

use render::Renderer;

// Without key release events, a second press this soon means the key is held.
const REPEAT_DETECT_MS: u64 = 600;
// A held key is released when the terminal stops repeating it.
const INPUT_HOLD_MS: u64 = 160;

const DIRS: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = init_logging(&args) {
        eprintln!("error: cannot open log file {:?}: {err}", args.log_file);
        return ExitCode::FAILURE;
    }
    match start(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(args: &Args) -> io::Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if args.debug {
        builder.filter_level(LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Off);
        builder.init();
        return Ok(());
    }
    // The game owns the terminal, so messages go to a file.
    let file = File::create(&args.log_file)?;
    builder.target(env_logger::Target::Pipe(Box::new(file)));
    builder.init();
    Ok(())
}

fn start(args: &Args) -> Result<(), Error> {
    let settings = Settings::from_args(args);
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    // Generate before touching the terminal so a bad configuration is
    // reported on a normal screen.
    let session = Session::new(settings, rng, Instant::now())?;
    info!("Starting a {0}x{0} game", session.settings().grid_size);

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;
    stdout.execute(EnableMouseCapture)?;
    let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        stdout.execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }

    let result = run(&mut stdout, session, enhanced);

    if enhanced {
        stdout.execute(PopKeyboardEnhancementFlags)?;
    }
    stdout.execute(DisableMouseCapture)?;
    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

/// Turns terminal key events into held directions.
///
/// Terminals that report key releases get exact hold and release. Others only
/// send repeated presses, so a key counts as held once a second press arrives
/// quickly and as released when the presses stop.
struct Keys {
    enhanced: bool,
    last_seen: [Option<Instant>; 4],
}

impl Keys {
    fn new(enhanced: bool) -> Self {
        Self {
            enhanced,
            last_seen: [None; 4],
        }
    }

    fn press(&mut self, session: &mut Session, dir: Dir, now: Instant) {
        let idx = idx_for_dir(dir);
        let recent = self.last_seen[idx]
            .is_some_and(|t| now.duration_since(t) <= Duration::from_millis(REPEAT_DETECT_MS));
        self.last_seen[idx] = Some(now);
        if self.enhanced {
            session.hold(dir, now);
        } else if recent {
            // Keep the first repeat behind the release check in `expire`, so
            // two quick taps stay two moves.
            let first_repeat =
                Duration::from_millis(INPUT_HOLD_MS) + session.settings().repeat_interval;
            session.hold_after(dir, now, first_repeat);
        } else {
            session.move_player(dir);
        }
    }

    fn release(&mut self, session: &mut Session, dir: Dir) {
        self.last_seen[idx_for_dir(dir)] = None;
        session.release(dir);
    }

    /// Release keys the terminal stopped repeating.
    fn expire(&mut self, session: &mut Session, now: Instant) {
        if self.enhanced {
            return;
        }
        for dir in DIRS {
            if !session.is_held(dir) {
                continue;
            }
            let stale = self.last_seen[idx_for_dir(dir)]
                .map_or(true, |t| now.duration_since(t) > Duration::from_millis(INPUT_HOLD_MS));
            if stale {
                self.release(session, dir);
            }
        }
    }

    fn clear(&mut self) {
        self.last_seen = [None; 4];
    }
}

enum Action {
    Move(Dir),
    Chop(Dir),
    Restart,
    Quit,
}

fn action_for(key: &KeyEvent) -> Option<Action> {
    let code = match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::SHIFT) => {
            KeyCode::Char(c.to_ascii_uppercase())
        }
        other => other,
    };
    let action = match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') => Action::Restart,
        KeyCode::Up | KeyCode::Char('k') => Action::Move(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') => Action::Move(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Action::Move(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') => Action::Move(Dir::Right),
        KeyCode::Char('K') => Action::Chop(Dir::Up),
        KeyCode::Char('J') => Action::Chop(Dir::Down),
        KeyCode::Char('H') => Action::Chop(Dir::Left),
        KeyCode::Char('L') => Action::Chop(Dir::Right),
        _ => return None,
    };
    Some(action)
}

fn run(stdout: &mut Stdout, mut session: Session, enhanced: bool) -> Result<(), Error> {
    let mut renderer = Renderer::new(session.settings().grid_size);
    let mut keys = Keys::new(enhanced);
    let render_fps = read_render_fps();
    let frame_time = Duration::from_micros(1_000_000 / render_fps.max(1));

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) => {
                    let Some(action) = action_for(&key) else {
                        continue;
                    };
                    match (key.kind, action) {
                        (KeyEventKind::Release, Action::Move(dir)) => {
                            keys.release(&mut session, dir)
                        }
                        (KeyEventKind::Release | KeyEventKind::Repeat, _) => {}
                        (_, Action::Move(dir)) => keys.press(&mut session, dir, now),
                        (_, Action::Chop(dir)) => {
                            session.use_tool_toward(dir);
                        }
                        (_, Action::Restart) => {
                            session.restart(now)?;
                            keys.clear();
                            renderer.invalidate();
                        }
                        (_, Action::Quit) => return Ok(()),
                    }
                }
                Event::Mouse(mouse) => {
                    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                        let size = session.settings().grid_size;
                        if let Some(pos) = renderer.cell_at(size, mouse.column, mouse.row) {
                            session.use_tool_at(pos);
                        }
                    }
                }
                Event::Resize(_, _) => renderer.invalidate(),
                _ => {}
            }
        }

        let now = Instant::now();
        keys.expire(&mut session, now);
        session.advance(now);
        renderer.render(stdout, &session)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn idx_for_dir(dir: Dir) -> usize {
    match dir {
        Dir::Up => 0,
        Dir::Down => 1,
        Dir::Left => 2,
        Dir::Right => 3,
    }
}
