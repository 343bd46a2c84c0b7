//! Interactive foreground timer.
//!
//! One task owns the session and `select!`s over scheduler ticks, key
//! presses and Ctrl-C. Each input goes through [`handle`], which resolves a
//! completion before the next tick is looked at and keeps the scheduler in
//! step with the session. Drawing happens afterwards, outside `handle`.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, queue};
use focusloop_core::storage::KeysConfig;
use focusloop_core::{
    Config, Event, FocusSession, Notifier, SilentNotifier, Store, SystemClock, Tick,
    TickScheduler,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{open_store_with, CommandResult};
use crate::notifier::DesktopNotifier;

const TICK_PERIOD: Duration = Duration::from_secs(1);
const KEY_POLL: Duration = Duration::from_millis(200);

#[derive(Args)]
pub struct RunArgs {
    /// Start counting down immediately
    #[arg(long)]
    pub start: bool,
    /// No desktop notifications or sound for this run
    #[arg(long)]
    pub quiet: bool,
    /// Print events as JSON lines instead of drawing the clock
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Toggle,
    Reset,
    Skip,
    Quit,
}

#[derive(Debug, Clone, Copy)]
enum Input {
    Tick(Tick),
    Command(Command),
}

/// What a handled input means for the screen.
#[derive(Debug)]
enum Outcome {
    Nothing,
    /// A tick from before the last stop; nothing was touched.
    Stale,
    Changed(Event),
    Completed(Event),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyBindings {
    toggle: KeyCode,
    reset: KeyCode,
    skip: KeyCode,
    quit: KeyCode,
}

fn parse_key(name: &str) -> Option<KeyCode> {
    match name.trim().to_ascii_lowercase().as_str() {
        "space" => Some(KeyCode::Char(' ')),
        "esc" | "escape" => Some(KeyCode::Esc),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        "backspace" => Some(KeyCode::Backspace),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

impl KeyBindings {
    fn from_config(keys: &KeysConfig) -> Result<Self, String> {
        let bind = |field: &str, name: &str| {
            parse_key(name).ok_or_else(|| format!("invalid key binding keys.{field} = '{name}'"))
        };
        Ok(Self {
            toggle: bind("toggle", &keys.toggle)?,
            reset: bind("reset", &keys.reset)?,
            skip: bind("skip", &keys.skip)?,
            quit: bind("quit", &keys.quit)?,
        })
    }

    fn command_for(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Command> {
        // raw mode swallows SIGINT
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }
        let code = match code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        if code == self.toggle {
            Some(Command::Toggle)
        } else if code == self.reset {
            Some(Command::Reset)
        } else if code == self.skip {
            Some(Command::Skip)
        } else if code == self.quit {
            Some(Command::Quit)
        } else {
            None
        }
    }
}

/// Raw terminal mode for as long as the guard lives.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Read key presses on a blocking thread until the receiver goes away.
fn spawn_key_reader(bindings: KeyBindings, sender: mpsc::UnboundedSender<Command>) {
    std::thread::spawn(move || {
        while !sender.is_closed() {
            match event::poll(KEY_POLL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(error = %e, "terminal input failed");
                    break;
                }
            }
            let key = match event::read() {
                Ok(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => key,
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "terminal input failed");
                    break;
                }
            };
            if let Some(command) = bindings.command_for(key.code, key.modifiers) {
                if sender.send(command).is_err() {
                    break;
                }
            }
        }
    });
}

/// `MM:SS`, minutes not wrapped at the hour.
fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn status_line(session: &FocusSession) -> String {
    let engine = session.engine();
    let state = if engine.is_running() { "running" } else { "paused" };
    format!(
        "{} {} [{}] {}/{}",
        engine.mode().label(),
        format_clock(engine.remaining_secs()),
        state,
        engine.completed_in_cycle(),
        engine.settings().sessions_before_long_break,
    )
}

struct Screen {
    json: bool,
}

impl Screen {
    fn draw(&self, session: &FocusSession) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        let mut out = io::stdout();
        queue!(
            out,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(status_line(session))
        )?;
        out.flush()
    }

    fn event(&self, event: &Event) -> CommandResult {
        if self.json {
            // raw mode needs an explicit carriage return
            print!("{}\r\n", serde_json::to_string(event)?);
            io::stdout().flush()?;
        }
        Ok(())
    }

    fn completion(&self, session: &FocusSession, event: &Event) -> CommandResult {
        if self.json {
            return self.event(event);
        }
        if let Event::IntervalCompleted {
            completion,
            next_mode,
            recorded_on,
            ..
        } = event
        {
            let mut out = io::stdout();
            queue!(
                out,
                cursor::MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(format!("{} done, next: {}\r\n", completion.mode.label(), next_mode.label()))
            )?;
            let day = session.stats().day(*recorded_on);
            if !completion.mode.is_break() && day.milestone_reached() {
                queue!(
                    out,
                    Print(format!("{} work sessions today\r\n", day.work_sessions))
                )?;
            }
            out.flush()?;
        }
        Ok(())
    }
}

/// Apply one input to the session, then start or stop the scheduler to
/// match. Reset and skip stop it first so ticks already queued go stale.
fn handle(session: &mut FocusSession, scheduler: &mut TickScheduler, input: Input) -> Outcome {
    let outcome = match input {
        Input::Tick(tick) if !scheduler.is_current(&tick) => {
            debug!(generation = tick.generation, "dropping stale tick");
            return Outcome::Stale;
        }
        Input::Tick(_) => session.tick().map_or(Outcome::Nothing, Outcome::Completed),
        Input::Command(Command::Toggle) => {
            session.toggle().map_or(Outcome::Nothing, Outcome::Changed)
        }
        Input::Command(Command::Reset) => {
            scheduler.stop();
            Outcome::Changed(session.reset())
        }
        Input::Command(Command::Skip) => {
            scheduler.stop();
            Outcome::Completed(session.skip())
        }
        Input::Command(Command::Quit) => return Outcome::Quit,
    };
    scheduler.sync(session.is_running());
    outcome
}

async fn drive(mut session: FocusSession, bindings: KeyBindings, args: RunArgs) -> CommandResult {
    let screen = Screen { json: args.json };
    let (mut scheduler, mut ticks) = TickScheduler::new(TICK_PERIOD);
    let (key_sender, mut commands) = mpsc::unbounded_channel();

    let _raw = match RawMode::enable() {
        Ok(guard) => {
            spawn_key_reader(bindings, key_sender);
            Some(guard)
        }
        Err(e) => {
            warn!(error = %e, "no interactive terminal, keys disabled");
            None
        }
    };

    if args.start {
        if let Some(event) = session.start() {
            screen.event(&event)?;
        }
    }
    scheduler.sync(session.is_running());
    screen.event(&session.snapshot())?;
    screen.draw(&session)?;

    loop {
        let input = tokio::select! {
            Some(tick) = ticks.recv() => Input::Tick(tick),
            Some(command) = commands.recv() => Input::Command(command),
            _ = tokio::signal::ctrl_c() => Input::Command(Command::Quit),
        };
        match handle(&mut session, &mut scheduler, input) {
            Outcome::Stale => continue,
            Outcome::Nothing => {}
            Outcome::Changed(event) => screen.event(&event)?,
            Outcome::Completed(event) => screen.completion(&session, &event)?,
            Outcome::Quit => break,
        }
        screen.draw(&session)?;
    }

    scheduler.stop();
    if !args.json {
        print!("\r\n");
        io::stdout().flush()?;
    }
    Ok(())
}

pub fn run(args: RunArgs) -> CommandResult {
    let config = Config::load()?;
    let bindings = KeyBindings::from_config(&config.keys)?;
    let store: Arc<dyn Store> = Arc::new(open_store_with(&config)?);
    let notifier: Arc<dyn Notifier> = if args.quiet {
        Arc::new(SilentNotifier)
    } else {
        Arc::new(DesktopNotifier::default())
    };
    let session = FocusSession::open(store, notifier, Arc::new(SystemClock));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(session, bindings, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use focusloop_core::{FixedClock, MemoryStore, Mode, SettingsPatch};

    #[test]
    fn parses_named_and_single_char_keys() {
        assert_eq!(parse_key("space"), Some(KeyCode::Char(' ')));
        assert_eq!(parse_key("Esc"), Some(KeyCode::Esc));
        assert_eq!(parse_key("s"), Some(KeyCode::Char('s')));
        assert_eq!(parse_key("ss"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn default_bindings_map_commands() {
        let bindings = KeyBindings::from_config(&KeysConfig::default()).unwrap();
        let none = KeyModifiers::NONE;
        assert_eq!(bindings.command_for(KeyCode::Char(' '), none), Some(Command::Toggle));
        assert_eq!(bindings.command_for(KeyCode::Esc, none), Some(Command::Reset));
        assert_eq!(bindings.command_for(KeyCode::Char('S'), none), Some(Command::Skip));
        assert_eq!(bindings.command_for(KeyCode::Char('q'), none), Some(Command::Quit));
        assert_eq!(bindings.command_for(KeyCode::Char('x'), none), None);
        assert_eq!(
            bindings.command_for(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Command::Quit)
        );
    }

    #[test]
    fn bad_binding_is_reported() {
        let keys = KeysConfig {
            skip: "ctrl-s".into(),
            ..KeysConfig::default()
        };
        let err = KeyBindings::from_config(&keys).unwrap_err();
        assert!(err.contains("keys.skip"));
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(3600), "60:00");
    }

    fn session() -> FocusSession {
        FocusSession::open(
            Arc::new(MemoryStore::new()),
            Arc::new(SilentNotifier),
            Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())),
        )
    }

    /// Wait for the next tick and hand it to `handle`, skipping stale ones.
    async fn next_tick(
        session: &mut FocusSession,
        scheduler: &mut TickScheduler,
        ticks: &mut mpsc::UnboundedReceiver<Tick>,
    ) -> Outcome {
        loop {
            let tick = ticks.recv().await.unwrap();
            match handle(session, scheduler, Input::Tick(tick)) {
                Outcome::Stale => continue,
                outcome => return outcome,
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reset_drops_queued_ticks() {
        let mut session = session();
        let (mut scheduler, mut ticks) = TickScheduler::new(TICK_PERIOD);
        handle(&mut session, &mut scheduler, Input::Command(Command::Toggle));
        assert!(scheduler.is_active());

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let outcome = handle(&mut session, &mut scheduler, Input::Command(Command::Reset));
        assert!(matches!(outcome, Outcome::Changed(Event::TimerReset { .. })));

        let mut drained = 0;
        while let Ok(tick) = ticks.try_recv() {
            drained += 1;
            let outcome = handle(&mut session, &mut scheduler, Input::Tick(tick));
            assert!(matches!(outcome, Outcome::Stale));
        }
        assert!(drained >= 2);
        assert_eq!(session.engine().remaining_secs(), 1500);
        assert!(!session.is_running());
        assert!(!scheduler.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_resume_follow_toggle() {
        let mut session = session();
        let (mut scheduler, mut ticks) = TickScheduler::new(TICK_PERIOD);
        handle(&mut session, &mut scheduler, Input::Command(Command::Toggle));
        next_tick(&mut session, &mut scheduler, &mut ticks).await;
        assert_eq!(session.engine().remaining_secs(), 1499);

        handle(&mut session, &mut scheduler, Input::Command(Command::Toggle));
        assert!(!scheduler.is_active());
        tokio::time::sleep(Duration::from_secs(3)).await;
        while let Ok(tick) = ticks.try_recv() {
            handle(&mut session, &mut scheduler, Input::Tick(tick));
        }
        assert_eq!(session.engine().remaining_secs(), 1499);

        handle(&mut session, &mut scheduler, Input::Command(Command::Toggle));
        assert!(scheduler.is_active());
        let outcome = next_tick(&mut session, &mut scheduler, &mut ticks).await;
        assert!(matches!(outcome, Outcome::Nothing));
        assert_eq!(session.engine().remaining_secs(), 1498);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_advance_keeps_ticking_after_completion() {
        let mut session = session();
        session
            .apply_settings(&SettingsPatch {
                work_duration: Some(60),
                auto_advance: Some(true),
                ..SettingsPatch::default()
            })
            .unwrap();
        let (mut scheduler, mut ticks) = TickScheduler::new(TICK_PERIOD);
        handle(&mut session, &mut scheduler, Input::Command(Command::Toggle));

        let mut elapsed = 0;
        let completed = loop {
            elapsed += 1;
            if let Outcome::Completed(event) =
                next_tick(&mut session, &mut scheduler, &mut ticks).await
            {
                break event;
            }
        };
        assert_eq!(elapsed, 60);
        assert!(matches!(
            completed,
            Event::IntervalCompleted {
                next_mode: Mode::ShortBreak,
                ..
            }
        ));
        assert!(scheduler.is_active());

        next_tick(&mut session, &mut scheduler, &mut ticks).await;
        assert_eq!(session.engine().mode(), Mode::ShortBreak);
        assert_eq!(session.engine().remaining_secs(), 299);
    }

    #[tokio::test(start_paused = true)]
    async fn skip_without_auto_advance_stops_ticking() {
        let mut session = session();
        let (mut scheduler, _ticks) = TickScheduler::new(TICK_PERIOD);
        handle(&mut session, &mut scheduler, Input::Command(Command::Toggle));

        let outcome = handle(&mut session, &mut scheduler, Input::Command(Command::Skip));
        assert!(matches!(
            outcome,
            Outcome::Completed(Event::IntervalCompleted { skipped: true, .. })
        ));
        assert!(!scheduler.is_active());
        assert!(matches!(
            handle(&mut session, &mut scheduler, Input::Command(Command::Quit)),
            Outcome::Quit
        ));
    }
}
