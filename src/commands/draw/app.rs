//! Draw screen state and main loop.

use std::io::{self, Stdout};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tracing::warn;

use super::event_handler::{handle_key_event, KeyAction};
use super::renderer::{
    render_footer, render_header, render_history, render_step_card, render_step_table,
    status_hint, StepRow,
};
use crate::auth::{set_unlocked, AdminDirectory};
use crate::config::Config;
use crate::identity::{IdentityProvider, SessionFile};
use crate::itinerary::ItineraryRepository;
use crate::models::{Identity, Step};
use crate::reveal::{RevealMachine, TickOutcome};
use crate::store::{FileStore, WatchHandle};

/// Poll timeout while nothing is animating (100ms for responsive UI).
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Draw screen state.
pub struct DrawApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    running: Arc<AtomicBool>,
    machine: RevealMachine,
    repo: ItineraryRepository<FileStore>,
    admins: AdminDirectory<FileStore>,
    identity: Option<Identity>,
    is_admin: bool,
    trip_title: Option<String>,
    cursor: usize,
    tick_interval: Duration,
    last_tick: Instant,
    spinner_frame: usize,
    steps_rx: Receiver<Vec<Step>>,
    identity_rx: Receiver<Option<Identity>>,
    _steps_watch: WatchHandle,
    _session_watch: WatchHandle,
    /// Flag to prevent double cleanup in Drop.
    cleaned_up: bool,
}

impl DrawApp {
    /// Create the draw screen: load state from the store, start the
    /// watchers, then take over the terminal.
    pub fn new(config: &Config, store_root: &Path) -> Result<Self> {
        let store = FileStore::open(store_root).with_poll_interval(config.watch_poll());
        let repo = ItineraryRepository::new(store.clone());
        let sessions = SessionFile::at_root(store_root).with_poll_interval(config.watch_poll());
        let admins = AdminDirectory::new(store, config.auth.source, config.auth.admins.clone());

        let steps = repo
            .load_steps()
            .context("Failed to load the itinerary (is the store initialized?)")?;
        let progress = repo.load_progress()?;
        let trip_title = repo.trip_title()?;
        let identity = sessions.current()?;
        let is_admin = admins.is_admin(identity.as_ref());

        let machine = RevealMachine::new(config.reveal_params(), steps, progress);

        let (steps_tx, steps_rx) = mpsc::channel();
        let steps_watch = repo.watch_steps(Box::new(move |steps| {
            let _ = steps_tx.send(steps);
        }))?;
        let (identity_tx, identity_rx) = mpsc::channel();
        let session_watch = sessions.watch(Box::new(move |identity| {
            let _ = identity_tx.send(identity);
        }))?;

        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

        crate::utils::install_terminal_panic_hook();

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        Ok(Self {
            terminal,
            running: Arc::new(AtomicBool::new(true)),
            machine,
            repo,
            admins,
            identity,
            is_admin,
            trip_title,
            cursor: 0,
            tick_interval: config.tick_interval(),
            last_tick: Instant::now(),
            spinner_frame: 0,
            steps_rx,
            identity_rx,
            _steps_watch: steps_watch,
            _session_watch: session_watch,
            cleaned_up: false,
        })
    }

    /// Run the draw screen event loop.
    pub fn run(&mut self) -> Result<()> {
        // Install Ctrl+C handler to ensure terminal cleanup on signal
        let running = self.running.clone();

        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);

            // Cleanup crossterm state - must be done in signal handler
            // since Drop may not run on process exit
            crate::utils::cleanup_terminal();

            std::process::exit(0);
        })
        .context("Failed to set Ctrl+C handler")?;

        let result = self.run_event_loop();

        // ALWAYS cleanup terminal before returning
        self.cleanup_terminal();

        result
    }

    /// Main event loop - returns on quit.
    fn run_event_loop(&mut self) -> Result<()> {
        let mut rng = rand::thread_rng();

        while self.running.load(Ordering::SeqCst) {
            self.drain_updates();

            let timeout = if self.machine.is_rolling() {
                self.tick_interval
            } else {
                IDLE_POLL
            };
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match handle_key_event(key.code, key.modifiers) {
                            KeyAction::Quit => break,
                            KeyAction::Draw => self.start_draw(),
                            KeyAction::CursorUp => self.move_cursor(-1),
                            KeyAction::CursorDown => self.move_cursor(1),
                            KeyAction::ToggleLock => self.toggle_selected(),
                            KeyAction::Ignore => {}
                        }
                    }
                    _ => {}
                }
            }

            if self.last_tick.elapsed() >= self.tick_interval {
                self.last_tick = Instant::now();
                self.spinner_frame = (self.spinner_frame + 1) % 10;

                if let TickOutcome::Revealed { step_id } =
                    self.machine.on_tick(Instant::now(), &mut rng)
                {
                    self.persist_progress(&step_id);
                }
            }

            self.render()?;
        }

        Ok(())
    }

    /// Apply pending store and session updates, newest snapshot wins.
    fn drain_updates(&mut self) {
        let mut latest_steps = None;
        while let Ok(steps) = self.steps_rx.try_recv() {
            latest_steps = Some(steps);
        }
        if let Some(steps) = latest_steps {
            self.machine.sync_steps(steps);
            let len = self.machine.steps().len();
            if len > 0 && self.cursor >= len {
                self.cursor = len - 1;
            }
        }

        let mut latest_identity = None;
        while let Ok(identity) = self.identity_rx.try_recv() {
            latest_identity = Some(identity);
        }
        if let Some(identity) = latest_identity {
            self.identity = identity;
            self.is_admin = self.admins.is_admin(self.identity.as_ref());
        }
    }

    fn start_draw(&mut self) {
        if self.identity.is_none() {
            self.machine
                .show_error("sign in with `jaunt login` to draw", Instant::now());
            return;
        }
        self.machine.request_reveal(Instant::now());
    }

    /// The reveal already happened on screen; a failed save is logged
    /// and the session moves on.
    fn persist_progress(&mut self, step_id: &str) {
        if let Err(e) = self.repo.save_progress(step_id) {
            warn!("failed to persist progress for step {step_id}: {e}");
        }
    }

    fn move_cursor(&mut self, delta: i32) {
        let len = self.machine.steps().len();
        if len == 0 {
            return;
        }
        let cursor = self.cursor as i32 + delta;
        self.cursor = cursor.clamp(0, len as i32 - 1) as usize;
    }

    /// Toggle the lock on the step under the cursor. The store watcher
    /// echoes the change back into the machine; nothing flips locally.
    fn toggle_selected(&mut self) {
        let now = Instant::now();
        let Some(step) = self.machine.steps().get(self.cursor) else {
            return;
        };
        let step_id = step.id.clone();
        let unlocked = !step.is_unlocked;

        if let Err(e) = set_unlocked(&self.admins, self.identity.as_ref(), &step_id, unlocked) {
            self.machine.show_error(e.to_string(), now);
        }
    }

    /// Cleanup terminal state (leave alternate screen, disable raw mode).
    /// Sets cleaned_up flag to prevent double cleanup in Drop.
    fn cleanup_terminal(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;

        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }

    /// Render the UI.
    fn render(&mut self) -> Result<()> {
        let now = Instant::now();
        let rolling = self.machine.is_rolling();
        let ready = self.machine.next_ready();
        let is_admin = self.is_admin;
        let cursor = self.cursor;

        let spinner = rolling.then(|| self.spinner_char());
        let trip_title = self.trip_title.clone();
        let identity_label = self.identity.as_ref().map(|i| i.label().to_string());
        let signed_in = self.identity.is_some();
        let display = self.machine.display_step().cloned();
        let banner = self.machine.banner(now).map(str::to_string);
        let hint = status_hint(rolling, ready, signed_in);

        let history: Vec<String> = self
            .machine
            .history()
            .iter()
            .map(|id| self.title_of(id))
            .collect();

        let rows: Vec<StepRow> = self
            .machine
            .steps()
            .iter()
            .map(|step| StepRow {
                id: step.id.clone(),
                title: step.title.clone(),
                is_unlocked: step.is_unlocked,
                revealed: self.machine.is_revealed(&step.id),
            })
            .collect();

        self.terminal.draw(|frame| {
            let area = frame.area();

            let mut constraints = vec![
                Constraint::Length(5),
                Constraint::Length(6),
                Constraint::Length(3),
            ];
            constraints.push(if is_admin {
                Constraint::Min(5)
            } else {
                Constraint::Min(0)
            });
            constraints.push(Constraint::Length(2));

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(area);

            render_header(frame, chunks[0], spinner, &trip_title, &identity_label);
            render_step_card(
                frame,
                chunks[1],
                display.as_ref(),
                rolling,
                ready,
                signed_in,
            );
            render_history(frame, chunks[2], &history);
            if is_admin {
                render_step_table(frame, chunks[3], &rows, cursor);
            }
            render_footer(frame, chunks[4], &banner, hint, is_admin);
        })?;

        Ok(())
    }

    /// Title for a revealed step id; the id itself when the step is gone.
    fn title_of(&self, step_id: &str) -> String {
        self.machine
            .steps()
            .iter()
            .find(|s| s.id == step_id)
            .map(|s| s.title.clone())
            .unwrap_or_else(|| format!("step {step_id}"))
    }

    /// Get spinner character for current frame.
    fn spinner_char(&self) -> char {
        const SPINNER: [char; 10] = [
            '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}',
            '\u{2827}', '\u{2807}', '\u{280F}',
        ];
        SPINNER[self.spinner_frame % SPINNER.len()]
    }
}

impl Drop for DrawApp {
    fn drop(&mut self) {
        self.cleanup_terminal();
    }
}
