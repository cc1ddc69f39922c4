use crate::output::SessionResult;
use crate::pipeline::{Outcome, Pipeline, PipelineEvent};
use anyhow::{Context, bail};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use homeflake_core::catalog::{self, Flake};
use homeflake_core::config::Settings;
use homeflake_core::profile::Profile;
use homeflake_core::session::ProvisionRequest;
use homeflake_core::store::ProfileStore;
use homeflake_ops::{NixProfileBackend, ToolchainSetup};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use std::collections::BTreeSet;
use std::io::{self, Stderr};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

const SPINNER_TICK: Duration = Duration::from_millis(120);
const INPUT_CAPACITY: usize = 64;
const NAME_MAX_LEN: usize = 30;

/// How the interactive session ended.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Finished(SessionResult),
    /// Ctrl+C: no structured result is printed.
    ForceQuit,
}

pub fn run_tui(settings: Settings) -> anyhow::Result<SessionEnd> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("create tui runtime")?;
    let jobs = JobContext::new(
        settings.clone(),
        Arc::new(NixProfileBackend::new()),
        Arc::new(ToolchainSetup::new()),
    );
    let app = App::load(settings);

    enable_raw_mode().context("enable raw mode")?;
    let mut stderr = io::stderr();
    if let Err(err) = execute!(stderr, EnterAlternateScreen) {
        disable_raw_mode().ok();
        return Err(err).context("enter alternate screen");
    }
    let mut terminal = match Terminal::new(CrosstermBackend::new(stderr)) {
        Ok(terminal) => terminal,
        Err(err) => {
            disable_raw_mode().ok();
            execute!(io::stderr(), LeaveAlternateScreen).ok();
            return Err(err).context("create terminal");
        }
    };

    info!(profiles = app.profiles.len(), flakes = app.catalog.len(), "Starting TUI");
    let result = runtime.block_on(run_app(&mut terminal, app, &jobs));

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    // Ctrl+C may leave a nix command running on the blocking pool.
    runtime.shutdown_background();

    match &result {
        Ok(SessionEnd::ForceQuit) => info!("TUI force-quit"),
        Ok(SessionEnd::Finished(outcome)) => debug!(action = outcome.action(), "TUI exited"),
        Err(err) => error!(error = %format!("{err:#}"), "TUI exited with error"),
    }
    result
}

enum Wake {
    Input(io::Result<Event>),
    InputClosed,
    Pipeline(PipelineEvent),
    Tick,
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    mut app: App,
    jobs: &JobContext,
) -> anyhow::Result<SessionEnd> {
    let theme = Theme::default();
    let mut input = spawn_input_reader();
    let mut pipeline: Option<Pipeline> = None;
    let mut spinner = tokio::time::interval(SPINNER_TICK);
    spinner.set_missed_tick_behavior(MissedTickBehavior::Skip);
    debug!(tick_ms = SPINNER_TICK.as_millis(), "TUI event loop started");

    loop {
        terminal.draw(|frame| app.draw(frame, &theme))?;

        let wake = tokio::select! {
            event = input.recv() => match event {
                Some(event) => Wake::Input(event),
                None => Wake::InputClosed,
            },
            event = next_pipeline_event(&mut pipeline) => Wake::Pipeline(event),
            _ = spinner.tick(), if app.is_busy() => Wake::Tick,
        };

        let flow = match wake {
            Wake::Input(Ok(Event::Key(key))) => app.handle_key(key),
            Wake::Input(Ok(_)) => Flow::Continue,
            Wake::Input(Err(err)) => return Err(err).context("read terminal input"),
            Wake::InputClosed => bail!("terminal input reader stopped"),
            Wake::Pipeline(event) => {
                app.handle_pipeline_event(event);
                if pipeline.as_ref().is_some_and(Pipeline::is_finished) {
                    pipeline = None;
                }
                Flow::Continue
            }
            Wake::Tick => {
                app.tick();
                Flow::Continue
            }
        };

        match flow {
            Flow::Continue => {}
            Flow::Spawn(job) => pipeline = Some(jobs.launch(job)),
            Flow::Finish(outcome) => return Ok(SessionEnd::Finished(outcome)),
            Flow::ForceQuit => return Ok(SessionEnd::ForceQuit),
        }
    }
}

/// Suspends forever when no job is running so `select!` only wakes on input.
async fn next_pipeline_event(pipeline: &mut Option<Pipeline>) -> PipelineEvent {
    if let Some(pipeline) = pipeline.as_mut()
        && let Some(event) = pipeline.next_event().await
    {
        return event;
    }
    std::future::pending().await
}

fn spawn_input_reader() -> mpsc::Receiver<io::Result<Event>> {
    let (tx, rx) = mpsc::channel(INPUT_CAPACITY);
    thread::spawn(move || {
        loop {
            let event = event::read();
            let failed = event.is_err();
            if tx.blocking_send(event).is_err() || failed {
                break;
            }
        }
    });
    rx
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    New,
    Edit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    Blocked,
    Menu,
    NamePrompt,
    BundleSelect(Mode),
    Confirm(Mode),
    DeleteConfirm,
    Progress,
    Success,
}

/// What the loop should do after a transition.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Spawn(Job),
    Finish(SessionResult),
    ForceQuit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Job {
    Provision(ProvisionRequest),
    Cleanup(Profile),
}

#[derive(Clone, Debug)]
struct InputField {
    label: &'static str,
    value: String,
}

impl InputField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
        }
    }

    /// Accepts only characters that keep the name a single path component.
    fn push(&mut self, ch: char) {
        if is_name_char(ch) && self.value.chars().count() < NAME_MAX_LEN {
            self.value.push(ch);
        }
    }

    fn pop(&mut self) {
        self.value.pop();
    }

    fn trimmed(&self) -> &str {
        self.value.trim()
    }
}

#[derive(Clone, Debug)]
struct ProgressSession {
    profile: Profile,
    mode: Mode,
    log: Vec<String>,
    outcome: Option<Outcome>,
}

impl ProgressSession {
    fn running(profile: Profile, mode: Mode) -> Self {
        Self {
            profile,
            mode,
            log: Vec::new(),
            outcome: None,
        }
    }

    fn failed(profile: Profile, mode: Mode, error: String) -> Self {
        Self {
            profile,
            mode,
            log: vec![format!("Error: {error}")],
            outcome: Some(Err(error)),
        }
    }

    fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    fn error(&self) -> Option<&str> {
        match &self.outcome {
            Some(Err(err)) => Some(err),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum CleanupState {
    Idle,
    Running,
    Finished(Outcome),
}

mod app_core;
mod draw;
mod handle;
mod helpers;
mod jobs;

use draw::Theme;
use helpers::*;
use jobs::JobContext;

struct App {
    settings: Settings,
    store: ProfileStore,
    screen: Screen,
    /// Name of the profile whose home this process runs in, if any.
    blocked: Option<String>,
    profiles: Vec<Profile>,
    catalog: Vec<Flake>,
    banner: Option<String>,
    menu_index: usize,
    catalog_index: usize,
    name_input: InputField,
    selection: BTreeSet<String>,
    target: Option<Profile>,
    session: Option<ProgressSession>,
    cleanup: CleanupState,
    spinner: usize,
}
