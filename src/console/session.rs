use std::io::BufRead;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crate::{
    console::console_state::ScanState,
    form::{
        controller::{FormController, FormError},
        draft::DraftField,
    },
    poll::poll_loop::{DEFAULT_POLL_INTERVAL, PollLoop, PollTick},
    registry::view::RegistryView,
    render::{
        console::{format_options, format_registry, format_status, fragment_to_text},
        fragment::{RenderContext, TemplateKey},
        renderer::{DefaultRenderer, Renderer},
    },
    trace::{logger::TraceLogger, trace::TraceEvent},
    transport::transport::{SubmitKind, Transport},
};

pub const HELP: &str = "\
Commands:
  uid <value>        set the uid field
  alias <value>      set the alias field
  parameter <value>  set the parameter field
  action <name>      select an action class
  register           register the tag in the form
  unregister         unregister the tag in the form
  select <n>         copy registry row <n> into the form
  list               show the registry
  actions            show the available actions
  show               show the form
  clear              clear the form
  quit               leave the console
";

// ============================================================================
// Events and commands
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Set(DraftField, String),
    Register,
    Unregister,
    Select(usize),
    List,
    Actions,
    Show,
    Clear,
    Help,
    Quit,
}

/// Parse one line typed at the console.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    if let Some(field) = DraftField::parse(word) {
        return Ok(ConsoleCommand::Set(field, rest.to_string()));
    }

    match word {
        "register" => Ok(ConsoleCommand::Register),
        "unregister" => Ok(ConsoleCommand::Unregister),
        "select" => rest
            .parse()
            .map(ConsoleCommand::Select)
            .map_err(|_| format!("select needs a row number, got '{}'", rest)),
        "list" => Ok(ConsoleCommand::List),
        "actions" => Ok(ConsoleCommand::Actions),
        "show" => Ok(ConsoleCommand::Show),
        "clear" => Ok(ConsoleCommand::Clear),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        other => Err(format!("Unknown command '{}' (try 'help')", other)),
    }
}

/// Everything the session loop reacts to, funnelled through one channel.
#[derive(Debug)]
pub enum ConsoleEvent {
    Poll(PollTick),
    Command(ConsoleCommand),
    Invalid(String),
    InputClosed,
}

/// Outcome of handling one event.
#[derive(Debug, PartialEq)]
pub enum Step {
    Continue(Option<String>),
    Quit,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub poll_interval: Duration,
    pub verbose: u8,
    pub trace_file: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            verbose: 0,
            trace_file: None,
        }
    }
}

// ============================================================================
// Console session
// ============================================================================

/// One console session: owns the form, the registry copy and the poll loop.
///
/// All state is mutated on the thread driving `handle`. The poll thread only
/// sends events into the session channel.
pub struct ConsoleSession {
    transport: Arc<dyn Transport>,
    renderer: Box<dyn Renderer>,
    form: FormController,
    registry: RegistryView,
    scan_state: ScanState,
    poll: Option<PollLoop>,
    stopped: bool,
    events_tx: Sender<ConsoleEvent>,
    events_rx: Receiver<ConsoleEvent>,
    tracer: TraceLogger,
    config: SessionConfig,
}

impl ConsoleSession {
    pub fn new(transport: Arc<dyn Transport>, config: SessionConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let tracer = TraceLogger::from_path(config.trace_file.as_deref());

        Self {
            transport,
            renderer: Box::new(DefaultRenderer),
            form: FormController::new(),
            registry: RegistryView::new(),
            scan_state: ScanState::Idle,
            poll: None,
            stopped: false,
            events_tx,
            events_rx,
            tracer,
            config,
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn registry(&self) -> &RegistryView {
        &self.registry
    }

    pub fn scan_state(&self) -> ScanState {
        self.scan_state
    }

    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(PollLoop::is_running)
    }

    /// Sender for feeding events (e.g. typed commands) into the session.
    pub fn sender(&self) -> Sender<ConsoleEvent> {
        self.events_tx.clone()
    }

    /// Start-up: load the registry and the catalog, then begin polling.
    /// Load failures are shown but do not prevent the console from running.
    pub fn start(&mut self) -> String {
        let mut out = String::new();

        if let Err(e) = self
            .registry
            .refresh_registry(self.transport.as_ref(), self.renderer.as_ref())
        {
            out.push_str(&self.error_text(&e.to_string()));
            self.trace(TraceEvent::now("registry_refresh_failed", self.scan_state, self.form.state()).with_message(&e));
        }

        if let Err(e) = self.registry.refresh_catalog(self.transport.as_ref()) {
            out.push_str(&self.error_text(&e.to_string()));
            self.trace(TraceEvent::now("catalog_refresh_failed", self.scan_state, self.form.state()).with_message(&e));
        }

        out.push_str(&format_registry(self.registry.rows()));
        self.start_polling();
        out
    }

    fn start_polling(&mut self) {
        if self.poll.is_some() || self.stopped {
            return;
        }

        let transport = Arc::clone(&self.transport);
        let events_tx = self.events_tx.clone();

        if self.config.verbose > 0 {
            eprintln!("Polling for scans every {:?}", self.config.poll_interval);
        }

        self.poll = Some(PollLoop::spawn(
            self.config.poll_interval,
            move || transport.fetch_latest(),
            move |outcome| {
                let _ = events_tx.send(ConsoleEvent::Poll(outcome));
            },
        ));
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_event(&self, timeout: Duration) -> Option<ConsoleEvent> {
        self.events_rx.recv_timeout(timeout).ok()
    }

    pub fn handle(&mut self, event: ConsoleEvent) -> Step {
        match event {
            ConsoleEvent::Poll(outcome) => Step::Continue(self.handle_poll(outcome)),
            ConsoleEvent::Command(command) => self.handle_command(command),
            ConsoleEvent::Invalid(message) => Step::Continue(Some(format!("{}\n", message))),
            ConsoleEvent::InputClosed => Step::Quit,
        }
    }

    fn handle_poll(&mut self, outcome: PollTick) -> Option<String> {
        // Ticks still queued from before shutdown must not touch the form.
        if self.stopped {
            return None;
        }

        self.scan_state = self.scan_state.on_tick(&outcome);

        match outcome {
            PollTick::Started { .. } => None,
            PollTick::Stale { tick } => {
                self.trace(TraceEvent::now("stale", self.scan_state, self.form.state()).with_tick(tick));
                None
            }
            PollTick::Miss { tick, error } => {
                if self.config.verbose > 0 {
                    eprintln!("Poll {} missed: {}", tick, error);
                }
                self.trace(
                    TraceEvent::now("poll_miss", self.scan_state, self.form.state())
                        .with_tick(tick)
                        .with_message(&error),
                );
                None
            }
            PollTick::NewScan { tick, record } => {
                self.form.apply_scan(&record);
                self.trace(
                    TraceEvent::now("new_scan", self.scan_state, self.form.state())
                        .with_tick(tick)
                        .with_uid(&record.uid),
                );

                let notice = self
                    .renderer
                    .render(TemplateKey::ScanNotice, &RenderContext::scan_notice(&record));
                Some(format!(
                    "{}\n{}",
                    fragment_to_text(&notice),
                    format_status(self.scan_state, &self.form)
                ))
            }
        }
    }

    fn handle_command(&mut self, command: ConsoleCommand) -> Step {
        let output = match command {
            ConsoleCommand::Set(field, value) => {
                self.form.set_field(field, &value);
                None
            }
            ConsoleCommand::Register => Some(self.submit(SubmitKind::Register)),
            ConsoleCommand::Unregister => Some(self.submit(SubmitKind::Unregister)),
            ConsoleCommand::Select(index) => match self.registry.select_row(index) {
                Some(draft) => {
                    self.form.load_draft(draft);
                    Some(format_status(self.scan_state, &self.form))
                }
                None => Some(format!("No registry row {}\n", index)),
            },
            ConsoleCommand::List => Some(format_registry(self.registry.rows())),
            ConsoleCommand::Actions => {
                let options = self
                    .registry
                    .options(self.renderer.as_ref(), self.form.draft().action.as_deref());
                Some(format_options(&options))
            }
            ConsoleCommand::Show => Some(format_status(self.scan_state, &self.form)),
            ConsoleCommand::Clear => {
                self.form.reset();
                None
            }
            ConsoleCommand::Help => Some(HELP.to_string()),
            ConsoleCommand::Quit => return Step::Quit,
        };

        Step::Continue(output)
    }

    /// Submit the draft. On success the registry is refreshed once and
    /// shown; on failure the error is shown and the draft kept.
    pub fn submit(&mut self, kind: SubmitKind) -> String {
        let uid = self.form.draft().uid.clone();

        match self
            .form
            .submit_selected(self.transport.as_ref(), kind, self.registry.catalog())
        {
            Ok(outcome) => {
                self.trace(
                    TraceEvent::now("submitted", self.scan_state, self.form.state())
                        .with_uid(&uid)
                        .with_message(kind),
                );

                let mut out = format!(
                    "{}: {}\n",
                    kind,
                    outcome.message.as_deref().unwrap_or("Request successful")
                );
                match self
                    .registry
                    .refresh_registry(self.transport.as_ref(), self.renderer.as_ref())
                {
                    Ok(()) => out.push_str(&format_registry(self.registry.rows())),
                    Err(e) => out.push_str(&self.error_text(&e.to_string())),
                }
                out
            }
            Err(FormError::SubmitInFlight) => self.error_text(&FormError::SubmitInFlight.to_string()),
            Err(e) => {
                self.trace(
                    TraceEvent::now("submit_failed", self.scan_state, self.form.state())
                        .with_uid(&uid)
                        .with_message(&e),
                );
                let message = self.form.error().map(str::to_string).unwrap_or_else(|| e.to_string());
                self.error_text(&message)
            }
        }
    }

    /// Stop polling. Idempotent.
    pub fn shutdown(&mut self) {
        self.stopped = true;
        if let Some(mut poll) = self.poll.take() {
            poll.stop();
            self.trace(TraceEvent::now("stopped", self.scan_state, self.form.state()));
        }
    }

    /// Interactive loop: commands from stdin, scans from the poll thread.
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        print!("{}", self.start());
        println!("Type 'help' for commands. Waiting for scans...");

        let input_tx = self.sender();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(l) => l,
                    Err(_) => break,
                };
                if line.trim().is_empty() {
                    continue;
                }
                let event = match parse_command(&line) {
                    Ok(command) => ConsoleEvent::Command(command),
                    Err(message) => ConsoleEvent::Invalid(message),
                };
                if input_tx.send(event).is_err() {
                    return;
                }
            }
            let _ = input_tx.send(ConsoleEvent::InputClosed);
        });

        while let Ok(event) = self.events_rx.recv() {
            match self.handle(event) {
                Step::Continue(Some(text)) => print!("{}", text),
                Step::Continue(None) => {}
                Step::Quit => break,
            }
        }

        self.shutdown();
        Ok(())
    }

    fn error_text(&self, message: &str) -> String {
        let fragment = self
            .renderer
            .render(TemplateKey::ErrorMessage, &RenderContext::error_message(message));
        format!("{}\n", fragment_to_text(&fragment))
    }

    fn trace(&self, event: TraceEvent) {
        self.tracer.log(&event);
    }
}

impl Drop for ConsoleSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
