//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Background work
//!
//! Network calls (chat, sources listing, health probe, auth lookup) run as
//! tokio tasks. Each one reports back with a single `Action` over an
//! `std::sync::mpsc` channel that the loop drains every tick.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (request or lookup in flight): draws every ~80ms so the
//!   spinner moves.
//! - **Idle**: sleeps up to 500ms and only redraws after an event.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::api::{AuthClient, ChatBackend};
use crate::core::action::{Action, Effect, update};
use crate::core::state::{App, View};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    EXAMPLE_QUESTIONS, InputBox, InputEvent, MessageListState, SourcesEvent, SourcesViewState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub sources_view: SourcesViewState,
    /// Index of the example question last copied with Tab
    pub last_example: Option<usize>,
}

impl TuiState {
    pub fn new(max_message_chars: usize) -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(max_message_chars),
            sources_view: SourcesViewState::new(),
            last_example: None,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock, // blinking resets on every draw
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste, Hide);
    }
}

/// Runs the UI until the user quits. Must be called inside a tokio runtime.
pub fn run(mut app: App, auth: Option<AuthClient>) -> std::io::Result<()> {
    let mut tui = TuiState::new(app.max_message_chars);
    let (tx, rx) = mpsc::channel();

    spawn_health_check(app.backend.clone(), tx.clone());
    if let Some(auth) = auth {
        spawn_auth_lookup(auth, tx.clone());
    }

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()
        .inspect_err(|e| warn!("Failed to enable terminal modes: {}", e))
        .ok();

    let start_time = Instant::now();
    let mut needs_redraw = true;

    loop {
        tui.input_box.max_chars = app.max_message_chars;
        tui.input_box.error = app.input_error.clone();
        tui.input_box.busy = app.is_loading;

        let animating = app.is_loading || app.sources_loading || app.auth.is_loading();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            should_quit |= handle_event(&mut app, &mut tui, event, &tx);
            if should_quit {
                break;
            }
        }
        if should_quit {
            break;
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(&mut app, &mut tui, action, &tx) {
                should_quit = true;
            }
        }
        if should_quit {
            break;
        }
    }

    info!("Stardust shutting down ({} turns)", app.messages.len());
    drop(_terminal_mode_guard);
    ratatui::restore();
    Ok(())
}

/// Routes one terminal event. Returns true when the app should quit.
fn handle_event(
    app: &mut App,
    tui: &mut TuiState,
    event: TuiEvent,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match event {
        TuiEvent::Resize => return false,
        TuiEvent::ForceQuit => return dispatch(app, tui, Action::Quit, tx),
        TuiEvent::ToggleView => return dispatch(app, tui, Action::ToggleView, tx),
        TuiEvent::Login => return dispatch(app, tui, Action::Login, tx),
        TuiEvent::Logout => return dispatch(app, tui, Action::Logout, tx),
        _ => {}
    }

    match app.view {
        View::Chat => handle_chat_event(app, tui, event, tx),
        View::Sources => handle_sources_event(app, tui, event, tx),
    }
}

fn handle_chat_event(
    app: &mut App,
    tui: &mut TuiState,
    event: TuiEvent,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match event {
        TuiEvent::NextExample if app.is_loading => false,
        TuiEvent::NextExample => {
            let next = tui
                .last_example
                .map_or(0, |i| (i + 1) % EXAMPLE_QUESTIONS.len());
            tui.input_box.set_text(EXAMPLE_QUESTIONS[next].1);
            tui.last_example = Some(next);
            dispatch(app, tui, Action::InputEdited, tx)
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(&event);
            false
        }
        _ => match tui.input_box.handle_event(&event) {
            Some(InputEvent::Submit(text)) => dispatch(app, tui, Action::Submit(text), tx),
            Some(InputEvent::Edited) => dispatch(app, tui, Action::InputEdited, tx),
            Some(InputEvent::Moved) => false,
            None => {
                // Up/Down past the first or last input row scroll the transcript
                if matches!(event, TuiEvent::CursorUp | TuiEvent::CursorDown) {
                    tui.message_list.handle_event(&event);
                }
                false
            }
        },
    }
}

fn handle_sources_event(
    app: &mut App,
    tui: &mut TuiState,
    event: TuiEvent,
    tx: &mpsc::Sender<Action>,
) -> bool {
    if matches!(event, TuiEvent::Escape) {
        return dispatch(app, tui, Action::ToggleView, tx);
    }
    match tui.sources_view.handle_event(&event) {
        Some(SourcesEvent::Open(index)) => match app.sources.as_slice().get(index).cloned() {
            Some(url) => dispatch(app, tui, Action::OpenUrl(url), tx),
            None => false,
        },
        Some(SourcesEvent::Refresh) => dispatch(app, tui, Action::RefreshSources, tx),
        None => false,
    }
}

/// Runs the reducer and performs the effect it asks for.
/// Returns true when the effect is `Quit`.
fn dispatch(app: &mut App, tui: &mut TuiState, action: Action, tx: &mpsc::Sender<Action>) -> bool {
    match update(app, action) {
        Effect::None => false,
        Effect::Quit => true,
        Effect::SendMessage(text) => {
            tui.input_box.clear();
            tui.input_box.busy = true;
            tui.message_list.stick_to_bottom = true;
            spawn_chat_request(app.backend.clone(), text, tx.clone());
            false
        }
        Effect::FetchSources => {
            spawn_sources_request(app.backend.clone(), app.indexed_only, tx.clone());
            false
        }
        Effect::OpenUrl(url) => {
            open_in_browser(app, &url);
            false
        }
    }
}

fn open_in_browser(app: &mut App, url: &str) {
    info!("Opening {} in browser", url);
    if let Err(e) = open::that(url) {
        warn!("Failed to open {}: {}", url, e);
        app.status_message = format!("Could not open a browser. Visit {url}");
    }
}

fn send_action(tx: &mpsc::Sender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Failed to deliver background result: receiver dropped");
    }
}

fn spawn_chat_request(backend: Arc<dyn ChatBackend>, text: String, tx: mpsc::Sender<Action>) {
    info!("Spawning chat request ({} chars)", text.chars().count());
    tokio::spawn(async move {
        let started = Instant::now();
        let action = match backend.send_message(&text).await {
            Ok(reply) => {
                info!(
                    "Chat reply in {}ms: {} chars, {} sources",
                    started.elapsed().as_millis(),
                    reply.response.len(),
                    reply.sources.len()
                );
                if let Some(metadata) = &reply.metadata {
                    debug!("Reply metadata: {}", metadata);
                }
                Action::ResponseReceived(reply)
            }
            Err(e) => {
                warn!("Chat request failed after {}ms: {}", started.elapsed().as_millis(), e);
                Action::ResponseFailed(e.message())
            }
        };
        send_action(&tx, action);
    });
}

fn spawn_sources_request(backend: Arc<dyn ChatBackend>, indexed_only: bool, tx: mpsc::Sender<Action>) {
    info!("Spawning sources request (indexed_only={})", indexed_only);
    tokio::spawn(async move {
        let action = match backend.fetch_sources(indexed_only).await {
            Ok(listing) => Action::SourcesLoaded(listing),
            Err(e) => {
                warn!("Sources request failed: {}", e);
                Action::SourcesFailed(e.message())
            }
        };
        send_action(&tx, action);
    });
}

fn spawn_health_check(backend: Arc<dyn ChatBackend>, tx: mpsc::Sender<Action>) {
    tokio::spawn(async move {
        let healthy = match backend.health().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!("Health check failed: {}", e);
                false
            }
        };
        info!("Backend health: {}", if healthy { "ok" } else { "unavailable" });
        send_action(&tx, Action::HealthChecked(healthy));
    });
}

fn spawn_auth_lookup(auth: AuthClient, tx: mpsc::Sender<Action>) {
    tokio::spawn(async move {
        let user = auth.resolve_user().await;
        send_action(&tx, Action::AuthResolved(user));
    });
}
