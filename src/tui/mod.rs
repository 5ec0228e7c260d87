//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Animating** (request in flight, reply being revealed): draws every
//!   ~50ms for a smooth spinner and typewriter.
//! - **Idle**: sleeps up to 500ms, only redraws on events or resize.
//!
//! ## Background work
//!
//! Network calls and the typewriter ticker run as tokio tasks that send
//! `Action`s back over an `mpsc` channel; the loop drains the channel each
//! iteration and feeds `update()`. Exactly one ticker is live at a time:
//! its `AbortHandle` is owned here and replaced on every new reply.

mod component;
mod components;
mod event;
mod ui;

use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use log::{debug, info, warn};
use tokio::task::AbortHandle;

use crate::api::{ChatBackend, HttpBackend};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::identity::{
    self, FileIdentityStore, IdentityStore, MemoryIdentityStore, SESSION_ID_KEY, USER_ID_KEY,
};
use crate::core::state::{App, TYPE_TICK_MS};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState, PanelEvent, SessionPanelState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which region keystrokes currently route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Text entry; Up/Down scroll the conversation.
    Input,
    /// Session panel; Up/Down move the selection.
    Sidebar,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub session_panel: SessionPanelState,
    pub focus: Focus,
    /// Backend URL shown in the title bar.
    pub backend_label: String,
}

impl TuiState {
    pub fn new(backend_label: String) -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            session_panel: SessionPanelState::new(),
            focus: Focus::Input, // User expects to type immediately
            backend_label,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            std::io::stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            std::io::stdout(),
            DisableMouseCapture,
            DisableBracketedPaste
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    // Identity first: both tokens must exist before anything talks to the
    // backend. Falls back to a process-lifetime store when there is no
    // home directory to persist into.
    let store: Box<dyn IdentityStore> = match FileIdentityStore::open_default() {
        Ok(s) => Box::new(s),
        Err(e) => {
            warn!("identity file unavailable ({e}), using in-memory store");
            Box::new(MemoryIdentityStore::default())
        }
    };
    let user_id = identity::get_or_create(store.as_ref(), USER_ID_KEY);
    let session_id = identity::get_or_create(store.as_ref(), SESSION_ID_KEY);
    info!("identity ready (user={user_id}, session={session_id})");

    let backend: Arc<dyn ChatBackend> = Arc::new(HttpBackend::new(config.backend_url.clone()));
    let mut app = App::new(user_id, session_id, config.language.clone());
    let mut tui = TuiState::new(config.backend_url.clone());

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    // The one live typewriter ticker (replaced on every new reply)
    let mut typing_ticker: Option<AbortHandle> = None;

    // Load sessions and history for the persisted identity
    spawn_fetch_sessions(backend.clone(), app.user_id.clone(), tx.clone());
    spawn_fetch_history(backend.clone(), app.session_id.clone(), tx.clone());

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame
    let mut should_quit = false;

    while !should_quit {
        let animating = app.is_loading || app.typing.is_some();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let elapsed = start_time.elapsed().as_secs_f32();
            let spinner_frame = (elapsed * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating, long when idle
        let timeout = if animating {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain all pending events before next draw
        for tui_event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match tui_event {
                // Resize just needs a redraw (already flagged above)
                TuiEvent::Resize => {}

                TuiEvent::ForceQuit => {
                    should_quit = true;
                }

                TuiEvent::Escape => {
                    // Esc backs out of the sidebar, otherwise quits.
                    if tui.focus == Focus::Sidebar {
                        tui.focus = Focus::Input;
                    } else {
                        should_quit = true;
                    }
                }

                TuiEvent::ToggleSidebar => {
                    tui.session_panel.toggle_open();
                    if !tui.session_panel.open {
                        tui.focus = Focus::Input;
                    }
                }

                TuiEvent::FocusNext => {
                    tui.focus = match tui.focus {
                        Focus::Input if tui.session_panel.open => Focus::Sidebar,
                        Focus::Input => {
                            tui.session_panel.open = true;
                            Focus::Sidebar
                        }
                        Focus::Sidebar => Focus::Input,
                    };
                }

                TuiEvent::NewSession => {
                    let effect = update(&mut app, Action::NewSession);
                    // The reducer dropped any reveal in progress.
                    if let Some(ticker) = typing_ticker.take() {
                        ticker.abort();
                    }
                    tui.message_list = MessageListState::new();
                    should_quit |= perform_effect(
                        effect,
                        &app,
                        &backend,
                        store.as_ref(),
                        &tx,
                        &mut typing_ticker,
                    );
                }

                // Mouse wheel and paging always scroll the conversation
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown => {
                    tui.message_list.handle_event(&tui_event);
                }

                _ => match tui.focus {
                    Focus::Input => {
                        // Single-line input: Up/Down scroll the conversation
                        if matches!(tui_event, TuiEvent::CursorUp | TuiEvent::CursorDown) {
                            tui.message_list.handle_event(&tui_event);
                            continue;
                        }
                        if let Some(input_event) = tui.input_box.handle_event(&tui_event) {
                            match input_event {
                                InputEvent::Submit(text) => {
                                    let effect = update(&mut app, Action::Submit(text));
                                    should_quit |= perform_effect(
                                        effect,
                                        &app,
                                        &backend,
                                        store.as_ref(),
                                        &tx,
                                        &mut typing_ticker,
                                    );
                                }
                                InputEvent::ContentChanged => {}
                            }
                        }
                    }
                    Focus::Sidebar => {
                        let panel_event = tui.session_panel.handle_event(
                            &tui_event,
                            &app.chat_history,
                            &app.sessions,
                        );
                        if let Some(panel_event) = panel_event {
                            match panel_event {
                                PanelEvent::Select(id) => {
                                    let effect = update(&mut app, Action::SelectSession(id));
                                    if let Some(ticker) = typing_ticker.take() {
                                        ticker.abort();
                                    }
                                    tui.message_list = MessageListState::new();
                                    tui.focus = Focus::Input;
                                    should_quit |= perform_effect(
                                        effect,
                                        &app,
                                        &backend,
                                        store.as_ref(),
                                        &tx,
                                        &mut typing_ticker,
                                    );
                                }
                                PanelEvent::CreateNew => {
                                    let effect = update(&mut app, Action::NewSession);
                                    if let Some(ticker) = typing_ticker.take() {
                                        ticker.abort();
                                    }
                                    tui.message_list = MessageListState::new();
                                    tui.focus = Focus::Input;
                                    should_quit |= perform_effect(
                                        effect,
                                        &app,
                                        &backend,
                                        store.as_ref(),
                                        &tx,
                                        &mut typing_ticker,
                                    );
                                }
                                PanelEvent::JumpToEntry(index) => {
                                    tui.message_list.jump_to_entry(index);
                                }
                            }
                        }
                    }
                },
            }
        }

        // Handle background task actions (replies, loads, typewriter ticks)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            should_quit |= perform_effect(
                effect,
                &app,
                &backend,
                store.as_ref(),
                &tx,
                &mut typing_ticker,
            );
        }
    }

    if let Some(ticker) = typing_ticker.take() {
        ticker.abort();
    }
    ratatui::restore();
    Ok(())
}

/// Execute the I/O an `update()` call asked for. Returns true on quit.
fn perform_effect(
    effect: Effect,
    app: &App,
    backend: &Arc<dyn ChatBackend>,
    store: &dyn IdentityStore,
    tx: &mpsc::Sender<Action>,
    typing_ticker: &mut Option<AbortHandle>,
) -> bool {
    match effect {
        Effect::None => {}

        Effect::SpawnRequest => {
            // The reducer cleared the typing buffer; stop its ticker too.
            if let Some(ticker) = typing_ticker.take() {
                ticker.abort();
            }
            let Some(entry) = app.chat_history.last() else {
                warn!("SpawnRequest with empty history");
                return false;
            };
            spawn_send(
                backend.clone(),
                entry.user.clone(),
                app.session_id.clone(),
                app.user_id.clone(),
                app.language.clone(),
                tx.clone(),
            );
        }

        Effect::StartTyping => {
            // Single-owner ticker: cancel and replace atomically.
            if let Some(ticker) = typing_ticker.take() {
                ticker.abort();
            }
            *typing_ticker = Some(spawn_typing_ticker(tx.clone()));
        }

        Effect::StopTyping => {
            if let Some(ticker) = typing_ticker.take() {
                ticker.abort();
            }
        }

        Effect::PersistSession => {
            if let Err(e) = store.set(SESSION_ID_KEY, &app.session_id) {
                warn!("failed to persist session id: {e}");
            }
        }

        Effect::Quit => return true,
    }
    false
}

/// Send a prompt in the background; the reply (or its fallback text) comes
/// back as a `ResponseReceived` tagged with the session it was born under.
fn spawn_send(
    backend: Arc<dyn ChatBackend>,
    prompt: String,
    session_id: String,
    user_id: String,
    language: String,
    tx: mpsc::Sender<Action>,
) {
    info!("Spawning send request (session={session_id})");
    tokio::spawn(async move {
        let text = match backend
            .send_message(&prompt, &session_id, &user_id, &language)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("send failed: {e}");
                e.user_facing_reply().to_string()
            }
        };
        if tx
            .send(Action::ResponseReceived { session_id, text })
            .is_err()
        {
            warn!("Failed to deliver reply: receiver dropped");
        }
    });
}

fn spawn_fetch_history(
    backend: Arc<dyn ChatBackend>,
    session_id: String,
    tx: mpsc::Sender<Action>,
) {
    tokio::spawn(async move {
        let entries = match backend.fetch_history(&session_id).await {
            Ok(entries) => entries,
            Err(e) => {
                // A failed fetch and a genuinely empty session render the same.
                warn!("history fetch failed: {e}");
                Vec::new()
            }
        };
        if tx
            .send(Action::HistoryLoaded {
                session_id,
                entries,
            })
            .is_err()
        {
            warn!("Failed to deliver history: receiver dropped");
        }
    });
}

fn spawn_fetch_sessions(backend: Arc<dyn ChatBackend>, user_id: String, tx: mpsc::Sender<Action>) {
    tokio::spawn(async move {
        let sessions = match backend.fetch_sessions(&user_id).await {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!("session list fetch failed: {e}");
                Vec::new()
            }
        };
        if tx.send(Action::SessionsLoaded(sessions)).is_err() {
            warn!("Failed to deliver session list: receiver dropped");
        }
    });
}

/// Fixed-rate typewriter ticks until aborted.
fn spawn_typing_ticker(tx: mpsc::Sender<Action>) -> AbortHandle {
    let handle = tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_millis(TYPE_TICK_MS)).await;
            if tx.send(Action::TypingTick).is_err() {
                return;
            }
        }
    });
    handle.abort_handle()
}
