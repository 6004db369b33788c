//! Runtime: terminal lifecycle and the single event loop.
//!
//! Responsibilities
//! - Own the terminal lifecycle (enter/leave alternate screen, raw mode).
//! - Subscribe to the host color scheme for the lifetime of the session.
//! - Multiplex input, background task results, theme changes and ticks.
//! - Execute returned `Effect`s through `cmd` and render when dirty.
//!
//! All workflow mutation happens inside a loop turn. Background tasks only
//! produce `Msg`s.
//!
//! Ticking: fast (100 ms) while an upload is in flight so the spinner
//! animates, slow (5 s) otherwise.

use std::{io::Stdout, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{StreamExt, future::BoxFuture, stream::FuturesUnordered};
use ratatui::{Terminal, prelude::CrosstermBackend};
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

use arffsplit_types::Effect;
use arffsplit_util::{ColorSchemeSignal, ThemePreference, preference_file_path};

use crate::{
    Session,
    app::{App, Msg},
    cmd,
    ui::draw,
};

const FAST_TICK: Duration = Duration::from_millis(100);
const IDLE_TICK: Duration = Duration::from_millis(5000);
const SCHEME_POLL: Duration = Duration::from_secs(2);

/// Spawn a dedicated OS thread that blocks on terminal input and forwards
/// `crossterm` events over a channel. The thread exits once the receiver is
/// dropped.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(256);
    std::thread::spawn(move || {
        let poll_interval = Duration::from_millis(50);
        loop {
            if sender.is_closed() {
                break;
            }
            match event::poll(poll_interval) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    warn!("Failed to poll terminal input: {}", e);
                    break;
                }
            }
            match event::read() {
                Ok(event) => {
                    if sender.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read event: {}", e);
                    break;
                }
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste).context("enter alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &App) -> Result<()> {
    terminal.draw(|frame| draw(frame, app))?;
    Ok(())
}

/// Route one terminal event. Returns `None` when the user asked to quit.
fn handle_input_event(app: &mut App, input_event: Event) -> Option<Vec<Effect>> {
    match input_event {
        Event::Key(key) if key.kind == KeyEventKind::Release => Some(Vec::new()),
        Event::Key(key) if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) => None,
        Event::Key(key) => Some(app.handle_key(key)),
        Event::Paste(text) => {
            app.handle_paste(&text);
            Some(Vec::new())
        }
        Event::Resize(width, height) => Some(app.update(Msg::Resize(width, height))),
        Event::Mouse(_) | Event::FocusGained | Event::FocusLost => Some(Vec::new()),
    }
}

/// Run `restore` whatever `outcome` is. An error from the loop wins over a
/// restore error.
fn restore_after<T>(outcome: Result<T>, restore: impl FnOnce() -> Result<()>) -> Result<T> {
    let restored = restore();
    let value = outcome?;
    restored.map(|()| value)
}

/// Turn effects into background work. Immediate results are applied right
/// away and may produce more effects.
fn process_effects(app: &mut App, effects: Vec<Effect>, pending: &mut FuturesUnordered<BoxFuture<'static, Msg>>) {
    let mut queue = effects;
    while !queue.is_empty() {
        let batch = cmd::run_from_effects(app, std::mem::take(&mut queue));
        pending.extend(batch.pending);
        for msg in batch.immediate {
            queue.extend(app.update(msg));
        }
    }
}

/// Entry point for the TUI runtime: sets up the terminal and the theme
/// subscription, runs the event loop, and tears everything down on exit.
pub async fn run_app(session: Session) -> Result<()> {
    let Session {
        ctx,
        workflow,
        color_scheme,
    } = session;

    // A caller-supplied signal is authoritative; otherwise follow the host.
    let (scheme_signal, host_watcher) = match color_scheme {
        Some(signal) => (signal, None),
        None => {
            let preference_file = preference_file_path();
            let signal = ColorSchemeSignal::from_host(preference_file.as_deref());
            let watcher = signal.spawn_host_watcher(preference_file, SCHEME_POLL);
            (signal, Some(watcher))
        }
    };
    let (theme_sender, mut theme_changes) = mpsc::unbounded_channel();
    let mut preference = ThemePreference::subscribe(&scheme_signal, move |dark| {
        let _ = theme_sender.send(dark);
    });

    let mut app = App::new(ctx, workflow, preference.flag());
    let mut input_receiver = spawn_input_thread();
    let mut terminal = setup_terminal()?;

    let outcome = event_loop(&mut terminal, &mut app, &mut input_receiver, &mut theme_changes).await;

    app.workflow.teardown();
    preference.unsubscribe();
    if let Some(watcher) = host_watcher {
        watcher.stop();
    }
    restore_after(outcome, || cleanup_terminal(&mut terminal))
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    input_receiver: &mut mpsc::Receiver<Event>,
    theme_changes: &mut mpsc::UnboundedReceiver<bool>,
) -> Result<()> {
    let mut pending: FuturesUnordered<BoxFuture<'static, Msg>> = FuturesUnordered::new();
    let mut current_interval = IDLE_TICK;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(terminal, app)?;

    loop {
        let target_interval = if app.workflow.is_loading() { FAST_TICK } else { IDLE_TICK };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let (effects, needs_render) = tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    // Input thread ended; shut down cleanly.
                    break;
                };
                match handle_input_event(app, event) {
                    Some(effects) => (effects, true),
                    None => break,
                }
            }

            Some(msg) = pending.next(), if !pending.is_empty() => {
                (app.update(msg), true)
            }

            Some(dark) = theme_changes.recv() => {
                debug!(dark, "redrawing for color scheme change");
                (app.update(Msg::ThemeChanged), true)
            }

            _ = ticker.tick() => {
                (app.update(Msg::Tick), app.workflow.is_loading())
            }

            // Handle Ctrl+C delivered as a signal
            _ = signal::ctrl_c() => { break; }
        };

        process_effects(app, effects, &mut pending);

        if needs_render {
            render(terminal, app)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use anyhow::anyhow;

    use super::*;

    #[test]
    fn terminal_is_restored_when_the_loop_fails() {
        let restored = Cell::new(false);
        let result: Result<()> = restore_after(Err(anyhow!("draw failed")), || {
            restored.set(true);
            Ok(())
        });
        assert!(restored.get());
        assert_eq!(result.unwrap_err().to_string(), "draw failed");
    }

    #[test]
    fn loop_error_wins_over_restore_error() {
        let result: Result<()> = restore_after(Err(anyhow!("draw failed")), || Err(anyhow!("raw mode stuck")));
        assert_eq!(result.unwrap_err().to_string(), "draw failed");

        let result = restore_after(Ok(7), || Err(anyhow!("raw mode stuck")));
        assert_eq!(result.unwrap_err().to_string(), "raw mode stuck");
    }
}
