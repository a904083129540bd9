pub mod actions;
pub mod navigation;
pub mod screens;

use crate::form::FormSession;
use actions::{apply_form_action, status_for_state, FormExit};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use navigation::{
    form_action_from_key, parse_scripted_form_keys, FormNavState, SCRIPT_KEYS_ENV,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use screens::{draw_group_form, project_group_form_view_model};
use std::io::{self, IsTerminal};
use std::time::Duration;

const SCRIPTED_REPLY_TIMEOUT: Duration = Duration::from_secs(30);

pub fn is_interactive_terminal() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

fn load_scripted_form_keys() -> Result<Option<Vec<KeyEvent>>, String> {
    let Ok(raw) = std::env::var(SCRIPT_KEYS_ENV) else {
        return Ok(None);
    };
    parse_scripted_form_keys(&raw).map(Some)
}

/// Hosts the form until the user closes it. The caller starts the initial
/// candidate fetch.
pub fn run_group_form(session: &mut FormSession) -> Result<FormExit, String> {
    if let Some(keys) = load_scripted_form_keys()? {
        return run_group_form_scripted(session, keys);
    }
    if !is_interactive_terminal() {
        return Err(
            "the group form needs an interactive terminal; use `nxgroup update` instead"
                .to_string(),
        );
    }
    run_group_form_tui(session)
}

/// Replays keys without a terminal, waiting for each remote reply before the
/// next key so runs are deterministic.
pub fn run_group_form_scripted(
    session: &mut FormSession,
    keys: Vec<KeyEvent>,
) -> Result<FormExit, String> {
    let mut nav = FormNavState::new();
    if !session.wait_idle(SCRIPTED_REPLY_TIMEOUT) {
        return Err("timed out waiting for member repositories".to_string());
    }
    for key in keys {
        let Some(action) = form_action_from_key(nav.focus, key) else {
            continue;
        };
        if let Some(exit) = apply_form_action(session, &mut nav, action) {
            return Ok(exit);
        }
        if !session.wait_idle(SCRIPTED_REPLY_TIMEOUT) {
            return Err("timed out waiting for the server".to_string());
        }
        if let Some(status) = status_for_state(session.form()) {
            nav.status_text = status;
        }
    }
    Ok(FormExit::Closed)
}

fn run_group_form_tui(session: &mut FormSession) -> Result<FormExit, String> {
    let mut stdout = io::stdout();
    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    execute!(stdout, EnterAlternateScreen, Hide)
        .map_err(|e| format!("failed to enter form screen: {e}"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create form terminal: {e}"))?;
    let result = run_group_form_loop(session, &mut terminal);
    disable_raw_mode().map_err(|e| format!("failed to disable raw mode: {e}"))?;
    execute!(terminal.backend_mut(), Show, LeaveAlternateScreen)
        .map_err(|e| format!("failed to leave form screen: {e}"))?;
    result
}

fn run_group_form_loop(
    session: &mut FormSession,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<FormExit, String> {
    let mut nav = FormNavState::new();
    loop {
        if !session.pump().is_empty() {
            if let Some(status) = status_for_state(session.form()) {
                nav.status_text = status;
            }
        }
        let view_model = project_group_form_view_model(session.form(), &nav);
        terminal
            .draw(|frame| draw_group_form(frame, &view_model))
            .map_err(|e| format!("failed to render group form: {e}"))?;
        if !event::poll(Duration::from_millis(250))
            .map_err(|e| format!("failed to poll form input: {e}"))?
        {
            continue;
        }
        let ev = event::read().map_err(|e| format!("failed to read form input: {e}"))?;
        let Event::Key(key) = ev else {
            continue;
        };
        let Some(action) = form_action_from_key(nav.focus, key) else {
            continue;
        };
        if let Some(exit) = apply_form_action(session, &mut nav, action) {
            return Ok(exit);
        }
    }
}
