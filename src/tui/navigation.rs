use crate::shared::ids::RepositoryId;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub const SCRIPT_KEYS_ENV: &str = "NXGROUP_FORM_SCRIPT_KEYS";

const CHECKBOX_HINT_TEXT: &str = "Tab next field | Space/Enter toggle | s submit | Esc close";
const AVAILABLE_HINT_TEXT: &str =
    "Up/Down move | Space mark | a/Enter add | f reload | s submit | Esc close";
const CHOSEN_HINT_TEXT: &str = "Up/Down move | r remove | u up | d down | s submit | Esc close";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Browseable,
    Exposed,
    Available,
    Chosen,
}

const FOCUS_ORDER: [FormFocus; 4] = [
    FormFocus::Browseable,
    FormFocus::Exposed,
    FormFocus::Available,
    FormFocus::Chosen,
];

impl FormFocus {
    fn index(self) -> usize {
        FOCUS_ORDER
            .iter()
            .position(|focus| *focus == self)
            .unwrap_or(0)
    }

    pub fn next(self) -> Self {
        FOCUS_ORDER[(self.index() + 1) % FOCUS_ORDER.len()]
    }

    pub fn prev(self) -> Self {
        FOCUS_ORDER[(self.index() + FOCUS_ORDER.len() - 1) % FOCUS_ORDER.len()]
    }

    fn hint_text(self) -> &'static str {
        match self {
            Self::Browseable | Self::Exposed => CHECKBOX_HINT_TEXT,
            Self::Available => AVAILABLE_HINT_TEXT,
            Self::Chosen => CHOSEN_HINT_TEXT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    FocusNext,
    FocusPrev,
    MovePrev,
    MoveNext,
    Toggle,
    Mark,
    Add,
    Remove,
    MoveUp,
    MoveDown,
    Submit,
    Reload,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormNavState {
    pub focus: FormFocus,
    pub available_cursor: usize,
    pub chosen_cursor: usize,
    /// Available entries marked for the next add, in marking order.
    pub marked: Vec<RepositoryId>,
    pub status_text: String,
    pub hint_text: String,
}

impl FormNavState {
    pub fn new() -> Self {
        Self {
            focus: FormFocus::Browseable,
            available_cursor: 0,
            chosen_cursor: 0,
            marked: Vec::new(),
            status_text: "Loading member repositories...".to_string(),
            hint_text: FormFocus::Browseable.hint_text().to_string(),
        }
    }

    pub fn set_focus(&mut self, focus: FormFocus) {
        self.focus = focus;
        self.hint_text = focus.hint_text().to_string();
    }

    pub fn clamp_cursors(&mut self, available_len: usize, chosen_len: usize) {
        self.available_cursor = clamp_selection(self.available_cursor, available_len);
        self.chosen_cursor = clamp_selection(self.chosen_cursor, chosen_len);
    }

    pub fn toggle_mark(&mut self, id: &RepositoryId) {
        if let Some(pos) = self.marked.iter().position(|marked| marked == id) {
            self.marked.remove(pos);
        } else {
            self.marked.push(id.clone());
        }
    }
}

impl Default for FormNavState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn clamp_selection(selected: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    selected.min(len - 1)
}

pub fn form_action_from_key(focus: FormFocus, key: KeyEvent) -> Option<FormAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(FormAction::Cancel);
    }
    match key.code {
        KeyCode::Tab => Some(FormAction::FocusNext),
        KeyCode::BackTab => Some(FormAction::FocusPrev),
        KeyCode::Up => Some(FormAction::MovePrev),
        KeyCode::Down => Some(FormAction::MoveNext),
        KeyCode::Esc => Some(FormAction::Cancel),
        KeyCode::Char(' ') => Some(match focus {
            FormFocus::Available => FormAction::Mark,
            _ => FormAction::Toggle,
        }),
        KeyCode::Enter => match focus {
            FormFocus::Browseable | FormFocus::Exposed => Some(FormAction::Toggle),
            FormFocus::Available => Some(FormAction::Add),
            FormFocus::Chosen => None,
        },
        KeyCode::Char('a') => Some(FormAction::Add),
        KeyCode::Char('r') => Some(FormAction::Remove),
        KeyCode::Char('u') => Some(FormAction::MoveUp),
        KeyCode::Char('d') => Some(FormAction::MoveDown),
        KeyCode::Char('s') => Some(FormAction::Submit),
        KeyCode::Char('f') => Some(FormAction::Reload),
        _ => None,
    }
}

pub fn parse_scripted_form_keys(raw: &str) -> Result<Vec<KeyEvent>, String> {
    let mut keys = Vec::new();
    for token in raw.split(',') {
        let normalized = token.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            continue;
        }
        let key = match normalized.as_str() {
            "up" => KeyEvent::new(KeyCode::Up, KeyModifiers::NONE),
            "down" => KeyEvent::new(KeyCode::Down, KeyModifiers::NONE),
            "tab" => KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE),
            "backtab" => KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT),
            "enter" => KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            "space" => KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE),
            "esc" => KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            "ctrl-c" => KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            "a" | "r" | "u" | "d" | "s" | "f" => {
                let ch = normalized.chars().next().unwrap_or('a');
                KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE)
            }
            other => {
                return Err(format!(
                    "invalid {SCRIPT_KEYS_ENV} token `{other}`; valid tokens: up,down,tab,backtab,enter,space,esc,ctrl-c,a,r,u,d,s,f"
                ));
            }
        };
        keys.push(key);
    }
    Ok(keys)
}
