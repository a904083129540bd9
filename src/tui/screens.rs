use super::navigation::{clamp_selection, FormFocus, FormNavState};
use crate::form::{
    FieldKind, FormState, GroupSettingsForm, SourceStatus, BROWSEABLE_FIELD, EXPOSED_FIELD,
    MEMBERS_FIELD,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Padding, Paragraph};
use ratatui::Frame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckboxRow {
    pub label: String,
    pub help: String,
    pub checked: bool,
    pub focused: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub text: String,
    pub marked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFormViewModel {
    pub title: String,
    pub mode_line: String,
    pub checkboxes: Vec<CheckboxRow>,
    pub members_label: String,
    pub from_title: String,
    pub to_title: String,
    pub available: Vec<ListRow>,
    pub chosen: Vec<ListRow>,
    pub available_selected: Option<usize>,
    pub chosen_selected: Option<usize>,
    pub members_error: Option<String>,
    pub banner: Option<String>,
    pub status_text: String,
    pub hint_text: String,
}

fn checkbox_value(form: &GroupSettingsForm, name: &str) -> bool {
    match name {
        BROWSEABLE_FIELD => form.kind().browseable(),
        EXPOSED_FIELD => form.kind().exposed(),
        _ => false,
    }
}

fn checkbox_focus(name: &str) -> Option<FormFocus> {
    match name {
        BROWSEABLE_FIELD => Some(FormFocus::Browseable),
        EXPOSED_FIELD => Some(FormFocus::Exposed),
        _ => None,
    }
}

pub fn project_group_form_view_model(
    form: &GroupSettingsForm,
    nav: &FormNavState,
) -> GroupFormViewModel {
    let mut checkboxes = Vec::new();
    let mut members_label = "Members".to_string();
    let mut from_title = "Available".to_string();
    let mut to_title = "Chosen".to_string();
    for field in form.fields() {
        match field.kind {
            FieldKind::Checkbox => checkboxes.push(CheckboxRow {
                label: field.label.to_string(),
                help: field.help.to_string(),
                checked: checkbox_value(form, field.name),
                focused: checkbox_focus(field.name) == Some(nav.focus),
                error: form.field_error(field.name).map(ToString::to_string),
            }),
            FieldKind::ItemSelector(options) => {
                members_label = field.label.to_string();
                from_title = options.from_title.to_string();
                to_title = options.to_title.to_string();
            }
        }
    }

    let available = match form.candidates().status() {
        SourceStatus::Loading if form.candidates().is_empty() => vec![ListRow {
            text: "Loading...".to_string(),
            marked: false,
        }],
        SourceStatus::LoadError(fault) if form.candidates().is_empty() => vec![ListRow {
            text: format!("{fault} (press f to retry)"),
            marked: false,
        }],
        _ => form
            .available_candidates()
            .into_iter()
            .map(|entry| ListRow {
                text: entry.name.clone(),
                marked: nav.marked.contains(&entry.id),
            })
            .collect(),
    };
    let candidates_known = form.candidates().is_loaded() || !form.candidates().is_empty();
    let chosen: Vec<ListRow> = form
        .chosen_rows()
        .into_iter()
        .map(|(id, entry)| ListRow {
            text: match entry {
                Some(entry) => entry.name.clone(),
                None if candidates_known => format!("{id} (not available)"),
                None => id.to_string(),
            },
            marked: false,
        })
        .collect();

    let available_selected = (nav.focus == FormFocus::Available && candidates_known)
        .then(|| clamp_selection(nav.available_cursor, available.len()));
    let chosen_selected = (nav.focus == FormFocus::Chosen && !chosen.is_empty())
        .then(|| clamp_selection(nav.chosen_cursor, chosen.len()));

    let group = form
        .kind()
        .id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "<new group>".to_string());
    GroupFormViewModel {
        title: format!("Repository group: {group}"),
        mode_line: format!(
            "Format: {} | State: {}",
            form.template().format(),
            state_label(form.state())
        ),
        checkboxes,
        members_label,
        from_title,
        to_title,
        available,
        chosen,
        available_selected,
        chosen_selected,
        members_error: form.field_error(MEMBERS_FIELD).map(ToString::to_string),
        banner: form.banner().map(ToString::to_string),
        status_text: nav.status_text.clone(),
        hint_text: nav.hint_text.clone(),
    }
}

fn state_label(state: FormState) -> &'static str {
    match state {
        FormState::Unloaded | FormState::Loading => "loading",
        FormState::Ready => "editing",
        FormState::Submitting => "submitting",
        FormState::Success => "saved",
        FormState::Error => "needs attention",
    }
}

fn highlight() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn list_widget<'a>(title: &'a str, rows: &'a [ListRow], selected: Option<usize>) -> List<'a> {
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let prefix = if row.marked { "[x] " } else { "    " };
            let mut item = ListItem::new(Line::from(Span::raw(format!("{prefix}{}", row.text))));
            if Some(idx) == selected {
                item = item.style(highlight());
            }
            item
        })
        .collect();
    List::new(items).block(Block::default().borders(Borders::ALL).title(title))
}

pub(crate) fn draw_group_form(frame: &mut Frame<'_>, view_model: &GroupFormViewModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(view_model.checkboxes.len() as u16 + 2),
            Constraint::Min(8),
            Constraint::Length(5),
        ])
        .split(frame.area());

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            view_model.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(view_model.mode_line.clone()),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let checkbox_lines: Vec<Line> = view_model
        .checkboxes
        .iter()
        .map(|row| {
            let mark = if row.checked { "[x]" } else { "[ ]" };
            let mut text = format!("{mark} {}  ({})", row.label, row.help);
            if let Some(error) = &row.error {
                text.push_str(&format!("  ! {error}"));
            }
            let style = if row.focused {
                highlight()
            } else {
                Style::default()
            };
            Line::from(Span::styled(text, style))
        })
        .collect();
    frame.render_widget(
        Paragraph::new(checkbox_lines).block(
            Block::default()
                .borders(Borders::ALL)
                .padding(Padding::horizontal(1)),
        ),
        chunks[1],
    );

    let members_block = Block::default()
        .borders(Borders::ALL)
        .title(match &view_model.members_error {
            Some(error) => format!("{} ! {error}", view_model.members_label),
            None => view_model.members_label.clone(),
        });
    let inner = members_block.inner(chunks[2]);
    frame.render_widget(members_block, chunks[2]);
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);
    frame.render_widget(
        list_widget(
            &view_model.from_title,
            &view_model.available,
            view_model.available_selected,
        ),
        panes[0],
    );
    frame.render_widget(
        list_widget(
            &view_model.to_title,
            &view_model.chosen,
            view_model.chosen_selected,
        ),
        panes[1],
    );

    let mut footer = vec![
        Line::from(view_model.hint_text.clone()),
        Line::from(format!("Status: {}", view_model.status_text)),
    ];
    if let Some(banner) = &view_model.banner {
        footer.push(Line::from(Span::styled(
            format!("Error: {banner}"),
            Style::default().fg(Color::Red),
        )));
    }
    frame.render_widget(
        Paragraph::new(footer).block(Block::default().borders(Borders::ALL)),
        chunks[3],
    );
}
