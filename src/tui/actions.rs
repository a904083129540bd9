use super::navigation::{FormAction, FormFocus, FormNavState};
use crate::form::{FormError, FormSession, FormState, GroupSettingsForm};
use crate::shared::ids::RepositoryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormExit {
    Closed,
}

fn cursor_ids(
    form: &GroupSettingsForm,
    nav: &FormNavState,
) -> (Option<RepositoryId>, Option<RepositoryId>) {
    let available = form
        .available_candidates()
        .get(nav.available_cursor)
        .map(|entry| entry.id.clone());
    let chosen = form.members().value().get(nav.chosen_cursor).cloned();
    (available, chosen)
}

fn describe(err: FormError) -> String {
    match err {
        FormError::CandidatesLoading => {
            "Member repositories are still loading; try again shortly.".to_string()
        }
        other => other.to_string(),
    }
}

/// Applies one user action to the session. Remote calls are started, not
/// awaited; their replies arrive through [`FormSession::pump`].
pub fn apply_form_action(
    session: &mut FormSession,
    nav: &mut FormNavState,
    action: FormAction,
) -> Option<FormExit> {
    let (available_id, chosen_id) = cursor_ids(session.form(), nav);
    let form = session.form_mut();
    let result: Result<Option<String>, FormError> = match (action, nav.focus) {
        (FormAction::Cancel, _) => return Some(FormExit::Closed),
        (FormAction::FocusNext, focus) => {
            nav.set_focus(focus.next());
            Ok(None)
        }
        (FormAction::FocusPrev, focus) => {
            nav.set_focus(focus.prev());
            Ok(None)
        }
        (FormAction::MovePrev, FormFocus::Available) => {
            nav.available_cursor = nav.available_cursor.saturating_sub(1);
            Ok(None)
        }
        (FormAction::MovePrev, FormFocus::Chosen) => {
            nav.chosen_cursor = nav.chosen_cursor.saturating_sub(1);
            Ok(None)
        }
        (FormAction::MovePrev, _) => {
            nav.set_focus(nav.focus.prev());
            Ok(None)
        }
        (FormAction::MoveNext, FormFocus::Available) => {
            nav.available_cursor += 1;
            Ok(None)
        }
        (FormAction::MoveNext, FormFocus::Chosen) => {
            nav.chosen_cursor += 1;
            Ok(None)
        }
        (FormAction::MoveNext, _) => {
            nav.set_focus(nav.focus.next());
            Ok(None)
        }
        (FormAction::Toggle, FormFocus::Browseable) => {
            let value = !form.kind().browseable();
            form.set_browseable(value).map(|_| None)
        }
        (FormAction::Toggle, FormFocus::Exposed) => {
            let value = !form.kind().exposed();
            form.set_exposed(value).map(|_| None)
        }
        (FormAction::Mark, FormFocus::Available) => {
            if let Some(id) = &available_id {
                nav.toggle_mark(id);
            }
            Ok(None)
        }
        (FormAction::Add, FormFocus::Available) => {
            let ids = if nav.marked.is_empty() {
                available_id.into_iter().collect::<Vec<_>>()
            } else {
                std::mem::take(&mut nav.marked)
            };
            form.add_members(&ids)
                .map(|added| Some(format!("Added {added} member(s).")))
        }
        (FormAction::Remove, FormFocus::Chosen) => match chosen_id {
            Some(id) => form
                .remove_members(&[id])
                .map(|_| Some("Removed member.".to_string())),
            None => Ok(None),
        },
        (FormAction::MoveUp, FormFocus::Chosen) => match chosen_id {
            Some(id) => form.move_member_up(&id).map(|moved| {
                if moved {
                    nav.chosen_cursor = nav.chosen_cursor.saturating_sub(1);
                }
                None
            }),
            None => Ok(None),
        },
        (FormAction::MoveDown, FormFocus::Chosen) => match chosen_id {
            Some(id) => form.move_member_down(&id).map(|moved| {
                if moved {
                    nav.chosen_cursor += 1;
                }
                None
            }),
            None => Ok(None),
        },
        (FormAction::Reload, _) => {
            if form.refresh_candidates() {
                session
                    .start_candidate_fetch()
                    .map(|_| Some("Reloading member repositories...".to_string()))
            } else {
                Ok(Some("A reload is already running.".to_string()))
            }
        }
        (FormAction::Submit, _) => session
            .start_submit()
            .map(|_| Some("Submitting...".to_string())),
        (_, _) => Ok(Some("Action is not mapped for this field.".to_string())),
    };

    match result {
        Ok(Some(feedback)) => nav.status_text = feedback,
        Ok(None) => {}
        Err(err) => nav.status_text = describe(err),
    }
    let form = session.form();
    nav.clamp_cursors(form.available_candidates().len(), form.members().value().len());
    None
}

/// Status line for a form state change delivered by a worker reply.
pub fn status_for_state(form: &GroupSettingsForm) -> Option<String> {
    match form.state() {
        FormState::Success => form.success_message().map(ToString::to_string),
        FormState::Error => Some("Fix the highlighted errors and submit again.".to_string()),
        FormState::Ready => Some(match form.banner() {
            Some(banner) => format!("Submit failed: {banner}"),
            None => "Ready.".to_string(),
        }),
        _ => None,
    }
}
