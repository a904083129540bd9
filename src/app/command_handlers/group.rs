use crate::app::command_support::{
    load_context, parse_args, parse_bool_flag, required_group_id, required_template, ParsedArgs,
};
use crate::form::{
    candidate_filter, FormError, FormSession, FormState, GroupSettingsForm,
    MemberCandidateSource, ResourceTypeTemplate, SourceOptions, SourceStatus,
};
use crate::remote::{CandidateRegistry, GroupConfig, GroupReader, GroupUpdater};
use crate::shared::ids::{parse_repository_id_list, RepositoryId};
use crate::shared::logging::LogSink;
use crate::tui::run_group_form;
use std::sync::Arc;

const EDIT_USAGE: &str = "edit <group> --format <fmt>";
const CREATE_USAGE: &str = "create <group> --format <fmt>";
const UPDATE_USAGE: &str = "update <group> --format <fmt> [--browseable true|false] [--exposed true|false] [--members a,b] [--add a,b] [--remove a,b] [--create]";
const SHOW_USAGE: &str = "show <group>";

/// Non-interactive edit of one group, parsed from `update` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupUpdateRequest {
    pub id: RepositoryId,
    pub template: ResourceTypeTemplate,
    pub create: bool,
    pub browseable: Option<bool>,
    pub exposed: Option<bool>,
    pub members: Option<Vec<RepositoryId>>,
    pub add: Vec<RepositoryId>,
    pub remove: Vec<RepositoryId>,
}

impl GroupUpdateRequest {
    pub fn from_args(parsed: &ParsedArgs) -> Result<Self, String> {
        let id = required_group_id(parsed, UPDATE_USAGE)?;
        let template = required_template(parsed)?;
        let browseable = parsed
            .flag("browseable")
            .map(|raw| parse_bool_flag("browseable", raw))
            .transpose()?;
        let exposed = parsed
            .flag("exposed")
            .map(|raw| parse_bool_flag("exposed", raw))
            .transpose()?;
        let members = parsed
            .flag("members")
            .map(parse_repository_id_list)
            .transpose()?;
        let add = parsed
            .flag("add")
            .map(parse_repository_id_list)
            .transpose()?
            .unwrap_or_default();
        let remove = parsed
            .flag("remove")
            .map(parse_repository_id_list)
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            id,
            template,
            create: parsed.has_switch("create"),
            browseable,
            exposed,
            members,
            add,
            remove,
        })
    }
}

fn form_err(err: FormError) -> String {
    err.to_string()
}

/// Renders the outcome of a finished submission for the terminal.
pub fn describe_submission(form: &GroupSettingsForm) -> Result<String, String> {
    match form.state() {
        FormState::Success => Ok(form
            .success_message()
            .unwrap_or("Repository updated")
            .to_string()),
        FormState::Error => {
            let mut lines = vec!["update rejected:".to_string()];
            for (field, message) in form.field_errors() {
                lines.push(format!("  {field}: {message}"));
            }
            if let Some(banner) = form.banner() {
                lines.push(format!("  {banner}"));
            }
            Err(lines.join("\n"))
        }
        FormState::Ready => Err(form
            .banner()
            .map(|banner| format!("update failed: {banner}"))
            .unwrap_or_else(|| "group form closed without saving".to_string())),
        other => Err(format!("group form ended while {other}")),
    }
}

pub fn execute_group_update(
    request: GroupUpdateRequest,
    registry: &dyn CandidateRegistry,
    updater: &dyn GroupUpdater,
    reader: &dyn GroupReader,
    log: LogSink,
) -> Result<String, String> {
    let mut form = GroupSettingsForm::for_template(request.template.clone(), log);
    if !request.create {
        let config = reader.read_group(&request.id).map_err(|e| e.to_string())?;
        form.load_values(config).map_err(form_err)?;
    }
    form.fetch_candidates(registry).map_err(form_err)?;
    let mut notes = Vec::new();
    if let SourceStatus::LoadError(fault) = form.candidates().status() {
        notes.push(format!("warning: {fault}"));
    }
    if request.create {
        form.set_group_id(request.id.clone()).map_err(form_err)?;
    }

    if let Some(value) = request.browseable {
        form.set_browseable(value).map_err(form_err)?;
    }
    if let Some(value) = request.exposed {
        form.set_exposed(value).map_err(form_err)?;
    }
    if let Some(members) = request.members {
        form.set_members(members).map_err(form_err)?;
    }
    if !request.remove.is_empty() {
        form.remove_members(&request.remove).map_err(form_err)?;
    }
    if !request.add.is_empty() {
        let added = form.add_members(&request.add).map_err(form_err)?;
        if added < request.add.len() {
            notes.push(format!(
                "note: {} of {} requested member(s) were not available to add",
                request.add.len() - added,
                request.add.len()
            ));
        }
    }

    match form.submit(updater) {
        Ok(_) | Err(FormError::Invalid(_)) => {}
        Err(err) => return Err(form_err(err)),
    }
    let message = describe_submission(&form)?;
    notes.push(message);
    Ok(notes.join("\n"))
}

pub fn cmd_update(args: &[String]) -> Result<String, String> {
    let parsed = parse_args(args, &["create"])?;
    let request = GroupUpdateRequest::from_args(&parsed)?;
    let ctx = load_context()?;
    execute_group_update(request, &ctx.client, &ctx.client, &ctx.client, ctx.log.clone())
}

fn run_interactive(parsed: &ParsedArgs, usage: &str, create: bool) -> Result<String, String> {
    let id = required_group_id(parsed, usage)?;
    let template = required_template(parsed)?;
    let ctx = load_context()?;
    let mut form = ctx.new_form(template);
    if !create {
        let config = ctx.client.read_group(&id).map_err(|e| e.to_string())?;
        form.load_values(config).map_err(form_err)?;
    }
    let mut session = FormSession::new(form, Arc::new(ctx.client.clone()));
    session.start_candidate_fetch().map_err(form_err)?;
    if create {
        session.form_mut().set_group_id(id).map_err(form_err)?;
    }
    run_group_form(&mut session)?;
    describe_submission(session.form())
}

pub fn cmd_edit(args: &[String]) -> Result<String, String> {
    let parsed = parse_args(args, &[])?;
    run_interactive(&parsed, EDIT_USAGE, false)
}

pub fn cmd_create(args: &[String]) -> Result<String, String> {
    let parsed = parse_args(args, &[])?;
    run_interactive(&parsed, CREATE_USAGE, true)
}

pub fn render_group(config: &GroupConfig) -> String {
    let members = if config.member_repository_ids.is_empty() {
        "<none>".to_string()
    } else {
        config
            .member_repository_ids
            .iter()
            .map(RepositoryId::as_str)
            .collect::<Vec<_>>()
            .join(",")
    };
    format!(
        "id={}\nbrowseable={}\nexposed={}\nmemberRepositoryIds={members}",
        config.id, config.browseable, config.exposed
    )
}

pub fn cmd_show(args: &[String]) -> Result<String, String> {
    let parsed = parse_args(args, &[])?;
    let id = required_group_id(&parsed, SHOW_USAGE)?;
    let ctx = load_context()?;
    let config = ctx.client.read_group(&id).map_err(|e| e.to_string())?;
    Ok(render_group(&config))
}

pub fn list_candidates(
    template: ResourceTypeTemplate,
    registry: &dyn CandidateRegistry,
) -> Result<String, String> {
    let mut source = MemberCandidateSource::new(
        template.clone(),
        SourceOptions {
            remote_filter: true,
        },
    );
    source.apply_filter(candidate_filter(&template));
    source.fetch(registry).map_err(|fault| fault.to_string())?;
    if source.is_empty() {
        return Ok(format!("no {} repositories available", template.format()));
    }
    Ok(source
        .entries()
        .map(|entry| format!("{}\t{}", entry.id, entry.name))
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn cmd_candidates(args: &[String]) -> Result<String, String> {
    let parsed = parse_args(args, &[])?;
    let template = required_template(&parsed)?;
    let ctx = load_context()?;
    list_candidates(template, &ctx.client)
}
