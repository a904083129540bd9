//! Settings form for repository groups.

use super::candidates::{
    candidate_filter, FetchCompletion, FetchTicket, MemberCandidateSource, SourceOptions,
};
use super::fields::{
    FieldDefault, FieldDescriptor, FieldKind, ItemSelectorOptions, SelectorButton,
};
use super::item_selector::OrderedDualListField;
use super::settings_form::{
    FormError, FormState, SettingsForm, SettingsFormKind, SubmitApi, SubmitCompletion,
};
use super::template::ResourceTypeTemplate;
use crate::remote::api::methods;
use crate::remote::{
    CandidateEntry, CandidateRegistry, FetchFault, GroupConfig, GroupSettingsPayload,
    GroupUpdater, UpdateSuccess, ValidationErrors,
};
use crate::shared::ids::RepositoryId;
use crate::shared::logging::LogSink;

pub const BROWSEABLE_FIELD: &str = "browseable";
pub const EXPOSED_FIELD: &str = "exposed";
pub const MEMBERS_FIELD: &str = "memberRepositoryIds";

pub const UPDATE_GROUP_API: SubmitApi = SubmitApi {
    action: "coreui_Repository",
    method: methods::UPDATE_GROUP,
};

pub const GROUP_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor {
        name: BROWSEABLE_FIELD,
        kind: FieldKind::Checkbox,
        default: FieldDefault::Bool(true),
        label: "Allow file browsing",
        help: "Allow users to browse the contents of the repository.",
    },
    FieldDescriptor {
        name: EXPOSED_FIELD,
        kind: FieldKind::Checkbox,
        default: FieldDefault::Bool(true),
        label: "Publish URL",
        help: "Expose the URL of the repository to users.",
    },
    FieldDescriptor {
        name: MEMBERS_FIELD,
        kind: FieldKind::ItemSelector(ItemSelectorOptions {
            buttons: &[
                SelectorButton::Up,
                SelectorButton::Add,
                SelectorButton::Remove,
                SelectorButton::Down,
            ],
            from_title: "Available Repositories",
            to_title: "Ordered Member Repositories",
            value_field: "id",
            display_field: "name",
            delimiter: None,
        }),
        default: FieldDefault::EmptyList,
        label: "Member Repositories",
        help: "Select the repositories that are member of the group.",
    },
];

pub fn repository_updated_message(result: &UpdateSuccess) -> String {
    format!("Repository updated: {}", result.id)
}

#[derive(Debug)]
pub struct GroupSettings {
    id: Option<RepositoryId>,
    browseable: bool,
    exposed: bool,
    members: OrderedDualListField,
    candidates: MemberCandidateSource,
}

impl GroupSettings {
    fn new(template: ResourceTypeTemplate) -> Self {
        let mut candidates = MemberCandidateSource::new(
            template.clone(),
            SourceOptions {
                remote_filter: true,
            },
        );
        candidates.apply_filter(candidate_filter(&template));
        Self {
            id: None,
            browseable: bool_default(BROWSEABLE_FIELD),
            exposed: bool_default(EXPOSED_FIELD),
            members: OrderedDualListField::default(),
            candidates,
        }
    }

    pub fn id(&self) -> Option<&RepositoryId> {
        self.id.as_ref()
    }

    pub fn browseable(&self) -> bool {
        self.browseable
    }

    pub fn exposed(&self) -> bool {
        self.exposed
    }

    pub fn members(&self) -> &OrderedDualListField {
        &self.members
    }

    pub fn candidates(&self) -> &MemberCandidateSource {
        &self.candidates
    }
}

fn bool_default(name: &str) -> bool {
    GROUP_FIELDS
        .iter()
        .find(|field| field.name == name)
        .map(|field| matches!(field.default, FieldDefault::Bool(true)))
        .unwrap_or(false)
}

impl SettingsFormKind for GroupSettings {
    type Values = GroupConfig;
    type Payload = GroupSettingsPayload;

    fn fields(&self) -> &'static [FieldDescriptor] {
        &GROUP_FIELDS
    }

    fn submit_api(&self) -> SubmitApi {
        UPDATE_GROUP_API
    }

    fn load_values(&mut self, values: GroupConfig) {
        self.id = Some(values.id);
        self.browseable = values.browseable;
        self.exposed = values.exposed;
        self.members.set_value(values.member_repository_ids);
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        if let Some(id) = &self.id {
            if self.members.is_chosen(id) {
                errors = errors.field(MEMBERS_FIELD, &format!("group `{id}` cannot contain itself"));
            }
        }
        errors
    }

    fn payload(&self) -> GroupSettingsPayload {
        GroupSettingsPayload {
            id: self.id.clone(),
            browseable: self.browseable,
            exposed: self.exposed,
            member_repository_ids: self.members.value().to_vec(),
        }
    }

    fn success_message(&self, result: &UpdateSuccess) -> String {
        repository_updated_message(result)
    }

    fn pending_load(&self) -> bool {
        self.candidates.is_loading()
    }
}

pub type GroupSettingsForm = SettingsForm<GroupSettings>;

impl SettingsForm<GroupSettings> {
    pub fn for_template(template: ResourceTypeTemplate, log: LogSink) -> Self {
        Self::new(GroupSettings::new(template), log)
    }

    pub fn template(&self) -> &ResourceTypeTemplate {
        self.kind().candidates.template()
    }

    pub fn candidates(&self) -> &MemberCandidateSource {
        &self.kind().candidates
    }

    pub fn members(&self) -> &OrderedDualListField {
        &self.kind().members
    }

    pub fn available_candidates(&self) -> Vec<&CandidateEntry> {
        let kind = self.kind();
        kind.members.available(&kind.candidates)
    }

    pub fn chosen_candidates(&self) -> Vec<&CandidateEntry> {
        let kind = self.kind();
        kind.members.chosen_entries(&kind.candidates)
    }

    /// Chosen members for display, orphans included.
    pub fn chosen_rows(&self) -> Vec<(&RepositoryId, Option<&CandidateEntry>)> {
        let kind = self.kind();
        kind.members.chosen_rows(&kind.candidates)
    }

    pub fn begin_candidate_fetch(&mut self) -> Result<FetchTicket, FormError> {
        if self.state() == FormState::Submitting {
            return Err(FormError::InvalidState {
                state: self.state(),
                action: "reload candidates",
            });
        }
        let ticket = self.kind_mut().candidates.begin_fetch()?;
        self.begin_loading();
        self.log.info(
            "candidates.fetch.started",
            &format!(
                "{} fetching {} candidates (generation {})",
                self.instance(),
                self.template().format(),
                ticket.generation
            ),
        );
        Ok(ticket)
    }

    pub fn complete_candidate_fetch(
        &mut self,
        generation: u64,
        result: Result<Vec<CandidateEntry>, FetchFault>,
    ) -> FetchCompletion {
        let failure = result.as_ref().err().map(ToString::to_string);
        let completion = self
            .kind_mut()
            .candidates
            .complete_fetch(generation, result);
        match (completion, failure) {
            (FetchCompletion::Stale, _) => self.log.warn(
                "candidates.fetch.stale",
                &format!("{} discarded candidate generation {generation}", self.instance()),
            ),
            (FetchCompletion::Applied, Some(message)) => {
                self.log.error("candidates.fetch.failed", &message)
            }
            (FetchCompletion::Applied, None) => self.log.info(
                "candidates.fetch.loaded",
                &format!(
                    "{} loaded {} candidates",
                    self.instance(),
                    self.candidates().len()
                ),
            ),
        }
        self.settle_loading();
        completion
    }

    /// Blocking candidate fetch.
    pub fn fetch_candidates(&mut self, registry: &dyn CandidateRegistry) -> Result<(), FormError> {
        let ticket = self.begin_candidate_fetch()?;
        let result = registry.query(&ticket.query);
        self.complete_candidate_fetch(ticket.generation, result);
        Ok(())
    }

    /// Marks the candidate list for refetching. Returns `false` while a fetch is
    /// already running.
    pub fn refresh_candidates(&mut self) -> bool {
        self.kind_mut().candidates.refresh()
    }

    /// Names a new group. Allowed once, and before the first load completes,
    /// since the id is part of what the form is created for.
    pub fn set_group_id(&mut self, id: RepositoryId) -> Result<(), FormError> {
        if self.kind().id.is_some() {
            return Err(FormError::IdReadOnly);
        }
        match self.state() {
            FormState::Unloaded | FormState::Loading => {
                self.kind_mut().id = Some(id);
                Ok(())
            }
            _ => self.edit("set group id", |kind| kind.id = Some(id)),
        }
    }

    pub fn set_browseable(&mut self, value: bool) -> Result<(), FormError> {
        self.edit("edit browseable", |kind| kind.browseable = value)
    }

    pub fn set_exposed(&mut self, value: bool) -> Result<(), FormError> {
        self.edit("edit exposed", |kind| kind.exposed = value)
    }

    pub fn add_members(&mut self, ids: &[RepositoryId]) -> Result<usize, FormError> {
        self.edit("add members", |kind| kind.members.add(&kind.candidates, ids))
    }

    pub fn remove_members(&mut self, ids: &[RepositoryId]) -> Result<usize, FormError> {
        self.edit("remove members", |kind| kind.members.remove(ids))
    }

    pub fn move_member_up(&mut self, id: &RepositoryId) -> Result<bool, FormError> {
        self.edit("reorder members", |kind| kind.members.move_up(id))
    }

    pub fn move_member_down(&mut self, id: &RepositoryId) -> Result<bool, FormError> {
        self.edit("reorder members", |kind| kind.members.move_down(id))
    }

    /// Replaces the whole member list, keeping the given order.
    pub fn set_members(&mut self, ids: Vec<RepositoryId>) -> Result<(), FormError> {
        self.edit("set members", |kind| kind.members.set_value(ids))
    }

    /// Blocking submit through `updater`.
    pub fn submit(&mut self, updater: &dyn GroupUpdater) -> Result<FormState, FormError> {
        let ticket = self.begin_submit()?;
        let outcome = updater.update_group(&ticket.payload);
        match self.complete_submit(ticket.seq, outcome) {
            SubmitCompletion::Applied(state) => Ok(state),
            SubmitCompletion::Stale => Ok(self.state()),
        }
    }
}
