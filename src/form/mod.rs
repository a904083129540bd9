pub mod candidates;
pub mod fields;
pub mod group;
pub mod item_selector;
pub mod session;
pub mod settings_form;
pub mod template;

pub use candidates::{
    candidate_filter, FetchCompletion, FetchTicket, MemberCandidateSource, SourceError,
    SourceOptions, SourceStatus,
};
pub use fields::{FieldDefault, FieldDescriptor, FieldKind, ItemSelectorOptions, SelectorButton};
pub use group::{
    repository_updated_message, GroupSettings, GroupSettingsForm, BROWSEABLE_FIELD,
    EXPOSED_FIELD, GROUP_FIELDS, MEMBERS_FIELD, UPDATE_GROUP_API,
};
pub use item_selector::OrderedDualListField;
pub use session::{EventOutcome, FormEvent, FormEventKind, FormSession, GroupRemote};
pub use settings_form::{
    FormError, FormInstanceId, FormState, SettingsForm, SettingsFormKind, SubmitApi,
    SubmitCompletion, SubmitTicket,
};
pub use template::ResourceTypeTemplate;
