use super::fields::{find_field, FieldDescriptor};
use super::candidates::SourceError;
use crate::remote::{SubmitFault, UpdateSuccess, ValidationErrors};
use crate::shared::logging::LogSink;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FORM_INSTANCE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormInstanceId(u64);

impl FormInstanceId {
    fn allocate() -> Self {
        Self(NEXT_FORM_INSTANCE.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for FormInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "form-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Unloaded,
    Loading,
    Ready,
    Submitting,
    Success,
    Error,
}

impl FormState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server operation a form submits to, e.g. `coreui_Repository.updateGroup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitApi {
    pub action: &'static str,
    pub method: &'static str,
}

impl std::fmt::Display for SubmitApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.action, self.method)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("cannot {action} while the form is {state}")]
    InvalidState {
        state: FormState,
        action: &'static str,
    },
    #[error("member repositories are still loading")]
    CandidatesLoading,
    #[error("form has invalid fields: {0}")]
    Invalid(ValidationErrors),
    #[error("repository id is read-only once the repository exists")]
    IdReadOnly,
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// What a concrete settings form contributes to the generic one: its field
/// set, its values, and its submit contract.
pub trait SettingsFormKind {
    type Values;
    type Payload: Clone + std::fmt::Debug;

    fn fields(&self) -> &'static [FieldDescriptor];
    fn submit_api(&self) -> SubmitApi;
    fn load_values(&mut self, values: Self::Values);
    /// Client-side checks; an empty result allows submission.
    fn validate(&self) -> ValidationErrors;
    fn payload(&self) -> Self::Payload;
    fn success_message(&self, result: &UpdateSuccess) -> String;
    /// Data the form depends on is still being fetched.
    fn pending_load(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket<P> {
    pub seq: u64,
    pub api: SubmitApi,
    pub payload: P,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitCompletion {
    Applied(FormState),
    Stale,
}

#[derive(Debug)]
pub struct SettingsForm<K> {
    instance: FormInstanceId,
    kind: K,
    state: FormState,
    field_errors: BTreeMap<String, String>,
    banner: Option<String>,
    success_message: Option<String>,
    submit_seq: u64,
    pub(crate) log: LogSink,
}

impl<K: SettingsFormKind> SettingsForm<K> {
    pub fn new(kind: K, log: LogSink) -> Self {
        Self {
            instance: FormInstanceId::allocate(),
            kind,
            state: FormState::Unloaded,
            field_errors: BTreeMap::new(),
            banner: None,
            success_message: None,
            submit_seq: 0,
            log,
        }
    }

    pub fn instance(&self) -> FormInstanceId {
        self.instance
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut K {
        &mut self.kind
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.kind.fields()
    }

    pub fn field_error(&self, name: &str) -> Option<&str> {
        self.field_errors.get(name).map(String::as_str)
    }

    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn success_message(&self) -> Option<&str> {
        self.success_message.as_deref()
    }

    pub(crate) fn begin_loading(&mut self) {
        if self.state == FormState::Unloaded {
            self.state = FormState::Loading;
        }
    }

    pub(crate) fn settle_loading(&mut self) {
        if self.state == FormState::Loading && !self.kind.pending_load() {
            self.state = FormState::Ready;
        }
    }

    pub fn load_values(&mut self, values: K::Values) -> Result<(), FormError> {
        if self.state == FormState::Submitting {
            return Err(FormError::InvalidState {
                state: self.state,
                action: "load values",
            });
        }
        self.kind.load_values(values);
        self.clear_feedback();
        if matches!(self.state, FormState::Success | FormState::Error) {
            self.state = FormState::Ready;
        }
        Ok(())
    }

    /// Applies a user edit. Edits need a loaded form; editing after an error
    /// or a success starts a new edit session in `Ready`.
    pub fn edit<R>(&mut self, action: &'static str, f: impl FnOnce(&mut K) -> R) -> Result<R, FormError> {
        match self.state {
            FormState::Unloaded | FormState::Loading | FormState::Submitting => {
                Err(FormError::InvalidState {
                    state: self.state,
                    action,
                })
            }
            FormState::Ready => Ok(f(&mut self.kind)),
            FormState::Success | FormState::Error => {
                let result = f(&mut self.kind);
                self.clear_feedback();
                self.state = FormState::Ready;
                Ok(result)
            }
        }
    }

    pub fn begin_submit(&mut self) -> Result<SubmitTicket<K::Payload>, FormError> {
        if !matches!(self.state, FormState::Ready | FormState::Error) {
            return Err(FormError::InvalidState {
                state: self.state,
                action: "submit",
            });
        }
        if self.kind.pending_load() {
            return Err(FormError::CandidatesLoading);
        }
        let errors = self.kind.validate();
        if !errors.is_empty() {
            self.apply_validation_errors(&errors);
            self.state = FormState::Error;
            return Err(FormError::Invalid(errors));
        }
        self.clear_feedback();
        self.submit_seq += 1;
        self.state = FormState::Submitting;
        let api = self.kind.submit_api();
        self.log.info(
            "form.submit.started",
            &format!("{} submitting to {api} (seq {})", self.instance, self.submit_seq),
        );
        Ok(SubmitTicket {
            seq: self.submit_seq,
            api,
            payload: self.kind.payload(),
        })
    }

    pub fn complete_submit(
        &mut self,
        seq: u64,
        outcome: Result<UpdateSuccess, SubmitFault>,
    ) -> SubmitCompletion {
        if self.state != FormState::Submitting || seq != self.submit_seq {
            self.log.warn(
                "form.submit.stale",
                &format!("{} discarded submit result seq {seq}", self.instance),
            );
            return SubmitCompletion::Stale;
        }
        match outcome {
            Ok(result) => {
                let message = self.kind.success_message(&result);
                self.log.info("form.submit.succeeded", &message);
                self.success_message = Some(message);
                self.state = FormState::Success;
            }
            Err(SubmitFault::Validation(errors)) => {
                self.log
                    .warn("form.submit.rejected", &format!("{}: {errors}", self.instance));
                self.apply_validation_errors(&errors);
                self.state = FormState::Error;
            }
            Err(SubmitFault::Transport(message)) => {
                self.log
                    .error("form.submit.failed", &format!("{}: {message}", self.instance));
                self.banner = Some(message);
                self.state = FormState::Ready;
            }
        }
        SubmitCompletion::Applied(self.state)
    }

    fn apply_validation_errors(&mut self, errors: &ValidationErrors) {
        self.field_errors.clear();
        let mut banner = Vec::new();
        for (field, message) in &errors.fields {
            if find_field(self.kind.fields(), field).is_some() {
                self.field_errors.insert(field.clone(), message.clone());
            } else {
                banner.push(format!("{field}: {message}"));
            }
        }
        banner.extend(errors.form.iter().cloned());
        self.banner = if banner.is_empty() {
            None
        } else {
            Some(banner.join("; "))
        };
    }

    fn clear_feedback(&mut self) {
        self.field_errors.clear();
        self.banner = None;
        self.success_message = None;
    }
}
