use nxgroup::form::{
    EventOutcome, FormError, FormEvent, FormEventKind, FormSession, FormState, GroupSettingsForm,
    ResourceTypeTemplate,
};
use nxgroup::remote::{
    CandidateEntry, CandidateRegistry, FetchFault, FilterProperty, GroupConfig,
    GroupSettingsPayload, GroupUpdater, SubmitFault, UpdateSuccess,
};
use nxgroup::shared::ids::{RepositoryFormat, RepositoryId};
use nxgroup::shared::logging::LogSink;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Remote whose candidate replies are released one at a time by the test.
struct GatedRemote {
    entries: Vec<CandidateEntry>,
    gate: Mutex<Receiver<()>>,
    submitted: Mutex<Vec<GroupSettingsPayload>>,
}

impl GatedRemote {
    fn new(ids: &[&str]) -> (Arc<Self>, Sender<()>) {
        let (release, gate) = mpsc::channel();
        let remote = Arc::new(Self {
            entries: ids.iter().map(|raw| entry(raw)).collect(),
            gate: Mutex::new(gate),
            submitted: Mutex::new(Vec::new()),
        });
        (remote, release)
    }
}

impl CandidateRegistry for GatedRemote {
    fn query(&self, _filter: &[FilterProperty]) -> Result<Vec<CandidateEntry>, FetchFault> {
        let gate = self.gate.lock().expect("lock gate");
        gate.recv_timeout(Duration::from_secs(5))
            .map_err(|_| FetchFault {
                message: "gate closed".to_string(),
            })?;
        Ok(self.entries.clone())
    }
}

impl GroupUpdater for GatedRemote {
    fn update_group(&self, payload: &GroupSettingsPayload) -> Result<UpdateSuccess, SubmitFault> {
        self.submitted
            .lock()
            .expect("lock submitted")
            .push(payload.clone());
        let id = payload
            .id
            .clone()
            .ok_or_else(|| SubmitFault::Transport("missing id".to_string()))?;
        Ok(UpdateSuccess { id })
    }
}

fn id(raw: &str) -> RepositoryId {
    RepositoryId::parse(raw).expect("repository id")
}

fn entry(raw: &str) -> CandidateEntry {
    CandidateEntry {
        id: id(raw),
        name: raw.to_string(),
        format: RepositoryFormat::parse("maven2").expect("format"),
    }
}

fn loaded_form(group: &str, members: &[&str]) -> GroupSettingsForm {
    let mut form = GroupSettingsForm::for_template(
        ResourceTypeTemplate::parse("maven2").expect("template"),
        LogSink::disabled(),
    );
    form.load_values(GroupConfig {
        id: id(group),
        browseable: true,
        exposed: true,
        member_repository_ids: members.iter().map(|raw| id(raw)).collect(),
    })
    .expect("load values");
    form
}

#[test]
fn form_session_module_applies_candidates_and_submit_from_workers() {
    let (remote, release) = GatedRemote::new(&["r1", "r2"]);
    let mut session = FormSession::new(loaded_form("grp1", &[]), remote.clone());

    session.start_candidate_fetch().expect("start fetch");
    assert_eq!(session.form().state(), FormState::Loading);
    assert_eq!(session.in_flight(), 1);

    release.send(()).expect("release fetch");
    assert!(session.wait_idle(Duration::from_secs(5)));
    assert_eq!(session.form().state(), FormState::Ready);
    assert_eq!(session.form().available_candidates().len(), 2);

    session
        .form_mut()
        .add_members(&[id("r2")])
        .expect("add member");
    session.start_submit().expect("start submit");
    assert_eq!(session.form().state(), FormState::Submitting);
    assert!(session.wait_idle(Duration::from_secs(5)));

    assert_eq!(session.form().state(), FormState::Success);
    assert_eq!(
        session.form().success_message(),
        Some("Repository updated: grp1")
    );
    assert_eq!(
        remote.submitted.lock().expect("lock submitted")[0].member_repository_ids,
        vec![id("r2")]
    );
}

#[test]
fn form_session_module_discards_replies_for_replaced_form() {
    let (remote, release) = GatedRemote::new(&["r1"]);
    let mut session = FormSession::new(loaded_form("grp1", &["r1"]), remote);
    session.start_candidate_fetch().expect("start first fetch");

    let old = session.replace_form(loaded_form("grp2", &[]));
    release.send(()).expect("release old fetch");
    assert!(session.wait_idle(Duration::from_secs(5)));

    assert_eq!(session.form().state(), FormState::Unloaded);
    assert!(session.form().candidates().is_empty());
    assert_eq!(old.state(), FormState::Loading);
}

#[test]
fn form_session_module_handle_event_checks_instance_and_generation() {
    let (remote, _release) = GatedRemote::new(&[]);
    let mut session = FormSession::new(loaded_form("grp1", &[]), remote);
    let ticket = session
        .form_mut()
        .begin_candidate_fetch()
        .expect("begin fetch");
    let other = loaded_form("grp9", &[]);
    let instance = session.form().instance();

    let foreign = session.handle_event(FormEvent {
        form: other.instance(),
        kind: FormEventKind::CandidatesFetched {
            generation: ticket.generation,
            result: Ok(vec![entry("r1")]),
        },
    });
    assert_eq!(foreign, EventOutcome::Discarded);

    let superseded = session.handle_event(FormEvent {
        form: instance,
        kind: FormEventKind::CandidatesFetched {
            generation: ticket.generation + 1,
            result: Ok(vec![entry("r1")]),
        },
    });
    assert_eq!(superseded, EventOutcome::Discarded);
    assert!(session.form().candidates().is_loading());

    let current = session.handle_event(FormEvent {
        form: instance,
        kind: FormEventKind::CandidatesFetched {
            generation: ticket.generation,
            result: Ok(vec![entry("r1")]),
        },
    });
    assert_eq!(current, EventOutcome::CandidatesApplied);
    assert_eq!(session.form().state(), FormState::Ready);
}

#[test]
fn form_session_module_refuses_submit_until_candidates_arrive() {
    let (remote, release) = GatedRemote::new(&["r1"]);
    let mut session = FormSession::new(loaded_form("grp1", &[]), remote);
    session.start_candidate_fetch().expect("start fetch");

    assert_eq!(
        session.start_submit(),
        Err(FormError::InvalidState {
            state: FormState::Loading,
            action: "submit",
        })
    );
    assert!(session.pump().is_empty());

    release.send(()).expect("release fetch");
    assert!(session.wait_idle(Duration::from_secs(5)));
    assert!(session.start_submit().is_ok());
    assert!(session.wait_idle(Duration::from_secs(5)));
    assert_eq!(session.form().state(), FormState::Success);
}

#[test]
fn form_session_module_wait_idle_times_out_on_stuck_request() {
    let (remote, release) = GatedRemote::new(&["r1"]);
    let mut session = FormSession::new(loaded_form("grp1", &[]), remote);
    session.start_candidate_fetch().expect("start fetch");

    assert!(!session.wait_idle(Duration::from_millis(50)));
    assert_eq!(session.in_flight(), 1);

    release.send(()).expect("release fetch");
    assert!(session.wait_idle(Duration::from_secs(5)));
    assert_eq!(session.in_flight(), 0);
}
