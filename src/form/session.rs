//! Runs a group form's remote calls off the UI thread.
//!
//! Each request runs on its own worker thread and reports back through a
//! channel owned by the session. The UI thread applies results with
//! [`FormSession::pump`]; results addressed to another form instance, or to a
//! superseded request, are dropped. Dropping the session drops the receiver,
//! so replies that arrive after navigation are discarded by the worker.

use super::candidates::FetchCompletion;
use super::group::GroupSettingsForm;
use super::settings_form::{FormError, FormInstanceId, FormState, SubmitCompletion};
use crate::remote::{
    CandidateEntry, CandidateRegistry, FetchFault, GroupUpdater, SubmitFault, UpdateSuccess,
};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub trait GroupRemote: CandidateRegistry + GroupUpdater {}

impl<T: CandidateRegistry + GroupUpdater> GroupRemote for T {}

#[derive(Debug)]
pub enum FormEventKind {
    CandidatesFetched {
        generation: u64,
        result: Result<Vec<CandidateEntry>, FetchFault>,
    },
    SubmitCompleted {
        seq: u64,
        result: Result<UpdateSuccess, SubmitFault>,
    },
}

#[derive(Debug)]
pub struct FormEvent {
    pub form: FormInstanceId,
    pub kind: FormEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    CandidatesApplied,
    SubmitApplied(FormState),
    Discarded,
}

pub struct FormSession {
    form: GroupSettingsForm,
    remote: Arc<dyn GroupRemote>,
    sender: Sender<FormEvent>,
    receiver: Receiver<FormEvent>,
    in_flight: usize,
}

impl FormSession {
    pub fn new(form: GroupSettingsForm, remote: Arc<dyn GroupRemote>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            form,
            remote,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    pub fn form(&self) -> &GroupSettingsForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut GroupSettingsForm {
        &mut self.form
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Swaps in a fresh form (navigation to another group). Replies still in
    /// flight for the old form are discarded when they arrive.
    pub fn replace_form(&mut self, form: GroupSettingsForm) -> GroupSettingsForm {
        std::mem::replace(&mut self.form, form)
    }

    pub fn start_candidate_fetch(&mut self) -> Result<(), FormError> {
        let ticket = self.form.begin_candidate_fetch()?;
        let form = self.form.instance();
        let remote = Arc::clone(&self.remote);
        let sender = self.sender.clone();
        self.in_flight += 1;
        thread::spawn(move || {
            let result = remote.query(&ticket.query);
            let _ = sender.send(FormEvent {
                form,
                kind: FormEventKind::CandidatesFetched {
                    generation: ticket.generation,
                    result,
                },
            });
        });
        Ok(())
    }

    pub fn start_submit(&mut self) -> Result<(), FormError> {
        let ticket = self.form.begin_submit()?;
        let form = self.form.instance();
        let remote = Arc::clone(&self.remote);
        let sender = self.sender.clone();
        self.in_flight += 1;
        thread::spawn(move || {
            let result = remote.update_group(&ticket.payload);
            let _ = sender.send(FormEvent {
                form,
                kind: FormEventKind::SubmitCompleted {
                    seq: ticket.seq,
                    result,
                },
            });
        });
        Ok(())
    }

    /// Applies every reply that has already arrived, without blocking.
    pub fn pump(&mut self) -> Vec<EventOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            outcomes.push(self.handle_event(event));
        }
        outcomes
    }

    /// Blocks until no request is in flight or `timeout` elapses. Returns
    /// `false` on timeout.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(event) => {
                    self.handle_event(event);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false;
                }
            }
        }
        true
    }

    pub fn handle_event(&mut self, event: FormEvent) -> EventOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        if event.form != self.form.instance() {
            self.form.log.warn(
                "form.event.discarded",
                &format!(
                    "reply for {} arrived after navigating to {}",
                    event.form,
                    self.form.instance()
                ),
            );
            return EventOutcome::Discarded;
        }
        match event.kind {
            FormEventKind::CandidatesFetched { generation, result } => {
                match self.form.complete_candidate_fetch(generation, result) {
                    FetchCompletion::Applied => EventOutcome::CandidatesApplied,
                    FetchCompletion::Stale => EventOutcome::Discarded,
                }
            }
            FormEventKind::SubmitCompleted { seq, result } => {
                match self.form.complete_submit(seq, result) {
                    SubmitCompletion::Applied(state) => EventOutcome::SubmitApplied(state),
                    SubmitCompletion::Stale => EventOutcome::Discarded,
                }
            }
        }
    }
}
