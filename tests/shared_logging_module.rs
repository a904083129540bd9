use nxgroup::form::{GroupSettingsForm, ResourceTypeTemplate};
use nxgroup::remote::{CandidateEntry, CandidateRegistry, FetchFault, FilterProperty};
use nxgroup::shared::logging::{append_form_log, form_log_path, LogSink};
use std::fs;
use tempfile::tempdir;

struct DownRegistry;

impl CandidateRegistry for DownRegistry {
    fn query(&self, _filter: &[FilterProperty]) -> Result<Vec<CandidateEntry>, FetchFault> {
        Err(FetchFault {
            message: "503 Service Unavailable".to_string(),
        })
    }
}

#[test]
fn shared_logging_module_writes_json_log_lines() {
    let tmp = tempdir().expect("tempdir");

    append_form_log(tmp.path(), "info", "form.test", "hello form");

    let log = fs::read_to_string(form_log_path(tmp.path())).expect("read form log");
    let line: serde_json::Value =
        serde_json::from_str(log.lines().next().expect("one line")).expect("json line");
    assert_eq!(line["level"], "info");
    assert_eq!(line["event"], "form.test");
    assert_eq!(line["message"], "hello form");
    assert!(line["timestamp"].as_i64().expect("timestamp") > 0);
}

#[test]
fn shared_logging_module_form_events_reach_the_sink() {
    let tmp = tempdir().expect("tempdir");
    let mut form = GroupSettingsForm::for_template(
        ResourceTypeTemplate::parse("maven2").expect("template"),
        LogSink::new(tmp.path().to_path_buf()),
    );

    form.fetch_candidates(&DownRegistry).expect("fetch candidates");

    let log = fs::read_to_string(form_log_path(tmp.path())).expect("read form log");
    assert!(log.contains("\"event\":\"candidates.fetch.started\""));
    assert!(log.contains("\"event\":\"candidates.fetch.failed\""));
    assert!(log.contains("503 Service Unavailable"));
}

#[test]
fn shared_logging_module_disabled_sink_writes_nothing() {
    let tmp = tempdir().expect("tempdir");
    let mut form = GroupSettingsForm::for_template(
        ResourceTypeTemplate::parse("maven2").expect("template"),
        LogSink::disabled(),
    );

    form.fetch_candidates(&DownRegistry).expect("fetch candidates");

    assert!(!form_log_path(tmp.path()).exists());
}
