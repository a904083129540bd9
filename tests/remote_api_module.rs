use nxgroup::remote::{
    CandidateRegistry, ExtDirectClient, FilterProperty, GroupReader, GroupSettingsPayload,
    GroupUpdater, RemoteError, SubmitFault,
};
use nxgroup::shared::ids::RepositoryId;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
struct RecordedRequest {
    path: String,
    body: Value,
}

struct MockDirectServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockDirectServer {
    /// The responder gets the decoded request envelope and returns the reply
    /// envelope.
    fn start<F>(expected_requests: usize, responder: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let requests_for_thread = Arc::clone(&requests);
        let responder = Arc::new(responder);

        let handle = thread::spawn(move || {
            for _ in 0..expected_requests {
                let (mut stream, _) = listener.accept().expect("accept");
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

                let mut request_line = String::new();
                reader
                    .read_line(&mut request_line)
                    .expect("read request line");
                let path = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();

                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).expect("read header");
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                    if line.to_ascii_lowercase().starts_with("content-length:") {
                        content_length = line
                            .split_once(':')
                            .map(|(_, v)| v.trim().parse::<usize>().unwrap_or(0))
                            .unwrap_or(0);
                    }
                }

                let mut body = vec![0_u8; content_length];
                if content_length > 0 {
                    reader.read_exact(&mut body).expect("read body");
                }
                let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

                let reply = responder(&body).to_string();
                requests_for_thread
                    .lock()
                    .expect("lock requests")
                    .push(RecordedRequest { path, body });

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.len(),
                    reply
                );
                stream
                    .write_all(response.as_bytes())
                    .expect("write response");
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
            handle: Some(handle),
        }
    }

    fn client(&self) -> ExtDirectClient {
        ExtDirectClient::new(&self.base_url, Duration::from_secs(5))
    }

    fn finish(mut self) -> Vec<RecordedRequest> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("join mock server");
        }
        self.requests.lock().expect("lock requests").clone()
    }
}

fn rpc_reply(request: &Value, result: Value) -> Value {
    json!({
        "tid": request["tid"],
        "action": request["action"],
        "method": request["method"],
        "type": "rpc",
        "result": result,
    })
}

fn id(raw: &str) -> RepositoryId {
    RepositoryId::parse(raw).expect("repository id")
}

#[test]
fn remote_api_module_queries_references_with_filter_envelope() {
    let server = MockDirectServer::start(1, |request| {
        rpc_reply(
            request,
            json!({
                "success": true,
                "data": [
                    {"id": "maven-central", "name": "maven-central", "format": "maven2"},
                    {"id": "maven-releases", "name": "maven-releases", "format": "maven2"}
                ]
            }),
        )
    });
    let client = server.client();

    let entries = client
        .query(&[
            FilterProperty::new("format", "maven2"),
            FilterProperty::new("includeNexusManaged", "true"),
        ])
        .expect("query candidates");

    let ids: Vec<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
    assert_eq!(ids, vec!["maven-central", "maven-releases"]);

    let requests = server.finish();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/service/extdirect");
    let body = &requests[0].body;
    assert_eq!(body["action"], "coreui_Repository");
    assert_eq!(body["method"], "readReferences");
    assert_eq!(body["type"], "rpc");
    assert_eq!(
        body["data"],
        json!([{"filter": [
            {"property": "format", "value": "maven2"},
            {"property": "includeNexusManaged", "value": "true"}
        ]}])
    );
}

#[test]
fn remote_api_module_update_group_sends_payload_and_returns_id() {
    let server = MockDirectServer::start(1, |request| {
        rpc_reply(
            request,
            json!({"success": true, "data": {"id": "grp1", "format": "maven2"}}),
        )
    });
    let client = server.client();

    let result = client
        .update_group(&GroupSettingsPayload {
            id: Some(id("grp1")),
            browseable: false,
            exposed: true,
            member_repository_ids: vec![id("r1"), id("r2")],
        })
        .expect("update group");

    assert_eq!(result.id, id("grp1"));
    let requests = server.finish();
    assert_eq!(requests[0].body["method"], "updateGroup");
    assert_eq!(
        requests[0].body["data"],
        json!([{
            "id": "grp1",
            "browseable": false,
            "exposed": true,
            "memberRepositoryIds": ["r1", "r2"]
        }])
    );
}

#[test]
fn remote_api_module_maps_rejection_to_validation_fault() {
    let server = MockDirectServer::start(1, |request| {
        rpc_reply(
            request,
            json!({
                "success": false,
                "errors": {"memberRepositoryIds": "Repository r9 does not exist"}
            }),
        )
    });
    let client = server.client();

    let err = client
        .update_group(&GroupSettingsPayload {
            id: Some(id("grp1")),
            browseable: true,
            exposed: true,
            member_repository_ids: vec![id("r9")],
        })
        .expect_err("rejected update");

    let SubmitFault::Validation(errors) = err else {
        panic!("expected validation fault, got {err:?}");
    };
    assert_eq!(
        errors.fields.get("memberRepositoryIds").map(String::as_str),
        Some("Repository r9 does not exist")
    );
    assert!(errors.form.is_empty());
    server.finish();
}

#[test]
fn remote_api_module_maps_exception_to_transport_fault() {
    let server = MockDirectServer::start(1, |request| {
        json!({
            "tid": request["tid"],
            "type": "exception",
            "message": "java.lang.NullPointerException"
        })
    });
    let client = server.client();

    let err = client
        .update_group(&GroupSettingsPayload {
            id: Some(id("grp1")),
            browseable: true,
            exposed: true,
            member_repository_ids: Vec::new(),
        })
        .expect_err("exception reply");

    assert_eq!(
        err,
        SubmitFault::Transport("unexpected response: java.lang.NullPointerException".to_string())
    );
    server.finish();
}

#[test]
fn remote_api_module_reports_unreachable_registry_as_fetch_fault() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind unused port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    let client = ExtDirectClient::new(&format!("http://{addr}"), Duration::from_secs(2));

    let fault = client
        .query(&[FilterProperty::new("format", "maven2")])
        .expect_err("connection refused");

    assert!(fault.message.starts_with("request failed:"));
}

#[test]
fn remote_api_module_reads_group_settings_from_repository_list() {
    let server = MockDirectServer::start(2, |request| {
        rpc_reply(
            request,
            json!({
                "success": true,
                "data": [
                    {"id": "maven-central", "type": "proxy", "format": "maven2"},
                    {
                        "id": "maven-public",
                        "type": "group",
                        "format": "maven2",
                        "browseable": false,
                        "memberRepositoryIds": ["maven-releases", "maven-central"]
                    }
                ]
            }),
        )
    });
    let client = server.client();

    let config = client.read_group(&id("maven-public")).expect("read group");
    assert!(!config.browseable);
    assert!(config.exposed);
    assert_eq!(
        config.member_repository_ids,
        vec![id("maven-releases"), id("maven-central")]
    );

    let err = client
        .read_group(&id("maven-central"))
        .expect_err("proxy is not a group");
    assert!(matches!(err, RemoteError::Response(message) if message.contains("not a group")));

    let requests = server.finish();
    assert_eq!(requests[0].body["method"], "read");
    assert_ne!(requests[0].body["tid"], requests[1].body["tid"]);
}
