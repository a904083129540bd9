use super::{
    CandidateEntry, CandidateRegistry, FetchFault, FilterProperty, GroupConfig, GroupReader,
    GroupSettingsPayload, GroupUpdater, RemoteError, SubmitFault, UpdateSuccess,
    ValidationErrors,
};
use crate::config::ClientSettings;
use crate::shared::ids::{RepositoryFormat, RepositoryId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const EXT_DIRECT_PATH: &str = "service/extdirect";
const REPOSITORY_ACTION: &str = "coreui_Repository";
const GROUP_REPOSITORY_TYPE: &str = "group";

pub mod methods {
    pub const READ: &str = "read";
    pub const READ_REFERENCES: &str = "readReferences";
    pub const UPDATE_GROUP: &str = "updateGroup";
}

/// Client for the server's Ext.Direct router. Every call is a blocking POST;
/// callers that must not block run it on a worker thread.
#[derive(Debug, Clone)]
pub struct ExtDirectClient {
    endpoint: String,
    agent: ureq::Agent,
    next_tid: Arc<AtomicU64>,
}

#[derive(Debug, Serialize)]
struct DirectRequest<'a> {
    action: &'a str,
    method: &'a str,
    data: Value,
    #[serde(rename = "type")]
    kind: &'a str,
    tid: u64,
}

#[derive(Debug, Deserialize)]
struct DirectResponse {
    #[serde(default)]
    tid: Option<u64>,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<DirectResult>,
}

#[derive(Debug, Deserialize)]
struct DirectResult {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryRecord {
    id: RepositoryId,
    #[serde(rename = "type")]
    kind: String,
    #[allow(dead_code)]
    format: RepositoryFormat,
    #[serde(default = "default_true")]
    browseable: bool,
    #[serde(default = "default_true")]
    exposed: bool,
    #[serde(default)]
    member_repository_ids: Vec<RepositoryId>,
}

fn default_true() -> bool {
    true
}

impl ExtDirectClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), EXT_DIRECT_PATH),
            agent,
            next_tid: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(&settings.base_url, settings.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn call(&self, method: &str, data: Value) -> Result<Value, RemoteError> {
        let tid = self.next_tid.fetch_add(1, Ordering::Relaxed);
        let request = DirectRequest {
            action: REPOSITORY_ACTION,
            method,
            data,
            kind: "rpc",
            tid,
        };
        let body = serde_json::to_value(&request).map_err(|e| RemoteError::Request(e.to_string()))?;
        let response = self
            .agent
            .post(&self.endpoint)
            .send_json(body)
            .map_err(|e| RemoteError::Request(e.to_string()))?;
        let envelope = response
            .into_json::<DirectResponse>()
            .map_err(|e| RemoteError::Response(e.to_string()))?;

        if envelope.kind == "exception" {
            return Err(RemoteError::Response(
                envelope
                    .message
                    .unwrap_or_else(|| format!("{REPOSITORY_ACTION}.{method} raised an exception")),
            ));
        }
        if let Some(reply_tid) = envelope.tid {
            if reply_tid != tid {
                return Err(RemoteError::Response(format!(
                    "transaction id mismatch: sent {tid}, received {reply_tid}"
                )));
            }
        }
        let result = envelope.result.ok_or_else(|| {
            RemoteError::Response(format!("{REPOSITORY_ACTION}.{method} returned no result"))
        })?;
        if !result.success {
            if result.errors.is_empty() && result.message.is_none() {
                return Err(RemoteError::Response(format!(
                    "{REPOSITORY_ACTION}.{method} failed"
                )));
            }
            return Err(RemoteError::Rejected(ValidationErrors {
                fields: result.errors,
                form: result.message.into_iter().collect(),
            }));
        }
        Ok(result.data.unwrap_or(Value::Null))
    }

    fn call_typed<T: DeserializeOwned>(&self, method: &str, data: Value) -> Result<T, RemoteError> {
        let value = self.call(method, data)?;
        serde_json::from_value(value).map_err(|e| {
            RemoteError::Response(format!(
                "failed to decode {REPOSITORY_ACTION}.{method} data: {e}"
            ))
        })
    }

    pub fn read_references(
        &self,
        filter: &[FilterProperty],
    ) -> Result<Vec<CandidateEntry>, RemoteError> {
        self.call_typed(methods::READ_REFERENCES, json!([{ "filter": filter }]))
    }

    pub fn update_group_settings(
        &self,
        payload: &GroupSettingsPayload,
    ) -> Result<UpdateSuccess, RemoteError> {
        let payload = serde_json::to_value(payload).map_err(|e| RemoteError::Request(e.to_string()))?;
        self.call_typed(methods::UPDATE_GROUP, Value::Array(vec![payload]))
    }

    pub fn read_group_settings(&self, id: &RepositoryId) -> Result<GroupConfig, RemoteError> {
        let records: Vec<RepositoryRecord> = self.call_typed(methods::READ, Value::Null)?;
        let record = records
            .into_iter()
            .find(|record| &record.id == id)
            .ok_or_else(|| RemoteError::Response(format!("repository `{id}` does not exist")))?;
        if record.kind != GROUP_REPOSITORY_TYPE {
            return Err(RemoteError::Response(format!(
                "repository `{id}` is a {} repository, not a group",
                record.kind
            )));
        }
        Ok(GroupConfig {
            id: record.id,
            browseable: record.browseable,
            exposed: record.exposed,
            member_repository_ids: record.member_repository_ids,
        })
    }
}

impl CandidateRegistry for ExtDirectClient {
    fn query(&self, filter: &[FilterProperty]) -> Result<Vec<CandidateEntry>, FetchFault> {
        self.read_references(filter).map_err(FetchFault::from)
    }
}

impl GroupUpdater for ExtDirectClient {
    fn update_group(&self, payload: &GroupSettingsPayload) -> Result<UpdateSuccess, SubmitFault> {
        self.update_group_settings(payload).map_err(SubmitFault::from)
    }
}

impl GroupReader for ExtDirectClient {
    fn read_group(&self, id: &RepositoryId) -> Result<GroupConfig, RemoteError> {
        self.read_group_settings(id)
    }
}
