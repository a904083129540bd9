use crate::shared::ids::{RepositoryFormat, RepositoryId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only projection of a repository that may become a group member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CandidateEntry {
    pub id: RepositoryId,
    pub name: String,
    pub format: RepositoryFormat,
}

/// One equality constraint of a candidate query, sent verbatim as an Ext.Direct
/// store filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct FilterProperty {
    pub property: String,
    pub value: String,
}

impl FilterProperty {
    pub fn new(property: &str, value: impl Into<String>) -> Self {
        Self {
            property: property.to_string(),
            value: value.into(),
        }
    }
}

/// Group settings as stored by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    pub id: RepositoryId,
    #[serde(default = "default_true")]
    pub browseable: bool,
    #[serde(default = "default_true")]
    pub exposed: bool,
    #[serde(default)]
    pub member_repository_ids: Vec<RepositoryId>,
}

fn default_true() -> bool {
    true
}

/// Body of the `updateGroup` call. `id` is absent while a group is being
/// created and the server assigns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSettingsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RepositoryId>,
    pub browseable: bool,
    pub exposed: bool,
    pub member_repository_ids: Vec<RepositoryId>,
}

impl From<GroupConfig> for GroupSettingsPayload {
    fn from(config: GroupConfig) -> Self {
        Self {
            id: Some(config.id),
            browseable: config.browseable,
            exposed: config.exposed,
            member_repository_ids: config.member_repository_ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpdateSuccess {
    pub id: RepositoryId,
}

/// Rejection returned by the update operation: messages keyed by field name
/// plus messages that belong to the form as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ValidationErrors {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub form: Vec<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.form.is_empty()
    }

    pub fn field(mut self, name: &str, message: &str) -> Self {
        self.fields.insert(name.to_string(), message.to_string());
        self
    }

    pub fn form_message(mut self, message: &str) -> Self {
        self.form.push(message.to_string());
        self
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        parts.extend(self.form.iter().cloned());
        if parts.is_empty() {
            return f.write_str("validation failed");
        }
        f.write_str(&parts.join("; "))
    }
}
