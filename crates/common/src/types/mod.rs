use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// A person to synchronize into the CRM and the task board.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Whether the task-board sync has completed for this contact.
    #[serde(rename = "estado_clickup", default, deserialize_with = "null_as_false")]
    pub task_synced: bool,
}

impl Contact {
    /// Names of the required fields that are empty after trimming.
    pub fn missing_required(&self) -> Vec<&'static str> {
        [("email", &self.email), ("firstname", &self.firstname), ("lastname", &self.lastname)]
            .into_iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// A task-board item. Fields other than `id` and `name` are carried through untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExternalTask {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExternalTask {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), extra: Map::new() }
    }
}

/// Audit entry describing one external call attempt.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiCallRecord {
    /// RFC 3339 timestamp of the attempt.
    pub timestamp: String,
    pub endpoint: String,
    #[serde(default)]
    pub parameters: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
}
