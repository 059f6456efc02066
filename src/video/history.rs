//! Job history records returned by `GET /history/{prompt_id}`.

use crate::error::{GenError, Result};
use crate::video::types::Artifact;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Execution status attached to a history entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    /// `"success"` or `"error"`.
    #[serde(default)]
    pub status_str: Option<String>,
    /// Whether every node ran.
    #[serde(default)]
    pub completed: Option<bool>,
    /// Execution event log as `[event_name, payload]` pairs.
    #[serde(default)]
    pub messages: Vec<Value>,
}

impl JobStatus {
    /// Returns the failure description if the server reported an error.
    pub fn failure(&self) -> Option<String> {
        if self.status_str.as_deref() != Some("error") {
            return None;
        }
        let detail = self.messages.iter().find_map(|message| {
            let [name, payload] = message.as_array()?.as_slice() else {
                return None;
            };
            if name.as_str()? != "execution_error" {
                return None;
            }
            let text = payload.get("exception_message")?.as_str()?.trim();
            let node = payload.get("node_id").and_then(Value::as_str);
            Some(match node {
                Some(node) => format!("node {node}: {text}"),
                None => text.to_string(),
            })
        });
        Some(detail.unwrap_or_else(|| "execution error".into()))
    }
}

/// The history record of one finished job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Node id -> output slots, in server order.
    #[serde(default)]
    pub outputs: Option<Map<String, Value>>,
    /// Execution status, if the server reports one.
    #[serde(default)]
    pub status: Option<JobStatus>,
}

impl HistoryEntry {
    /// Fails with [`GenError::JobFailed`] if the server reported an
    /// execution error for this job.
    pub fn check_status(&self) -> Result<()> {
        match self.status.as_ref().and_then(JobStatus::failure) {
            Some(message) => Err(GenError::JobFailed(message)),
            None => Ok(()),
        }
    }

    /// Returns every artifact listed in the job's outputs.
    pub fn artifacts(&self) -> Result<Vec<Artifact>> {
        let outputs = self
            .outputs
            .as_ref()
            .ok_or_else(|| GenError::MissingField("outputs".into()))?;
        Ok(extract_artifacts(outputs))
    }
}

/// Collects artifact descriptors from a job's output slots.
///
/// A slot counts when it is a list whose entries are objects with a string
/// `filename`. Anything else is skipped.
pub fn extract_artifacts(outputs: &Map<String, Value>) -> Vec<Artifact> {
    let mut artifacts = Vec::new();

    for (node_id, slots) in outputs {
        let Some(slots) = slots.as_object() else {
            tracing::warn!(node_id = %node_id, "ignoring non-object node output");
            continue;
        };
        for (kind, value) in slots {
            let Some(entries) = value.as_array() else {
                continue;
            };
            for entry in entries {
                let Some(filename) = entry.get("filename").and_then(Value::as_str) else {
                    continue;
                };
                artifacts.push(Artifact {
                    node_id: node_id.clone(),
                    kind: kind.clone(),
                    filename: filename.to_string(),
                    subfolder: str_field(entry, "subfolder", ""),
                    folder_type: str_field(entry, "type", "output"),
                });
            }
        }
    }

    artifacts
}

fn str_field(entry: &Value, name: &str, default: &str) -> String {
    entry
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}
