//! ComfyUI workflow graphs in "API format".
//!
//! A workflow is a mapping from node id to [`Node`]. Each node names the
//! operation it runs (`class_type`) and carries free-form `inputs`. An input
//! either holds a literal value or links to another node's output as
//! `[node_id, output_index]`.

use crate::error::{GenError, Result};
use crate::video::types::TextToVideoRequest;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Class of the generator node in the built-in text-to-video pipeline.
pub const TEXT_TO_VIDEO_CLASS: &str = "WanTextToVideoApi";
/// Class of the sink node that writes the generated video on the server.
pub const SAVE_VIDEO_CLASS: &str = "SaveVideo";

/// Optional node metadata exported by the ComfyUI editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    /// Display title of the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A single operation in a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Operation parameters and links to upstream outputs.
    #[serde(default)]
    pub inputs: Map<String, Value>,
    /// Name of the operation the server runs for this node.
    pub class_type: String,
    /// Editor metadata, round-tripped untouched.
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<NodeMeta>,
}

impl Node {
    /// Creates a node of the given class with no inputs.
    pub fn new(class_type: impl Into<String>) -> Self {
        Self {
            inputs: Map::new(),
            class_type: class_type.into(),
            meta: None,
        }
    }

    /// Sets a literal input value.
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    /// Links an input to output `index` of node `node_id`.
    pub fn with_link(
        mut self,
        name: impl Into<String>,
        node_id: impl Into<String>,
        index: u32,
    ) -> Self {
        self.inputs
            .insert(name.into(), json!([node_id.into(), index]));
        self
    }

    /// Sets the editor title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.meta = Some(NodeMeta {
            title: Some(title.into()),
        });
        self
    }

    /// Returns the `(node_id, output_index)` pairs this node links to.
    pub fn links(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.inputs.values().filter_map(as_link)
    }
}

/// Interprets an input value as a `[node_id, output_index]` link.
fn as_link(value: &Value) -> Option<(&str, u64)> {
    match value.as_array()?.as_slice() {
        [Value::String(id), index] => Some((id.as_str(), index.as_u64()?)),
        _ => None,
    }
}

/// A workflow graph, keyed by node id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workflow {
    nodes: BTreeMap<String, Node>,
}

impl Workflow {
    /// Creates an empty workflow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a node under the given id.
    pub fn with_node(mut self, id: impl Into<String>, node: Node) -> Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Iterates over `(id, node)` pairs.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(id, node)| (id.as_str(), node))
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Builds the two-node text-to-video pipeline: a generator feeding a
    /// save-video sink.
    pub fn text_to_video(request: &TextToVideoRequest) -> Self {
        let generator = Node::new(TEXT_TO_VIDEO_CLASS)
            .with_input("model", request.model.as_str())
            .with_input("prompt", request.prompt.as_str())
            .with_input("size", request.size.as_str())
            .with_input("duration", request.duration_secs)
            .with_input("seed", request.seed)
            .with_input("prompt_extend", request.prompt_extend);

        let sink = Node::new(SAVE_VIDEO_CLASS)
            .with_link("video", "1", 0)
            .with_input("filename_prefix", request.filename_prefix.as_str())
            .with_input("format", request.format.as_str())
            .with_input("codec", request.codec.as_str());

        Self::new().with_node("1", generator).with_node("2", sink)
    }

    /// Loads an API-format workflow exported from ComfyUI.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let workflow: Self = serde_json::from_str(&text)?;
        Ok(workflow)
    }

    /// Checks that the graph is non-empty and every link targets a node
    /// that exists.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(GenError::InvalidRequest("workflow has no nodes".into()));
        }
        for (id, node) in self.nodes() {
            if node.class_type.is_empty() {
                return Err(GenError::InvalidRequest(format!(
                    "node {id} has an empty class_type"
                )));
            }
            for (target, _) in node.links() {
                if !self.nodes.contains_key(target) {
                    return Err(GenError::InvalidRequest(format!(
                        "node {id} links to missing node {target}"
                    )));
                }
            }
        }
        Ok(())
    }
}
