//! userdata3.json: free-form strings attached to drawables and parts.

use serde::{Deserialize, Serialize};

use crate::error::Result;

const ART_MESH_TARGET: &str = "ArtMesh";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawUserData {
    #[serde(default)]
    user_data: Vec<UserDataNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserDataNode {
    #[serde(rename = "Target")]
    pub target_type: String,
    #[serde(rename = "Id")]
    pub target_id: String,
    #[serde(rename = "Value")]
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserData {
    nodes: Vec<UserDataNode>,
    art_mesh: Vec<usize>,
}

impl UserData {
    pub fn from_json(s: &str) -> Result<Self> {
        let raw: RawUserData = serde_json::from_str(s)?;
        let art_mesh = raw
            .user_data
            .iter()
            .enumerate()
            .filter(|(_, n)| n.target_type == ART_MESH_TARGET)
            .map(|(i, _)| i)
            .collect();
        Ok(Self {
            nodes: raw.user_data,
            art_mesh,
        })
    }

    pub fn nodes(&self) -> &[UserDataNode] {
        &self.nodes
    }

    /// Entries that target art meshes (drawables).
    pub fn art_mesh_nodes(&self) -> impl Iterator<Item = &UserDataNode> {
        self.art_mesh.iter().map(|&i| &self.nodes[i])
    }

    pub fn value_for(&self, target_id: &str) -> Option<&str> {
        self.nodes
            .iter()
            .find(|n| n.target_id == target_id)
            .map(|n| n.value.as_str())
    }
}
