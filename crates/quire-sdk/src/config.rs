use serde::{Deserialize, Serialize};

use quire_merge::MergeOptions;

/// Engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Node id stamped into every timestamp to break ties between nodes.
    pub node_id: u16,
    /// Rendering of conflicted merge previews.
    pub merge: MergeOptions,
}
