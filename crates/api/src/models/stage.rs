use serde::{Deserialize, Serialize};
use std::fmt;

/// States a single `make_destination` call moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Resolving,
    Adapting,
    Instantiating,
    Preparing,
    AwaitingModuleCompletion,
    Dispatching,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Resolving => "resolving",
            PipelineStage::Adapting => "adapting",
            PipelineStage::Instantiating => "instantiating",
            PipelineStage::Preparing => "preparing",
            PipelineStage::AwaitingModuleCompletion => "awaiting_module_completion",
            PipelineStage::Dispatching => "dispatching",
            PipelineStage::Done => "done",
        }
    }

    /// Whether the performer path can have been entered by the time this stage runs.
    pub fn reaches_performer(&self) -> bool {
        *self >= PipelineStage::Preparing
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
