use serde::{Deserialize, Serialize};
use std::fmt;

/// Who initiated a construction path within a single routing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// The direct `make_destination` caller.
    Provider,
    /// The caller preparing the module through the configuring form.
    Performer,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Provider => "provider",
            Action::Performer => "performer",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
