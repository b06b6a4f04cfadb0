use serde::{Deserialize, Serialize};

pub const DISPATCH_ENV: &str = "WAYFINDER_DISPATCH";

/// When per-call handlers run relative to `make_destination` returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Handlers run inline, before the destination is returned.
    Immediate,
    /// Handlers run on a later turn of the Tokio runtime, after the
    /// destination is returned.
    #[default]
    Deferred,
}

impl DispatchMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "immediate" | "sync" => Some(Self::Immediate),
            "deferred" | "async" => Some(Self::Deferred),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub dispatch: DispatchMode,
}

impl RouterConfig {
    pub fn immediate() -> Self {
        Self {
            dispatch: DispatchMode::Immediate,
        }
    }

    pub fn deferred() -> Self {
        Self {
            dispatch: DispatchMode::Deferred,
        }
    }

    /// Defaults overridden by `WAYFINDER_DISPATCH`, if set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(DISPATCH_ENV) {
            match DispatchMode::parse(&value) {
                Some(mode) => config.dispatch = mode,
                None => tracing::warn!(
                    value = %value,
                    "Unknown {}, using {:?}",
                    DISPATCH_ENV,
                    config.dispatch
                ),
            }
        }
        config
    }
}
