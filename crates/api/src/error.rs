use crate::models::PipelineStage;

/// Error type returned by provider factories and build steps.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a routing call failed to produce a destination.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("Unregistered module: {module}")]
    UnregisteredModule { module: String },
    #[error("Incompatible input: no route bridges {requested} to a provider for {required}")]
    IncompatibleInput { requested: String, required: String },
    #[error("Construction of {module} failed while {stage}: {reason}")]
    ConstructionFailed {
        module: String,
        stage: PipelineStage,
        reason: String,
    },
}

impl RouteError {
    /// Stage at which the failure was detected.
    pub fn stage(&self) -> PipelineStage {
        match self {
            RouteError::UnregisteredModule { .. } => PipelineStage::Resolving,
            RouteError::IncompatibleInput { .. } => PipelineStage::Adapting,
            RouteError::ConstructionFailed { stage, .. } => *stage,
        }
    }
}

pub type RouteResult<T> = std::result::Result<T, RouteError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate registration: {key} is already bound")]
    DuplicateRegistration { key: String },
    #[error("Registration is finished, no more modules can be registered")]
    RegistrationClosed,
    #[error("Identifier conflict: {identifier} is already bound to {bound}")]
    IdentifierConflict { identifier: String, bound: String },
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
