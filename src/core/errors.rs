use super::entities::MachineStatus;
use super::types::MachineId;

/// Errors raised by the job shop engine
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Popped from an empty event queue; the main loop guards against this
    EmptyQueue,
    /// A distribution was asked to sample with an unusable parameter
    InvalidDistributionParameter(String),
    /// Configuration rejected before the run started
    InvalidConfig(String),
    /// An event referenced a machine that is not in the pool
    UnknownMachine(MachineId),
    /// A machine was driven through a transition its current state does not allow
    InvalidTransition {
        machine: MachineId,
        from: MachineStatus,
        action: &'static str,
    },
    /// The replication thread pool could not be built
    ThreadPool(String),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::EmptyQueue => write!(f, "Event queue is empty"),
            SimError::InvalidDistributionParameter(msg) => {
                write!(f, "Invalid distribution parameter: {}", msg)
            }
            SimError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            SimError::UnknownMachine(id) => write!(f, "Unknown machine: {}", id),
            SimError::InvalidTransition {
                machine,
                from,
                action,
            } => write!(f, "Machine {} cannot {} while {}", machine, action, from),
            SimError::ThreadPool(msg) => write!(f, "Thread pool error: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}
