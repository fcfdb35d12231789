pub mod core;
pub mod params;
pub mod report;

// Re-export commonly used types
pub use crate::core::config::{DueDatePolicy, ProductTypeConfig, ShopConfig};
pub use crate::core::entities::{Machine, MachineStatus, Product};
pub use crate::core::errors::SimError;
pub use crate::core::event::{Event, EventKind};
pub use crate::core::random::{MeanValueSource, RandomVariateSource, VariateSource};
pub use crate::core::replication::{
    run_replications, ConcurrencyMode, ReplicationConfig, ReplicationSummary,
};
pub use crate::core::simulation_engine::{
    CompletedProduct, SimulationEngine, SimulationObserver, SimulationReport,
};
pub use crate::core::types::{MachineId, ProductId, ProductType, SimTime};
