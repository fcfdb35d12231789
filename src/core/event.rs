use serde::{Deserialize, Serialize};

use super::types::{MachineId, ProductType, SimTime};

/// What an event does when it fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A product of this type arrives and the chain schedules its successor
    Arrival { product_type: ProductType },
    /// The machine completes the product it holds
    Finish { machine_id: MachineId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: SimTime,
    pub kind: EventKind,
}

impl Event {
    pub fn new(time: SimTime, kind: EventKind) -> Self {
        Self { time, kind }
    }

    pub fn arrival(time: SimTime, product_type: ProductType) -> Self {
        Self::new(time, EventKind::Arrival { product_type })
    }

    pub fn finish(time: SimTime, machine_id: MachineId) -> Self {
        Self::new(time, EventKind::Finish { machine_id })
    }
}
