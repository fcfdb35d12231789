use serde::{Deserialize, Serialize};

use super::errors::SimError;
use super::types::{MachineId, ProductId, ProductType, SimTime};

/// A unit of work created by an arrival event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub product_type: ProductType,
    pub arrival_time: SimTime,
    pub processing_time: SimTime,
    pub due_date: SimTime,
}

/// Machine status. `Setup` and `Down` are declared for future setup and
/// breakdown modelling; nothing in the engine transitions into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineStatus {
    Idle,
    Run,
    Setup,
    Down,
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MachineStatus::Idle => "IDLE",
            MachineStatus::Run => "RUN",
            MachineStatus::Setup => "SETUP",
            MachineStatus::Down => "DOWN",
        };
        write!(f, "{}", label)
    }
}

/// What a machine hands back when it finishes a job
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedJob {
    pub product: Product,
    pub start_time: SimTime,
    pub completion_time: SimTime,
}

/// One machine of the parallel pool.
///
/// Status and the held product only change together through `start` and
/// `finish`, so a machine is `Run` exactly when it holds a product.
#[derive(Debug, Clone)]
pub struct Machine {
    id: MachineId,
    status: MachineStatus,
    current: Option<Product>,
    job_start_time: SimTime,
    last_finish_time: SimTime,
}

impl Machine {
    pub fn new(id: MachineId) -> Self {
        Self {
            id,
            status: MachineStatus::Idle,
            current: None,
            job_start_time: 0.0,
            last_finish_time: 0.0,
        }
    }

    pub fn id(&self) -> &MachineId {
        &self.id
    }

    pub fn status(&self) -> MachineStatus {
        self.status
    }

    pub fn is_idle(&self) -> bool {
        self.status == MachineStatus::Idle
    }

    pub fn current_product(&self) -> Option<&Product> {
        self.current.as_ref()
    }

    pub fn job_start_time(&self) -> Option<SimTime> {
        self.current.as_ref().map(|_| self.job_start_time)
    }

    pub fn last_finish_time(&self) -> SimTime {
        self.last_finish_time
    }

    /// IDLE -> RUN. Returns the time the job will finish.
    pub fn start(&mut self, product: Product, now: SimTime) -> Result<SimTime, SimError> {
        if self.status != MachineStatus::Idle {
            return Err(SimError::InvalidTransition {
                machine: self.id.clone(),
                from: self.status,
                action: "start",
            });
        }
        let finish_at = now + product.processing_time;
        self.status = MachineStatus::Run;
        self.current = Some(product);
        self.job_start_time = now;
        Ok(finish_at)
    }

    /// RUN -> IDLE. Releases the held product.
    pub fn finish(&mut self, now: SimTime) -> Result<FinishedJob, SimError> {
        let product = match (self.status, self.current.take()) {
            (MachineStatus::Run, Some(product)) => product,
            (status, current) => {
                self.current = current;
                return Err(SimError::InvalidTransition {
                    machine: self.id.clone(),
                    from: status,
                    action: "finish",
                });
            }
        };
        self.status = MachineStatus::Idle;
        self.last_finish_time = now;
        Ok(FinishedJob {
            product,
            start_time: self.job_start_time,
            completion_time: now,
        })
    }
}
