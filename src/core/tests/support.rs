use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::core::errors::SimError;
use crate::core::event::EventKind;
use crate::core::random::VariateSource;
use crate::core::simulation_engine::SimulationObserver;
use crate::core::types::SimTime;

/// Hands out pre-set samples so handler arithmetic can be checked exactly.
///
/// Exponential draws come from `exponentials` and fall back to
/// `exhausted_delay`; normal draws come from `normals` and fall back to the
/// mean; uniform draws return `uniform_value` or the lower bound.
pub struct ScriptedSource {
    pub exponentials: VecDeque<f64>,
    pub exhausted_delay: f64,
    pub normals: VecDeque<f64>,
    pub uniform_value: Option<f64>,
}

impl ScriptedSource {
    pub fn new(exponentials: &[f64]) -> Self {
        Self {
            exponentials: exponentials.iter().copied().collect(),
            exhausted_delay: 1.0e9,
            normals: VecDeque::new(),
            uniform_value: None,
        }
    }

    pub fn with_normals(mut self, normals: &[f64]) -> Self {
        self.normals = normals.iter().copied().collect();
        self
    }

    pub fn with_uniform(mut self, value: f64) -> Self {
        self.uniform_value = Some(value);
        self
    }
}

impl VariateSource for ScriptedSource {
    fn exponential(&mut self, _mean: f64) -> Result<f64, SimError> {
        Ok(self.exponentials.pop_front().unwrap_or(self.exhausted_delay))
    }

    fn normal(&mut self, mean: f64, _std_dev: f64) -> Result<f64, SimError> {
        Ok(self.normals.pop_front().unwrap_or(mean))
    }

    fn uniform(&mut self, low: f64, _high: f64) -> Result<f64, SimError> {
        Ok(self.uniform_value.unwrap_or(low))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub advances: Vec<(SimTime, SimTime)>,
    pub processed: Vec<(SimTime, EventKind)>,
}

/// Observer writing into a shared log the test keeps a handle to
pub struct RecordingObserver {
    pub log: Rc<RefCell<Recorded>>,
}

impl RecordingObserver {
    pub fn new() -> (Self, Rc<RefCell<Recorded>>) {
        let log = Rc::new(RefCell::new(Recorded::default()));
        (Self { log: log.clone() }, log)
    }
}

impl SimulationObserver for RecordingObserver {
    fn on_clock_advance(&mut self, old_time: SimTime, new_time: SimTime) {
        self.log.borrow_mut().advances.push((old_time, new_time));
    }

    fn on_event_processed(&mut self, time: SimTime, event: &EventKind) {
        self.log.borrow_mut().processed.push((time, event.clone()));
    }
}
