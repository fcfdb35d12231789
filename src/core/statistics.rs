//! Accumulates shop statistics from engine callbacks.
//!
//! The collector never looks at engine state itself: the engine reports
//! clock advances, WIP/queue levels, busy intervals and completions, and
//! `report` turns the accumulated totals into KPIs for a given final clock.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::entities::Product;
use super::errors::SimError;
use super::types::{MachineId, ProductId, ProductType, SimTime};

/// A stretch of time a machine spent processing one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub machine_id: MachineId,
    pub start: SimTime,
    pub end: SimTime,
    pub product_type: ProductType,
    pub product_id: ProductId,
}

#[derive(Debug, Clone, Default)]
struct MachineAccumulator {
    busy_time: f64,
    jobs_completed: u64,
}

#[derive(Debug, Clone, Default)]
struct ProductAccumulator {
    completed: u64,
    total_waiting_time: f64,
    max_waiting_time: f64,
    total_flow_time: f64,
    max_flow_time: f64,
    total_tardiness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineUtilization {
    pub machine_id: MachineId,
    pub busy_time: f64,
    pub jobs_completed: u64,
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTypeStats {
    pub product_type: ProductType,
    pub completed: u64,
    pub total_waiting_time: f64,
    pub max_waiting_time: f64,
    pub avg_waiting_time: f64,
    pub total_flow_time: f64,
    pub max_flow_time: f64,
    pub avg_flow_time: f64,
    pub total_tardiness: f64,
}

/// KPIs at a given final clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub final_clock: SimTime,
    pub machines: Vec<MachineUtilization>,
    pub average_utilization: f64,
    pub average_wip: f64,
    pub average_queue: f64,
    pub products: Vec<ProductTypeStats>,
}

#[derive(Debug, Clone)]
pub struct StatisticsCollector {
    machine_order: Vec<MachineId>,
    machines: HashMap<MachineId, MachineAccumulator>,
    products: Vec<(ProductType, ProductAccumulator)>,
    busy_intervals: Vec<BusyInterval>,
    wip_area: f64,
    queue_area: f64,
    current_wip: usize,
    current_queue: usize,
    last_update: SimTime,
}

impl StatisticsCollector {
    pub fn new(machines: &[MachineId], product_types: &[ProductType]) -> Self {
        Self {
            machine_order: machines.to_vec(),
            machines: machines
                .iter()
                .map(|id| (id.clone(), MachineAccumulator::default()))
                .collect(),
            products: product_types
                .iter()
                .map(|t| (t.clone(), ProductAccumulator::default()))
                .collect(),
            busy_intervals: Vec::new(),
            wip_area: 0.0,
            queue_area: 0.0,
            current_wip: 0,
            current_queue: 0,
            last_update: 0.0,
        }
    }

    /// Integrate the current WIP and queue levels up to `now`
    pub fn advance(&mut self, now: SimTime) {
        let dt = now - self.last_update;
        if dt > 0.0 {
            self.wip_area += dt * self.current_wip as f64;
            self.queue_area += dt * self.current_queue as f64;
            self.last_update = now;
        }
    }

    /// Levels that hold from the last `advance` until the next one
    pub fn set_levels(&mut self, wip: usize, queue_length: usize) {
        self.current_wip = wip;
        self.current_queue = queue_length;
    }

    pub fn record_busy_interval(
        &mut self,
        machine_id: &MachineId,
        start: SimTime,
        end: SimTime,
        product: &Product,
    ) -> Result<(), SimError> {
        let acc = self
            .machines
            .get_mut(machine_id)
            .ok_or_else(|| SimError::UnknownMachine(machine_id.clone()))?;
        acc.busy_time += end - start;
        self.busy_intervals.push(BusyInterval {
            machine_id: machine_id.clone(),
            start,
            end,
            product_type: product.product_type.clone(),
            product_id: product.id,
        });
        Ok(())
    }

    pub fn record_completion(
        &mut self,
        machine_id: &MachineId,
        product: &Product,
        start_time: SimTime,
        completion_time: SimTime,
        tardiness: f64,
    ) -> Result<(), SimError> {
        let machine = self
            .machines
            .get_mut(machine_id)
            .ok_or_else(|| SimError::UnknownMachine(machine_id.clone()))?;
        machine.jobs_completed += 1;

        let acc = match self
            .products
            .iter()
            .position(|(t, _)| t == &product.product_type)
        {
            Some(index) => &mut self.products[index].1,
            None => {
                self.products
                    .push((product.product_type.clone(), ProductAccumulator::default()));
                let last = self.products.len() - 1;
                &mut self.products[last].1
            }
        };

        let waiting = start_time - product.arrival_time;
        let flow = completion_time - product.arrival_time;
        acc.completed += 1;
        acc.total_waiting_time += waiting;
        acc.max_waiting_time = acc.max_waiting_time.max(waiting);
        acc.total_flow_time += flow;
        acc.max_flow_time = acc.max_flow_time.max(flow);
        acc.total_tardiness += tardiness;
        Ok(())
    }

    pub fn busy_intervals(&self) -> &[BusyInterval] {
        &self.busy_intervals
    }

    /// Compute KPIs as of `final_clock`. Pure: repeated calls on the same
    /// collector give the same numbers.
    pub fn report(&self, final_clock: SimTime) -> StatisticsReport {
        let horizon = if final_clock.is_finite() && final_clock > 0.0 {
            Some(final_clock)
        } else {
            None
        };
        let ratio = |value: f64| horizon.map_or(0.0, |h| value / h);

        let tail = (final_clock - self.last_update).max(0.0);
        let wip_area = self.wip_area + tail * self.current_wip as f64;
        let queue_area = self.queue_area + tail * self.current_queue as f64;

        let machines: Vec<MachineUtilization> = self
            .machine_order
            .iter()
            .map(|id| {
                let acc = self.machines.get(id).cloned().unwrap_or_default();
                MachineUtilization {
                    machine_id: id.clone(),
                    busy_time: acc.busy_time,
                    jobs_completed: acc.jobs_completed,
                    utilization: ratio(acc.busy_time),
                }
            })
            .collect();

        let average_utilization = if machines.is_empty() {
            0.0
        } else {
            machines.iter().map(|m| m.utilization).sum::<f64>() / machines.len() as f64
        };

        let products = self
            .products
            .iter()
            .map(|(product_type, acc)| {
                let per_unit = |total: f64| {
                    if acc.completed == 0 {
                        0.0
                    } else {
                        total / acc.completed as f64
                    }
                };
                ProductTypeStats {
                    product_type: product_type.clone(),
                    completed: acc.completed,
                    total_waiting_time: acc.total_waiting_time,
                    max_waiting_time: acc.max_waiting_time,
                    avg_waiting_time: per_unit(acc.total_waiting_time),
                    total_flow_time: acc.total_flow_time,
                    max_flow_time: acc.max_flow_time,
                    avg_flow_time: per_unit(acc.total_flow_time),
                    total_tardiness: acc.total_tardiness,
                }
            })
            .collect();

        StatisticsReport {
            final_clock,
            machines,
            average_utilization,
            average_wip: ratio(wip_area),
            average_queue: ratio(queue_area),
            products,
        }
    }
}
