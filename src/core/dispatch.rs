//! Matching waiting products to idle machines.

use log::trace;
use std::collections::VecDeque;

use super::entities::{Machine, Product};
use super::errors::SimError;
use super::types::{MachineId, ProductId, SimTime};

/// Products waiting for a machine, in arrival order
#[derive(Debug, Clone, Default)]
pub struct WaitingQueue {
    products: VecDeque<Product>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self {
            products: VecDeque::new(),
        }
    }

    pub fn push_back(&mut self, product: Product) {
        self.products.push_back(product);
    }

    pub fn pop_front(&mut self) -> Option<Product> {
        self.products.pop_front()
    }

    pub fn front(&self) -> Option<&Product> {
        self.products.front()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }
}

/// Chooses which waiting product an idle machine takes next
pub trait DispatchPolicy: Send {
    fn name(&self) -> &str;

    /// Remove and return the product `machine` should start, if any
    fn select(&mut self, machine: &Machine, waiting: &mut WaitingQueue) -> Option<Product>;
}

/// First come, first served; any machine takes any product type
#[derive(Debug, Clone, Copy, Default)]
pub struct FifoDispatch;

impl DispatchPolicy for FifoDispatch {
    fn name(&self) -> &str {
        "FIFO"
    }

    fn select(&mut self, _machine: &Machine, waiting: &mut WaitingQueue) -> Option<Product> {
        waiting.pop_front()
    }
}

/// A product placed on a machine during a dispatch pass
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub machine_id: MachineId,
    pub product_id: ProductId,
    pub start_time: SimTime,
    pub finish_time: SimTime,
}

/// One pass over the pool in pool order: every idle machine is offered the
/// current queue until either runs out.
pub fn dispatch<P: DispatchPolicy + ?Sized>(
    policy: &mut P,
    machines: &mut [Machine],
    waiting: &mut WaitingQueue,
    now: SimTime,
) -> Result<Vec<Assignment>, SimError> {
    let mut assignments = Vec::new();

    for machine in machines.iter_mut() {
        if waiting.is_empty() {
            break;
        }
        if !machine.is_idle() {
            continue;
        }
        if let Some(product) = policy.select(machine, waiting) {
            let product_id = product.id;
            let finish_time = machine.start(product, now)?;
            trace!(
                "[{}] {} -> {} at {:.3}, finishes at {:.3}",
                policy.name(),
                product_id,
                machine.id(),
                now,
                finish_time
            );
            assignments.push(Assignment {
                machine_id: machine.id().clone(),
                product_id,
                start_time: now,
                finish_time,
            });
        }
    }

    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ProductType;

    fn product(id: u64, arrival_time: f64) -> Product {
        Product {
            id: ProductId(id),
            product_type: ProductType::from("A"),
            arrival_time,
            processing_time: 3.0,
            due_date: arrival_time + 10.0,
        }
    }

    fn pool(n: usize) -> Vec<Machine> {
        (1..=n)
            .map(|i| Machine::new(MachineId::new(format!("M{}", i))))
            .collect()
    }

    #[test]
    fn test_fills_every_idle_machine_in_pool_order() {
        let mut machines = pool(3);
        let mut waiting = WaitingQueue::new();
        waiting.push_back(product(0, 0.0));
        waiting.push_back(product(1, 0.5));

        let assignments = dispatch(&mut FifoDispatch, &mut machines, &mut waiting, 1.0).unwrap();

        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].machine_id.as_str(), "M1");
        assert_eq!(assignments[0].product_id, ProductId(0));
        assert_eq!(assignments[1].machine_id.as_str(), "M2");
        assert_eq!(assignments[1].product_id, ProductId(1));
        assert!(assignments.iter().all(|a| a.start_time == 1.0));
        assert_eq!(assignments[0].finish_time, 4.0);
        assert!(waiting.is_empty());
        assert!(machines[2].is_idle());
    }

    #[test]
    fn test_skips_busy_machines() {
        let mut machines = pool(2);
        machines[0].start(product(9, 0.0), 0.0).unwrap();
        let mut waiting = WaitingQueue::new();
        waiting.push_back(product(0, 0.0));
        waiting.push_back(product(1, 0.0));
        let queued: Vec<ProductId> = waiting.iter().map(|p| p.id).collect();
        assert_eq!(queued, vec![ProductId(0), ProductId(1)]);

        let assignments = dispatch(&mut FifoDispatch, &mut machines, &mut waiting, 0.0).unwrap();

        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].machine_id.as_str(), "M2");
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting.front().unwrap().id, ProductId(1));
    }

    #[test]
    fn test_empty_queue_or_no_idle_machine_is_a_no_op() {
        let mut machines = pool(1);
        let mut waiting = WaitingQueue::new();
        assert!(dispatch(&mut FifoDispatch, &mut machines, &mut waiting, 0.0)
            .unwrap()
            .is_empty());

        machines[0].start(product(5, 0.0), 0.0).unwrap();
        waiting.push_back(product(6, 0.0));
        assert!(dispatch(&mut FifoDispatch, &mut machines, &mut waiting, 0.0)
            .unwrap()
            .is_empty());
        assert_eq!(waiting.len(), 1);
    }
}
