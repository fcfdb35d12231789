use super::config::ShopConfig;
use super::dispatch::{self, DispatchPolicy, FifoDispatch, WaitingQueue};
use super::entities::{Machine, MachineStatus, Product};
use super::errors::SimError;
use super::event::{Event, EventKind};
use super::event_scheduler::{Clock, EventQueue};
use super::random::{RandomVariateSource, VariateSource};
use super::statistics::{BusyInterval, StatisticsCollector, StatisticsReport};
use super::types::{MachineId, ProductId, ProductType, SimTime};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Observer trait for simulation events
pub trait SimulationObserver {
    /// Called when the clock moves to a later timestamp
    fn on_clock_advance(&mut self, old_time: SimTime, new_time: SimTime);

    /// Called after an event's handler has run
    fn on_event_processed(&mut self, time: SimTime, event: &EventKind);
}

/// One line of the completion log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedProduct {
    pub product_id: ProductId,
    pub product_type: ProductType,
    pub machine_id: MachineId,
    pub arrival_time: SimTime,
    pub processing_time: SimTime,
    pub start_time: SimTime,
    pub completion_time: SimTime,
    pub due_date: SimTime,
    pub tardiness: f64,
}

/// Everything a finished (or paused) run hands to reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub seed: u64,
    pub final_clock: SimTime,
    pub events_processed: u64,
    pub total_tardiness: f64,
    pub makespan: SimTime,
    pub completed: Vec<CompletedProduct>,
    pub busy_intervals: Vec<BusyInterval>,
    pub statistics: StatisticsReport,
    /// Products still waiting or in process when the run stopped
    pub unfinished: usize,
}

/// Interarrival delays must keep the clock moving forward
fn checked_delay(delay: f64) -> Result<f64, SimError> {
    if delay.is_finite() && delay >= 0.0 {
        Ok(delay)
    } else {
        Err(SimError::InvalidDistributionParameter(format!(
            "interarrival delay must be finite and non-negative, got {}",
            delay
        )))
    }
}

/// Discrete-event engine for a single-stage shop of identical parallel machines
pub struct SimulationEngine<R: VariateSource = RandomVariateSource> {
    config: ShopConfig,
    run_id: Uuid,
    clock: Clock,
    events: EventQueue,
    waiting: WaitingQueue,
    machines: Vec<Machine>,
    machine_index: HashMap<MachineId, usize>,
    policy: Box<dyn DispatchPolicy>,
    source: R,
    stats: StatisticsCollector,
    completed: Vec<CompletedProduct>,
    total_tardiness: f64,
    makespan: SimTime,
    next_product_id: u64,
    events_processed: u64,
    seeded: bool,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl SimulationEngine<RandomVariateSource> {
    /// Create an engine drawing from a `StdRng` seeded with `config.seed`
    pub fn new(config: ShopConfig) -> Result<Self, SimError> {
        let source = RandomVariateSource::new(config.seed);
        Self::with_source(config, source)
    }
}

impl<R: VariateSource> SimulationEngine<R> {
    /// Create an engine drawing every variate from `source`
    pub fn with_source(config: ShopConfig, source: R) -> Result<Self, SimError> {
        config.validate()?;

        let machines: Vec<Machine> = config
            .machines
            .iter()
            .map(|id| Machine::new(id.clone()))
            .collect();
        let machine_index = config
            .machines
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let product_types: Vec<ProductType> = config
            .products
            .iter()
            .map(|p| p.product_type.clone())
            .collect();
        let stats = StatisticsCollector::new(&config.machines, &product_types);

        Ok(Self {
            config,
            run_id: Uuid::new_v4(),
            clock: Clock::new(),
            events: EventQueue::new(),
            waiting: WaitingQueue::new(),
            machines,
            machine_index,
            policy: Box::new(FifoDispatch),
            source,
            stats,
            completed: Vec::new(),
            total_tardiness: 0.0,
            makespan: 0.0,
            next_product_id: 0,
            events_processed: 0,
            seeded: false,
            observers: Vec::new(),
        })
    }

    /// Replace the dispatch policy (FIFO by default)
    pub fn with_policy(mut self, policy: Box<dyn DispatchPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    fn notify_clock_advance(&mut self, old_time: SimTime, new_time: SimTime) {
        for observer in &mut self.observers {
            observer.on_clock_advance(old_time, new_time);
        }
    }

    fn notify_event_processed(&mut self, time: SimTime, event: &EventKind) {
        for observer in &mut self.observers {
            observer.on_event_processed(time, event);
        }
    }

    /// Schedule the first arrival of every product type, each with its own
    /// exponential delay. Runs once, before the first event is popped.
    fn seed_arrivals(&mut self) -> Result<(), SimError> {
        if self.seeded {
            return Ok(());
        }
        self.seeded = true;

        for product in &self.config.products {
            let delay = checked_delay(self.source.exponential(product.mean_interarrival)?)?;
            debug!(
                "Seeding first arrival of {} at {:.3}",
                product.product_type, delay
            );
            self.events
                .push(Event::arrival(self.clock.now() + delay, product.product_type.clone()));
        }
        Ok(())
    }

    /// The next event is executed only while the clock is short of the
    /// horizon and the event itself does not lie beyond it
    fn can_continue(&self) -> bool {
        let horizon = self.config.sim_duration;
        self.clock.now() < horizon
            && self
                .events
                .peek_next_time()
                .map_or(false, |time| time <= horizon)
    }

    /// Run until the queue drains or the horizon is reached
    pub fn run(&mut self) -> Result<SimulationReport, SimError> {
        info!(
            "Starting job shop run {} (seed {}, {} machines, {} product types, horizon {})",
            self.run_id,
            self.config.seed,
            self.machines.len(),
            self.config.products.len(),
            self.config.sim_duration
        );

        while self.step()? {}

        info!(
            "Run {} stopped at {:.3} after {} events: {} completed, {} unfinished, {} abandoned events",
            self.run_id,
            self.clock.now(),
            self.events_processed,
            self.completed.len(),
            self.work_in_process(),
            self.events.len()
        );
        Ok(self.report())
    }

    /// Process one event, returns true if another event is eligible to run
    pub fn step(&mut self) -> Result<bool, SimError> {
        self.seed_arrivals()?;
        if !self.can_continue() {
            return Ok(false);
        }

        let event = self.events.pop_earliest()?;
        let old_time = self.clock.advance_to(event.time);
        self.stats.advance(event.time);
        if old_time != event.time {
            self.notify_clock_advance(old_time, event.time);
        }

        debug!("=== t = {:.3}: {:?} ===", event.time, event.kind);

        match &event.kind {
            EventKind::Arrival { product_type } => self.handle_arrival(product_type)?,
            EventKind::Finish { machine_id } => self.handle_finish(machine_id)?,
        }

        let (wip, queue_length) = (self.work_in_process(), self.waiting.len());
        self.stats.set_levels(wip, queue_length);
        self.events_processed += 1;
        self.notify_event_processed(event.time, &event.kind);

        Ok(self.can_continue())
    }

    /// Create the product, queue it, schedule the successor arrival and dispatch
    fn handle_arrival(&mut self, product_type: &ProductType) -> Result<(), SimError> {
        let params = self.config.product(product_type).ok_or_else(|| {
            SimError::InvalidConfig(format!("no parameters for product type '{}'", product_type))
        })?;
        let (mean_interarrival, processing_mean, processing_std_dev) = (
            params.mean_interarrival,
            params.processing_mean,
            params.processing_std_dev,
        );
        let policy = self.config.due_date;
        let now = self.clock.now();

        // Negative samples are clamped, not rejected
        let processing_time = self
            .source
            .normal(processing_mean, processing_std_dev)?
            .max(0.0);
        let slack = self.source.uniform(policy.slack_low, policy.slack_high)?;
        let product = Product {
            id: ProductId(self.next_product_id),
            product_type: product_type.clone(),
            arrival_time: now,
            processing_time,
            due_date: now + policy.flow_allowance * processing_time + slack,
        };
        self.next_product_id += 1;

        debug!(
            "Arrival {} type {} (processing {:.3}, due {:.3})",
            product.id, product.product_type, product.processing_time, product.due_date
        );
        self.waiting.push_back(product);

        let delay = checked_delay(self.source.exponential(mean_interarrival)?)?;
        self.events
            .push(Event::arrival(now + delay, product_type.clone()));

        self.dispatch()
    }

    /// RUN -> IDLE, log the completion, then offer the freed machine to the queue
    fn handle_finish(&mut self, machine_id: &MachineId) -> Result<(), SimError> {
        let index = *self
            .machine_index
            .get(machine_id)
            .ok_or_else(|| SimError::UnknownMachine(machine_id.clone()))?;
        let now = self.clock.now();
        let job = self.machines[index].finish(now)?;

        let tardiness = (job.completion_time - job.product.due_date).max(0.0);
        self.total_tardiness += tardiness;
        self.makespan = self.makespan.max(job.completion_time);

        self.stats
            .record_busy_interval(machine_id, job.start_time, job.completion_time, &job.product)?;
        self.stats.record_completion(
            machine_id,
            &job.product,
            job.start_time,
            job.completion_time,
            tardiness,
        )?;

        debug!(
            "Finish {} on {} at {:.3} (tardiness {:.3})",
            job.product.id, machine_id, now, tardiness
        );
        self.completed.push(CompletedProduct {
            product_id: job.product.id,
            product_type: job.product.product_type,
            machine_id: machine_id.clone(),
            arrival_time: job.product.arrival_time,
            processing_time: job.product.processing_time,
            start_time: job.start_time,
            completion_time: job.completion_time,
            due_date: job.product.due_date,
            tardiness,
        });

        self.dispatch()
    }

    fn dispatch(&mut self) -> Result<(), SimError> {
        let assignments = dispatch::dispatch(
            &mut *self.policy,
            &mut self.machines,
            &mut self.waiting,
            self.clock.now(),
        )?;
        for assignment in assignments {
            self.events
                .push(Event::finish(assignment.finish_time, assignment.machine_id));
        }
        Ok(())
    }

    /// Snapshot of the run so far. Calling it repeatedly without stepping
    /// yields identical numbers.
    pub fn report(&self) -> SimulationReport {
        let final_clock = self.clock.now();
        SimulationReport {
            run_id: self.run_id,
            seed: self.config.seed,
            final_clock,
            events_processed: self.events_processed,
            total_tardiness: self.total_tardiness,
            makespan: self.makespan,
            completed: self.completed.clone(),
            busy_intervals: self.stats.busy_intervals().to_vec(),
            statistics: self.stats.report(final_clock),
            unfinished: self.work_in_process(),
        }
    }

    /// Waiting plus in-process products
    pub fn work_in_process(&self) -> usize {
        self.waiting.len()
            + self
                .machines
                .iter()
                .filter(|m| m.status() == MachineStatus::Run)
                .count()
    }

    /// Get current simulation time
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    /// Machines in pool (dispatch) order
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub fn waiting(&self) -> &WaitingQueue {
        &self.waiting
    }

    pub fn completed(&self) -> &[CompletedProduct] {
        &self.completed
    }

    pub fn total_tardiness(&self) -> f64 {
        self.total_tardiness
    }

    pub fn makespan(&self) -> SimTime {
        self.makespan
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Check if there are pending events in the queue
    pub fn has_pending_events(&self) -> bool {
        self.events.has_events()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}
