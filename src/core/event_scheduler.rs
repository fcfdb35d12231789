use super::errors::SimError;
use super::event::Event;
use super::types::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
pub struct ScheduledEvent {
    pub sequence_num: u64,
    pub event: Event,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default).
        // Equal timestamps fire in submission order.
        other
            .event
            .time
            .total_cmp(&self.event.time)
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Time-ordered queue of pending events
#[derive(Debug, Default)]
pub struct EventQueue {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    /// Insert an event; O(log n)
    pub fn push(&mut self, event: Event) {
        let scheduled_event = ScheduledEvent {
            sequence_num: self.sequence_counter,
            event,
        };

        self.event_queue.push(scheduled_event);
        self.sequence_counter += 1;
    }

    /// Remove the earliest event (ties broken by submission order)
    pub fn pop_earliest(&mut self) -> Result<Event, SimError> {
        self.event_queue
            .pop()
            .map(|scheduled| scheduled.event)
            .ok_or(SimError::EmptyQueue)
    }

    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|scheduled| scheduled.event.time)
    }

    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }
}

/// Current simulated time. Only moves forward, and only to the timestamp of
/// a popped event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Clock {
    now: SimTime,
}

impl Clock {
    pub fn new() -> Self {
        Self { now: 0.0 }
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Move to `time`, returning the previous reading
    pub(crate) fn advance_to(&mut self, time: SimTime) -> SimTime {
        debug_assert!(time >= self.now, "clock must not move backwards");
        let old = self.now;
        self.now = time;
        old
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::EventKind;
    use crate::core::types::{MachineId, ProductType};

    #[test]
    fn test_pops_in_time_order() {
        let mut queue = EventQueue::new();
        queue.push(Event::arrival(10.0, ProductType::from("A")));
        queue.push(Event::arrival(2.5, ProductType::from("B")));
        queue.push(Event::finish(7.0, MachineId::from("M1")));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek_next_time(), Some(2.5));
        assert_eq!(queue.pop_earliest().unwrap().time, 2.5);
        assert_eq!(queue.pop_earliest().unwrap().time, 7.0);
        assert_eq!(queue.pop_earliest().unwrap().time, 10.0);
        assert!(!queue.has_events());
    }

    #[test]
    fn test_equal_times_pop_in_submission_order() {
        let mut queue = EventQueue::new();
        queue.push(Event::arrival(3.0, ProductType::from("C")));
        queue.push(Event::finish(3.0, MachineId::from("M2")));
        queue.push(Event::arrival(3.0, ProductType::from("A")));

        let kinds: Vec<EventKind> = (0..3).map(|_| queue.pop_earliest().unwrap().kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Arrival { product_type: ProductType::from("C") },
                EventKind::Finish { machine_id: MachineId::from("M2") },
                EventKind::Arrival { product_type: ProductType::from("A") },
            ]
        );
    }

    #[test]
    fn test_pop_empty_is_error() {
        let mut queue = EventQueue::new();
        assert_eq!(queue.pop_earliest(), Err(SimError::EmptyQueue));
        assert_eq!(queue.peek_next_time(), None);
    }

    #[test]
    fn test_clock_advances() {
        let mut clock = Clock::new();
        assert_eq!(clock.now(), 0.0);
        assert_eq!(clock.advance_to(4.0), 0.0);
        assert_eq!(clock.advance_to(4.0), 4.0);
        assert_eq!(clock.now(), 4.0);
    }
}
