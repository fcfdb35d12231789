pub mod config;
pub mod dispatch;
pub mod entities;
pub mod errors;
pub mod event;
pub mod event_scheduler;
pub mod random;
pub mod replication;
pub mod simulation_engine;
pub mod statistics;
pub mod types;

#[cfg(test)]
mod tests;
