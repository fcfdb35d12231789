//! Text output for finished runs: the summary printout and a Gantt export.
//! Neither feeds back into the engine.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::simulation_engine::SimulationReport;
use crate::core::statistics::BusyInterval;
use crate::core::types::{MachineId, ProductType, SimTime};

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Simulation Results ---")?;
        writeln!(f, "Run: {} (seed {})", self.run_id, self.seed)?;
        writeln!(f, "Total Tardiness: {:.4}", self.total_tardiness)?;
        writeln!(f, "Makespan: {:.4}", self.makespan)?;
        writeln!(f, "Completed Products: {}", self.completed.len())?;
        for done in &self.completed {
            writeln!(
                f,
                "Product {} {}: Completion Time = {:.4}, Tardiness = {:.4}",
                done.product_type, done.product_id, done.completion_time, done.tardiness
            )?;
        }

        let stats = &self.statistics;
        writeln!(f)?;
        writeln!(f, "--- Simulation Report ---")?;
        writeln!(f, "Total simulation time: {:.2}", stats.final_clock)?;
        for machine in &stats.machines {
            writeln!(
                f,
                "Machine {} utilization: {:.2}% ({} jobs)",
                machine.machine_id,
                machine.utilization * 100.0,
                machine.jobs_completed
            )?;
        }
        writeln!(
            f,
            "Average machine utilization: {:.2}%",
            stats.average_utilization * 100.0
        )?;
        writeln!(f, "Average WIP: {:.2}", stats.average_wip)?;
        writeln!(f, "Average # of Queue: {:.2}", stats.average_queue)?;
        for product in &stats.products {
            writeln!(
                f,
                "Type {}: {} done, avg wait {:.2} (max {:.2}), avg flow {:.2} (max {:.2}), tardiness {:.2}",
                product.product_type,
                product.completed,
                product.avg_waiting_time,
                product.max_waiting_time,
                product.avg_flow_time,
                product.max_flow_time,
                product.total_tardiness
            )?;
        }
        write!(f, "Unfinished at stop: {}", self.unfinished)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GanttBar {
    pub start: SimTime,
    pub end: SimTime,
    pub product_type: ProductType,
}

/// Busy intervals grouped per machine, machines sorted by id
#[derive(Debug, Clone, Default)]
pub struct GanttChart {
    rows: BTreeMap<MachineId, Vec<GanttBar>>,
}

impl GanttChart {
    pub fn from_intervals(intervals: &[BusyInterval]) -> Self {
        let mut rows: BTreeMap<MachineId, Vec<GanttBar>> = BTreeMap::new();
        for interval in intervals {
            rows.entry(interval.machine_id.clone())
                .or_default()
                .push(GanttBar {
                    start: interval.start,
                    end: interval.end,
                    product_type: interval.product_type.clone(),
                });
        }
        Self { rows }
    }

    pub fn rows(&self) -> impl Iterator<Item = (&MachineId, &[GanttBar])> {
        self.rows.iter().map(|(id, bars)| (id, bars.as_slice()))
    }

    /// Render one line per machine, `width` columns spanning `[0, horizon]`.
    /// A column shows the first letter of the product type running at its
    /// midpoint, or a blank when the machine is idle.
    pub fn render_text(&self, horizon: SimTime, width: usize) -> String {
        let label_width = self
            .rows
            .keys()
            .map(|id| id.as_str().len())
            .max()
            .unwrap_or(0);
        let mut out = String::new();

        for (machine_id, bars) in &self.rows {
            let cells: String = (0..width)
                .map(|col| {
                    if horizon <= 0.0 {
                        return ' ';
                    }
                    let t = (col as f64 + 0.5) * horizon / width as f64;
                    bars.iter()
                        .find(|bar| bar.start <= t && t < bar.end)
                        .map(|bar| bar.product_type.as_str().chars().next().unwrap_or('?'))
                        .unwrap_or(' ')
                })
                .collect();
            out.push_str(&format!(
                "{:<label_width$} |{}|\n",
                machine_id.as_str(),
                cells,
                label_width = label_width
            ));
        }
        out
    }
}
