//! Construction-time parameters of a job shop run.
//!
//! A configuration is a plain value: machine ids in dispatch order, one entry
//! per product type with its arrival and processing parameters, the horizon,
//! the seed and the due-date policy. `validate` is called by the engine before
//! anything is scheduled.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::errors::SimError;
use super::types::{MachineId, ProductType, SimTime};

/// Arrival and processing parameters for one product type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTypeConfig {
    pub product_type: ProductType,
    /// Mean interarrival time of the exponential arrival process
    pub mean_interarrival: f64,
    pub processing_mean: f64,
    pub processing_std_dev: f64,
}

impl ProductTypeConfig {
    pub fn new(
        product_type: impl Into<ProductType>,
        mean_interarrival: f64,
        processing: (f64, f64),
    ) -> Self {
        Self {
            product_type: product_type.into(),
            mean_interarrival,
            processing_mean: processing.0,
            processing_std_dev: processing.1,
        }
    }
}

/// `due = arrival + flow_allowance * processing + U(slack_low, slack_high)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DueDatePolicy {
    pub flow_allowance: f64,
    pub slack_low: f64,
    pub slack_high: f64,
}

impl Default for DueDatePolicy {
    fn default() -> Self {
        Self {
            flow_allowance: 1.6,
            slack_low: 5.0,
            slack_high: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Machine pool; this order is the dispatch order
    pub machines: Vec<MachineId>,
    /// Product types; this order is the order first arrivals are seeded in
    pub products: Vec<ProductTypeConfig>,
    pub sim_duration: SimTime,
    pub seed: u64,
    #[serde(default)]
    pub due_date: DueDatePolicy,
}

impl ShopConfig {
    /// Create an empty configuration with the given horizon
    pub fn new(sim_duration: SimTime) -> Self {
        Self {
            machines: Vec::new(),
            products: Vec::new(),
            sim_duration,
            seed: 0,
            due_date: DueDatePolicy::default(),
        }
    }

    /// Build from the two lookup tables a driver script typically carries:
    /// product type -> mean interarrival, product type -> (mean, std dev).
    ///
    /// Product order follows `arrival_rates`. A type that appears in only one
    /// of the tables is rejected.
    pub fn from_tables<M, T>(
        machines: impl IntoIterator<Item = M>,
        arrival_rates: &[(T, f64)],
        processing_params: &[(T, (f64, f64))],
        sim_duration: SimTime,
    ) -> Result<Self, SimError>
    where
        M: Into<MachineId>,
        T: AsRef<str>,
    {
        let mut config = Self::new(sim_duration);
        config.machines = machines.into_iter().map(Into::into).collect();

        for (product_type, mean_interarrival) in arrival_rates {
            let processing = processing_params
                .iter()
                .find(|(t, _)| t.as_ref() == product_type.as_ref())
                .map(|(_, params)| *params)
                .ok_or_else(|| {
                    SimError::InvalidConfig(format!(
                        "product type '{}' has an arrival rate but no processing parameters",
                        product_type.as_ref()
                    ))
                })?;
            config.products.push(ProductTypeConfig::new(
                ProductType::new(product_type.as_ref()),
                *mean_interarrival,
                processing,
            ));
        }

        if let Some((orphan, _)) = processing_params.iter().find(|(t, _)| {
            !arrival_rates
                .iter()
                .any(|(a, _)| a.as_ref() == t.as_ref())
        }) {
            return Err(SimError::InvalidConfig(format!(
                "product type '{}' has processing parameters but no arrival rate",
                orphan.as_ref()
            )));
        }

        Ok(config)
    }

    pub fn with_machine(mut self, id: impl Into<MachineId>) -> Self {
        self.machines.push(id.into());
        self
    }

    pub fn with_machines<M: Into<MachineId>>(mut self, ids: impl IntoIterator<Item = M>) -> Self {
        self.machines.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_product(
        mut self,
        product_type: impl Into<ProductType>,
        mean_interarrival: f64,
        processing: (f64, f64),
    ) -> Self {
        self.products
            .push(ProductTypeConfig::new(product_type, mean_interarrival, processing));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_due_date_policy(mut self, policy: DueDatePolicy) -> Self {
        self.due_date = policy;
        self
    }

    pub fn product(&self, product_type: &ProductType) -> Option<&ProductTypeConfig> {
        self.products.iter().find(|p| &p.product_type == product_type)
    }

    /// Reject parameters no distribution can sample from.
    ///
    /// A zero horizon is accepted and produces an empty run.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.sim_duration.is_finite() || self.sim_duration < 0.0 {
            return Err(SimError::InvalidDistributionParameter(format!(
                "sim_duration must be finite and non-negative, got {}",
                self.sim_duration
            )));
        }

        let mut seen_machines = HashSet::new();
        for id in &self.machines {
            if !seen_machines.insert(id) {
                return Err(SimError::InvalidConfig(format!("duplicate machine id '{}'", id)));
            }
        }

        let mut seen_types = HashSet::new();
        for product in &self.products {
            if !seen_types.insert(&product.product_type) {
                return Err(SimError::InvalidConfig(format!(
                    "duplicate product type '{}'",
                    product.product_type
                )));
            }
            if !product.mean_interarrival.is_finite() || product.mean_interarrival <= 0.0 {
                return Err(SimError::InvalidDistributionParameter(format!(
                    "mean interarrival for '{}' must be positive, got {}",
                    product.product_type, product.mean_interarrival
                )));
            }
            // A negative mean is allowed; sampled times are clamped at zero
            if !product.processing_mean.is_finite() {
                return Err(SimError::InvalidDistributionParameter(format!(
                    "processing mean for '{}' must be finite, got {}",
                    product.product_type, product.processing_mean
                )));
            }
            if !product.processing_std_dev.is_finite() || product.processing_std_dev < 0.0 {
                return Err(SimError::InvalidDistributionParameter(format!(
                    "processing std dev for '{}' must be non-negative, got {}",
                    product.product_type, product.processing_std_dev
                )));
            }
        }

        let policy = &self.due_date;
        if !policy.flow_allowance.is_finite() || policy.flow_allowance < 0.0 {
            return Err(SimError::InvalidDistributionParameter(format!(
                "due-date flow allowance must be non-negative, got {}",
                policy.flow_allowance
            )));
        }
        if !policy.slack_low.is_finite()
            || !policy.slack_high.is_finite()
            || policy.slack_high < policy.slack_low
        {
            return Err(SimError::InvalidDistributionParameter(format!(
                "due-date slack must satisfy low <= high, got [{}, {}]",
                policy.slack_low, policy.slack_high
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ShopConfig {
        ShopConfig::new(100.0)
            .with_machines(["M1", "M2"])
            .with_product("A", 4.0, (5.0, 2.0))
    }

    #[test]
    fn test_builder_keeps_order() {
        let config = base().with_machine("M0").with_product("B", 8.0, (7.0, 2.0)).with_seed(9);
        let machines: Vec<&str> = config.machines.iter().map(|m| m.as_str()).collect();
        assert_eq!(machines, vec!["M1", "M2", "M0"]);
        assert_eq!(config.products[1].product_type.as_str(), "B");
        assert_eq!(config.seed, 9);
        assert_eq!(config.due_date, DueDatePolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_tables_joins_by_type() {
        let config = ShopConfig::from_tables(
            ["M1", "M2", "M3"],
            &[("A", 4.0), ("B", 8.0)],
            &[("B", (7.0, 2.0)), ("A", (5.0, 2.0))],
            1000.0,
        )
        .unwrap();

        assert_eq!(config.machines.len(), 3);
        let a = config.product(&ProductType::from("A")).unwrap();
        assert_eq!(a.mean_interarrival, 4.0);
        assert_eq!((a.processing_mean, a.processing_std_dev), (5.0, 2.0));
        assert_eq!(config.products[1].product_type.as_str(), "B");
    }

    #[test]
    fn test_from_tables_rejects_unmatched_types() {
        let missing_params =
            ShopConfig::from_tables(["M1"], &[("A", 4.0)], &[("B", (1.0, 0.0))], 10.0);
        assert!(matches!(missing_params, Err(SimError::InvalidConfig(_))));

        let missing_rate = ShopConfig::from_tables(
            ["M1"],
            &[("A", 4.0)],
            &[("A", (1.0, 0.0)), ("B", (1.0, 0.0))],
            10.0,
        );
        assert!(matches!(missing_rate, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        let config = base().with_product("B", 0.0, (1.0, 0.0));
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidDistributionParameter(_))
        ));
    }

    #[test]
    fn test_rejects_negative_duration_but_allows_zero() {
        let mut config = base();
        config.sim_duration = -1.0;
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidDistributionParameter(_))
        ));
        config.sim_duration = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_duplicates() {
        let dup_machine = base().with_machine("M1");
        assert!(matches!(dup_machine.validate(), Err(SimError::InvalidConfig(_))));

        let dup_type = base().with_product("A", 3.0, (1.0, 0.0));
        assert!(matches!(dup_type.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_processing_mean_must_be_finite_but_may_be_negative() {
        let negative = base().with_product("B", 8.0, (-1.0, 0.5));
        assert!(negative.validate().is_ok());

        let infinite = base().with_product("B", 8.0, (f64::INFINITY, 0.5));
        assert!(matches!(
            infinite.validate(),
            Err(SimError::InvalidDistributionParameter(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_slack() {
        let config = base().with_due_date_policy(DueDatePolicy {
            flow_allowance: 1.6,
            slack_low: 10.0,
            slack_high: 5.0,
        });
        assert!(config.validate().is_err());
    }
}
