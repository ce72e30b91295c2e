//! Data access for customer, catalog, and usage facts.
//!
//! The engine never reads storage directly. It goes through [`DataAccess`],
//! which keeps analysis free of I/O and lets tests and hosting layers supply
//! their own sources:
//! - [`InMemoryDataSource`] for datasets already resident in memory
//! - JSON datasets via [`InMemoryDataSource::from_json_file`]
//! - the built-in demo accounts in [`demo`]

pub mod demo;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::core::{Customer, Error, Feature, FeatureUsage, Result, UsageSet};

/// Read-only access to the facts one analysis needs.
///
/// # Implementation Notes
///
/// Implementations must be `Send + Sync`; the engine is shared across
/// threads and may issue concurrent reads for different customers.
pub trait DataAccess: Send + Sync {
    /// Look up one customer. `None` means the id is unknown.
    fn get_customer(&self, customer_id: &str) -> Option<Customer>;

    /// The full product catalog, regardless of plan.
    fn get_feature_catalog(&self) -> Vec<Feature>;

    /// Usage records for a customer. `None` means the id is unknown;
    /// a known customer without activity gets an empty set.
    fn get_usage(&self, customer_id: &str) -> Option<UsageSet>;

    /// Every known customer, ordered by id.
    fn list_customers(&self) -> Vec<Customer>;
}

/// Serialized dataset shape: `{ "customers": [...], "features": [...], "usage": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub usage: Vec<FeatureUsage>,
}

impl Dataset {
    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customers.push(customer);
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn with_usage(mut self, usage: FeatureUsage) -> Self {
        self.usage.push(usage);
        self
    }
}

/// Validated, immutable in-memory facts.
#[derive(Debug, Clone)]
pub struct InMemoryDataSource {
    customers: BTreeMap<String, Customer>,
    catalog: Vec<Feature>,
    usage: BTreeMap<String, UsageSet>,
}

impl InMemoryDataSource {
    /// Validate a dataset and index it by customer.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` when:
    /// - a customer or feature id is duplicated
    /// - a customer record is malformed (empty id, negative MRR)
    /// - a usage record points at an unknown customer or feature
    /// - a (customer, feature) usage pair appears twice
    pub fn from_dataset(dataset: Dataset) -> Result<Self> {
        let mut customers = BTreeMap::new();
        for customer in dataset.customers {
            customer.validate()?;
            if customers.contains_key(&customer.id) {
                return Err(Error::invariant(format!(
                    "duplicate customer id {}",
                    customer.id
                )));
            }
            customers.insert(customer.id.clone(), customer);
        }

        let mut feature_ids = BTreeSet::new();
        for feature in &dataset.features {
            if !feature_ids.insert(feature.id.as_str()) {
                return Err(Error::invariant(format!(
                    "duplicate feature id {}",
                    feature.id
                )));
            }
        }

        let mut grouped: BTreeMap<String, Vec<FeatureUsage>> = BTreeMap::new();
        for record in dataset.usage {
            if !customers.contains_key(&record.customer_id) {
                return Err(Error::invariant(format!(
                    "usage references unknown customer {}",
                    record.customer_id
                )));
            }
            if !feature_ids.contains(record.feature_id.as_str()) {
                return Err(Error::invariant(format!(
                    "usage references unknown feature {}",
                    record.feature_id
                )));
            }
            grouped
                .entry(record.customer_id.clone())
                .or_default()
                .push(record);
        }

        let usage = customers
            .keys()
            .map(|id| {
                let records = grouped.remove(id).unwrap_or_default();
                UsageSet::new(id.clone(), records).map(|set| (id.clone(), set))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        log::debug!(
            "Loaded {} customers, {} features",
            customers.len(),
            dataset.features.len()
        );

        Ok(Self {
            customers,
            catalog: dataset.features,
            usage,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        Self::from_dataset(dataset)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        log::info!("Loading dataset from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

impl DataAccess for InMemoryDataSource {
    fn get_customer(&self, customer_id: &str) -> Option<Customer> {
        self.customers.get(customer_id).cloned()
    }

    fn get_feature_catalog(&self) -> Vec<Feature> {
        self.catalog.clone()
    }

    fn get_usage(&self, customer_id: &str) -> Option<UsageSet> {
        self.usage.get(customer_id).cloned()
    }

    fn list_customers(&self) -> Vec<Customer> {
        self.customers.values().cloned().collect()
    }
}
