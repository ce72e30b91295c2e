//! Per-customer risk history, trajectory classification, and the
//! recommendations made at each assessment.
//!
//! Each customer's history sits behind its own lock inside a concurrent map,
//! so requests for different customers never contend on the same lock while
//! writes and reads for one customer are serialized.

pub mod persist;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::config::TrendRules;

pub use persist::{load_snapshot, save_snapshot, TrendSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTrend {
    Increasing,
    Decreasing,
    Stable,
    Unknown,
}

impl fmt::Display for RiskTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increasing => write!(f, "increasing"),
            Self::Decreasing => write!(f, "decreasing"),
            Self::Stable => write!(f, "stable"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskPoint {
    pub timestamp: DateTime<Utc>,
    pub score: u32,
}

/// Feature ids recommended to a customer at one assessment, in priority order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub timestamp: DateTime<Utc>,
    pub feature_ids: Vec<String>,
}

/// Storage for risk and recommendation history. Implementations must
/// serialize operations on the same customer id and must not block across
/// different ids.
pub trait TrendStore: Send + Sync {
    fn record(&self, customer_id: &str, score: u32, timestamp: DateTime<Utc>);

    fn classify_trend(&self, customer_id: &str) -> RiskTrend;

    /// Oldest first.
    fn history(&self, customer_id: &str) -> Vec<RiskPoint>;

    /// Append and classify as one step for the customer.
    fn record_and_classify(
        &self,
        customer_id: &str,
        score: u32,
        timestamp: DateTime<Utc>,
    ) -> RiskTrend;

    fn record_recommendations(&self, customer_id: &str, record: RecommendationRecord);

    /// The most recent `limit` records, oldest first.
    fn recommendation_history(&self, customer_id: &str, limit: usize)
        -> Vec<RecommendationRecord>;
}

/// Bounded FIFOs of one customer's assessments.
#[derive(Debug, Clone)]
struct CustomerHistory {
    points: VecDeque<RiskPoint>,
    recommendations: VecDeque<RecommendationRecord>,
    capacity: usize,
}

impl CustomerHistory {
    fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            recommendations: VecDeque::new(),
            capacity,
        }
    }

    fn push(&mut self, point: RiskPoint) {
        push_bounded(&mut self.points, point, self.capacity);
    }

    fn push_recommendations(&mut self, record: RecommendationRecord) {
        push_bounded(&mut self.recommendations, record, self.capacity);
    }

    fn classify(&self, noise_threshold: f64) -> RiskTrend {
        let n = self.points.len();
        if n < 2 {
            return RiskTrend::Unknown;
        }
        let previous = f64::from(self.points[n - 2].score);
        let latest = f64::from(self.points[n - 1].score);
        classify_change(latest - previous, noise_threshold)
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, item: T, capacity: usize) {
    queue.push_back(item);
    while queue.len() > capacity {
        queue.pop_front();
    }
}

/// Moves smaller than the noise threshold count as stable.
pub fn classify_change(delta: f64, noise_threshold: f64) -> RiskTrend {
    if delta.abs() < noise_threshold {
        RiskTrend::Stable
    } else if delta > 0.0 {
        RiskTrend::Increasing
    } else {
        RiskTrend::Decreasing
    }
}

/// Process-local trend memory.
pub struct InMemoryTrendStore {
    histories: DashMap<String, Arc<Mutex<CustomerHistory>>>,
    retention: usize,
    noise_threshold: f64,
}

impl InMemoryTrendStore {
    pub fn new(retention: usize, noise_threshold: f64) -> Self {
        Self {
            histories: DashMap::new(),
            retention: retention.max(2),
            noise_threshold,
        }
    }

    pub fn from_rules(rules: &TrendRules) -> Self {
        Self::new(rules.retention, rules.noise_threshold)
    }

    /// Rebuild a store from a persisted snapshot, re-applying retention.
    pub fn from_snapshot(snapshot: TrendSnapshot, rules: &TrendRules) -> Self {
        let store = Self::from_rules(rules);
        for (customer_id, mut points) in snapshot.customers {
            points.sort_by_key(|p| p.timestamp);
            let handle = store.entry(&customer_id);
            let mut history = handle.lock();
            for point in points {
                history.push(point);
            }
        }
        for (customer_id, mut records) in snapshot.recommendations {
            records.sort_by_key(|r| r.timestamp);
            let handle = store.entry(&customer_id);
            let mut history = handle.lock();
            for record in records {
                history.push_recommendations(record);
            }
        }
        store
    }

    pub fn snapshot(&self) -> TrendSnapshot {
        let mut customers = BTreeMap::new();
        let mut recommendations = BTreeMap::new();
        for entry in self.histories.iter() {
            let history = entry.value().lock();
            if !history.points.is_empty() {
                customers.insert(entry.key().clone(), history.points.iter().copied().collect());
            }
            if !history.recommendations.is_empty() {
                recommendations.insert(
                    entry.key().clone(),
                    history.recommendations.iter().cloned().collect(),
                );
            }
        }
        TrendSnapshot::new(customers, recommendations)
    }

    pub fn customer_count(&self) -> usize {
        self.histories.len()
    }

    /// Clone the per-customer handle so the map shard lock is released
    /// before the customer lock is taken.
    fn entry(&self, customer_id: &str) -> Arc<Mutex<CustomerHistory>> {
        if let Some(existing) = self.histories.get(customer_id) {
            return Arc::clone(existing.value());
        }
        let retention = self.retention;
        Arc::clone(
            self.histories
                .entry(customer_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(CustomerHistory::new(retention))))
                .value(),
        )
    }

    fn existing(&self, customer_id: &str) -> Option<Arc<Mutex<CustomerHistory>>> {
        self.histories
            .get(customer_id)
            .map(|entry| Arc::clone(entry.value()))
    }
}

impl TrendStore for InMemoryTrendStore {
    fn record(&self, customer_id: &str, score: u32, timestamp: DateTime<Utc>) {
        self.entry(customer_id)
            .lock()
            .push(RiskPoint { timestamp, score });
    }

    fn classify_trend(&self, customer_id: &str) -> RiskTrend {
        self.existing(customer_id)
            .map_or(RiskTrend::Unknown, |h| h.lock().classify(self.noise_threshold))
    }

    fn history(&self, customer_id: &str) -> Vec<RiskPoint> {
        self.existing(customer_id)
            .map(|h| h.lock().points.iter().copied().collect())
            .unwrap_or_default()
    }

    fn record_and_classify(
        &self,
        customer_id: &str,
        score: u32,
        timestamp: DateTime<Utc>,
    ) -> RiskTrend {
        let handle = self.entry(customer_id);
        let mut history = handle.lock();
        history.push(RiskPoint { timestamp, score });
        let trend = history.classify(self.noise_threshold);
        log::trace!(
            "Customer {} trend {} over {} points",
            customer_id,
            trend,
            history.points.len()
        );
        trend
    }

    fn record_recommendations(&self, customer_id: &str, record: RecommendationRecord) {
        self.entry(customer_id).lock().push_recommendations(record);
    }

    fn recommendation_history(
        &self,
        customer_id: &str,
        limit: usize,
    ) -> Vec<RecommendationRecord> {
        self.existing(customer_id)
            .map(|h| {
                let history = h.lock();
                let skip = history.recommendations.len().saturating_sub(limit);
                history.recommendations.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }
}
