mod common;

use adoptmap::config::TrendRules;
use adoptmap::data::demo::demo_dataset;
use adoptmap::trend::{load_snapshot, save_snapshot};
use adoptmap::{InMemoryDataSource, InMemoryTrendStore, IntelligenceEngine, RiskTrend, RuleSet, TrendStore};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn t(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

#[test]
fn test_concurrent_writers_for_distinct_customers() {
    let store = Arc::new(InMemoryTrendStore::new(10, 5.0));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let customer = format!("cust_{worker}");
                for i in 0..50 {
                    store.record(&customer, (i * 2) as u32, t(i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for worker in 0..8 {
        let history = store.history(&format!("cust_{worker}"));
        assert_eq!(history.len(), 10);
        assert_eq!(history.last().unwrap().score, 98);
        assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}

#[test]
fn test_concurrent_writers_for_same_customer_never_exceed_retention() {
    let store = Arc::new(InMemoryTrendStore::new(5, 5.0));

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut trends = Vec::new();
                for i in 0..25 {
                    trends.push(store.record_and_classify("shared", 50, t(worker * 100 + i)));
                }
                trends
            })
        })
        .collect();

    let trends: Vec<RiskTrend> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    // Exactly one call saw an empty history.
    assert_eq!(trends.iter().filter(|t| **t == RiskTrend::Unknown).count(), 1);
    assert!(trends
        .iter()
        .all(|t| matches!(t, RiskTrend::Unknown | RiskTrend::Stable)));
    assert_eq!(store.history("shared").len(), 5);
}

#[test]
fn test_trend_survives_restart_through_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trend.json");
    let rules = RuleSet::default();
    let as_of = common::as_of();
    let data = Arc::new(InMemoryDataSource::from_dataset(demo_dataset(as_of)).unwrap());

    {
        let store = Arc::new(InMemoryTrendStore::from_snapshot(
            load_snapshot(&path).unwrap(),
            &rules.trend,
        ));
        let engine = IntelligenceEngine::new(data.clone(), store.clone(), rules.clone());
        let report = engine.analyze_customer_at("cust_003", as_of).unwrap();
        assert_eq!(report.trend, RiskTrend::Unknown);
        save_snapshot(&path, &store.snapshot()).unwrap();
    }

    let store = Arc::new(InMemoryTrendStore::from_snapshot(
        load_snapshot(&path).unwrap(),
        &rules.trend,
    ));
    let engine = IntelligenceEngine::new(data, store.clone(), rules);
    let report = engine
        .analyze_customer_at("cust_003", as_of + Duration::hours(1))
        .unwrap();

    assert_eq!(report.trend, RiskTrend::Stable);
    assert_eq!(store.history("cust_003").len(), 2);
}

#[test]
fn test_snapshot_reapplies_smaller_retention() {
    let store = InMemoryTrendStore::new(10, 5.0);
    for i in 0..10 {
        store.record("c1", 10 * i as u32, t(i));
    }

    let tighter = TrendRules {
        retention: 3,
        ..TrendRules::default()
    };
    let restored = InMemoryTrendStore::from_snapshot(store.snapshot(), &tighter);
    let scores: Vec<_> = restored.history("c1").iter().map(|p| p.score).collect();
    assert_eq!(scores, vec![70, 80, 90]);
    assert_eq!(restored.classify_trend("c1"), RiskTrend::Increasing);
}
