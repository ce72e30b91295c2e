//! Thread-local context tracking for crash reports.
//!
//! Records which analysis phase and customer the current thread is working
//! on, so a panic can be reported with that context. A global atomic counter
//! tracks how many analyses have completed in this process.
//!
//! ## Thread Safety
//!
//! - Thread-local context: each thread has its own context (via `thread_local!`)
//! - Completed analyses: atomic counter shared by all threads
//! - Context guards use RAII and restore the previous context on drop

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

static ANALYSES_COMPLETED: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static CURRENT_CONTEXT: RefCell<AnalysisContext> = const { RefCell::new(AnalysisContext::new()) };
}

/// What the current thread was doing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisContext {
    pub phase: Option<AnalysisPhase>,
    pub customer_id: Option<String>,
}

impl AnalysisContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            customer_id: None,
        }
    }
}

/// Stages of one customer analysis, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    /// Reading customer, catalog, and usage facts
    DataLoading,
    /// Computing adoption gaps
    AdoptionScoring,
    /// Ranking and explaining recommendations
    Recommendation,
    /// Computing churn signals and the risk verdict
    RiskAssessment,
    /// Building the onboarding playbook
    Onboarding,
    /// Recording the score and classifying the trend
    TrendTracking,
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataLoading => write!(f, "data_loading"),
            Self::AdoptionScoring => write!(f, "adoption_scoring"),
            Self::Recommendation => write!(f, "recommendation"),
            Self::RiskAssessment => write!(f, "risk_assessment"),
            Self::Onboarding => write!(f, "onboarding"),
            Self::TrendTracking => write!(f, "trend_tracking"),
        }
    }
}

/// RAII guard that restores the previous context on drop.
pub struct ContextGuard {
    previous: AnalysisContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

fn update(apply: impl FnOnce(&mut AnalysisContext)) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        apply(&mut ctx.borrow_mut());
        ContextGuard { previous }
    })
}

/// Set the current analysis phase until the guard drops.
///
/// ```ignore
/// let _phase = set_phase(AnalysisPhase::RiskAssessment);
/// // phase restored when _phase drops
/// ```
#[must_use]
pub fn set_phase(phase: AnalysisPhase) -> ContextGuard {
    update(|ctx| ctx.phase = Some(phase))
}

/// Set the customer being analyzed until the guard drops.
#[must_use]
pub fn set_current_customer(customer_id: impl Into<String>) -> ContextGuard {
    let customer_id = customer_id.into();
    update(|ctx| ctx.customer_id = Some(customer_id))
}

pub fn record_completed_analysis() {
    ANALYSES_COMPLETED.fetch_add(1, Ordering::Relaxed);
}

#[must_use]
pub fn completed_analyses() -> usize {
    ANALYSES_COMPLETED.load(Ordering::Relaxed)
}

/// Called by the panic hook to include context in crash reports.
#[must_use]
pub fn get_current_context() -> AnalysisContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Reset the current thread's context to empty.
pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = AnalysisContext::new();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_guard_restores_previous() {
        reset_context();

        let _phase = set_phase(AnalysisPhase::DataLoading);
        {
            let _inner = set_phase(AnalysisPhase::RiskAssessment);
            assert_eq!(
                get_current_context().phase,
                Some(AnalysisPhase::RiskAssessment)
            );
        }
        assert_eq!(get_current_context().phase, Some(AnalysisPhase::DataLoading));
    }

    #[test]
    fn test_customer_and_phase_nest() {
        reset_context();

        let _customer = set_current_customer("cust_003");
        let _phase = set_phase(AnalysisPhase::TrendTracking);

        let ctx = get_current_context();
        assert_eq!(ctx.customer_id.as_deref(), Some("cust_003"));
        assert_eq!(ctx.phase, Some(AnalysisPhase::TrendTracking));
    }

    #[test]
    fn test_completed_counter_increases() {
        let before = completed_analyses();
        record_completed_analysis();
        assert!(completed_analyses() > before);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(AnalysisPhase::DataLoading.to_string(), "data_loading");
        assert_eq!(AnalysisPhase::TrendTracking.to_string(), "trend_tracking");
    }
}
