//! Pure scoring functions over customer facts.
//!
//! Every score is produced together with the sentence that justifies it
//! (see [`Explained`]), so a reason shown to a user is always the one that
//! produced the number.

pub mod adoption_gap;
pub mod churn_signals;
pub mod explained;

pub use adoption_gap::{compute_adoption_gap, AdoptionGap, GapCause, Relevance};
pub use churn_signals::{compute_churn_signals, ChurnSignal, SignalKind};
pub use explained::Explained;
