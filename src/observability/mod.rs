//! Observability for crash reports and debugging.
//!
//! ## Features
//!
//! - **Logging**: `log` records and `tracing` spans through one `tracing-subscriber` sink
//! - **Panic Hook**: structured crash reports naming the phase and customer
//! - **Context Tracking**: thread-local analysis phase and customer id
//!
//! ## Usage
//!
//! ```ignore
//! use adoptmap::observability::{init_logging, install_panic_hook};
//!
//! fn main() {
//!     init_logging(verbosity);
//!     install_panic_hook();
//!     // ... rest of application
//! }
//! ```

pub mod context;
pub mod logging;
pub mod panic_hook;

pub use context::{
    completed_analyses, get_current_context, record_completed_analysis, set_current_customer,
    set_phase, AnalysisContext, AnalysisPhase, ContextGuard,
};
pub use logging::{filter_for_verbosity, init_logging};
pub use panic_hook::install_panic_hook;
