//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All handlers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows into every request span
//! - Metrics are cheap (no-op until a recorder is installed)

pub mod logging;
pub mod metrics;
