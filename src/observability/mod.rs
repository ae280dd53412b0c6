//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Route declaration pass produces:
//!     → logging.rs (structured debug events per verdict, per sitemap block)
//!     → metrics.rs (verdict counters, claimed routes, registered routes)
//! ```
//!
//! # Design Decisions
//! - Library code only emits events; binaries decide where they go
//! - Log level configurable via config and environment

pub mod logging;
pub mod metrics;
