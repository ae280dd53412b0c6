//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! route file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SitemapConfig (validated, immutable)
//!     → loader.rs build_route_set (declarations replayed through the mapper)
//!     → RouteSet (frozen, shared read-only)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a fresh RouteSet
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Declarations keep file order, which decides ownership and filters

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{build_route_set, load_config, load_route_set, parse_config, ConfigError};
pub use schema::{Declaration, FilterOp, ObservabilityConfig, RouteOptionsConfig, SitemapConfig};
pub use validation::{validate_config, ValidationError};
