//! Sitemap filter policy.
//!
//! # Data Flow
//! ```text
//! Filter directives (include_actions, exclude_verbs, ...)
//!     → stack.rs (mutate the top FilterScope)
//!
//! Sitemap block entered / exited
//!     → stack.rs (push copy of top scope / pop it)
//!
//! Route declared inside a block, block exits
//!     → predicate.rs (route-level rules, then top scope rules)
//!     → Verdict cached on the Route
//! ```
//!
//! # Design Decisions
//! - Everything is excluded unless some rule includes it
//! - Scopes are deep copies; a nested block never mutates its parent
//! - The base scope is permanent; the stack is never empty

pub mod predicate;
pub mod stack;

use thiserror::Error;

pub use predicate::{evaluate, InclusionPolicy, Verdict};
pub use stack::{Category, FilterRule, FilterScope, FilterStack};

/// Errors raised while declaring filters.
///
/// These are configuration mistakes and surface at declaration time.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Filter category is not one of actions, verbs, names, controllers.
    #[error("unknown filter category: {0:?} (expected actions, verbs, names or controllers)")]
    UnknownCategory(String),

    /// Pattern token failed to compile.
    #[error("invalid filter pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
