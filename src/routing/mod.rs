//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Declaration phase (at startup):
//!     RouteSet::draw
//!     → mapper.rs (namespaces, resources, sitemaps, filter directives)
//!     → registry.rs (append routes, push/pop filter scopes,
//!                    claim block routes and cache their verdicts)
//!
//! Query phase (read-only):
//!     "/products/sitemap.xml"
//!     → registry.rs find_sitemap_route
//!     → registry.rs sitemap_routes (cached verdicts or live predicate)
//!     → Return: routes listed by that sitemap
//! ```
//!
//! # Design Decisions
//! - Routes declared at startup, immutable afterwards
//! - Routes keep declaration order; every query preserves it
//! - Lookup misses are absent results, not errors

pub mod mapper;
pub mod matcher;
pub mod registry;
pub mod route;

pub use mapper::{Mapper, RouteOptions, SitemapOptions};
pub use matcher::{match_any, Matcher, Token};
pub use registry::RouteSet;
pub use route::{HttpVerb, Route, RouteId, RouteSpec, SitemapInfo};
