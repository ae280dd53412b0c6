//! Sitemap route selection library.
//!
//! Declares routes, scopes include/exclude filters over nested sitemap
//! blocks, and decides which routes each sitemap lists.

pub mod config;
pub mod filter;
pub mod observability;
pub mod routing;

pub use config::schema::SitemapConfig;
pub use filter::{Category, FilterError, FilterScope, FilterStack, Verdict};
pub use routing::{HttpVerb, Mapper, Route, RouteId, RouteOptions, RouteSet, SitemapOptions, Token};
