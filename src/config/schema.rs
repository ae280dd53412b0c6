//! Configuration schema definitions.
//!
//! This module defines the route file format. A route file holds global
//! settings plus an ordered list of declarations, replayed through the
//! mapper exactly as if they had been written in code.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::filter::{Category, FilterError};
use crate::routing::matcher::Token;
use crate::routing::mapper::RouteOptions;

/// Root configuration of a route file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SitemapConfig {
    /// Evaluate unnamed routes instead of rejecting them.
    pub allow_blank_route_name: bool,

    /// Extra path patterns excluded from every sitemap.
    pub system_paths: Vec<String>,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route declarations, in order.
    pub routes: Vec<Declaration>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Print event targets in log lines.
    pub show_target: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_target: false,
        }
    }
}

/// Filter directive kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Include,
    Exclude,
}

/// One declaration, tagged by `kind`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    /// A sitemap. With `block` present (even empty), the routes in it
    /// belong to this sitemap.
    Sitemap {
        #[serde(default = "default_sitemap_name")]
        name: String,
        #[serde(default)]
        url_limit: Option<u32>,
        #[serde(default)]
        block: Option<Vec<Declaration>>,
    },

    Namespace {
        name: String,
        #[serde(default)]
        routes: Vec<Declaration>,
    },

    /// The seven CRUD routes of a resource, plus nested declarations.
    Resources {
        name: String,
        #[serde(default)]
        options: RouteOptionsConfig,
        #[serde(default)]
        routes: Vec<Declaration>,
    },

    Root {
        to: String,
    },

    /// A single route. `to` is `controller#action`.
    Route {
        #[serde(default = "default_verb")]
        verb: String,
        path: String,
        to: String,
        #[serde(default, rename = "as")]
        name: String,
        #[serde(default)]
        options: RouteOptionsConfig,
    },

    Filter {
        op: FilterOp,
        category: String,
        #[serde(default)]
        values: Vec<String>,
    },

    ClearFilters,

    ClearFilter {
        category: String,
    },

    ResetFilters,

    AllowBlankRouteName {
        value: bool,
    },
}

fn default_sitemap_name() -> String {
    "sitemap".to_string()
}

fn default_verb() -> String {
    "get".to_string()
}

/// Route-level options as written in a route file.
///
/// `include` and `exclude` map a category name to token strings, e.g.
/// `include = { actions = ["new"] }`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouteOptionsConfig {
    pub include: BTreeMap<String, Vec<String>>,
    pub exclude: BTreeMap<String, Vec<String>>,
    pub changefreq: Option<String>,
    pub priority: Option<String>,
}

impl RouteOptionsConfig {
    /// Parse categories and tokens into mapper options.
    pub fn build(&self) -> Result<RouteOptions, FilterError> {
        let mut options = RouteOptions {
            changefreq: self.changefreq.clone(),
            priority: self.priority.clone(),
            ..Default::default()
        };
        for (category, values) in &self.include {
            let (category, tokens) = parse_rule(category, values)?;
            options.filters.include(category, tokens);
        }
        for (category, values) in &self.exclude {
            let (category, tokens) = parse_rule(category, values)?;
            options.filters.exclude(category, tokens);
        }
        Ok(options)
    }
}

fn parse_rule(category: &str, values: &[String]) -> Result<(Category, Vec<Token>), FilterError> {
    let category: Category = category.parse()?;
    let tokens = values
        .iter()
        .map(|v| Token::parse(v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((category, tokens))
}
