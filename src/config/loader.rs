//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use regex::Regex;
use thiserror::Error;

use crate::config::schema::SitemapConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::filter::{FilterError, InclusionPolicy};
use crate::routing::RouteSet;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid system path {pattern:?}: {source}")]
    SystemPath {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SitemapConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<SitemapConfig, ConfigError> {
    let config: SitemapConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Draw every declaration of `config` into a new RouteSet.
pub fn build_route_set(config: &SitemapConfig) -> Result<RouteSet, ConfigError> {
    let mut policy = InclusionPolicy {
        allow_blank_route_name: config.allow_blank_route_name,
        ..Default::default()
    };
    for pattern in &config.system_paths {
        let re = Regex::new(pattern).map_err(|source| ConfigError::SystemPath {
            pattern: pattern.clone(),
            source,
        })?;
        policy.system_paths.push(re);
    }

    let mut set = RouteSet::with_policy(policy);
    set.draw(|m| m.apply(&config.routes))?;

    tracing::info!(
        routes = set.len(),
        sitemaps = set.sitemap_routes_only().len(),
        "Route set built"
    );
    Ok(set)
}

/// Load a route file and draw it.
pub fn load_route_set(path: &Path) -> Result<(SitemapConfig, RouteSet), ConfigError> {
    let config = load_config(path)?;
    let set = build_route_set(&config)?;
    Ok((config, set))
}
