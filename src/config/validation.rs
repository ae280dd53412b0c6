//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check filter categories and tokens before any route is drawn
//! - Check route targets (`controller#action`) and names
//! - Check system path patterns and the log level
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SitemapConfig → Result<(), Vec<ValidationError>>
//! - Each error names the declaration it came from, e.g. `routes[1].routes[0]`

use regex::Regex;
use thiserror::Error;

use crate::config::schema::{Declaration, RouteOptionsConfig, SitemapConfig};
use crate::filter::Category;
use crate::routing::matcher::Token;
use crate::routing::HttpVerb;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
/// Verbs that route to every method. Anything else must name a known verb.
const WILDCARD_VERBS: [&str; 2] = ["any", "match"];

/// A single semantic problem in a route file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {message}")]
pub struct ValidationError {
    /// Where the problem is, e.g. `routes[2].block[0]`.
    pub location: String,
    pub message: String,
}

impl ValidationError {
    fn new(location: &str, message: impl Into<String>) -> Self {
        Self {
            location: location.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &SitemapConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let level = config.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown log level {:?}", config.observability.log_level),
        ));
    }

    for (i, pattern) in config.system_paths.iter().enumerate() {
        if let Err(e) = Regex::new(pattern) {
            errors.push(ValidationError::new(
                &format!("system_paths[{}]", i),
                format!("invalid pattern {:?}: {}", pattern, e),
            ));
        }
    }

    validate_declarations(&config.routes, "routes", &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_declarations(list: &[Declaration], path: &str, errors: &mut Vec<ValidationError>) {
    for (i, declaration) in list.iter().enumerate() {
        let here = format!("{}[{}]", path, i);
        validate_declaration(declaration, &here, errors);
    }
}

fn validate_declaration(declaration: &Declaration, here: &str, errors: &mut Vec<ValidationError>) {
    match declaration {
        Declaration::Sitemap { name, block, .. } => {
            check_segment(name, "sitemap name", here, errors);
            if let Some(block) = block {
                validate_declarations(block, &format!("{}.block", here), errors);
            }
        }
        Declaration::Namespace { name, routes } => {
            check_segment(name, "namespace name", here, errors);
            validate_declarations(routes, &format!("{}.routes", here), errors);
        }
        Declaration::Resources {
            name,
            options,
            routes,
        } => {
            check_segment(name, "resource name", here, errors);
            check_options(options, here, errors);
            validate_declarations(routes, &format!("{}.routes", here), errors);
        }
        Declaration::Root { to } => check_target(to, here, errors),
        Declaration::Route {
            verb,
            path,
            to,
            options,
            ..
        } => {
            if !known_verb(verb) {
                errors.push(ValidationError::new(
                    here,
                    format!("unknown verb {:?}", verb),
                ));
            }
            if path.trim().is_empty() {
                errors.push(ValidationError::new(here, "route path must not be empty"));
            }
            check_target(to, here, errors);
            check_options(options, here, errors);
        }
        Declaration::Filter {
            category, values, ..
        } => {
            check_category(category, here, errors);
            check_tokens(values, here, errors);
        }
        Declaration::ClearFilter { category } => check_category(category, here, errors),
        Declaration::ClearFilters
        | Declaration::ResetFilters
        | Declaration::AllowBlankRouteName { .. } => {}
    }
}

fn known_verb(verb: &str) -> bool {
    HttpVerb::parse(verb) != HttpVerb::Unknown
        || WILDCARD_VERBS.contains(&verb.trim().to_lowercase().as_str())
}

fn check_segment(name: &str, what: &str, here: &str, errors: &mut Vec<ValidationError>) {
    if name.trim().is_empty() {
        errors.push(ValidationError::new(here, format!("{} must not be empty", what)));
    } else if name.contains('/') || name.contains(char::is_whitespace) {
        errors.push(ValidationError::new(
            here,
            format!("{} {:?} must be a single path segment", what, name),
        ));
    }
}

fn check_target(to: &str, here: &str, errors: &mut Vec<ValidationError>) {
    match to.split_once('#') {
        Some((controller, action)) if !controller.is_empty() && !action.is_empty() => {}
        _ => errors.push(ValidationError::new(
            here,
            format!("target {:?} must be controller#action", to),
        )),
    }
}

fn check_category(category: &str, here: &str, errors: &mut Vec<ValidationError>) {
    if let Err(e) = category.parse::<Category>() {
        errors.push(ValidationError::new(here, e.to_string()));
    }
}

fn check_tokens(values: &[String], here: &str, errors: &mut Vec<ValidationError>) {
    for value in values {
        if let Err(e) = Token::parse(value) {
            errors.push(ValidationError::new(here, e.to_string()));
        }
    }
}

fn check_options(options: &RouteOptionsConfig, here: &str, errors: &mut Vec<ValidationError>) {
    for (category, values) in options.include.iter().chain(options.exclude.iter()) {
        check_category(category, here, errors);
        check_tokens(values, here, errors);
    }
}
