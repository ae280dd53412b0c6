//! Route inclusion predicate.
//!
//! # Precedence
//! ```text
//! 1. system path (assets, health, framework info)  → excluded
//! 2. blank name and blank names not allowed         → excluded
//! 3. route-level exclude match                      → excluded,
//!    unless a route-level include also matches      → included
//! 4. route-level include match                      → included
//! 5. scope exclude (actions, verbs, controllers, names) → excluded
//! 6. scope include (same order)                     → included
//! 7. nothing matched                                → excluded
//! ```
//!
//! Step 5 runs before step 6 for every category, so a verb exclude beats an
//! action include declared in the same scope. Only route-level includes can
//! override it.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::filter::stack::{Category, FilterRule, FilterScope};
use crate::routing::matcher::{match_any, Token};
use crate::routing::route::Route;

/// Paths that never belong in a sitemap.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static SYSTEM_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/assets|/rails/info/properties|^/healthz?(?:[/(.]|$)").unwrap()
});

/// Outcome of the predicate, naming the step that decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    SystemPath,
    NameMissing,
    RouteExclude,
    RouteExcludeOverridden,
    RouteInclude,
    ScopeExclude(Category),
    ScopeInclude(Category),
    NoMatch,
}

impl Verdict {
    pub fn is_included(self) -> bool {
        matches!(
            self,
            Verdict::RouteExcludeOverridden | Verdict::RouteInclude | Verdict::ScopeInclude(_)
        )
    }

    /// Short label used for logs and metric labels.
    pub fn label(self) -> &'static str {
        match self {
            Verdict::SystemPath => "system_path",
            Verdict::NameMissing => "name_missing",
            Verdict::RouteExclude => "route_exclude",
            Verdict::RouteExcludeOverridden => "route_exclude_overridden",
            Verdict::RouteInclude => "route_include",
            Verdict::ScopeExclude(_) => "scope_exclude",
            Verdict::ScopeInclude(_) => "scope_include",
            Verdict::NoMatch => "no_match",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::ScopeExclude(c) | Verdict::ScopeInclude(c) => {
                write!(f, "{} ({})", self.label(), c)
            }
            _ => f.write_str(self.label()),
        }
    }
}

/// Settings the predicate reads besides the filter scope.
#[derive(Debug, Clone, Default)]
pub struct InclusionPolicy {
    /// Evaluate unnamed routes instead of rejecting them.
    pub allow_blank_route_name: bool,
    /// Extra system paths, checked after the built-in ones.
    pub system_paths: Vec<Regex>,
}

impl InclusionPolicy {
    fn is_system_path(&self, path: &str) -> bool {
        SYSTEM_PATH_RE.is_match(path) || self.system_paths.iter().any(|re| re.is_match(path))
    }
}

fn attribute(route: &Route, category: Category) -> Option<&str> {
    match category {
        Category::Actions => Some(route.action_name()),
        Category::Verbs => route.verb().symbol(),
        Category::Names => Some(route.name()),
        Category::Controllers => Some(route.controller_name()),
    }
}

const ROUTE_LEVEL_ORDER: [Category; 4] = [
    Category::Actions,
    Category::Controllers,
    Category::Names,
    Category::Verbs,
];

fn route_level_match(route: &Route, list: fn(&FilterRule) -> &[Token]) -> bool {
    ROUTE_LEVEL_ORDER
        .iter()
        .any(|&c| match_any(attribute(route, c), list(route.filters().rule(c))))
}

/// Decide whether `route` belongs in a sitemap under `scope`.
pub fn evaluate(route: &Route, scope: &FilterScope, policy: &InclusionPolicy) -> Verdict {
    let verdict = decide(route, scope, policy);
    tracing::debug!(
        verb = %route.verb(),
        name = route.name(),
        controller = route.controller_name(),
        action = route.action_name(),
        path = route.path_spec(),
        verdict = %verdict,
        included = verdict.is_included(),
        "Route evaluated"
    );
    verdict
}

fn decide(route: &Route, scope: &FilterScope, policy: &InclusionPolicy) -> Verdict {
    if policy.is_system_path(route.path_spec()) {
        return Verdict::SystemPath;
    }

    if route.name().trim().is_empty() && !policy.allow_blank_route_name {
        return Verdict::NameMissing;
    }

    let route_included = route_level_match(route, FilterRule::include);

    if route_level_match(route, FilterRule::exclude) {
        return if route_included {
            Verdict::RouteExcludeOverridden
        } else {
            Verdict::RouteExclude
        };
    }

    if route_included {
        return Verdict::RouteInclude;
    }

    for category in Category::EVALUATION_ORDER {
        if match_any(attribute(route, category), scope.rule(category).exclude()) {
            return Verdict::ScopeExclude(category);
        }
    }

    for category in Category::EVALUATION_ORDER {
        if match_any(attribute(route, category), scope.rule(category).include()) {
            return Verdict::ScopeInclude(category);
        }
    }

    Verdict::NoMatch
}
