//! Route registry and sitemap ownership.
//!
//! # Responsibilities
//! - Store routes in declaration order
//! - Own the filter stack used while routes are declared
//! - Claim routes for block-defined sitemaps as their blocks exit
//! - Resolve the owner of unclaimed routes for bare sitemaps
//! - Look up sitemap routes by name or request path
//!
//! # Ownership Resolution
//! ```text
//! block exit:   routes[start..] without an owner → owner = sitemap,
//!               verdict computed against the block's scope and cached
//!
//! bare sitemap: candidates = routes not claimed by a block sitemap
//!               owners     = sitemap routes, deepest namespace first
//!               owner      = first owner that already claimed the candidate,
//!                            or bare owner whose prefix starts its name,
//!                            else the first bare owner without a prefix
//! ```
//!
//! # Design Decisions
//! - Two passes, no recursion: eager claims at block exit, then one linear
//!   scan over sorted owners per candidate
//! - Immutable after the declaration phase; shared reads need no locking
//! - Lookup misses are `None` or empty lists, never errors

use std::cmp::Reverse;

use regex::Regex;

use crate::filter::{evaluate, FilterStack, InclusionPolicy, Verdict};
use crate::observability::metrics;
use crate::routing::mapper::Mapper;
use crate::routing::route::{Route, RouteId, RouteSpec, SitemapInfo};

/// All declared routes plus the policy used to filter them.
///
/// A `RouteSet` is mutated only while routes are declared. Once drawing is
/// finished it must not change again; from then on it can be shared across
/// threads (`&RouteSet` is `Send + Sync`) and every query is a pure read.
#[derive(Debug, Clone, Default)]
pub struct RouteSet {
    routes: Vec<Route>,
    filters: FilterStack,
    policy: InclusionPolicy,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set using `policy` for every verdict.
    pub fn with_policy(policy: InclusionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Declare routes. The mapper starts at the root namespace.
    pub fn draw<R>(&mut self, f: impl FnOnce(&mut Mapper<'_>) -> R) -> R {
        let result = {
            let mut mapper = Mapper::new(self);
            f(&mut mapper)
        };
        metrics::record_registered(self.routes.len());
        tracing::debug!(routes = self.routes.len(), "Routes drawn");
        result
    }

    /// Drop every route and reset the filter stack.
    pub fn clear(&mut self) {
        self.routes.clear();
        self.filters.reset();
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn filters(&self) -> &FilterStack {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterStack {
        &mut self.filters
    }

    pub fn policy(&self) -> &InclusionPolicy {
        &self.policy
    }

    pub fn allow_blank_route_name(&self) -> bool {
        self.policy.allow_blank_route_name
    }

    pub fn set_allow_blank_route_name(&mut self, value: bool) {
        self.policy.allow_blank_route_name = value;
    }

    /// Exclude paths matching `pattern` from every sitemap.
    pub fn add_system_path(&mut self, pattern: Regex) {
        self.policy.system_paths.push(pattern);
    }

    /// Register an ordinary route.
    pub fn add_route(&mut self, spec: RouteSpec) -> RouteId {
        let id = RouteId(self.routes.len());
        self.routes.push(Route::new(id, spec));
        id
    }

    /// Register a sitemap route.
    ///
    /// A sitemap route with the same name already registered wins; the new
    /// one is discarded and the existing id returned.
    pub fn add_sitemap_route(&mut self, spec: RouteSpec, info: SitemapInfo) -> RouteId {
        if let Some(existing) = self
            .routes
            .iter()
            .find(|r| r.is_sitemap_route() && r.name() == spec.name)
        {
            tracing::debug!(name = %spec.name, existing = %existing.id(), "Duplicate sitemap route discarded");
            return existing.id();
        }
        let id = RouteId(self.routes.len());
        self.routes.push(Route::new_sitemap(id, spec, info));
        id
    }

    /// Evaluate `route` against the scope currently on top of the stack.
    pub fn evaluate_route(&self, route: &Route) -> Verdict {
        evaluate(route, self.filters.current(), &self.policy)
    }

    /// True if `route` passes the current filters.
    pub fn include_route(&self, route: &Route) -> bool {
        self.evaluate_route(route).is_included()
    }

    /// Enter the block of a sitemap declaration.
    ///
    /// Flags the sitemap as block-defined, pushes a filter scope and returns
    /// the index the block's routes start at.
    pub fn enter_sitemap_scope(&mut self, sitemap: RouteId) -> usize {
        if let Some(route) = self.routes.get_mut(sitemap.0) {
            route.mark_defined_with_block();
        }
        self.filters.push();
        self.routes.len()
    }

    /// Leave the block of a sitemap declaration.
    ///
    /// Claims the block's routes while its scope is still on top, then pops
    /// it. Returns the number of claimed routes that were included.
    pub fn exit_sitemap_scope(&mut self, sitemap: RouteId, start: usize) -> usize {
        let included = self.run_filter(sitemap, start);
        self.filters.pop();
        tracing::debug!(
            sitemap = self.route(sitemap).map(Route::name).unwrap_or_default(),
            filtered = self.routes.len().saturating_sub(start),
            included,
            "Sitemap block closed"
        );
        included
    }

    /// Claim every unowned route from `start` on for `sitemap` and cache its
    /// verdict under the current scope. Returns how many were included.
    pub fn run_filter(&mut self, sitemap: RouteId, start: usize) -> usize {
        let scope = self.filters.current();
        let policy = &self.policy;
        let mut claimed = 0;
        let mut included = 0;

        for route in self.routes.iter_mut().skip(start) {
            if route.is_sitemap_route() || !route.assign_owner(sitemap) {
                continue;
            }
            let verdict = evaluate(route, scope, policy);
            metrics::record_verdict(verdict);
            route.set_available(verdict.is_included());
            claimed += 1;
            if verdict.is_included() {
                included += 1;
            }
        }

        metrics::record_claimed(claimed);
        included
    }

    /// Routes that are themselves sitemaps, in declaration order.
    pub fn sitemap_routes_only(&self) -> Vec<&Route> {
        self.routes.iter().filter(|r| r.is_sitemap_route()).collect()
    }

    /// Routes listed by `sitemap`, in declaration order.
    pub fn sitemap_routes(&self, sitemap: &Route) -> Vec<&Route> {
        if !sitemap.is_sitemap_route() {
            return Vec::new();
        }

        if sitemap.defined_with_block() {
            return self
                .routes
                .iter()
                .filter(|r| {
                    !r.is_sitemap_route()
                        && r.owning_sitemap_id() == Some(sitemap.id())
                        && r.is_available()
                })
                .collect();
        }

        let owners = self.potential_owners();
        self.routes
            .iter()
            .filter(|r| !r.is_sitemap_route() && !self.claimed_by_block(r))
            .filter(|r| resolve_owner(r, &owners).map(Route::id) == Some(sitemap.id()))
            .filter(|r| self.include_route(r))
            .collect()
    }

    /// Sitemap a route would be listed in, ignoring filters.
    ///
    /// Sitemap routes have no owner.
    pub fn route_owner(&self, route: &Route) -> Option<&Route> {
        if route.is_sitemap_route() {
            return None;
        }
        resolve_owner(route, &self.potential_owners())
    }

    /// Find a sitemap route by request path (`/products/sitemap.xml`), by
    /// name (`products_sitemap`) or by full route name.
    pub fn find_sitemap_route(&self, name_or_path: &str) -> Option<&Route> {
        let mut key = name_or_path.trim();
        if let Some(dot) = key.rfind('.') {
            key = &key[..dot];
        }
        if key.is_empty() {
            return None;
        }
        let full_name = format!("{}_sitemap", key);

        self.routes.iter().find(|r| {
            r.is_sitemap_route()
                && (r.path_spec().starts_with(key) || r.name() == key || r.name() == full_name)
        })
    }

    pub fn find_route_via_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name() == name)
    }

    fn claimed_by_block(&self, route: &Route) -> bool {
        route
            .owning_sitemap_id()
            .and_then(|id| self.route(id))
            .map(Route::defined_with_block)
            .unwrap_or(false)
    }

    /// Sitemap routes, deepest namespace first. Ties keep declaration order.
    fn potential_owners(&self) -> Vec<&Route> {
        let mut owners = self.sitemap_routes_only();
        owners.sort_by_key(|o| Reverse(o.namespace_depth()));
        owners
    }
}

fn resolve_owner<'a>(candidate: &Route, owners: &[&'a Route]) -> Option<&'a Route> {
    owners
        .iter()
        .copied()
        .find(|owner| {
            candidate.owning_sitemap_id() == Some(owner.id())
                || (!owner.namespace_prefix().is_empty()
                    && !owner.defined_with_block()
                    && candidate.name().starts_with(owner.namespace_prefix()))
        })
        .or_else(|| {
            owners
                .iter()
                .copied()
                .find(|owner| owner.namespace_prefix().is_empty() && !owner.defined_with_block())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Category;
    use crate::routing::route::HttpVerb;

    fn names(routes: &[&Route]) -> Vec<String> {
        routes.iter().map(|r| r.name().to_string()).collect()
    }

    #[test]
    fn test_find_sitemap_route_missing() {
        let set = RouteSet::new();
        assert!(set.find_sitemap_route("/sitemap.xml").is_none());
        assert!(set.find_sitemap_route("sitemap").is_none());
    }

    #[test]
    fn test_find_sitemap_route_variants() {
        let mut set = RouteSet::new();
        set.draw(|m| {
            m.sitemap("sitemap");
        });

        for key in ["/sitemap.xml", "sitemap", "sitemap_sitemap", "/sitemap"] {
            let found = set.find_sitemap_route(key);
            assert_eq!(found.map(Route::name), Some("sitemap_sitemap"), "key {}", key);
        }
        assert!(set.find_sitemap_route("").is_none());
        assert!(set.find_sitemap_route(".xml").is_none());
    }

    #[test]
    fn test_find_named_sitemap_only() {
        let mut set = RouteSet::new();
        set.draw(|m| {
            m.sitemap_with("duck", Default::default(), |_| {});
        });

        for key in ["/duck.xml", "duck", "duck_sitemap"] {
            assert!(set.find_sitemap_route(key).is_some(), "key {}", key);
        }
        for key in ["/sitemap.xml", "sitemap", "sitemap_sitemap"] {
            assert!(set.find_sitemap_route(key).is_none(), "key {}", key);
        }
    }

    #[test]
    fn test_find_deeply_namespaced_sitemaps() {
        let mut set = RouteSet::new();
        set.draw(|m| {
            m.sitemap_with("sitemap", Default::default(), |_| {});
            m.namespace("books", |m| {
                m.sitemap_with("duck", Default::default(), |_| {});
                m.sitemap_with("goose", Default::default(), |_| {});
                m.namespace("trucks", |m| {
                    m.sitemap_with("duck", Default::default(), |_| {});
                    m.sitemap_with("cat", Default::default(), |_| {});
                    m.namespace("cars", |m| {
                        m.sitemap_with("dog", Default::default(), |_| {});
                    });
                });
            });
        });

        let cases = [
            ("/sitemap.xml", "sitemap_sitemap"),
            ("/books/duck.xml", "books_duck_sitemap"),
            ("books_duck", "books_duck_sitemap"),
            ("/books/goose.xml", "books_goose_sitemap"),
            ("books_trucks_duck", "books_trucks_duck_sitemap"),
            ("/books/trucks/cat.xml", "books_trucks_cat_sitemap"),
            ("books_trucks_cars_dog_sitemap", "books_trucks_cars_dog_sitemap"),
            ("/books/trucks/cars/dog.xml", "books_trucks_cars_dog_sitemap"),
        ];
        for (key, expected) in cases {
            assert_eq!(
                set.find_sitemap_route(key).map(Route::name),
                Some(expected),
                "key {}",
                key
            );
        }
    }

    #[test]
    fn test_duplicate_sitemap_keeps_first() {
        let mut set = RouteSet::new();
        let (first, second) = set.draw(|m| {
            let first = m.sitemap("sitemap");
            let second = m.sitemap_with("sitemap", Default::default(), |m| {
                m.root("home#index");
            });
            (first, second)
        });

        assert_eq!(first, second);
        assert_eq!(set.sitemap_routes_only().len(), 1);

        // The block of the discarded duplicate still marks the survivor.
        let sitemap = set.route(first).unwrap();
        assert!(sitemap.defined_with_block());
        assert_eq!(names(&set.sitemap_routes(sitemap)), vec!["root"]);
    }

    #[test]
    fn test_bare_sitemap_lists_root() {
        let mut set = RouteSet::new();
        set.draw(|m| {
            m.sitemap("sitemap");
            m.root("home#index");
        });

        let sitemap = set.find_sitemap_route("/sitemap.xml").unwrap();
        assert_eq!(names(&set.sitemap_routes(sitemap)), vec!["root"]);
    }

    #[test]
    fn test_block_sitemap_lists_only_available_routes() {
        let mut set = RouteSet::new();
        set.draw(|m| {
            m.sitemap_with("sitemap", Default::default(), |m| {
                m.root("home#index");
                m.resources("books");
            });
        });

        let sitemap = set.find_sitemap_route("/sitemap.xml").unwrap();
        assert_eq!(
            names(&set.sitemap_routes(sitemap)),
            vec!["root", "books", "book"]
        );
    }

    #[test]
    fn test_namespaced_block_sitemap() {
        let mut set = RouteSet::new();
        set.draw(|m| {
            m.namespace("duck", |m| {
                m.sitemap_with("sitemap", Default::default(), |m| {
                    m.root("home#index");
                    m.resources("books");
                });
            });
        });

        let sitemap = set.find_sitemap_route("/duck/sitemap.xml").unwrap();
        assert_eq!(
            names(&set.sitemap_routes(sitemap)),
            vec!["duck_root", "duck_books", "duck_book"]
        );
    }

    #[test]
    fn test_run_filter_is_first_write_wins() {
        let mut set = RouteSet::new();
        let a = set.add_sitemap_route(
            RouteSpec {
                name: "a_sitemap".into(),
                ..Default::default()
            },
            SitemapInfo {
                raw_name: "a_sitemap".into(),
                defined_with_block: true,
                url_limit: None,
            },
        );
        let b = set.add_sitemap_route(
            RouteSpec {
                name: "b_sitemap".into(),
                ..Default::default()
            },
            SitemapInfo {
                raw_name: "b_sitemap".into(),
                defined_with_block: true,
                url_limit: None,
            },
        );
        let faqs = set.add_route(RouteSpec {
            name: "faqs".into(),
            controller_name: "faqs".into(),
            action_name: "index".into(),
            verb: HttpVerb::Get,
            path_spec: "/faqs(.:format)".into(),
            ..Default::default()
        });

        assert_eq!(set.run_filter(a, 0), 1);
        assert_eq!(set.run_filter(b, 0), 0);
        assert_eq!(set.route(faqs).unwrap().owning_sitemap_id(), Some(a));
        assert!(set.route(faqs).unwrap().is_available());
    }

    #[test]
    fn test_block_verdict_uses_block_scope() {
        let mut set = RouteSet::new();
        set.draw(|m| {
            m.sitemap_with("sitemap", Default::default(), |m| {
                m.include_actions(["new"]);
                m.resources("faqs");
            });
        });

        // The block scope is gone, the cached verdicts stay.
        assert_eq!(set.filters().depth(), 1);
        assert!(!set
            .filters()
            .current()
            .rule(Category::Actions)
            .include()
            .contains(&crate::routing::matcher::Token::symbol("new")));

        let sitemap = set.find_sitemap_route("sitemap").unwrap();
        assert_eq!(
            names(&set.sitemap_routes(sitemap)),
            vec!["faqs", "new_faq", "faq"]
        );
    }

    #[test]
    fn test_route_owner_fallback() {
        let mut set = RouteSet::new();
        set.draw(|m| {
            m.resources("chicks");
        });
        let chicks = set.find_route_via_name("chicks").unwrap();
        assert!(set.route_owner(chicks).is_none());

        set.draw(|m| {
            m.sitemap("sitemap");
        });
        let chicks = set.find_route_via_name("chicks").unwrap();
        assert_eq!(
            set.route_owner(chicks).map(Route::name),
            Some("sitemap_sitemap")
        );

        let sitemap = set.find_sitemap_route("sitemap").unwrap();
        assert!(set.route_owner(sitemap).is_none());
    }

    #[test]
    fn test_sitemap_routes_of_plain_route_is_empty() {
        let mut set = RouteSet::new();
        set.draw(|m| {
            m.sitemap("sitemap");
            m.resources("faqs");
        });
        let faqs = set.find_route_via_name("faqs").unwrap();
        assert!(set.sitemap_routes(faqs).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut set = RouteSet::new();
        set.draw(|m| {
            m.sitemap("sitemap");
            m.exclude_verbs(["get"]);
        });
        set.clear();
        assert!(set.is_empty());
        assert_eq!(
            set.filters().current(),
            &crate::filter::FilterScope::default_policy()
        );
    }

    #[test]
    fn test_shared_reads_across_threads() {
        let mut set = RouteSet::new();
        set.draw(|m| {
            m.sitemap("sitemap");
            m.root("home#index");
            m.resources("faqs");
        });
        let set = &set;

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(move || {
                        let sitemap = set.find_sitemap_route("/sitemap.xml").unwrap();
                        set.sitemap_routes(sitemap).len()
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), 3);
            }
        });
    }
}
