//! Shared fixtures for integration tests.

use sitemap_router::{Mapper, Route, RouteOptions, RouteSet};

/// Names of `routes`, in order.
pub fn names(routes: &[&Route]) -> Vec<String> {
    routes.iter().map(|r| r.name().to_string()).collect()
}

/// Names of the routes listed by the sitemap found via `key`.
///
/// Panics if no sitemap matches `key`.
pub fn listed(set: &RouteSet, key: &str) -> Vec<String> {
    let sitemap = set
        .find_sitemap_route(key)
        .unwrap_or_else(|| panic!("no sitemap for {}", key));
    names(&set.sitemap_routes(sitemap))
}

/// Run `directives`, then declare a bare sitemap, root and faqs.
#[allow(dead_code)]
pub fn faqs_site(directives: impl FnOnce(&mut Mapper<'_>)) -> RouteSet {
    let mut set = RouteSet::new();
    set.draw(|m| {
        directives(m);
        m.sitemap("sitemap");
        m.root("home#index");
        m.resources("faqs");
    });
    set
}

/// Product catalogue with sitemaps nested three levels deep.
#[allow(dead_code)]
pub fn product_catalog() -> RouteSet {
    let mut set = RouteSet::new();
    set.draw(|m| {
        m.sitemap("sitemap");

        m.namespace("products", |m| {
            m.sitemap_with("sitemap", Default::default(), |m| {
                m.namespace("video", |m| {
                    m.sitemap_with("sitemap", Default::default(), |m| {
                        m.sitemap_with("bluray", Default::default(), |m| {
                            m.resources("blu_ray_players");
                        });
                        m.resources_with("dvd_players", RouteOptions::default(), |m| {
                            m.resources("comments");
                        });
                        m.resources("accessories");
                    });
                });

                m.namespace("audio", |m| {
                    m.sitemap_with("sitemap", Default::default(), |m| {
                        m.resources("head_phones");
                        m.resources("speakers");
                        m.resources("accessories");
                    });
                });

                m.resources("papers");
                m.resources("pencils");
            });
        });

        m.root("home#index");
        m.resources("faqs");
    });
    set
}

/// Sorted copy, for comparisons that ignore order.
#[allow(dead_code)]
pub fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}
