//! Sitemap route inspector.
//!
//! Loads a route file, draws it and answers questions about the result.
//!
//! # Commands
//!
//! ```text
//! sitemap-router --config routes.toml sitemaps
//!     every sitemap route, its block flag and how many routes it lists
//!
//! sitemap-router --config routes.toml routes /products/sitemap.xml
//!     routes listed by one sitemap (by request path or name)
//!
//! sitemap-router --config routes.toml owners
//!     every route with its resolved owner and inclusion verdict
//!
//! sitemap-router --config routes.toml find products_sitemap
//!     one sitemap route, or any route with that name
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use sitemap_router::config::{build_route_set, load_config, ConfigError, SitemapConfig};
use sitemap_router::observability::logging::init_logging;
use sitemap_router::{Route, RouteSet};

#[derive(Parser)]
#[command(name = "sitemap-router")]
#[command(about = "Inspect which routes each sitemap lists", long_about = None)]
struct Cli {
    /// Route file (TOML).
    #[arg(short, long)]
    config: PathBuf,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sitemap routes
    Sitemaps,
    /// List the routes of one sitemap
    Routes {
        /// Sitemap request path or name, e.g. /sitemap.xml
        sitemap: String,
    },
    /// Show the owner and verdict of every route
    Owners,
    /// Look up a sitemap by path or name, falling back to any route name
    Find {
        name_or_path: String,
    },
}

#[derive(Debug, Serialize)]
struct RouteView {
    id: usize,
    name: String,
    verb: String,
    path: String,
    controller: String,
    action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    changefreq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<String>,
}

impl From<&Route> for RouteView {
    fn from(route: &Route) -> Self {
        Self {
            id: route.id().0,
            name: route.name().to_string(),
            verb: route.verb().to_string(),
            path: route.path_spec().to_string(),
            controller: route.controller_name().to_string(),
            action: route.action_name().to_string(),
            changefreq: route.changefreq().map(str::to_string),
            priority: route.priority().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
struct SitemapView {
    name: String,
    path: String,
    defined_with_block: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    url_limit: Option<u32>,
    routes: usize,
}

#[derive(Debug, Serialize)]
struct OwnerView {
    route: RouteView,
    owner: Option<String>,
    included: bool,
}

fn sitemaps(set: &RouteSet) -> Vec<SitemapView> {
    set.sitemap_routes_only()
        .into_iter()
        .map(|sitemap| SitemapView {
            name: sitemap.name().to_string(),
            path: sitemap.path_spec().to_string(),
            defined_with_block: sitemap.defined_with_block(),
            url_limit: sitemap.url_limit(),
            routes: set.sitemap_routes(sitemap).len(),
        })
        .collect()
}

fn owners(set: &RouteSet) -> Vec<OwnerView> {
    set.routes()
        .iter()
        .filter(|r| !r.is_sitemap_route())
        .map(|route| {
            let owner = set.route_owner(route);
            let included = owner
                .map(|o| set.sitemap_routes(o).iter().any(|r| r.id() == route.id()))
                .unwrap_or(false);
            OwnerView {
                route: route.into(),
                owner: owner.map(|o| o.name().to_string()),
                included,
            }
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_route(route: &RouteView) {
    println!(
        "{:<6} {:<32} {:<40} {}#{}",
        route.verb, route.name, route.path, route.controller, route.action
    );
}

/// Read the route file, install logging, then draw the routes.
///
/// Logging goes up before drawing so per-route verdicts are not lost.
fn prepare(path: &Path) -> Result<(SitemapConfig, RouteSet), ConfigError> {
    let config = load_config(path)?;
    init_logging(&config.observability);
    let set = build_route_set(&config)?;
    Ok((config, set))
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (_, set) = prepare(&cli.config)?;

    tracing::info!(
        config = %cli.config.display(),
        routes = set.len(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Sitemaps => {
            let views = sitemaps(&set);
            if cli.json {
                print_json(&views)?;
            } else {
                for view in &views {
                    println!(
                        "{:<32} {:<32} block={:<5} routes={}",
                        view.name, view.path, view.defined_with_block, view.routes
                    );
                }
            }
        }
        Commands::Routes { sitemap } => {
            let Some(found) = set.find_sitemap_route(&sitemap) else {
                eprintln!("Error: no sitemap matches {:?}", sitemap);
                return Ok(ExitCode::FAILURE);
            };
            let views: Vec<RouteView> = set
                .sitemap_routes(found)
                .into_iter()
                .map(RouteView::from)
                .collect();
            if cli.json {
                print_json(&views)?;
            } else {
                views.iter().for_each(print_route);
            }
        }
        Commands::Owners => {
            let views = owners(&set);
            if cli.json {
                print_json(&views)?;
            } else {
                for view in &views {
                    println!(
                        "{:<32} {:<32} {}",
                        view.route.name,
                        view.owner.as_deref().unwrap_or("-"),
                        if view.included { "included" } else { "excluded" }
                    );
                }
            }
        }
        Commands::Find { name_or_path } => {
            let found = set
                .find_sitemap_route(&name_or_path)
                .or_else(|| set.find_route_via_name(&name_or_path));
            let Some(route) = found else {
                eprintln!("Error: nothing matches {:?}", name_or_path);
                return Ok(ExitCode::FAILURE);
            };
            let view = RouteView::from(route);
            if cli.json {
                print_json(&view)?;
            } else {
                print_route(&view);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn drawn() -> RouteSet {
        let mut set = RouteSet::new();
        set.draw(|m| {
            m.sitemap("sitemap");
            m.root("home#index");
            m.namespace("products", |m| {
                m.sitemap_with("sitemap", Default::default(), |m| {
                    m.resources("papers");
                });
            });
        });
        set
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
        let cli = Cli::try_parse_from(["sitemap-router", "-c", "routes.toml", "--json", "routes", "/sitemap.xml"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Routes { sitemap } if sitemap == "/sitemap.xml"));
    }

    #[test]
    fn test_sitemap_views() {
        let set = drawn();
        let views = sitemaps(&set);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].name, "sitemap_sitemap");
        assert_eq!(views[0].routes, 1);
        assert!(views[1].defined_with_block);
        assert_eq!(views[1].routes, 2);
    }

    #[test]
    fn test_owner_views() {
        let set = drawn();
        let views = owners(&set);
        let root = views.iter().find(|v| v.route.name == "root").unwrap();
        assert_eq!(root.owner.as_deref(), Some("sitemap_sitemap"));
        assert!(root.included);

        let new_paper = views
            .iter()
            .find(|v| v.route.name == "new_products_paper")
            .unwrap();
        assert_eq!(new_paper.owner.as_deref(), Some("products_sitemap_sitemap"));
        assert!(!new_paper.included);

        let json = serde_json::to_value(root).unwrap();
        assert_eq!(json["route"]["verb"], "ANY");
        assert!(json["route"].get("changefreq").is_none());
    }

    #[test]
    fn test_prepare_installs_logging_and_draws() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/routes.toml");
        let (config, set) = prepare(&path).unwrap();
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(set.len(), 42);
        // The subscriber is already in place.
        assert!(!init_logging(&config.observability));
    }
}
