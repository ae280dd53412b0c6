//! Route declaration DSL.
//!
//! # Responsibilities
//! - Turn nested declarations (namespaces, resources, sitemaps) into routes
//! - Drive the filter stack as sitemap blocks open and close
//! - Forward filter directives to the scope currently in effect
//!
//! # Naming
//! ```text
//! namespace :products → resources :papers
//!     products_papers      GET    /products/papers           index
//!     (unnamed)            POST   /products/papers           create
//!     new_products_paper   GET    /products/papers/new       new
//!     edit_products_paper  GET    /products/papers/:id/edit  edit
//!     products_paper       GET    /products/papers/:id       show
//!     (unnamed)            PUT    /products/papers/:id       update
//!     (unnamed)            DELETE /products/papers/:id       destroy
//!
//! namespace :products → sitemap
//!     products_sitemap_sitemap  GET  /products/sitemap(.:format)
//! ```

use crate::config::schema::{Declaration, FilterOp};
use crate::filter::{Category, FilterError, FilterScope};
use crate::routing::matcher::Token;
use crate::routing::registry::RouteSet;
use crate::routing::route::{HttpVerb, RouteId, RouteSpec, SitemapInfo};

const FORMAT_SUFFIX: &str = "(.:format)";

/// Options of a sitemap declaration.
#[derive(Debug, Clone, Default)]
pub struct SitemapOptions {
    /// Maximum number of URL nodes in the rendered sitemap.
    pub url_limit: Option<u32>,
}

/// Per-route options: route-level filters and rendering hints.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    pub filters: FilterScope,
    pub changefreq: Option<String>,
    pub priority: Option<String>,
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include matching routes even if the scope excludes them.
    pub fn include<I, T>(mut self, category: Category, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.filters.include(category, values);
        self
    }

    /// Exclude matching routes unless a route-level include matches too.
    pub fn exclude<I, T>(mut self, category: Category, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.filters.exclude(category, values);
        self
    }

    pub fn changefreq(mut self, value: impl Into<String>) -> Self {
        self.changefreq = Some(value.into());
        self
    }

    pub fn priority(mut self, value: impl Into<String>) -> Self {
        self.priority = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
struct Scope {
    /// Path prefix, e.g. `/products/video`.
    path: String,
    /// Route name prefix, e.g. `products_video_`.
    name_prefix: String,
    /// Controller prefix, e.g. `products/video/`.
    controller_prefix: String,
}

impl Scope {
    fn namespace(&self, name: &str) -> Self {
        Self {
            path: format!("{}/{}", self.path, name),
            name_prefix: format!("{}{}_", self.name_prefix, name),
            controller_prefix: format!("{}{}/", self.controller_prefix, name),
        }
    }

    fn nested_resource(&self, plural: &str, singular: &str) -> Self {
        Self {
            path: format!("{}/{}/:{}_id", self.path, plural, singular),
            name_prefix: format!("{}{}_", self.name_prefix, singular),
            controller_prefix: self.controller_prefix.clone(),
        }
    }
}

/// Declares routes into a RouteSet. Obtained from [`RouteSet::draw`].
#[derive(Debug)]
pub struct Mapper<'a> {
    set: &'a mut RouteSet,
    scope: Scope,
}

impl<'a> Mapper<'a> {
    pub(crate) fn new(set: &'a mut RouteSet) -> Self {
        Self {
            set,
            scope: Scope::default(),
        }
    }

    /// Run `f` inside `namespace`, prefixing paths, names and controllers.
    pub fn namespace(&mut self, name: &str, f: impl FnOnce(&mut Mapper<'_>)) {
        let inner = self.scope.namespace(name);
        self.within(inner, f);
    }

    fn within<R>(&mut self, scope: Scope, f: impl FnOnce(&mut Mapper<'_>) -> R) -> R {
        let outer = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = outer;
        result
    }

    /// Declare a sitemap without a block. It lists routes no block claimed.
    pub fn sitemap(&mut self, name: &str) -> RouteId {
        self.sitemap_with_options(name, SitemapOptions::default())
    }

    pub fn sitemap_with_options(&mut self, name: &str, options: SitemapOptions) -> RouteId {
        self.add_sitemap(name, options)
    }

    /// Declare a sitemap with a block. Routes declared in `f` belong to it,
    /// filtered with the policy in effect inside the block.
    pub fn sitemap_with(
        &mut self,
        name: &str,
        options: SitemapOptions,
        f: impl FnOnce(&mut Mapper<'_>),
    ) -> RouteId {
        let id = self.add_sitemap(name, options);
        let start = self.set.enter_sitemap_scope(id);
        f(self);
        self.set.exit_sitemap_scope(id, start);
        id
    }

    fn add_sitemap(&mut self, name: &str, options: SitemapOptions) -> RouteId {
        let name = if name.is_empty() { "sitemap" } else { name };
        let raw_name = format!("{}_sitemap", name);
        let spec = RouteSpec {
            name: format!("{}{}", self.scope.name_prefix, raw_name),
            controller_name: "sitemap".to_string(),
            action_name: name.to_string(),
            verb: HttpVerb::Get,
            path_spec: format!("{}/{}{}", self.scope.path, name, FORMAT_SUFFIX),
            namespace_prefix: self.scope.name_prefix.clone(),
            ..Default::default()
        };
        let info = SitemapInfo {
            raw_name,
            defined_with_block: false,
            url_limit: options.url_limit,
        };
        self.set.add_sitemap_route(spec, info)
    }

    /// Declare the root route, e.g. `root("home#index")`.
    pub fn root(&mut self, to: &str) -> RouteId {
        let path = if self.scope.path.is_empty() {
            "/".to_string()
        } else {
            self.scope.path.clone()
        };
        let (controller, action) = split_target(to);
        let spec = RouteSpec {
            name: format!("{}root", self.scope.name_prefix),
            controller_name: format!("{}{}", self.scope.controller_prefix, controller),
            action_name: action.to_string(),
            verb: HttpVerb::Unknown,
            path_spec: path,
            namespace_prefix: self.scope.name_prefix.clone(),
            ..Default::default()
        };
        self.set.add_route(spec)
    }

    /// Declare a single route.
    ///
    /// `to` is `controller#action`; `name` is prefixed by the enclosing
    /// namespaces, an empty name leaves the route unnamed.
    pub fn route(
        &mut self,
        verb: HttpVerb,
        path: &str,
        to: &str,
        name: &str,
        options: RouteOptions,
    ) -> RouteId {
        let (controller, action) = split_target(to);
        let controller = format!("{}{}", self.scope.controller_prefix, controller);
        let path = format!(
            "{}/{}{}",
            self.scope.path,
            path.trim_start_matches('/'),
            FORMAT_SUFFIX
        );
        self.add(verb, &path, &controller, action, name, options)
    }

    pub fn get(&mut self, path: &str, to: &str, name: &str) -> RouteId {
        self.route(HttpVerb::Get, path, to, name, RouteOptions::default())
    }

    pub fn post(&mut self, path: &str, to: &str, name: &str) -> RouteId {
        self.route(HttpVerb::Post, path, to, name, RouteOptions::default())
    }

    pub fn put(&mut self, path: &str, to: &str, name: &str) -> RouteId {
        self.route(HttpVerb::Put, path, to, name, RouteOptions::default())
    }

    pub fn delete(&mut self, path: &str, to: &str, name: &str) -> RouteId {
        self.route(HttpVerb::Delete, path, to, name, RouteOptions::default())
    }

    fn add(
        &mut self,
        verb: HttpVerb,
        path: &str,
        controller: &str,
        action: &str,
        name: &str,
        options: RouteOptions,
    ) -> RouteId {
        let name = if name.is_empty() {
            String::new()
        } else {
            format!("{}{}", self.scope.name_prefix, name)
        };
        self.add_named(verb, path, controller, action, name, options)
    }

    fn add_named(
        &mut self,
        verb: HttpVerb,
        path: &str,
        controller: &str,
        action: &str,
        name: String,
        options: RouteOptions,
    ) -> RouteId {
        self.set.add_route(RouteSpec {
            name,
            controller_name: controller.to_string(),
            action_name: action.to_string(),
            verb,
            path_spec: path.to_string(),
            namespace_prefix: self.scope.name_prefix.clone(),
            filters: options.filters,
            changefreq: options.changefreq,
            priority: options.priority,
        })
    }

    /// Declare the seven CRUD routes of a resource.
    pub fn resources(&mut self, name: &str) -> Vec<RouteId> {
        self.resources_with(name, RouteOptions::default(), |_| {})
    }

    pub fn resources_with_options(&mut self, name: &str, options: RouteOptions) -> Vec<RouteId> {
        self.resources_with(name, options, |_| {})
    }

    /// Declare a resource with nested routes. Nested routes are declared
    /// first, under `/{plural}/:{singular}_id`.
    pub fn resources_with(
        &mut self,
        name: &str,
        options: RouteOptions,
        f: impl FnOnce(&mut Mapper<'_>),
    ) -> Vec<RouteId> {
        let singular = singularize(name);
        let nested = self.scope.nested_resource(name, &singular);
        self.within(nested, f);

        let prefix = self.scope.name_prefix.clone();
        let controller = format!("{}{}", self.scope.controller_prefix, name);
        let collection = format!("{}/{}", self.scope.path, name);
        let member = format!("{}/:id", collection);

        let table: [(HttpVerb, String, &str, String); 7] = [
            (HttpVerb::Get, format!("{}{}", collection, FORMAT_SUFFIX), "index", format!("{}{}", prefix, name)),
            (HttpVerb::Post, format!("{}{}", collection, FORMAT_SUFFIX), "create", String::new()),
            (HttpVerb::Get, format!("{}/new{}", collection, FORMAT_SUFFIX), "new", format!("new_{}{}", prefix, singular)),
            (HttpVerb::Get, format!("{}/edit{}", member, FORMAT_SUFFIX), "edit", format!("edit_{}{}", prefix, singular)),
            (HttpVerb::Get, format!("{}{}", member, FORMAT_SUFFIX), "show", format!("{}{}", prefix, singular)),
            (HttpVerb::Put, format!("{}{}", member, FORMAT_SUFFIX), "update", String::new()),
            (HttpVerb::Delete, format!("{}{}", member, FORMAT_SUFFIX), "destroy", String::new()),
        ];

        table
            .into_iter()
            .map(|(verb, path, action, route_name)| {
                self.add_named(verb, &path, &controller, action, route_name, options.clone())
            })
            .collect()
    }

    pub fn include_filter<I, T>(&mut self, category: Category, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.set.filters_mut().include_filter(category, values);
    }

    pub fn exclude_filter<I, T>(&mut self, category: Category, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.set.filters_mut().exclude_filter(category, values);
    }

    pub fn include_actions<I: IntoIterator<Item = T>, T: Into<Token>>(&mut self, values: I) {
        self.include_filter(Category::Actions, values);
    }

    pub fn include_verbs<I: IntoIterator<Item = T>, T: Into<Token>>(&mut self, values: I) {
        self.include_filter(Category::Verbs, values);
    }

    pub fn include_names<I: IntoIterator<Item = T>, T: Into<Token>>(&mut self, values: I) {
        self.include_filter(Category::Names, values);
    }

    pub fn include_controllers<I: IntoIterator<Item = T>, T: Into<Token>>(&mut self, values: I) {
        self.include_filter(Category::Controllers, values);
    }

    pub fn exclude_actions<I: IntoIterator<Item = T>, T: Into<Token>>(&mut self, values: I) {
        self.exclude_filter(Category::Actions, values);
    }

    pub fn exclude_verbs<I: IntoIterator<Item = T>, T: Into<Token>>(&mut self, values: I) {
        self.exclude_filter(Category::Verbs, values);
    }

    pub fn exclude_names<I: IntoIterator<Item = T>, T: Into<Token>>(&mut self, values: I) {
        self.exclude_filter(Category::Names, values);
    }

    pub fn exclude_controllers<I: IntoIterator<Item = T>, T: Into<Token>>(&mut self, values: I) {
        self.exclude_filter(Category::Controllers, values);
    }

    pub fn clear_filters(&mut self) {
        self.set.filters_mut().clear_filters();
    }

    pub fn clear_filter(&mut self, category: Category) {
        self.set.filters_mut().clear_filter(category);
    }

    pub fn reset_filters(&mut self) {
        self.set.filters_mut().reset();
    }

    pub fn allow_blank_route_name(&mut self, value: bool) {
        self.set.set_allow_blank_route_name(value);
    }

    /// Replay declarations read from a configuration file.
    pub fn apply(&mut self, declarations: &[Declaration]) -> Result<(), FilterError> {
        for declaration in declarations {
            self.apply_one(declaration)?;
        }
        Ok(())
    }

    fn apply_one(&mut self, declaration: &Declaration) -> Result<(), FilterError> {
        match declaration {
            Declaration::Sitemap {
                name,
                url_limit,
                block,
            } => {
                let options = SitemapOptions {
                    url_limit: *url_limit,
                };
                match block {
                    Some(body) => {
                        let mut result = Ok(());
                        self.sitemap_with(name, options, |m| result = m.apply(body));
                        result?;
                    }
                    None => {
                        self.sitemap_with_options(name, options);
                    }
                }
            }
            Declaration::Namespace { name, routes } => {
                let mut result = Ok(());
                self.namespace(name, |m| result = m.apply(routes));
                result?;
            }
            Declaration::Resources {
                name,
                options,
                routes,
            } => {
                let options = options.build()?;
                let mut result = Ok(());
                self.resources_with(name, options, |m| result = m.apply(routes));
                result?;
            }
            Declaration::Root { to } => {
                self.root(to);
            }
            Declaration::Route {
                verb,
                path,
                to,
                name,
                options,
            } => {
                let options = options.build()?;
                self.route(HttpVerb::parse(verb), path, to, name, options);
            }
            Declaration::Filter {
                op,
                category,
                values,
            } => {
                let category: Category = category.parse()?;
                let tokens = values
                    .iter()
                    .map(|v| Token::parse(v))
                    .collect::<Result<Vec<_>, _>>()?;
                match op {
                    FilterOp::Include => self.include_filter(category, tokens),
                    FilterOp::Exclude => self.exclude_filter(category, tokens),
                }
            }
            Declaration::ClearFilters => self.clear_filters(),
            Declaration::ClearFilter { category } => self.clear_filter(category.parse()?),
            Declaration::ResetFilters => self.reset_filters(),
            Declaration::AllowBlankRouteName { value } => self.allow_blank_route_name(*value),
        }
        Ok(())
    }
}

fn split_target(to: &str) -> (&str, &str) {
    to.split_once('#').unwrap_or((to, ""))
}

/// Naive English singular, enough for resource names.
pub fn singularize(plural: &str) -> String {
    if let Some(stem) = plural.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    for suffix in ["sses", "xes", "ches", "shes"] {
        if plural.ends_with(suffix) {
            return plural[..plural.len() - 2].to_string();
        }
    }
    match plural.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem.to_string(),
        _ => plural.to_string(),
    }
}
