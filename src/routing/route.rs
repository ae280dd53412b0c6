//! The route record.
//!
//! # Responsibilities
//! - Describe one declared endpoint (name, controller, action, verb, path)
//! - Carry route-level include/exclude rules declared as route options
//! - Hold the sitemap annotations written during declaration
//!
//! # Design Decisions
//! - Ownership is write-once: the first sitemap to claim a route keeps it
//! - `defined_with_block` only ever moves from false to true
//! - Annotations are set during declaration and read-only afterwards

use std::fmt;

use serde::Serialize;

use crate::filter::FilterScope;

/// Position of a route in its RouteSet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RouteId(pub usize);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// HTTP verb of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    /// Any verb, or one the sitemap filters do not know about.
    #[default]
    Unknown,
}

impl HttpVerb {
    /// Parse a verb constraint such as `"GET"` or `"^GET$"`.
    ///
    /// Matching is by substring so anchored constraints still resolve.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("delete") {
            HttpVerb::Delete
        } else if lower.contains("get") {
            HttpVerb::Get
        } else if lower.contains("post") {
            HttpVerb::Post
        } else if lower.contains("put") {
            HttpVerb::Put
        } else {
            HttpVerb::Unknown
        }
    }

    /// Symbol compared against verb filters. Unknown verbs have none.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            HttpVerb::Get => Some("get"),
            HttpVerb::Post => Some("post"),
            HttpVerb::Put => Some("put"),
            HttpVerb::Delete => Some("delete"),
            HttpVerb::Unknown => None,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(s) => write!(f, "{}", s.to_uppercase()),
            None => f.write_str("ANY"),
        }
    }
}

/// Sitemap-only annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapInfo {
    /// Sitemap route name without the namespace prefix, e.g. `sitemap_sitemap`.
    pub raw_name: String,
    /// True once any declaration of this sitemap had a block.
    pub defined_with_block: bool,
    /// Maximum number of URL nodes the rendered sitemap may hold.
    pub url_limit: Option<u32>,
}

/// Attributes of a route as handed over by the declaration layer.
#[derive(Debug, Clone, Default)]
pub struct RouteSpec {
    pub name: String,
    pub controller_name: String,
    pub action_name: String,
    pub verb: HttpVerb,
    pub path_spec: String,
    pub namespace_prefix: String,
    pub filters: FilterScope,
    pub changefreq: Option<String>,
    pub priority: Option<String>,
}

/// One registered endpoint.
#[derive(Debug, Clone)]
pub struct Route {
    id: RouteId,
    name: String,
    controller_name: String,
    action_name: String,
    verb: HttpVerb,
    path_spec: String,
    namespace_prefix: String,
    filters: FilterScope,
    changefreq: Option<String>,
    priority: Option<String>,
    sitemap: Option<SitemapInfo>,
    owner: Option<RouteId>,
    available: bool,
}

impl Route {
    pub(crate) fn new(id: RouteId, spec: RouteSpec) -> Self {
        Self {
            id,
            name: spec.name,
            controller_name: spec.controller_name,
            action_name: spec.action_name,
            verb: spec.verb,
            path_spec: spec.path_spec,
            namespace_prefix: spec.namespace_prefix,
            filters: spec.filters,
            changefreq: spec.changefreq,
            priority: spec.priority,
            sitemap: None,
            owner: None,
            available: false,
        }
    }

    pub(crate) fn new_sitemap(id: RouteId, spec: RouteSpec, info: SitemapInfo) -> Self {
        let mut route = Self::new(id, spec);
        route.sitemap = Some(info);
        route
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    /// Route name; empty for unnamed routes.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn controller_name(&self) -> &str {
        &self.controller_name
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    pub fn path_spec(&self) -> &str {
        &self.path_spec
    }

    /// Name prefix contributed by enclosing namespaces, e.g. `products_video_`.
    pub fn namespace_prefix(&self) -> &str {
        &self.namespace_prefix
    }

    /// Number of namespace segments in the prefix.
    pub fn namespace_depth(&self) -> usize {
        self.namespace_prefix
            .split('_')
            .filter(|s| !s.is_empty())
            .count()
    }

    /// Route-level include/exclude rules.
    pub fn filters(&self) -> &FilterScope {
        &self.filters
    }

    pub fn changefreq(&self) -> Option<&str> {
        self.changefreq.as_deref()
    }

    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }

    pub fn is_sitemap_route(&self) -> bool {
        self.sitemap.is_some()
    }

    pub fn sitemap_info(&self) -> Option<&SitemapInfo> {
        self.sitemap.as_ref()
    }

    pub fn defined_with_block(&self) -> bool {
        self.sitemap
            .as_ref()
            .map(|s| s.defined_with_block)
            .unwrap_or(false)
    }

    pub fn url_limit(&self) -> Option<u32> {
        self.sitemap.as_ref().and_then(|s| s.url_limit)
    }

    /// Sitemap this route was claimed by during declaration.
    pub fn owning_sitemap_id(&self) -> Option<RouteId> {
        self.owner
    }

    /// Cached inclusion verdict.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Claim the route for `sitemap`. Returns false if already claimed.
    pub(crate) fn assign_owner(&mut self, sitemap: RouteId) -> bool {
        if self.owner.is_some() {
            return false;
        }
        self.owner = Some(sitemap);
        true
    }

    pub(crate) fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Flag a sitemap route as block-defined. Never reverts.
    pub(crate) fn mark_defined_with_block(&mut self) {
        if let Some(info) = self.sitemap.as_mut() {
            info.defined_with_block = true;
        }
    }
}
