//! Scoped include/exclude filter stack.
//!
//! # Responsibilities
//! - Hold one FilterScope per nested sitemap block
//! - Apply include/exclude/clear directives to the top scope
//! - Restore the parent policy when a block exits
//!
//! # Design Decisions
//! - `push` deep-copies the top scope (no shared rule lists)
//! - `reset` builds the default policy fresh every time
//! - `pop` on the base scope is a no-op

use std::fmt;
use std::str::FromStr;

use crate::filter::FilterError;
use crate::routing::matcher::Token;

/// Filter category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Actions,
    Verbs,
    Names,
    Controllers,
}

impl Category {
    /// Every category, in storage order.
    pub const ALL: [Category; 4] = [
        Category::Actions,
        Category::Verbs,
        Category::Names,
        Category::Controllers,
    ];

    /// Order in which scope-level rules are checked.
    pub const EVALUATION_ORDER: [Category; 4] = [
        Category::Actions,
        Category::Verbs,
        Category::Controllers,
        Category::Names,
    ];

    /// Actions and verbs compare in symbol form.
    pub fn is_symbolic(self) -> bool {
        matches!(self, Category::Actions | Category::Verbs)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Actions => "actions",
            Category::Verbs => "verbs",
            Category::Names => "names",
            Category::Controllers => "controllers",
        }
    }

    fn index(self) -> usize {
        match self {
            Category::Actions => 0,
            Category::Verbs => 1,
            Category::Names => 2,
            Category::Controllers => 3,
        }
    }
}

impl FromStr for Category {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().trim_start_matches(':').to_lowercase();
        match key.as_str() {
            "actions" => Ok(Category::Actions),
            "verbs" => Ok(Category::Verbs),
            "names" => Ok(Category::Names),
            "controllers" => Ok(Category::Controllers),
            _ => Err(FilterError::UnknownCategory(s.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Include and exclude tokens for one category.
///
/// Both lists keep insertion order and never hold duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRule {
    include: Vec<Token>,
    exclude: Vec<Token>,
}

impl FilterRule {
    pub fn include(&self) -> &[Token] {
        &self.include
    }

    pub fn exclude(&self) -> &[Token] {
        &self.exclude
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Included tokens leave the exclude list, so a nested scope can
    /// re-open what an outer scope excluded.
    fn add_include(&mut self, tokens: Vec<Token>) {
        self.exclude.retain(|t| !tokens.contains(t));
        push_unique(&mut self.include, tokens);
    }

    fn add_exclude(&mut self, tokens: Vec<Token>) {
        push_unique(&mut self.exclude, tokens);
    }

    fn clear(&mut self) {
        self.include.clear();
        self.exclude.clear();
    }
}

fn push_unique(list: &mut Vec<Token>, tokens: Vec<Token>) {
    for token in tokens {
        if !list.contains(&token) {
            list.push(token);
        }
    }
}

/// Normalize directive values into tokens for `category`.
pub fn normalize<I, T>(category: Category, values: I) -> Vec<Token>
where
    I: IntoIterator<Item = T>,
    T: Into<Token>,
{
    values
        .into_iter()
        .map(Into::into)
        .map(|t| if category.is_symbolic() { t.symbolize() } else { t })
        .collect()
}

/// One level of filter policy: a rule per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterScope {
    rules: [FilterRule; 4],
}

impl FilterScope {
    /// A scope with every rule empty. Route-level filters start here.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Include index/show actions, exclude post/put/delete verbs.
    pub fn default_policy() -> Self {
        let mut scope = Self::empty();
        scope.include(Category::Actions, ["index", "show"]);
        scope.exclude(Category::Verbs, ["post", "put", "delete"]);
        scope
    }

    pub fn rule(&self, category: Category) -> &FilterRule {
        &self.rules[category.index()]
    }

    /// Add values to the include list of `category`, dropping them from
    /// its exclude list.
    pub fn include<I, T>(&mut self, category: Category, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        let tokens = normalize(category, values);
        self.rules[category.index()].add_include(tokens);
    }

    /// Add values to the exclude list of `category`.
    ///
    /// The include list is left untouched; a token may sit in both.
    pub fn exclude<I, T>(&mut self, category: Category, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        let tokens = normalize(category, values);
        self.rules[category.index()].add_exclude(tokens);
    }

    pub fn clear(&mut self) {
        for rule in &mut self.rules {
            rule.clear();
        }
    }

    pub fn clear_category(&mut self, category: Category) {
        self.rules[category.index()].clear();
    }

    pub fn is_empty(&self) -> bool {
        self.rules.iter().all(FilterRule::is_empty)
    }
}

/// Stack of filter scopes mirroring nested sitemap blocks.
#[derive(Debug, Clone)]
pub struct FilterStack {
    scopes: Vec<FilterScope>,
}

impl Default for FilterStack {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStack {
    /// Create a stack holding only the default policy.
    pub fn new() -> Self {
        Self {
            scopes: vec![FilterScope::default_policy()],
        }
    }

    /// Drop every scope and start over from the default policy.
    pub fn reset(&mut self) {
        self.scopes.clear();
        self.scopes.push(FilterScope::default_policy());
    }

    /// Push a deep copy of the current scope.
    pub fn push(&mut self) {
        let copy = self.current().clone();
        self.scopes.push(copy);
    }

    /// Pop the current scope. The base scope is never removed; popping it
    /// returns a copy and leaves the stack as is.
    pub fn pop(&mut self) -> FilterScope {
        if self.scopes.len() > 1 {
            if let Some(scope) = self.scopes.pop() {
                return scope;
            }
        }
        self.current().clone()
    }

    /// The scope in effect, always the top of the stack.
    pub fn current(&self) -> &FilterScope {
        self.scopes.last().expect("filter stack is never empty")
    }

    fn current_mut(&mut self) -> &mut FilterScope {
        self.scopes.last_mut().expect("filter stack is never empty")
    }

    /// Number of scopes, including the base scope.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Scope at `level`, 0 being the base scope.
    pub fn scope(&self, level: usize) -> Option<&FilterScope> {
        self.scopes.get(level)
    }

    pub fn include_filter<I, T>(&mut self, category: Category, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.current_mut().include(category, values);
    }

    pub fn exclude_filter<I, T>(&mut self, category: Category, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.current_mut().exclude(category, values);
    }

    /// Empty every category of the current scope.
    pub fn clear_filters(&mut self) {
        self.current_mut().clear();
    }

    /// Empty a single category of the current scope.
    pub fn clear_filter(&mut self, category: Category) {
        self.current_mut().clear_category(category);
    }
}
