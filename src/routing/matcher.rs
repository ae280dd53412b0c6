//! Filter token matching.
//!
//! # Responsibilities
//! - Represent filter tokens (plain strings, symbols, regular expressions)
//! - Normalize tokens for categories compared in symbol form
//! - Match a single route attribute against a list of tokens
//!
//! # Design Decisions
//! - String and symbol comparison is case-insensitive
//! - The literal `all` (string or symbol) matches any non-blank value
//! - Patterns are searched, not anchored; authors anchor them explicitly
//! - Blank values never match, whatever the token list holds

use std::fmt;

use regex::Regex;

use crate::filter::FilterError;

/// Trait for matching a route attribute against a condition.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the value satisfies this condition.
    fn matches(&self, value: &str) -> bool;
}

/// A single include/exclude filter token.
#[derive(Debug, Clone)]
pub enum Token {
    /// Compared case-insensitively against the raw value.
    Str(String),
    /// Canonical symbol form, used for actions and verbs.
    Symbol(String),
    /// Regular expression searched in the raw value.
    Pattern(Regex),
}

impl Token {
    /// Create a symbol token. Symbols are stored lower-cased.
    pub fn symbol(value: impl AsRef<str>) -> Self {
        Token::Symbol(value.as_ref().to_lowercase())
    }

    /// Compile a pattern token.
    pub fn pattern(expr: &str) -> Result<Self, FilterError> {
        Regex::new(expr)
            .map(Token::Pattern)
            .map_err(|source| FilterError::InvalidPattern {
                pattern: expr.to_string(),
                source,
            })
    }

    /// Parse the textual token syntax used in configuration files.
    ///
    /// `/expr/` is a pattern, `:name` is a symbol, anything else is a string.
    pub fn parse(raw: &str) -> Result<Self, FilterError> {
        if raw.len() >= 2 && raw.starts_with('/') && raw.ends_with('/') {
            return Token::pattern(&raw[1..raw.len() - 1]);
        }
        match raw.strip_prefix(':') {
            Some(sym) if !sym.is_empty() => Ok(Token::symbol(sym)),
            _ => Ok(Token::Str(raw.to_string())),
        }
    }

    /// Coerce to the canonical symbol form. Patterns stay patterns.
    pub fn symbolize(self) -> Self {
        match self {
            Token::Str(s) => Token::symbol(s),
            Token::Symbol(s) => Token::symbol(s),
            pattern @ Token::Pattern(_) => pattern,
        }
    }

    /// Source text of the token, without kind markers.
    pub fn as_str(&self) -> &str {
        match self {
            Token::Str(s) | Token::Symbol(s) => s,
            Token::Pattern(re) => re.as_str(),
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Str(a), Token::Str(b)) => a == b,
            (Token::Symbol(a), Token::Symbol(b)) => a == b,
            (Token::Pattern(a), Token::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Str(s) => write!(f, "{}", s),
            Token::Symbol(s) => write!(f, ":{}", s),
            Token::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::Str(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::Str(value)
    }
}

impl From<&String> for Token {
    fn from(value: &String) -> Self {
        Token::Str(value.clone())
    }
}

impl From<Regex> for Token {
    fn from(value: Regex) -> Self {
        Token::Pattern(value)
    }
}

impl From<&Token> for Token {
    fn from(value: &Token) -> Self {
        value.clone()
    }
}

impl Matcher for Token {
    fn matches(&self, value: &str) -> bool {
        match self {
            Token::Str(s) => s == "all" || value.to_lowercase() == s.to_lowercase(),
            Token::Symbol(s) => s == "all" || value.to_lowercase() == *s,
            Token::Pattern(re) => re.is_match(value),
        }
    }
}

/// Returns true if `value` matches any of `tokens`.
///
/// A blank or missing value never matches.
pub fn match_any(value: Option<&str>, tokens: &[Token]) -> bool {
    match value {
        Some(v) if !v.trim().is_empty() => tokens.iter().any(|t| t.matches(v)),
        _ => false,
    }
}
