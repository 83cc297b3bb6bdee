//! Site definitions
//!
//! A [`SiteDefinition`] bundles everything one image-board software family
//! needs to parse its comments: style rules and quote patterns.

use super::parser::MarkupParser;
use super::quote::QuotePatternMatcher;
use super::rules::{RuleSet, StyleRule};
use super::style::Span;
use crate::error::Result;

/// A complete site variant for comment parsing
#[derive(Debug, Clone)]
pub struct SiteDefinition {
    /// Site name (e.g., "vichan", "4chan")
    pub name: String,
    /// Style rules, in registration order
    pub rules: RuleSet,
    /// Quote reference patterns
    pub quotes: QuotePatternMatcher,
}

impl SiteDefinition {
    /// Create a site with no rules
    ///
    /// Fails if either quote pattern is invalid.
    pub fn new(name: &str, quote_pattern: &str, full_quote_pattern: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            rules: RuleSet::new(),
            quotes: QuotePatternMatcher::new(quote_pattern, full_quote_pattern)?,
        })
    }

    /// Add a style rule
    pub fn rule(&mut self, rule: StyleRule) {
        self.rules.add_rule(rule);
    }

    /// Borrow a parser for this site
    pub fn parser(&self) -> MarkupParser<'_> {
        MarkupParser::new(&self.rules, &self.quotes)
    }

    /// Parse one post body
    pub fn parse_comment(&self, raw: &str) -> Vec<Span> {
        self.parser().parse(raw)
    }
}
