//! Site file support
//!
//! Extra sites are loaded from ~/.chanmarkup.toml (or
//! %USERPROFILE%\.chanmarkup.toml on Windows), or from a file given on the
//! command line.
//!
//! Example:
//! ```text
//! [[site]]
//! name = "mychan"
//! extends = "vichan"
//!
//! [[site.rule]]
//! tag = "span"
//! class = "heading"
//! foreground = "#af0a0f"
//! bold = true
//! ```
//!
//! A site that does not extend another must give both quote patterns.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{MarkupError, Result};
use crate::markup::{
    add_default_rules, Color, Handler, QuotePatternMatcher, SiteDefinition, SiteRegistry,
    StyleRule,
};

/// Top-level layout of a site file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SiteFile {
    #[serde(default)]
    site: Vec<SiteEntry>,
}

/// One `[[site]]` table
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SiteEntry {
    name: String,
    /// Site to copy rules and patterns from
    extends: Option<String>,
    /// Start from the shared default rules (ignored when extending)
    default_rules: Option<bool>,
    quote_pattern: Option<String>,
    full_quote_pattern: Option<String>,
    #[serde(default)]
    rule: Vec<RuleEntry>,
}

/// One `[[site.rule]]` table
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleEntry {
    tag: String,
    class: Option<String>,
    foreground: Option<String>,
    background: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default)]
    underline: bool,
    #[serde(default)]
    strikethrough: bool,
    #[serde(default)]
    monospace: bool,
    #[serde(default)]
    spoiler: bool,
    #[serde(default)]
    linkify: bool,
    handler: Option<String>,
}

impl RuleEntry {
    fn into_rule(self) -> Result<StyleRule> {
        let mut rule = StyleRule::tag(&self.tag);
        if let Some(class) = &self.class {
            rule = rule.css_class(class);
        }
        if let Some(fg) = &self.foreground {
            rule = rule.foreground(Color::from_name(fg)?);
        }
        if let Some(bg) = &self.background {
            rule = rule.background(Color::from_name(bg)?);
        }
        if let Some(handler) = &self.handler {
            rule = rule.handler(Handler::from_name(handler)?);
        }

        let effects = &mut rule.effects;
        effects.bold = self.bold;
        effects.italic = self.italic;
        effects.underline = self.underline;
        effects.strikethrough = self.strikethrough;
        effects.monospace = self.monospace;
        effects.spoiler = self.spoiler;
        effects.linkify = self.linkify;
        Ok(rule)
    }
}

/// Get the default site file path
pub fn config_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|home| PathBuf::from(home).join(".chanmarkup.toml"))
    }

    #[cfg(not(windows))]
    {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".chanmarkup.toml"))
    }
}

/// Read and build every site in a site file
///
/// `extends` may name a site defined earlier in the same file or one
/// already in `registry`.
pub fn load_sites(path: &Path, registry: &SiteRegistry) -> Result<Vec<SiteDefinition>> {
    let contents = fs::read_to_string(path)?;
    parse_sites(&contents, registry)
}

/// Build sites from site file contents
pub fn parse_sites(contents: &str, registry: &SiteRegistry) -> Result<Vec<SiteDefinition>> {
    let file: SiteFile = toml::from_str(contents)?;
    let mut built: Vec<SiteDefinition> = Vec::new();

    for entry in file.site {
        let site = build_site(entry, &built, registry)?;
        debug!(site = %site.name, rules = site.rules.len(), "built site from file");
        built.push(site);
    }

    Ok(built)
}

fn build_site(
    entry: SiteEntry,
    earlier: &[SiteDefinition],
    registry: &SiteRegistry,
) -> Result<SiteDefinition> {
    let base = match &entry.extends {
        Some(parent) => Some(
            earlier
                .iter()
                .rev()
                .find(|s| s.name.eq_ignore_ascii_case(parent))
                .or_else(|| registry.get(parent))
                .ok_or_else(|| MarkupError::UnknownSite(parent.clone()))?,
        ),
        None => None,
    };

    let mut site = match base {
        Some(base) => {
            let mut site = base.clone();
            site.name = entry.name.clone();
            if entry.quote_pattern.is_some() || entry.full_quote_pattern.is_some() {
                let quote = entry
                    .quote_pattern
                    .as_deref()
                    .unwrap_or(base.quotes.quote_pattern());
                let full = entry
                    .full_quote_pattern
                    .as_deref()
                    .unwrap_or(base.quotes.full_quote_pattern());
                site.quotes = QuotePatternMatcher::new(quote, full)?;
            }
            site
        }
        None => {
            let (Some(quote), Some(full)) = (&entry.quote_pattern, &entry.full_quote_pattern)
            else {
                return Err(MarkupError::MissingPattern { site: entry.name });
            };
            let mut site = SiteDefinition::new(&entry.name, quote, full)?;
            if entry.default_rules.unwrap_or(true) {
                add_default_rules(&mut site);
            }
            site
        }
    };

    for rule in entry.rule {
        site.rule(rule.into_rule()?);
    }
    Ok(site)
}
