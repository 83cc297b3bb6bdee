//! Site registry
//!
//! This module provides the SiteRegistry that maps site names to their
//! definitions, starting from the built-in sites and optionally extended
//! from a site file.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use super::builtin;
use super::site::SiteDefinition;
use super::style::Span;
use crate::config;
use crate::error::{MarkupError, Result};

/// Name to site definition table
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    /// Sites keyed by lowercase name
    sites: HashMap<String, SiteDefinition>,
}

impl SiteRegistry {
    /// Create a registry with the built-in sites
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for site in builtin::all_sites() {
            registry.sites.insert(site.name.to_lowercase(), site);
        }
        registry
    }

    /// Create a registry with no sites at all
    pub fn empty() -> Self {
        Self {
            sites: HashMap::new(),
        }
    }

    /// Add a site, replacing any site with the same name
    pub fn add_site(&mut self, site: SiteDefinition) {
        let key = site.name.to_lowercase();
        if builtin::is_builtin(&key) && self.sites.contains_key(&key) {
            warn!(site = %site.name, "site file replaces built-in site");
        }
        self.sites.insert(key, site);
    }

    /// Get a site by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&SiteDefinition> {
        self.sites.get(&name.to_lowercase())
    }

    /// Get a site by name, or fail with `UnknownSite`
    pub fn require(&self, name: &str) -> Result<&SiteDefinition> {
        self.get(name)
            .ok_or_else(|| MarkupError::UnknownSite(name.to_string()))
    }

    /// Load sites from a TOML site file
    ///
    /// Returns the number of sites added.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let sites = config::load_sites(path, self)?;
        let count = sites.len();
        for site in sites {
            self.add_site(site);
        }
        info!(path = %path.display(), count, "loaded site file");
        Ok(count)
    }

    /// Parse a post body with a named site
    pub fn parse_comment(&self, site: &str, raw: &str) -> Result<Vec<Span>> {
        Ok(self.require(site)?.parse_comment(raw))
    }

    /// List available sites
    pub fn list_sites(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.sites.values().map(|s| s.name.as_str()).collect();
        names.sort();
        names
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
