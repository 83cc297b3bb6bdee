//! Built-in site definitions
//!
//! This module provides comment parsing setups for common image-board
//! software families.

mod chan4;
mod foolfuuka;
mod vichan;

use tracing::error;

use super::rules::{Handler, StyleRule};
use super::site::SiteDefinition;
use super::style::Color;
use crate::error::Result;

/// Get all built-in site definitions
pub fn all_sites() -> Vec<SiteDefinition> {
    [
        vichan::vichan_site(),
        chan4::chan4_site(),
        foolfuuka::foolfuuka_site(),
    ]
    .into_iter()
    .filter_map(|site| match site {
        Ok(site) => Some(site),
        Err(err) => {
            error!(%err, "built-in site failed to build");
            None
        }
    })
    .collect()
}

/// Names of the built-in sites
pub const BUILTIN_SITES: &[&str] = &["vichan", "4chan", "foolfuuka"];

/// Check whether a name belongs to a built-in site
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_SITES.iter().any(|b| b.eq_ignore_ascii_case(name))
}

/// Build a built-in site by name
pub fn builtin_site(name: &str) -> Option<Result<SiteDefinition>> {
    match name.to_ascii_lowercase().as_str() {
        "vichan" => Some(vichan::vichan_site()),
        "4chan" => Some(chan4::chan4_site()),
        "foolfuuka" => Some(foolfuuka::foolfuuka_site()),
        _ => None,
    }
}

/// Rules shared by every board engine
pub fn add_default_rules(site: &mut SiteDefinition) {
    site.rule(StyleRule::tag("a").handler(Handler::Anchor));
    site.rule(StyleRule::tag("br").handler(Handler::LineBreak));
    site.rule(StyleRule::tag("font").handler(Handler::FontColor));

    site.rule(StyleRule::tag("b").bold());
    site.rule(StyleRule::tag("strong").bold());
    site.rule(StyleRule::tag("i").italic());
    site.rule(StyleRule::tag("em").italic());
    site.rule(StyleRule::tag("u").underline());
    // Boards post spoilers as plain <s>, real strikethrough uses <strike>/<del>
    site.rule(StyleRule::tag("s").spoiler().background(Color::Spoiler));
    site.rule(StyleRule::tag("strike").strikethrough());
    site.rule(StyleRule::tag("del").strikethrough());
    site.rule(StyleRule::tag("pre").monospace().background(Color::Code));
    site.rule(StyleRule::tag("code").monospace().background(Color::Code));

    // Class rules come after tag rules so they win on conflict
    site.rule(StyleRule::tag("span").css_class("quote").foreground(Color::InlineQuote).linkify());
    site.rule(
        StyleRule::tag("span")
            .css_class("spoiler")
            .spoiler()
            .background(Color::Spoiler),
    );
    site.rule(
        StyleRule::tag("span")
            .css_class("deadlink")
            .foreground(Color::DeadLink)
            .strikethrough(),
    );
    site.rule(StyleRule::tag("span").css_class("abbr").handler(Handler::Nullify));
}
