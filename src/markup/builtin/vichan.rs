//! vichan (and derivatives like infinity/OpenIB) site definition

use crate::error::Result;
use crate::markup::rules::StyleRule;
use crate::markup::site::SiteDefinition;
use crate::markup::style::Color;

/// Short quotes are bare fragments, full quotes point at a thread page
const QUOTE_PATTERN: &str = r"#(\d+)";
const FULL_QUOTE_PATTERN: &str = r"/(\w+)/\w+/(\d+)\.html#(\d+)";

/// Create the vichan site definition
pub fn vichan_site() -> Result<SiteDefinition> {
    let mut site = SiteDefinition::new("vichan", QUOTE_PATTERN, FULL_QUOTE_PATTERN)?;
    super::add_default_rules(&mut site);

    // Greentext is a whole paragraph here, not a span
    site.rule(
        StyleRule::tag("p")
            .css_class("quote")
            .foreground(Color::InlineQuote)
            .linkify(),
    );

    Ok(site)
}
