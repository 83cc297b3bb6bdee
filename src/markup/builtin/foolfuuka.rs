//! FoolFuuka archive site definition

use crate::error::Result;
use crate::markup::rules::StyleRule;
use crate::markup::site::SiteDefinition;
use crate::markup::style::Color;

const QUOTE_PATTERN: &str = r"#(\d+)";
const FULL_QUOTE_PATTERN: &str = r"/(\w+)/thread/(\d+)/#(\d+)";

/// Create the FoolFuuka site definition
pub fn foolfuuka_site() -> Result<SiteDefinition> {
    let mut site = SiteDefinition::new("foolfuuka", QUOTE_PATTERN, FULL_QUOTE_PATTERN)?;
    super::add_default_rules(&mut site);

    site.rule(
        StyleRule::tag("span")
            .css_class("greentext")
            .foreground(Color::InlineQuote)
            .linkify(),
    );
    site.rule(StyleRule::tag("a").css_class("backlink").foreground(Color::Quote));

    Ok(site)
}
