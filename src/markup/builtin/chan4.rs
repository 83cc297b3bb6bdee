//! 4chan site definition

use crate::error::Result;
use crate::markup::rules::StyleRule;
use crate::markup::site::SiteDefinition;
use crate::markup::style::Color;

const QUOTE_PATTERN: &str = r"#p(\d+)";
const FULL_QUOTE_PATTERN: &str = r"/(\w+)/\w+/(\d+)#p(\d+)";

/// Create the 4chan site definition
pub fn chan4_site() -> Result<SiteDefinition> {
    let mut site = SiteDefinition::new("4chan", QUOTE_PATTERN, FULL_QUOTE_PATTERN)?;
    super::add_default_rules(&mut site);

    site.rule(StyleRule::tag("span").css_class("fortune").bold());
    site.rule(StyleRule::tag("pre").css_class("prettyprint").monospace().background(Color::Code));

    Ok(site)
}
