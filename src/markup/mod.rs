//! Comment markup parsing
//!
//! This module turns raw image-board post markup into styled spans:
//! - Tokenizing and repairing the HTML subset boards emit
//! - Applying per-site style rules by tag and class
//! - Resolving quote references to post and thread links

mod builtin;
mod parser;
mod quote;
mod registry;
mod rules;
mod site;
mod style;
mod tokens;
mod tree;

pub use builtin::{add_default_rules, builtin_site, is_builtin, BUILTIN_SITES};
pub use parser::{parse, MarkupParser};
pub use quote::{FullQuote, QuoteMatch, QuotePatternMatcher, QuoteTarget};
pub use registry::SiteRegistry;
pub use rules::{Effects, Handler, RuleSet, StyleRule};
pub use site::SiteDefinition;
pub use style::{visible_text, Color, Link, Span, Style};
