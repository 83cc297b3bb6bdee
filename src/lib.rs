//! chanmarkup - image-board comment markup parser
//!
//! Turns the HTML-ish markup boards emit for post bodies into a flat list
//! of styled spans, using per-site style rules and quote patterns.
//!
//! ```
//! use chanmarkup::markup::{Link, SiteRegistry};
//!
//! let registry = SiteRegistry::new();
//! let vichan = registry.get("vichan").unwrap();
//! let spans = vichan.parse_comment(r#"<p class="quote">#42</p>"#);
//! assert_eq!(spans[0].style.link, Some(Link::Quote { post_id: 42 }));
//! ```

pub mod config;
pub mod error;
pub mod markup;

pub use error::{MarkupError, Result};
