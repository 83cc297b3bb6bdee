//! Style types for parsed comment text
//!
//! A post body is turned into a list of [`Span`]s, each carrying the
//! [`Style`] the renderer should apply to it.

use serde::Serialize;

use crate::error::{MarkupError, Result};

/// Colors a span can request
///
/// Theme roles are resolved by the renderer; `Rgb` is a literal
/// `0xRRGGBB` value taken from the markup or a site file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Default,
    InlineQuote,
    Quote,
    Link,
    Spoiler,
    Name,
    Subject,
    DeadLink,
    Code,
    Rgb(u32),
}

impl Color {
    /// Parse a color from a role name (`inline_quote`) or hex (`#789922`, `#fff`)
    pub fn from_name(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| MarkupError::UnknownColor(name.to_string()));
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "default" => Ok(Color::Default),
            "inline_quote" => Ok(Color::InlineQuote),
            "quote" => Ok(Color::Quote),
            "link" => Ok(Color::Link),
            "spoiler" => Ok(Color::Spoiler),
            "name" => Ok(Color::Name),
            "subject" => Ok(Color::Subject),
            "dead_link" => Ok(Color::DeadLink),
            "code" => Ok(Color::Code),
            _ => Err(MarkupError::UnknownColor(name.to_string())),
        }
    }

    /// Check if this is the renderer's default color
    pub fn is_default(&self) -> bool {
        *self == Color::Default
    }
}

/// Parse `rrggbb` or `rgb` hex digits into an `Rgb` color
pub(crate) fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => u32::from_str_radix(hex, 16).ok().map(Color::Rgb),
        3 => {
            // #abc is shorthand for #aabbcc
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            u32::from_str_radix(&expanded, 16).ok().map(Color::Rgb)
        }
        _ => None,
    }
}

/// Link target attached to a span
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Link {
    /// Reference to a post in the same thread
    Quote { post_id: u64 },
    /// Reference to a post in another thread, possibly on another board
    Thread {
        board: String,
        thread_id: u64,
        post_id: u64,
    },
    /// External URL
    Url { url: String },
}

/// Text style attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    /// Fixed-width font (code blocks)
    pub monospace: bool,
    /// Hidden until revealed
    pub spoiler: bool,
    /// Link target, if this span is clickable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: attach a link
    pub fn with_link(mut self, link: Link) -> Self {
        self.link = Some(link);
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Check if this style is a quote or thread link
    pub fn is_quote(&self) -> bool {
        matches!(self.link, Some(Link::Quote { .. }) | Some(Link::Thread { .. }))
    }
}

/// A styled run of comment text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Visible text of this run
    pub text: String,
    /// Style to apply to this run
    pub style: Style,
}

impl Span {
    /// Create a new span
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Create an unstyled span
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Style::default())
    }

    /// Get the length of this span in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Concatenate the text of a span sequence
pub fn visible_text(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}
