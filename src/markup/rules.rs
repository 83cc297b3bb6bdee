//! Style rules for comment markup
//!
//! A [`StyleRule`] matches a tag (and optionally a CSS class) and carries
//! the effects to apply to everything inside that element. A [`RuleSet`]
//! keeps rules in registration order for one site.

use tracing::trace;

use super::style::{Color, Style};
use crate::error::{MarkupError, Result};

/// Custom behaviour attached to a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// Turn the element's `href` into a quote, thread or URL link
    Anchor,
    /// Emit a newline (`<br>`)
    LineBreak,
    /// Drop the element and its contents
    Nullify,
    /// Take the foreground color from the `color` attribute (`<font>`)
    FontColor,
}

impl Handler {
    /// Parse a handler from its site-file name
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "anchor" => Ok(Handler::Anchor),
            "line_break" => Ok(Handler::LineBreak),
            "nullify" => Ok(Handler::Nullify),
            "font_color" => Ok(Handler::FontColor),
            _ => Err(MarkupError::UnknownHandler(name.to_string())),
        }
    }
}

/// Effects a rule applies. `None`/`false` fields leave the inherited value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub monospace: bool,
    pub spoiler: bool,
    /// Detect bare URLs in text below this element
    pub linkify: bool,
    pub handler: Option<Handler>,
}

impl Effects {
    /// Layer these effects on top of an inherited style
    pub fn apply(&self, style: &mut Style) {
        if let Some(fg) = self.foreground {
            style.fg = fg;
        }
        if let Some(bg) = self.background {
            style.bg = bg;
        }
        style.bold |= self.bold;
        style.italic |= self.italic;
        style.underline |= self.underline;
        style.strikethrough |= self.strikethrough;
        style.monospace |= self.monospace;
        style.spoiler |= self.spoiler;
    }
}

/// A tag/class triggered style rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// Tag name, stored lowercase
    pub tag: String,
    /// Required class token, if any
    pub css_class: Option<String>,
    pub effects: Effects,
}

impl StyleRule {
    /// Start a rule matching a tag name
    pub fn tag(name: &str) -> Self {
        Self {
            tag: name.to_ascii_lowercase(),
            css_class: None,
            effects: Effects::default(),
        }
    }

    /// Builder: require a class token
    pub fn css_class(mut self, class: &str) -> Self {
        self.css_class = Some(class.to_string());
        self
    }

    /// Builder: set foreground color
    pub fn foreground(mut self, color: Color) -> Self {
        self.effects.foreground = Some(color);
        self
    }

    /// Builder: set background color
    pub fn background(mut self, color: Color) -> Self {
        self.effects.background = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.effects.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.effects.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.effects.underline = true;
        self
    }

    pub fn strikethrough(mut self) -> Self {
        self.effects.strikethrough = true;
        self
    }

    pub fn monospace(mut self) -> Self {
        self.effects.monospace = true;
        self
    }

    pub fn spoiler(mut self) -> Self {
        self.effects.spoiler = true;
        self
    }

    /// Builder: detect URLs inside this element
    pub fn linkify(mut self) -> Self {
        self.effects.linkify = true;
        self
    }

    /// Builder: attach a custom handler
    pub fn handler(mut self, handler: Handler) -> Self {
        self.effects.handler = Some(handler);
        self
    }

    /// Check whether this rule applies to an element
    pub fn matches(&self, tag: &str, class_attr: Option<&str>) -> bool {
        if !self.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
        match &self.css_class {
            None => true,
            Some(required) => class_attr
                .map(|classes| classes.split_ascii_whitespace().any(|c| c == required))
                .unwrap_or(false),
        }
    }
}

/// Ordered collection of style rules for one site
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<StyleRule>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Later rules override earlier ones on conflict.
    pub fn add_rule(&mut self, rule: StyleRule) {
        self.rules.push(rule);
    }

    /// All rules matching an element, in registration order
    pub fn rules_for(&self, tag: &str, class_attr: Option<&str>) -> Vec<&StyleRule> {
        let matched: Vec<&StyleRule> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(tag, class_attr))
            .collect();
        if !matched.is_empty() {
            trace!(tag, class = class_attr, count = matched.len(), "matched style rules");
        }
        matched
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
