//! Comment markup parser
//!
//! Turns a raw post body into styled spans: tokenize, build a tag tree,
//! then walk it with a stack of style contexts, applying the site's rules
//! and resolving quote references in text.
//!
//! Parsing never fails. Malformed markup is repaired or kept as literal
//! text, so every input produces a span sequence.

use std::ops::Range;
use std::slice;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::quote::{QuotePatternMatcher, QuoteTarget};
use super::rules::{Handler, RuleSet};
use super::style::{parse_hex, Color, Link, Span, Style};
use super::tokens::tokenize;
use super::tree::{build_tree, Element, Node};

/// Bare URLs picked up by linkify rules
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"']*[^\s<>"'.,;:!?)\]]"#).expect("URL pattern is valid")
});

/// Style state inherited by everything inside an element
#[derive(Debug, Clone, Default)]
struct Context {
    style: Style,
    linkify: bool,
}

/// Parser over one site's rules and quote patterns
///
/// Holds only shared references, so one site configuration can back any
/// number of parsers on any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct MarkupParser<'a> {
    rules: &'a RuleSet,
    quotes: &'a QuotePatternMatcher,
}

impl<'a> MarkupParser<'a> {
    pub fn new(rules: &'a RuleSet, quotes: &'a QuotePatternMatcher) -> Self {
        Self { rules, quotes }
    }

    /// Parse a post body into spans
    pub fn parse(&self, raw: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        if raw.is_empty() {
            return spans;
        }

        let nodes = build_tree(tokenize(raw));
        let mut stack: Vec<(slice::Iter<'_, Node>, Context)> =
            vec![(nodes.iter(), Context::default())];

        while let Some((children, ctx)) = stack.last_mut() {
            let Some(node) = children.next() else {
                stack.pop();
                continue;
            };
            match node {
                Node::Text(text) => self.emit_text(text, ctx, &mut spans),
                Node::Element(element) => {
                    if let Some(inner) = self.enter(element, ctx, &mut spans) {
                        stack.push((element.children.iter(), inner));
                    }
                }
            }
        }

        spans
    }

    /// Compute the context for an element's children
    ///
    /// Returns None when the element and its contents are dropped.
    fn enter(
        &self,
        element: &Element,
        parent: &Context,
        out: &mut Vec<Span>,
    ) -> Option<Context> {
        let mut ctx = parent.clone();
        let mut handlers = Vec::new();

        for rule in self.rules.rules_for(&element.tag, element.class()) {
            rule.effects.apply(&mut ctx.style);
            ctx.linkify |= rule.effects.linkify;
            if let Some(handler) = rule.effects.handler {
                handlers.push(handler);
            }
        }

        for handler in handlers {
            match handler {
                Handler::Nullify => {
                    trace!(tag = %element.tag, "nullified element");
                    return None;
                }
                Handler::LineBreak => out.push(Span::new("\n", ctx.style.clone())),
                Handler::FontColor => {
                    if let Some(color) = element.attr("color").and_then(font_color) {
                        ctx.style.fg = color;
                    }
                }
                Handler::Anchor => {
                    if let Some(href) = element.attr("href").filter(|h| !h.is_empty()) {
                        let link = self.resolve_href(href);
                        if ctx.style.fg.is_default() {
                            ctx.style.fg = link_color(&link);
                        }
                        ctx.style.link = Some(link);
                    }
                }
            }
        }

        Some(ctx)
    }

    /// Turn an anchor target into a link
    fn resolve_href(&self, href: &str) -> Link {
        if let Some(quote) = self.quotes.match_full_quote(href) {
            return Link::Thread {
                board: quote.board,
                thread_id: quote.thread_id,
                post_id: quote.post_id,
            };
        }
        // Fragments of absolute URLs elsewhere are not post references
        if !href.contains("://") {
            if let Some(post_id) = self.quotes.match_quote(href) {
                return Link::Quote { post_id };
            }
        }
        Link::Url {
            url: href.to_string(),
        }
    }

    /// Split a text node into plain and linked spans
    fn emit_text(&self, text: &str, ctx: &Context, out: &mut Vec<Span>) {
        if text.is_empty() {
            return;
        }
        // Text inside a link is not scanned again
        if ctx.style.link.is_some() {
            out.push(Span::new(text, ctx.style.clone()));
            return;
        }

        let mut found: Vec<(Range<usize>, Link)> = self
            .quotes
            .find_quotes(text)
            .into_iter()
            .map(|m| {
                let link = match m.target {
                    QuoteTarget::Post(post_id) => Link::Quote { post_id },
                    QuoteTarget::Thread(q) => Link::Thread {
                        board: q.board,
                        thread_id: q.thread_id,
                        post_id: q.post_id,
                    },
                };
                (m.range, link)
            })
            .collect();

        if ctx.linkify {
            found.extend(URL_RE.find_iter(text).map(|m| {
                (
                    m.range(),
                    Link::Url {
                        url: m.as_str().to_string(),
                    },
                )
            }));
        }

        // Earliest start wins, longer match on a tie
        found.sort_by(|a, b| {
            a.0.start
                .cmp(&b.0.start)
                .then_with(|| b.0.len().cmp(&a.0.len()))
        });

        let mut pos = 0;
        for (range, link) in found {
            if range.start < pos {
                continue;
            }
            if range.start > pos {
                out.push(Span::new(&text[pos..range.start], ctx.style.clone()));
            }
            let mut style = ctx.style.clone();
            if style.fg.is_default() {
                style.fg = link_color(&link);
            }
            style.link = Some(link);
            out.push(Span::new(&text[range.clone()], style));
            pos = range.end;
        }
        if pos < text.len() {
            out.push(Span::new(&text[pos..], ctx.style.clone()));
        }
    }
}

/// Parse a post body with a site's rules and quote patterns
pub fn parse(raw: &str, rules: &RuleSet, quotes: &QuotePatternMatcher) -> Vec<Span> {
    MarkupParser::new(rules, quotes).parse(raw)
}

fn link_color(link: &Link) -> Color {
    match link {
        Link::Quote { .. } | Link::Thread { .. } => Color::Quote,
        Link::Url { .. } => Color::Link,
    }
}

fn font_color(value: &str) -> Option<Color> {
    parse_hex(value.trim().strip_prefix('#')?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::rules::StyleRule;
    use crate::markup::style::visible_text;

    fn quotes() -> QuotePatternMatcher {
        QuotePatternMatcher::new(r"#(\d+)", r"/(\w+)/\w+/(\d+)\.html#(\d+)").unwrap()
    }

    fn rules() -> RuleSet {
        let mut rules = RuleSet::new();
        rules.add_rule(StyleRule::tag("a").handler(Handler::Anchor));
        rules.add_rule(StyleRule::tag("br").handler(Handler::LineBreak));
        rules.add_rule(StyleRule::tag("b").bold());
        rules.add_rule(StyleRule::tag("i").italic());
        rules.add_rule(StyleRule::tag("span").css_class("abbr").handler(Handler::Nullify));
        rules.add_rule(StyleRule::tag("font").handler(Handler::FontColor));
        rules.add_rule(StyleRule::tag("p").css_class("quote").foreground(Color::InlineQuote).linkify());
        rules
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("", &rules(), &quotes()).is_empty());
    }

    #[test]
    fn test_plain_text_single_span() {
        let spans = parse("just some words", &rules(), &quotes());
        assert_eq!(spans, vec![Span::plain("just some words")]);
    }

    #[test]
    fn test_bare_quote_single_span() {
        let spans = parse("#42", &rules(), &quotes());
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "#42");
        assert_eq!(spans[0].style.link, Some(Link::Quote { post_id: 42 }));
        assert_eq!(spans[0].style.fg, Color::Quote);
    }

    #[test]
    fn test_inline_quote_keeps_color_and_link() {
        let spans = parse(r#"<p class="quote">#42</p>"#, &rules(), &quotes());
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].style.fg, Color::InlineQuote);
        assert_eq!(spans[0].style.link, Some(Link::Quote { post_id: 42 }));
    }

    #[test]
    fn test_unclosed_tag() {
        let spans = parse("<b>hello", &rules(), &quotes());
        assert_eq!(spans, vec![Span::new("hello", Style::default().with_bold())]);
    }

    #[test]
    fn test_nested_styles_merge() {
        let spans = parse("<b>bold <i>both</i></b> none", &rules(), &quotes());
        assert_eq!(spans.len(), 3);
        assert!(spans[0].style.bold && !spans[0].style.italic);
        assert!(spans[1].style.bold && spans[1].style.italic);
        assert!(spans[2].style.is_default());
    }

    #[test]
    fn test_quotes_split_text() {
        let spans = parse("see #1 and /g/res/5.html#6 ok", &rules(), &quotes());
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["see ", "#1", " and ", "/g/res/5.html#6", " ok"]);
        assert_eq!(
            spans[3].style.link,
            Some(Link::Thread {
                board: "g".to_string(),
                thread_id: 5,
                post_id: 6,
            })
        );
    }

    #[test]
    fn test_anchor_links() {
        let spans = parse(
            r#"<a href="/g/res/5.html#6">&gt;&gt;6</a> <a href="https://example.com/x#7">site</a>"#,
            &rules(),
            &quotes(),
        );
        assert_eq!(spans[0].text, ">>6");
        assert!(matches!(spans[0].style.link, Some(Link::Thread { post_id: 6, .. })));
        assert_eq!(spans[1], Span::plain(" "));
        assert_eq!(
            spans[2].style.link,
            Some(Link::Url {
                url: "https://example.com/x#7".to_string()
            })
        );
        assert_eq!(spans[2].style.fg, Color::Link);
    }

    #[test]
    fn test_unquoted_href_ending_in_slash() {
        let spans = parse("<a href=/g/>board</a> after", &rules(), &quotes());
        assert_eq!(spans[0].text, "board");
        assert_eq!(
            spans[0].style.link,
            Some(Link::Url {
                url: "/g/".to_string()
            })
        );
        assert_eq!(spans[1], Span::plain(" after"));
    }

    #[test]
    fn test_anchor_text_not_rescanned() {
        let spans = parse(r##"<a href="#3">#4</a>"##, &rules(), &quotes());
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].style.link, Some(Link::Quote { post_id: 3 }));
    }

    #[test]
    fn test_linkify_only_inside_linkify_rule() {
        let plain = parse("go to https://example.com now", &rules(), &quotes());
        assert_eq!(plain.len(), 1);

        let linked = parse(
            r#"<p class="quote">go to https://example.com. now</p>"#,
            &rules(),
            &quotes(),
        );
        let texts: Vec<&str> = linked.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["go to ", "https://example.com", ". now"]);
        assert_eq!(linked[1].style.fg, Color::InlineQuote);
    }

    #[test]
    fn test_line_break_and_nullify() {
        let spans = parse(
            r#"one<br>two<span class="abbr">hidden <b>stuff</b></span>"#,
            &rules(),
            &quotes(),
        );
        assert_eq!(visible_text(&spans), "one\ntwo");
    }

    #[test]
    fn test_font_color() {
        let spans = parse(
            r##"<font color="#ff0000">red</font><font color="bad">x</font>"##,
            &rules(),
            &quotes(),
        );
        assert_eq!(spans[0].style.fg, Color::Rgb(0xff0000));
        assert_eq!(spans[1].style.fg, Color::Default);
    }

    #[test]
    fn test_malformed_markup_degrades_to_text() {
        let spans = parse("a < b &bogus; <i>c</b>", &rules(), &quotes());
        assert_eq!(visible_text(&spans), "a < b &bogus; c");
        assert!(spans.last().unwrap().style.italic);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let input = "<b>".repeat(100_000) + "deep";
        let spans = parse(&input, &rules(), &quotes());
        assert_eq!(spans, vec![Span::new("deep", Style::default().with_bold())]);
    }

    #[test]
    fn test_parse_is_repeatable() {
        let rules = rules();
        let quotes = quotes();
        let input = r#"<p class="quote">&gt;#1 https://a.b</p><b>x<i>y"#;
        assert_eq!(parse(input, &rules, &quotes), parse(input, &rules, &quotes));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn segment() -> impl Strategy<Value = (Option<&'static str>, String)> {
            (
                prop::option::of(prop::sample::select(vec!["b", "i", "p", "span", "u"])),
                "[a-z ]{0,12}",
            )
        }

        proptest! {
            #[test]
            fn plain_text_is_one_span(text in "[a-zA-Z0-9 .,!?]{1,64}") {
                let spans = parse(&text, &rules(), &quotes());
                prop_assert_eq!(spans, vec![Span::plain(text.clone())]);
            }

            #[test]
            fn visible_text_matches_stripped_markup(segments in prop::collection::vec(segment(), 0..12)) {
                let mut markup = String::new();
                let mut expected = String::new();
                for (tag, text) in &segments {
                    match tag {
                        Some(tag) => markup.push_str(&format!("<{tag}>{text}</{tag}>")),
                        None => markup.push_str(text),
                    }
                    expected.push_str(text);
                }
                let spans = parse(&markup, &rules(), &quotes());
                prop_assert_eq!(visible_text(&spans), expected);
                prop_assert!(spans.iter().all(|s| !s.is_empty()));
            }

            #[test]
            fn arbitrary_input_never_panics(input in "[<>/&#;a-z0-9 \"'=]{0,80}") {
                let rules = rules();
                let quotes = quotes();
                let first = parse(&input, &rules, &quotes);
                prop_assert_eq!(first, parse(&input, &rules, &quotes));
            }
        }
    }
}
