//! Permissive tokenizer for post body markup
//!
//! Handles the HTML subset boards actually emit. Anything it cannot make
//! sense of (a stray `<`, an unterminated tag, an unknown entity) is kept
//! as literal text instead of failing.

use tracing::debug;

/// A markup event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Opening tag with lowercase name and attributes
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    /// Closing tag with lowercase name
    Close { name: String },
    /// Decoded text between tags
    Text(String),
}

/// Terminators already known to be absent from the rest of the input
#[derive(Debug, Default)]
struct Unterminated {
    comment: bool,
    declaration: bool,
}

/// Split raw markup into tokens
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut pos = 0;
    let mut unterminated = Unterminated::default();

    while let Some(offset) = input[pos..].find(['<', '&']) {
        let at = pos + offset;
        text.push_str(&input[pos..at]);
        let rest = &input[at..];

        if rest.starts_with('&') {
            match decode_entity(rest) {
                Some((decoded, len)) => {
                    text.push(decoded);
                    pos = at + len;
                }
                None => {
                    debug!(offset = at, "unrecognised entity kept as text");
                    text.push('&');
                    pos = at + 1;
                }
            }
            continue;
        }

        match read_tag(rest, &mut unterminated) {
            Some((token, len)) => {
                if !text.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut text)));
                }
                if let Some(token) = token {
                    tokens.push(token);
                }
                pos = at + len;
            }
            None => {
                debug!(offset = at, "malformed tag kept as text");
                text.push('<');
                pos = at + 1;
            }
        }
    }

    text.push_str(&input[pos..]);
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

/// Read a tag starting at `<`
///
/// Returns the token (None for skipped comments/doctypes) and the number of
/// bytes consumed, or None when this is not a tag at all.
fn read_tag(rest: &str, unterminated: &mut Unterminated) -> Option<(Option<Token>, usize)> {
    if let Some(body) = rest.strip_prefix("<!--") {
        if unterminated.comment {
            return None;
        }
        let Some(end) = body.find("-->") else {
            unterminated.comment = true;
            return None;
        };
        return Some((None, 4 + end + 3));
    }
    if rest.starts_with("<!") {
        if unterminated.declaration {
            return None;
        }
        let Some(end) = rest.find('>') else {
            unterminated.declaration = true;
            return None;
        };
        return Some((None, end + 1));
    }

    let after = &rest[1..];
    let (closing, name_start) = match after.strip_prefix('/') {
        Some(stripped) => (true, stripped),
        None => (false, after),
    };
    if !name_start.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let end = find_tag_end(rest)?;
    let inner = &rest[1..end];
    let len = end + 1;

    let inner = inner.strip_prefix('/').unwrap_or(inner);
    let name_len = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    let name = inner[..name_len].to_ascii_lowercase();

    if closing {
        return Some((Some(Token::Close { name }), len));
    }

    let (attrs, self_closing) = parse_attrs(&inner[name_len..]);
    Some((
        Some(Token::Open {
            name,
            attrs,
            self_closing,
        }),
        len,
    ))
}

/// Byte offset of the `>` that ends the tag, skipping quoted values
fn find_tag_end(rest: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in rest.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(i),
            // A new tag before this one closed means it never will
            None if c == '<' => return None,
            None => {}
        }
    }
    None
}

/// Parse attributes, and whether the tag ends with a standalone `/`
///
/// A `/` inside an unquoted value (`href=/g/`) belongs to the value.
fn parse_attrs(text: &str) -> (Vec<(String, String)>, bool) {
    let mut attrs = Vec::new();
    let mut self_closing = false;
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '/' {
            self_closing = true;
            chars.next();
            continue;
        }
        self_closing = false;

        let mut name_end = text.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' || c == '/' {
                name_end = i;
                break;
            }
            chars.next();
        }
        let name = text[start..name_end].to_ascii_lowercase();

        while chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        if chars.peek().is_some_and(|&(_, c)| c == '=') {
            chars.next();
            while chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
                chars.next();
            }
            match chars.peek() {
                Some(&(i, q)) if q == '"' || q == '\'' => {
                    chars.next();
                    let mut end = text.len();
                    for (j, c) in chars.by_ref() {
                        if c == q {
                            end = j;
                            break;
                        }
                    }
                    value = decode_entities(&text[i + 1..end]);
                }
                Some(&(i, _)) => {
                    let mut end = text.len();
                    while let Some(&(j, c)) = chars.peek() {
                        if c.is_whitespace() {
                            end = j;
                            break;
                        }
                        chars.next();
                    }
                    value = decode_entities(&text[i..end]);
                }
                None => {}
            }
        }

        if !name.is_empty() {
            attrs.push((name, value));
        }
    }

    (attrs, self_closing)
}

/// Decode every entity in a string, keeping unknown ones verbatim
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(offset) = text[pos..].find('&') {
        let at = pos + offset;
        out.push_str(&text[pos..at]);
        match decode_entity(&text[at..]) {
            Some((decoded, len)) => {
                out.push(decoded);
                pos = at + len;
            }
            None => {
                out.push('&');
                pos = at + 1;
            }
        }
    }
    out.push_str(&text[pos..]);
    out
}

/// Decode one `&...;` entity at the start of `rest`
fn decode_entity(rest: &str) -> Option<(char, usize)> {
    // Longest entity we accept is a hex reference like &#x10FFFF;
    let semi = rest[1..].char_indices().take(10).find(|&(_, c)| c == ';')?.0 + 1;
    let body = &rest[1..semi];

    let decoded = if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        if code == 0 {
            return None;
        }
        char::from_u32(code)?
    } else {
        match body {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{a0}',
            _ => return None,
        }
    };

    Some((decoded, semi + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(name: &str, attrs: &[(&str, &str)]) -> Token {
        Token::Open {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            self_closing: false,
        }
    }

    #[test]
    fn test_simple_tags() {
        let tokens = tokenize(r#"<p class="quote">hi</p>"#);
        assert_eq!(
            tokens,
            vec![
                open("p", &[("class", "quote")]),
                Token::Text("hi".to_string()),
                Token::Close { name: "p".to_string() },
            ]
        );
    }

    #[test]
    fn test_attribute_forms() {
        let tokens = tokenize(r#"<A HREF='/g/res/1.html#2' target=_blank data-x>"#);
        assert_eq!(
            tokens,
            vec![open(
                "a",
                &[("href", "/g/res/1.html#2"), ("target", "_blank"), ("data-x", "")]
            )]
        );
    }

    #[test]
    fn test_self_closing() {
        let tokens = tokenize("a<br/>b<br />c");
        assert!(matches!(&tokens[1], Token::Open { name, self_closing: true, .. } if name == "br"));
        assert!(matches!(&tokens[3], Token::Open { self_closing: true, .. }));
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn test_slash_in_unquoted_value_is_not_self_closing() {
        let tokens = tokenize("<a href=/g/>board</a>");
        assert_eq!(tokens[0], open("a", &[("href", "/g/")]));
        assert_eq!(tokens[1], Token::Text("board".to_string()));

        let tokens = tokenize(r#"<a href="/g/"/>"#);
        assert!(matches!(
            &tokens[0],
            Token::Open { self_closing: true, attrs, .. } if attrs[0].1 == "/g/"
        ));
        let tokens = tokenize("<img src=x.png />");
        assert!(matches!(&tokens[0], Token::Open { self_closing: true, .. }));
    }

    #[test]
    fn test_entities() {
        let tokens = tokenize("&gt;&gt;123 &amp; &#39;x&#x27; &quot;");
        assert_eq!(tokens, vec![Token::Text(">>123 & 'x' \"".to_string())]);
    }

    #[test]
    fn test_malformed_entities_are_literal() {
        let tokens = tokenize("fish & chips &bogus; &#xZZ; &#0; &amp");
        assert_eq!(
            tokens,
            vec![Token::Text("fish & chips &bogus; &#xZZ; &#0; &amp".to_string())]
        );
    }

    #[test]
    fn test_stray_angle_brackets_are_literal() {
        assert_eq!(tokenize("1 < 2"), vec![Token::Text("1 < 2".to_string())]);
        assert_eq!(tokenize("<3 you"), vec![Token::Text("<3 you".to_string())]);
        assert_eq!(
            tokenize("oops <b unterminated"),
            vec![Token::Text("oops <b unterminated".to_string())]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            tokenize("a<!-- hidden -->b"),
            vec![Token::Text("a".to_string()), Token::Text("b".to_string())]
        );
        assert_eq!(
            tokenize("a<!-- never closed"),
            vec![Token::Text("a<!-- never closed".to_string())]
        );
    }

    #[test]
    fn test_many_unterminated_declarations() {
        let input = "<!-".repeat(10_000);
        assert_eq!(tokenize(&input), vec![Token::Text(input.clone())]);

        let input = format!("x{}", "<!--".repeat(10_000));
        assert_eq!(tokenize(&input), vec![Token::Text(input.clone())]);
    }

    #[test]
    fn test_quoted_gt_in_attribute() {
        let tokens = tokenize(r#"<span title="a > b">x</span>"#);
        assert_eq!(tokens[0], open("span", &[("title", "a > b")]));
    }

    #[test]
    fn test_attribute_entities_decoded() {
        let tokens = tokenize(r#"<a href="/x?a=1&amp;b=2">"#);
        assert_eq!(tokens[0], open("a", &[("href", "/x?a=1&b=2")]));
    }
}
