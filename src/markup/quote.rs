//! Quote reference matching
//!
//! Every site has two patterns: a short one capturing a post id (`#123`)
//! and a full one capturing board, thread id and post id
//! (`/g/res/555.html#556`).

use std::ops::Range;

use regex::{Captures, Regex};

use crate::error::{MarkupError, Result};

/// A cross-thread quote reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullQuote {
    pub board: String,
    pub thread_id: u64,
    pub post_id: u64,
}

/// What a quote match points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteTarget {
    Post(u64),
    Thread(FullQuote),
}

/// A quote reference found in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteMatch {
    /// Byte range of the whole match
    pub range: Range<usize>,
    pub target: QuoteTarget,
}

/// Compiled quote patterns for one site
#[derive(Debug, Clone)]
pub struct QuotePatternMatcher {
    quote: Regex,
    full_quote: Regex,
}

impl QuotePatternMatcher {
    /// Compile and validate a site's quote patterns
    ///
    /// The short pattern needs one capture group (post id), the full one
    /// needs three (board, thread id, post id).
    pub fn new(quote_pattern: &str, full_quote_pattern: &str) -> Result<Self> {
        let quote = compile("quote", quote_pattern, 1)?;
        let full_quote = compile("full quote", full_quote_pattern, 3)?;
        Ok(Self { quote, full_quote })
    }

    /// Source of the short pattern
    pub fn quote_pattern(&self) -> &str {
        self.quote.as_str()
    }

    /// Source of the full pattern
    pub fn full_quote_pattern(&self) -> &str {
        self.full_quote.as_str()
    }

    /// First short quote in text
    pub fn match_quote(&self, text: &str) -> Option<u64> {
        self.next_quote(text, 0).map(|(_, id)| id)
    }

    /// First full quote in text
    pub fn match_full_quote(&self, text: &str) -> Option<FullQuote> {
        self.next_full_quote(text, 0).map(|(_, quote)| quote)
    }

    /// All non-overlapping quote references in document order
    ///
    /// The match starting earliest wins; at the same start the longer match
    /// wins, so a full quote beats a short quote inside it.
    pub fn find_quotes(&self, text: &str) -> Vec<QuoteMatch> {
        let mut found = Vec::new();
        let mut pos = 0;
        // Next match of each pattern at or after `pos`. The outer None means
        // search again, an inner None means the pattern has no more matches.
        let mut short_next: Option<Option<(Range<usize>, u64)>> = None;
        let mut full_next: Option<Option<(Range<usize>, FullQuote)>> = None;

        while pos < text.len() {
            if matches!(&short_next, Some(Some((range, _))) if range.start < pos) {
                short_next = None;
            }
            if matches!(&full_next, Some(Some((range, _))) if range.start < pos) {
                full_next = None;
            }
            let short = short_next.get_or_insert_with(|| self.next_quote(text, pos));
            let full = full_next.get_or_insert_with(|| self.next_full_quote(text, pos));

            let full_first = match (&*short, &*full) {
                (None, None) => break,
                (Some(_), None) => false,
                (None, Some(_)) => true,
                (Some((short_range, _)), Some((full_range, _))) => {
                    full_range.start < short_range.start
                        || (full_range.start == short_range.start
                            && full_range.len() >= short_range.len())
                }
            };

            let next = if full_first {
                let Some((range, quote)) = full_next.take().flatten() else {
                    break;
                };
                QuoteMatch {
                    range,
                    target: QuoteTarget::Thread(quote),
                }
            } else {
                let Some((range, id)) = short_next.take().flatten() else {
                    break;
                };
                QuoteMatch {
                    range,
                    target: QuoteTarget::Post(id),
                }
            };

            pos = if next.range.is_empty() {
                next_char_boundary(text, next.range.end)
            } else {
                next.range.end
            };
            if !next.range.is_empty() {
                found.push(next);
            }
        }

        found
    }

    fn next_quote(&self, text: &str, start: usize) -> Option<(Range<usize>, u64)> {
        let mut pos = start;
        while pos <= text.len() {
            let caps = self.quote.captures_at(text, pos)?;
            let whole = caps.get(0)?.range();
            if let Some(id) = capture_id(&caps, 1) {
                return Some((whole, id));
            }
            // Id did not fit, keep looking past this match
            pos = next_char_boundary(text, whole.start);
        }
        None
    }

    fn next_full_quote(&self, text: &str, start: usize) -> Option<(Range<usize>, FullQuote)> {
        let mut pos = start;
        while pos <= text.len() {
            let caps = self.full_quote.captures_at(text, pos)?;
            let whole = caps.get(0)?.range();
            let board = caps.get(1).map(|m| m.as_str().to_string());
            let ids = capture_id(&caps, 2).zip(capture_id(&caps, 3));
            if let (Some(board), Some((thread_id, post_id))) = (board, ids) {
                return Some((
                    whole,
                    FullQuote {
                        board,
                        thread_id,
                        post_id,
                    },
                ));
            }
            pos = next_char_boundary(text, whole.start);
        }
        None
    }
}

fn compile(name: &str, pattern: &str, groups: usize) -> Result<Regex> {
    let regex = Regex::new(pattern).map_err(|source| MarkupError::InvalidPattern {
        name: name.to_string(),
        source,
    })?;
    // captures_len counts the implicit whole-match group
    let found = regex.captures_len() - 1;
    if found < groups {
        return Err(MarkupError::MissingCaptureGroup {
            name: name.to_string(),
            expected: groups,
            found,
        });
    }
    Ok(regex)
}

fn capture_id(caps: &Captures<'_>, group: usize) -> Option<u64> {
    caps.get(group)?.as_str().parse().ok()
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    let mut next = pos + 1;
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    next
}
