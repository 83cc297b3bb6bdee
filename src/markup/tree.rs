//! Tag tree built from markup tokens
//!
//! Unbalanced markup is repaired here: close tags close the nearest
//! matching element, stray close tags are dropped and anything still open
//! at the end of input is closed implicitly.

use tracing::debug;

use super::tokens::Token;

/// Elements that never have children
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "wbr", "input", "meta", "link"];

/// Deepest nesting kept; open tags past this are ignored
const MAX_DEPTH: usize = 512;

/// An element in the tag tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(tag: String, attrs: Vec<(String, String)>) -> Self {
        Self {
            tag,
            attrs,
            children: Vec::new(),
        }
    }

    /// Value of an attribute, by lowercase name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The `class` attribute
    pub fn class(&self) -> Option<&str> {
        self.attr("class")
    }
}

/// A node in the tag tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Build a tree of top-level nodes from a token stream
pub fn build_tree(tokens: Vec<Token>) -> Vec<Node> {
    let mut root: Vec<Node> = Vec::new();
    let mut open: Vec<Element> = Vec::new();

    for token in tokens {
        match token {
            Token::Text(text) => push_node(&mut root, &mut open, Node::Text(text)),
            Token::Open {
                name,
                attrs,
                self_closing,
            } => {
                let element = Element::new(name, attrs);
                if self_closing || VOID_ELEMENTS.contains(&element.tag.as_str()) {
                    push_node(&mut root, &mut open, Node::Element(element));
                } else if open.len() >= MAX_DEPTH {
                    debug!(tag = %element.tag, "nesting too deep, ignoring open tag");
                } else {
                    open.push(element);
                }
            }
            Token::Close { name } => match open.iter().rposition(|e| e.tag == name) {
                Some(index) => {
                    while open.len() > index {
                        close_top(&mut root, &mut open);
                    }
                }
                None => debug!(tag = %name, "dropping unmatched close tag"),
            },
        }
    }

    if !open.is_empty() {
        debug!(count = open.len(), "auto-closing elements at end of input");
    }
    while !open.is_empty() {
        close_top(&mut root, &mut open);
    }

    root
}

fn push_node(root: &mut Vec<Node>, open: &mut [Element], node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}

fn close_top(root: &mut Vec<Node>, open: &mut Vec<Element>) {
    if let Some(element) = open.pop() {
        push_node(root, open, Node::Element(element));
    }
}
