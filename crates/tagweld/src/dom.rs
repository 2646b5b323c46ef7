//! Owned document tree and the structural edits the injection pass needs.
//!
//! The template is parsed into a plain tree of tagged nodes: elements with
//! ordered attributes, text and comments. The tree is exclusive to one
//! generate pass, mutated in place and serialized back to text at the end.
//! The capability surface is deliberately small: first-match lookup,
//! ensure-child, newline-append, exchange-child and serialization.

use serde_json::Value;

use crate::tag::render_attrs;

/// An attribute value on an element.
///
/// `True` is the boolean shorthand (`defer`, `nomodule`); everything else
/// renders as `key=<JSON-encoded value>`, so strings gain quotes and
/// escapes while numbers and `false` stay bare.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    True,
    Json(Value),
}

impl AttrValue {
    pub fn str(value: impl Into<String>) -> Self {
        AttrValue::Json(Value::String(value.into()))
    }

    /// The value as a plain string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::True => None,
            AttrValue::Json(Value::String(s)) => Some(s),
            AttrValue::Json(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Tag name, lowercased at parse time.
    pub tag: String,
    /// Attributes in insertion order. No deduplication.
    pub attrs: Vec<(String, AttrValue)>,
    pub children: Vec<Node>,
}

/// Where a newly created child lands in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Append,
    Prepend,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attrs(tag: impl Into<String>, attrs: Vec<(String, AttrValue)>) -> Self {
        Self {
            tag: tag.into(),
            attrs,
            children: Vec::new(),
        }
    }

    /// First attribute with the given name, as a string value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .and_then(|(_, v)| v.as_str())
    }

    /// Index of the first direct child element matching the predicate.
    pub fn child_index<P>(&self, mut pred: P) -> Option<usize>
    where
        P: FnMut(&Element) -> bool,
    {
        self.children.iter().position(|node| match node {
            Node::Element(el) => pred(el),
            _ => false,
        })
    }

    /// First direct child element with the given tag.
    pub fn child_element_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.tag == tag => Some(el),
            _ => None,
        })
    }

    /// Fetch the first direct child with the given tag, creating an empty
    /// one at the requested position when absent.
    pub fn ensure_child(&mut self, tag: &str, placement: Placement) -> &mut Element {
        let index = match self.child_index(|el| el.tag == tag) {
            Some(index) => index,
            None => {
                let node = Node::Element(Element::new(tag));
                match placement {
                    Placement::Append => {
                        self.children.push(node);
                        self.children.len() - 1
                    }
                    Placement::Prepend => {
                        self.children.insert(0, node);
                        0
                    }
                }
            }
        };
        match &mut self.children[index] {
            Node::Element(el) => el,
            _ => unreachable!("child_index only returns element positions"),
        }
    }

    /// Append a node, preceded by a newline text node so injected siblings
    /// keep the template readable.
    pub fn append_with_newline(&mut self, node: Node) {
        self.children.push(Node::Text("\n".to_string()));
        self.children.push(node);
    }

    /// Replace the direct child at `index` in place, preserving document
    /// position. Used for conflict resolution on metas, titles and
    /// favicon links.
    pub fn exchange_child(&mut self, index: usize, node: Node) {
        self.children[index] = node;
    }

    /// Replace all content with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    fn serialize_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if !self.attrs.is_empty() {
            out.push(' ');
            out.push_str(&render_attrs(&self.attrs));
        }
        out.push('>');
        if is_void_element(&self.tag) {
            return;
        }
        for child in &self.children {
            child.serialize_into(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl Node {
    fn serialize_into(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.serialize_into(out),
            Node::Text(text) => out.push_str(text),
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
        }
    }
}

/// A parsed template. Exclusive to one generate pass.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    /// Parse HTML text, preserving comments. Doctype declarations are
    /// dropped; the serializer in the injection pass re-emits a literal
    /// doctype line.
    pub fn parse(input: &str) -> Document {
        Parser::new(input).run()
    }

    /// First element with the given tag, depth first.
    pub fn find_element_mut(&mut self, tag: &str) -> Option<&mut Element> {
        find_in(&mut self.children, tag)
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            node.serialize_into(&mut out);
        }
        out
    }
}

fn find_in<'a>(nodes: &'a mut [Node], tag: &str) -> Option<&'a mut Element> {
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            if el.tag == tag {
                return Some(el);
            }
            if let Some(found) = find_in(&mut el.children, tag) {
                return Some(found);
            }
        }
    }
    None
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Raw-text elements: content runs to the matching close tag, markup
/// inside is not interpreted.
fn is_rawtext_element(name: &str) -> bool {
    matches!(name, "script" | "style")
}

struct Parser<'a> {
    bytes: &'a [u8],
    input: &'a str,
    pos: usize,
    stack: Vec<Element>,
    root: Vec<Node>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            input,
            pos: 0,
            stack: Vec::new(),
            root: Vec::new(),
        }
    }

    fn run(mut self) -> Document {
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'<' {
                self.markup();
            } else {
                self.text();
            }
        }
        // Close anything left open at end of input.
        while let Some(el) = self.stack.pop() {
            self.push_node(Node::Element(el));
        }
        Document {
            children: self.root,
        }
    }

    fn push_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn text(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'<' {
            self.pos += 1;
        }
        self.push_node(Node::Text(self.input[start..self.pos].to_string()));
    }

    fn markup(&mut self) {
        let rest = &self.input[self.pos..];
        if rest.starts_with("<!--") {
            self.comment();
        } else if rest.starts_with("<!") {
            // Doctype or other declaration: skipped, not preserved.
            self.skip_until(b'>');
        } else if rest.starts_with("</") {
            self.close_tag();
        } else if self
            .bytes
            .get(self.pos + 1)
            .is_some_and(|b| b.is_ascii_alphabetic())
        {
            self.open_tag();
        } else {
            // A lone `<` that opens nothing is ordinary text.
            self.push_node(Node::Text("<".to_string()));
            self.pos += 1;
        }
    }

    fn comment(&mut self) {
        let start = self.pos + 4;
        let end = self.input[start..]
            .find("-->")
            .map(|i| start + i)
            .unwrap_or(self.bytes.len());
        self.push_node(Node::Comment(self.input[start..end].to_string()));
        self.pos = (end + 3).min(self.bytes.len());
    }

    fn skip_until(&mut self, byte: u8) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] != byte {
            self.pos += 1;
        }
        if self.pos < self.bytes.len() {
            self.pos += 1;
        }
    }

    fn close_tag(&mut self) {
        self.pos += 2;
        let name = self.tag_name();
        self.skip_until(b'>');
        if !self.stack.iter().any(|el| el.tag == name) {
            // Stray close tag, nothing to match. Dropped.
            return;
        }
        while let Some(el) = self.stack.pop() {
            let matched = el.tag == name;
            self.push_node(Node::Element(el));
            if matched {
                break;
            }
        }
    }

    fn open_tag(&mut self) {
        self.pos += 1;
        let name = self.tag_name();
        let attrs = self.attributes();
        let self_closing = self.bytes.get(self.pos) == Some(&b'/');
        self.skip_until(b'>');

        let mut element = Element::with_attrs(name.clone(), attrs);
        if self_closing || is_void_element(&name) {
            self.push_node(Node::Element(element));
        } else if is_rawtext_element(&name) {
            let text = self.rawtext(&name);
            if !text.is_empty() {
                element.children.push(Node::Text(text));
            }
            self.push_node(Node::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    fn tag_name(&mut self) -> String {
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'-')
        {
            self.pos += 1;
        }
        self.input[start..self.pos].to_ascii_lowercase()
    }

    /// Content of a raw-text element up to its case-insensitive close tag.
    fn rawtext(&mut self, name: &str) -> String {
        let close = format!("</{name}");
        let rest = &self.input[self.pos..];
        let lower = rest.to_ascii_lowercase();
        match lower.find(&close) {
            Some(offset) => {
                let text = rest[..offset].to_string();
                self.pos += offset;
                self.skip_until(b'>');
                text
            }
            None => {
                let text = rest.to_string();
                self.pos = self.bytes.len();
                text
            }
        }
    }

    fn attributes(&mut self) -> Vec<(String, AttrValue)> {
        let mut attrs = Vec::new();
        loop {
            while self
                .bytes
                .get(self.pos)
                .is_some_and(|b| b.is_ascii_whitespace())
            {
                self.pos += 1;
            }
            match self.bytes.get(self.pos) {
                None | Some(&b'>') | Some(&b'/') => break,
                _ => {}
            }
            let start = self.pos;
            while self.bytes.get(self.pos).is_some_and(|b| {
                !b.is_ascii_whitespace() && *b != b'=' && *b != b'>' && *b != b'/'
            }) {
                self.pos += 1;
            }
            if self.pos == start {
                // Defensive bail-out on malformed input like `< >`.
                self.pos += 1;
                continue;
            }
            let key = self.input[start..self.pos].to_string();
            if self.bytes.get(self.pos) == Some(&b'=') {
                self.pos += 1;
                attrs.push((key, AttrValue::str(self.attr_value())));
            } else {
                attrs.push((key, AttrValue::True));
            }
        }
        attrs
    }

    fn attr_value(&mut self) -> String {
        match self.bytes.get(self.pos).copied() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.pos < self.bytes.len() && self.bytes[self.pos] != quote {
                    self.pos += 1;
                }
                let value = self.input[start..self.pos].to_string();
                if self.pos < self.bytes.len() {
                    self.pos += 1;
                }
                value
            }
            _ => {
                let start = self.pos;
                while self
                    .bytes
                    .get(self.pos)
                    .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'>')
                {
                    self.pos += 1;
                }
                self.input[start..self.pos].to_string()
            }
        }
    }
}
