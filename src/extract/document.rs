//! Library-independent view of a parsed page.
//!
//! A [`Document`] is a flat, pre-order list of [`Element`]s with their
//! collapsed text already computed. Heuristics query it by semantic role or
//! by attribute substring and never see the underlying HTML parser, so they
//! can be exercised against documents assembled by hand with
//! [`DocumentBuilder`].

use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Maximum characters of text retained per element. Longer elements are
/// flagged as truncated; they are page sections, not promotions.
pub const ELEMENT_TEXT_CAP: usize = 300;

/// Subtrees that never carry readable content.
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "noscript", "svg", "iframe", "video", "audio", "picture", "template",
    "object", "embed", "canvas",
];

/// Tags that flow inside a line of text; they don't separate words.
const INLINE_TAGS: &[&str] = &[
    "span", "b", "strong", "em", "i", "small", "sup", "sub", "u", "mark", "abbr", "a", "del", "s",
    "strike", "ins",
];

const MAX_DEPTH: usize = 256;

/// Attributes consulted for styling hints.
pub const HINT_ATTRS: &[&str] = &["class", "id", "data-testid", "data-component"];

/// Semantic roles an element can be queried by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// `h1`-`h4`.
    Heading,
    /// Anchor with an `href`.
    Link,
    /// Inside navigation or footer regions.
    Chrome,
    /// Struck-through text (`del`, `s`, `strike`).
    Struck,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    attrs: Vec<(String, String)>,
    /// Collapsed text of the element and its descendants, capped.
    pub text: String,
    /// Text exceeded [`ELEMENT_TEXT_CAP`].
    pub truncated: bool,
    index: usize,
    parent: Option<usize>,
    subtree_end: usize,
    in_chrome: bool,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            text: String::new(),
            truncated: false,
            index: 0,
            parent: None,
            subtree_end: 0,
            in_chrome: false,
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// Set the element's own text (builder convenience).
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_role(&self, role: Role) -> bool {
        match role {
            Role::Heading => matches!(self.tag.as_str(), "h1" | "h2" | "h3" | "h4"),
            Role::Link => self.tag == "a" && self.attr("href").is_some(),
            Role::Chrome => self.in_chrome,
            Role::Struck => matches!(self.tag.as_str(), "del" | "s" | "strike"),
        }
    }

    /// Whether any of `attrs` contains any of `needles`, case-insensitively.
    pub fn attr_contains(&self, attrs: &[&str], needles: &[String]) -> bool {
        attrs.iter().filter_map(|a| self.attr(a)).any(|value| {
            let lower = value.to_lowercase();
            needles.iter().any(|n| lower.contains(n.as_str()))
        })
    }

    fn starts_chrome(&self) -> bool {
        matches!(self.tag.as_str(), "nav" | "footer")
            || matches!(self.attr("role"), Some("navigation" | "contentinfo"))
    }
}

/// A parsed page.
#[derive(Debug, Clone, Default)]
pub struct Document {
    title: Option<String>,
    elements: Vec<Element>,
}

impl Document {
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    /// Parse raw markup. Never fails; malformed input yields whatever the
    /// HTML5 parser recovers.
    pub fn parse(raw: &str) -> Self {
        let html = Html::parse_document(raw);
        let mut builder = DocumentBuilder::default();
        walk(html.root_element(), &mut builder, 0);
        builder.build()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Elements with `role`, in document order.
    pub fn by_role(&self, role: Role) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |e| e.has_role(role))
    }

    /// Elements whose hint attributes contain one of `needles`.
    pub fn by_attr_substring<'a>(
        &'a self,
        attrs: &'a [&'a str],
        needles: &'a [String],
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements
            .iter()
            .filter(move |e| e.attr_contains(attrs, needles))
    }

    pub fn parent(&self, element: &Element) -> Option<&Element> {
        element.parent.and_then(|i| self.elements.get(i))
    }

    pub fn ancestors<'a>(&'a self, element: &'a Element) -> impl Iterator<Item = &'a Element> + 'a {
        std::iter::successors(self.parent(element), move |e| self.parent(e))
    }

    pub fn descendants(&self, element: &Element) -> &[Element] {
        let start = (element.index + 1).min(self.elements.len());
        let end = element.subtree_end.clamp(start, self.elements.len());
        &self.elements[start..end]
    }
}

fn walk(element: ElementRef<'_>, builder: &mut DocumentBuilder, depth: usize) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                builder.text(text);
            }
            Node::Element(el) => {
                let name = el.name();
                if EXCLUDED_TAGS.contains(&name) {
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                if name == "title" {
                    let title: String = child_ref.text().collect();
                    builder.set_title(&title);
                    continue;
                }
                if depth >= MAX_DEPTH {
                    for text in child_ref.text() {
                        builder.text(text);
                    }
                    continue;
                }
                let mut node = Element::new(name);
                for (k, v) in el.attrs() {
                    node = node.with_attr(k, v);
                }
                builder.open(node);
                walk(child_ref, builder, depth + 1);
                builder.close();
            }
            _ => {}
        }
    }
}

/// Incremental text accumulator with on-the-fly whitespace collapsing.
#[derive(Debug, Default)]
struct TextBuf {
    text: String,
    chars: usize,
    pending_space: bool,
    overflow: bool,
}

impl TextBuf {
    fn push(&mut self, s: &str) {
        for c in s.chars() {
            if self.overflow {
                return;
            }
            if c.is_whitespace() {
                self.pending_space = !self.text.is_empty();
                continue;
            }
            if self.pending_space {
                if self.chars >= ELEMENT_TEXT_CAP {
                    self.overflow = true;
                    return;
                }
                self.text.push(' ');
                self.chars += 1;
                self.pending_space = false;
            }
            if self.chars >= ELEMENT_TEXT_CAP {
                self.overflow = true;
                return;
            }
            self.text.push(c);
            self.chars += 1;
        }
    }

    fn separate(&mut self) {
        if !self.text.is_empty() {
            self.pending_space = true;
        }
    }
}

/// Assembles a [`Document`] from open/close/text events.
///
/// Used by the HTML parser and directly by tests to build synthetic pages.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    title: Option<String>,
    elements: Vec<Element>,
    buffers: Vec<TextBuf>,
    open: Vec<usize>,
}

impl DocumentBuilder {
    pub fn title(mut self, title: &str) -> Self {
        self.set_title(title);
        self
    }

    fn set_title(&mut self, title: &str) {
        let cleaned = super::text::collapse_whitespace(title);
        if !cleaned.is_empty() {
            self.title = Some(cleaned);
        }
    }

    /// Open an element; subsequent elements and text nest inside it until
    /// [`close`](Self::close). Text already set on `element` is kept.
    pub fn open(&mut self, mut element: Element) -> &mut Self {
        let index = self.elements.len();
        let parent = self.open.last().copied();
        element.index = index;
        element.parent = parent;
        element.in_chrome =
            element.starts_chrome() || parent.is_some_and(|p| self.elements[p].in_chrome);

        let block = !INLINE_TAGS.contains(&element.tag.as_str());
        if block {
            for &i in &self.open {
                self.buffers[i].separate();
            }
        }

        let own_text = std::mem::take(&mut element.text);
        self.elements.push(element);
        self.buffers.push(TextBuf::default());
        self.open.push(index);
        if !own_text.is_empty() {
            self.text(&own_text);
        }
        self
    }

    pub fn close(&mut self) -> &mut Self {
        if let Some(index) = self.open.pop() {
            self.elements[index].subtree_end = self.elements.len();
            if !INLINE_TAGS.contains(&self.elements[index].tag.as_str()) {
                for &i in &self.open {
                    self.buffers[i].separate();
                }
            }
        }
        self
    }

    /// Add an element with no children.
    pub fn leaf(&mut self, element: Element) -> &mut Self {
        self.open(element).close()
    }

    /// Append text to every open element.
    pub fn text(&mut self, text: &str) -> &mut Self {
        for &i in &self.open {
            self.buffers[i].push(text);
        }
        self
    }

    pub fn build(&mut self) -> Document {
        while !self.open.is_empty() {
            self.close();
        }
        let buffers = std::mem::take(&mut self.buffers);
        let mut elements = std::mem::take(&mut self.elements);
        for (element, buf) in elements.iter_mut().zip(buffers) {
            element.text = buf.text;
            element.truncated = buf.overflow;
        }
        Document {
            title: self.title.take(),
            elements,
        }
    }
}
