//! The closed tag vocabulary the archive parsers understand.
//!
//! Archives are matched on `(tag, class)` pairs only; everything else in the
//! document is [`Node::Other`] and only matters for nesting.

/// Kind of element, decided from its tag name and class tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    /// `<h1>`: the archive owner's name.
    OwnerHeading,
    /// `<div class="thread">`: one thread fragment.
    Thread,
    /// `<div class="content">`: body of a split-format manifest.
    Content,
    /// `<div class="message">`: message container.
    Message,
    /// `<span class="user">`: sender marker.
    User,
    /// `<span class="meta">`: timestamp marker.
    Meta,
    /// `<p>`: message text.
    Paragraph,
    /// `<a>`: manifest link to a thread file.
    Link,
    /// `<img>`: image message.
    Image,
    /// `<br>`: line break inside text.
    LineBreak,
    /// Anything else.
    Other,
}

impl Node {
    /// Classifies an element.
    ///
    /// `tag` must already be lower-case. The `thread`, `content`, `user` and
    /// `meta` markers match anywhere in the class attribute, so
    /// `class="contents"` is a [`Node::Content`]. `message` must be a whole
    /// class token, since the header inside a message is `message_header`.
    ///
    /// ```
    /// use fbchat_history::markup::events::Node;
    ///
    /// assert_eq!(Node::classify("div", Some("thread")), Node::Thread);
    /// assert_eq!(Node::classify("div", Some("contents")), Node::Content);
    /// assert_eq!(Node::classify("div", Some("message unread")), Node::Message);
    /// assert_eq!(Node::classify("div", Some("message_header")), Node::Other);
    /// assert_eq!(Node::classify("p", None), Node::Paragraph);
    /// ```
    pub fn classify(tag: &str, class: Option<&str>) -> Node {
        let contains = |marker: &str| class.is_some_and(|c| c.contains(marker));
        let has_token =
            |name: &str| class.is_some_and(|c| c.split_whitespace().any(|t| t == name));
        match tag {
            "h1" => Node::OwnerHeading,
            "div" if contains("thread") => Node::Thread,
            "div" if contains("content") => Node::Content,
            "div" if has_token("message") => Node::Message,
            "span" if contains("user") => Node::User,
            "span" if contains("meta") => Node::Meta,
            "p" => Node::Paragraph,
            "a" => Node::Link,
            "img" => Node::Image,
            "br" => Node::LineBreak,
            _ => Node::Other,
        }
    }

    /// Name of the attribute carried on [`Element::attr`], if any.
    pub fn locator_attribute(self) -> Option<&'static str> {
        match self {
            Node::Link => Some("href"),
            Node::Image => Some("src"),
            _ => None,
        }
    }

    /// Whether the text of closed children is folded into this element.
    ///
    /// Structural containers keep only their own direct text, so that the
    /// text of a whole thread is never accumulated in memory.
    pub(crate) fn collects_child_text(self) -> bool {
        matches!(
            self,
            Node::OwnerHeading | Node::User | Node::Meta | Node::Paragraph | Node::Link | Node::Other
        )
    }
}

/// Which side of an element an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    End,
}

/// An element as seen by the parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Element kind.
    pub node: Node,
    /// `href` of a link or `src` of an image.
    pub attr: Option<String>,
    /// On end events: the element's text, including inline children.
    /// Always empty on start events.
    pub text: String,
}

impl Element {
    pub fn new(node: Node) -> Self {
        Self {
            node,
            attr: None,
            text: String::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, attr: impl Into<String>) -> Self {
        self.attr = Some(attr.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// A tokenizer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent {
    Start(Element),
    End(Element),
    /// Non-blank character data, entities resolved.
    Text(String),
}

impl TagEvent {
    /// Returns the element and phase, or `None` for text.
    pub fn element(&self) -> Option<(&Element, Phase)> {
        match self {
            TagEvent::Start(e) => Some((e, Phase::Start)),
            TagEvent::End(e) => Some((e, Phase::End)),
            TagEvent::Text(_) => None,
        }
    }

    /// Returns `true` if this is `phase` of a `node` element.
    pub fn is(&self, node: Node, phase: Phase) -> bool {
        self.element()
            .is_some_and(|(e, p)| e.node == node && p == phase)
    }
}
