//! Tolerant tag event reader on top of `quick-xml`.
//!
//! Archive markup is close to XHTML but not reliably well formed, so the
//! reader keeps its own stack of open elements instead of trusting the
//! tokenizer's nesting checks:
//!
//! - an end tag closes the nearest open element with the same name, and
//!   every element opened after it (each gets its own end event)
//! - an end tag with no matching open element is ignored
//! - entities declared in the document type are resolved, unknown ones are
//!   left as written
//! - blank text is never reported

use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};
use std::io::{BufRead, BufReader, Read};
use std::sync::OnceLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};
use regex::{Captures, Regex};

use super::events::{Element, Node, TagEvent};
use super::sanitize::SanitizingReader;
use crate::error::Result;

#[derive(Debug)]
struct OpenElement {
    name: String,
    node: Node,
    attr: Option<String>,
    text: String,
}

fn entity_re() -> &'static Regex {
    static ENTITY_RE: OnceLock<Regex> = OnceLock::new();
    ENTITY_RE.get_or_init(|| {
        Regex::new(r#"<!ENTITY\s+([A-Za-z_][\w.-]*)\s+(?:'([^']*)'|"([^"]*)")\s*>"#)
            .expect("valid entity declaration regex")
    })
}

fn entity_ref_re() -> &'static Regex {
    static ENTITY_REF_RE: OnceLock<Regex> = OnceLock::new();
    ENTITY_REF_RE.get_or_init(|| {
        Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|([A-Za-z][A-Za-z0-9]*));")
            .expect("valid entity reference regex")
    })
}

/// Streams [`TagEvent`]s from a document.
pub struct TagReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    entities: HashMap<String, String>,
    stack: Vec<OpenElement>,
    queue: VecDeque<TagEvent>,
}

impl<R: Read> TagReader<BufReader<SanitizingReader<R>>> {
    /// Reads raw archive bytes through a [`SanitizingReader`].
    pub fn sanitized(inner: R) -> Self {
        TagReader::new(BufReader::new(SanitizingReader::new(inner)))
    }
}

impl<R: BufRead> TagReader<R> {
    /// Reads already sanitized markup.
    pub fn new(inner: R) -> Self {
        let mut reader = Reader::from_reader(inner);
        reader
            .trim_text(false)
            .expand_empty_elements(true)
            .check_end_names(false);

        let entities = [
            ("amp", "&"),
            ("lt", "<"),
            ("gt", ">"),
            ("quot", "\""),
            ("apos", "'"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            reader,
            buf: Vec::new(),
            entities,
            stack: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns an event to the front of the stream.
    pub fn push_back(&mut self, event: TagEvent) {
        self.queue.push_front(event);
    }

    /// Returns the next event, or `None` at the end of the document.
    pub fn next_event(&mut self) -> Result<Option<TagEvent>> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Ok(Some(event));
            }

            let event = self.reader.read_event_into(&mut self.buf)?.into_owned();
            self.buf.clear();

            match event {
                Event::Start(start) => {
                    self.open(&start);
                }
                Event::Empty(start) => {
                    let name = self.open(&start);
                    self.close(&name);
                }
                Event::End(end) => {
                    let name = lower_name(end.name().as_ref());
                    self.close(&name);
                }
                Event::Text(text) => {
                    let text = self.unescape(&text);
                    self.text(text);
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    self.text(text);
                }
                Event::DocType(doctype) => {
                    self.declare_entities(&String::from_utf8_lossy(&doctype));
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    fn open(&mut self, start: &BytesStart<'_>) -> String {
        let name = lower_name(start.name().as_ref());

        let mut class = None;
        let mut href = None;
        let mut src = None;
        for attr in start.html_attributes().filter_map(std::result::Result::ok) {
            let slot = match lower_name(attr.key.as_ref()).as_str() {
                "class" => &mut class,
                "href" => &mut href,
                "src" => &mut src,
                _ => continue,
            };
            let value = attr
                .unescape_value()
                .map(Cow::into_owned)
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            *slot = Some(value);
        }

        let node = Node::classify(&name, class.as_deref());
        let attr = match node {
            Node::Link => href,
            Node::Image => src,
            _ => None,
        };

        if node == Node::LineBreak {
            if let Some(parent) = self.stack.last_mut() {
                parent.text.push('\n');
            }
        }

        let mut element = Element::new(node);
        element.attr.clone_from(&attr);
        self.queue.push_back(TagEvent::Start(element));
        self.stack.push(OpenElement {
            name: name.clone(),
            node,
            attr,
            text: String::new(),
        });
        name
    }

    fn close(&mut self, name: &str) {
        let Some(pos) = self.stack.iter().rposition(|open| open.name == name) else {
            return;
        };
        while self.stack.len() > pos {
            let Some(open) = self.stack.pop() else {
                break;
            };
            if let Some(parent) = self.stack.last_mut() {
                if parent.node.collects_child_text() {
                    parent.text.push_str(&open.text);
                }
            }
            self.queue.push_back(TagEvent::End(Element {
                node: open.node,
                attr: open.attr,
                text: open.text,
            }));
        }
    }

    fn text(&mut self, text: String) {
        if let Some(top) = self.stack.last_mut() {
            top.text.push_str(&text);
        }
        if !text.trim().is_empty() {
            self.queue.push_back(TagEvent::Text(text));
        }
    }

    /// Resolves character and entity references one by one; a reference
    /// that cannot be resolved stays as written.
    fn unescape(&self, raw: &BytesText<'_>) -> String {
        let raw = String::from_utf8_lossy(raw);
        entity_ref_re()
            .replace_all(&raw, |caps: &Captures<'_>| {
                let resolved = if let Some(hex) = caps.get(1) {
                    u32::from_str_radix(hex.as_str(), 16)
                        .ok()
                        .and_then(char::from_u32)
                        .map(String::from)
                } else if let Some(dec) = caps.get(2) {
                    dec.as_str()
                        .parse()
                        .ok()
                        .and_then(char::from_u32)
                        .map(String::from)
                } else {
                    caps.get(3)
                        .and_then(|name| self.entities.get(name.as_str()).cloned())
                };
                resolved.unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn declare_entities(&mut self, doctype: &str) {
        for caps in entity_re().captures_iter(doctype) {
            let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
            self.entities.insert(caps[1].to_string(), value.to_string());
        }
    }
}

fn lower_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::events::Phase;

    fn events(doc: &str) -> Vec<TagEvent> {
        let mut reader = TagReader::sanitized(doc.as_bytes());
        let mut out = Vec::new();
        while let Some(event) = reader.next_event().unwrap() {
            out.push(event);
        }
        out
    }

    fn ends(doc: &str) -> Vec<(Node, String)> {
        events(doc)
            .into_iter()
            .filter_map(|e| match e {
                TagEvent::End(el) => Some((el.node, el.text)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_basic_vocabulary() {
        let doc = r#"<html><body><h1>Owner</h1><div class="thread">Bob<div class="message"><span class="user">Bob</span><span class="meta">when</span></div><p>hi</p></div></body></html>"#;
        let ends = ends(doc);
        assert!(ends.contains(&(Node::OwnerHeading, "Owner".into())));
        assert!(ends.contains(&(Node::User, "Bob".into())));
        assert!(ends.contains(&(Node::Meta, "when".into())));
        assert!(ends.contains(&(Node::Paragraph, "hi".into())));
    }

    #[test]
    fn test_thread_start_followed_by_participants_text() {
        let doc = r#"<div class="thread">Alice, Bob<p>x</p></div>"#;
        let evs = events(doc);
        assert!(evs[0].is(Node::Thread, Phase::Start));
        assert_eq!(evs[1], TagEvent::Text("Alice, Bob".into()));
    }

    #[test]
    fn test_nbsp_entity_resolved() {
        let ends = ends("<p>a&nbsp;b &amp; c</p>");
        assert_eq!(ends, vec![(Node::Paragraph, "a\u{a0}b & c".into())]);
    }

    #[test]
    fn test_numeric_character_reference() {
        let ends = ends("<p>&#19977;</p>");
        assert_eq!(ends[0].1, "三");
    }

    #[test]
    fn test_unknown_entity_left_as_written() {
        let ends = ends("<p>&hellip; Tom & Jerry</p>");
        assert_eq!(ends[0].1, "&hellip; Tom & Jerry");
    }

    #[test]
    fn test_unknown_entity_does_not_block_known_ones() {
        let ends = ends("<p>&lt;3 &hearts;&nbsp;&#x41;</p>");
        assert_eq!(ends[0].1, "<3 &hearts;\u{a0}A");
    }

    #[test]
    fn test_line_break_and_inline_children() {
        let ends = ends("<p>one<br/>two <b>three</b></p>");
        let para = ends.iter().find(|(n, _)| *n == Node::Paragraph).unwrap();
        assert_eq!(para.1, "one\ntwo three");
    }

    #[test]
    fn test_link_and_image_attributes() {
        let evs = events(r#"<a href="../messages/1.html">Bob</a><img src=photo.jpg>"#);
        let link_end = evs
            .iter()
            .find_map(|e| match e {
                TagEvent::End(el) if el.node == Node::Link => Some(el.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(link_end.attr.as_deref(), Some("../messages/1.html"));
        assert_eq!(link_end.text, "Bob");

        let img_start = evs
            .iter()
            .find_map(|e| match e {
                TagEvent::Start(el) if el.node == Node::Image => Some(el.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(img_start.attr.as_deref(), Some("photo.jpg"));
    }

    #[test]
    fn test_mismatched_end_closes_inner_elements() {
        // The unclosed <img> is closed by </p>.
        let ends = ends(r#"<div class="thread"><p><img src="x"></p></div>"#);
        let nodes: Vec<Node> = ends.iter().map(|(n, _)| *n).collect();
        assert_eq!(nodes, vec![Node::Image, Node::Paragraph, Node::Thread]);
    }

    #[test]
    fn test_orphan_end_ignored() {
        let ends = ends("<p>a</span></p>");
        assert_eq!(ends, vec![(Node::Paragraph, "a".into())]);
    }

    #[test]
    fn test_blank_text_not_reported() {
        let evs = events("<div>\n   <p>x</p>\n</div>");
        let texts = evs
            .iter()
            .filter(|e| matches!(e, TagEvent::Text(_)))
            .count();
        assert_eq!(texts, 1);
    }

    #[test]
    fn test_push_back() {
        let mut reader = TagReader::sanitized(&b"<p>x</p>"[..]);
        let first = reader.next_event().unwrap().unwrap();
        reader.push_back(first.clone());
        assert_eq!(reader.next_event().unwrap(), Some(first));
        assert_eq!(reader.depth(), 1);
    }

    #[test]
    fn test_control_characters_do_not_break_tokenizer() {
        let ends = ends("<p>a\u{1}b\u{b}c</p>");
        assert_eq!(ends[0].1, "abc");
    }

    #[test]
    fn test_case_insensitive_tags() {
        let ends = ends(r#"<DIV CLASS="thread"><P>x</P></DIV>"#);
        let nodes: Vec<Node> = ends.iter().map(|(n, _)| *n).collect();
        assert_eq!(nodes, vec![Node::Paragraph, Node::Thread]);
    }
}
