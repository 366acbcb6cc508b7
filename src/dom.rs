//! Document access.
//!
//! Every page behaviour in this crate talks to the page through the [`Dom`]
//! trait, and every lookup returns an `Option` so a partially composed page
//! simply skips what it lacks. [`MemoryDom`] is an in-memory document tree
//! built by parsing HTML with `scraper`; it serializes back to HTML and keeps
//! enough bookkeeping (style properties, forced layouts) for tests to observe
//! what a behaviour did.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use scraper::{ElementRef, Html};

/// Handle to a node inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// The document operations page behaviours need.
pub trait Dom {
    /// First attached element with the given `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
    /// First attached element with the given tag name.
    fn first_by_tag(&self, tag: &str) -> Option<NodeId>;
    /// Every attached element carrying `class`, in document order.
    fn elements_by_class(&self, class: &str) -> Vec<NodeId>;
    /// First descendant of `root` carrying `class`.
    fn descendant_by_class(&self, root: NodeId, class: &str) -> Option<NodeId>;
    /// Element children of `node`, in order.
    fn element_children(&self, node: NodeId) -> Vec<NodeId>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);

    /// Replace the children of `node` with parsed `html`.
    fn set_inner_html(&mut self, node: NodeId, html: &str);
    fn inner_html(&self, node: NodeId) -> String;
    /// Replace the children of `node` with a single text node.
    fn set_text(&mut self, node: NodeId, text: &str);
    /// Concatenated descendant text.
    fn text(&self, node: NodeId) -> String;

    fn set_style(&mut self, node: NodeId, property: &str, value: &str);
    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    /// Deep-clone `node` and append the clone to `parent`.
    fn append_clone(&mut self, parent: NodeId, node: NodeId) -> NodeId;
    /// Flush pending style changes before the next one is applied.
    fn force_layout(&mut self, node: NodeId);

    /// Add the class if absent, remove it if present. Returns whether the
    /// class is present afterwards.
    fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }
}

/// A set of classes to add and remove together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassPatch {
    pub add: &'static [&'static str],
    pub remove: &'static [&'static str],
}

impl ClassPatch {
    /// Remove first, then add.
    pub fn apply<D: Dom + ?Sized>(&self, dom: &mut D, node: NodeId) {
        for class in self.remove {
            dom.remove_class(node, class);
        }
        for class in self.add {
            dom.add_class(node, class);
        }
    }

    /// Whether `node` currently shows this patch.
    pub fn is_applied<D: Dom + ?Sized>(&self, dom: &D, node: NodeId) -> bool {
        self.add.iter().all(|c| dom.has_class(node, c))
            && self.remove.iter().all(|c| !dom.has_class(node, c))
    }
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    /// Attributes other than `class` and `style`, in source order.
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    style: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// In-memory document.
///
/// Nodes live in an arena. Replacing a node's content releases the old
/// subtree's slots for reuse, so ids taken from inside a replaced subtree
/// must not be used afterwards.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    /// Released slots, reused before the arena grows.
    free: Vec<usize>,
    layouts: BTreeMap<NodeId, usize>,
}

const ROOT: NodeId = NodeId(0);

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// An empty document.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element(ElementData {
                    tag: "#document".to_string(),
                    attributes: Vec::new(),
                    classes: Vec::new(),
                    style: Vec::new(),
                }),
                parent: None,
                children: Vec::new(),
            }],
            free: Vec::new(),
            layouts: BTreeMap::new(),
        }
    }

    /// Parse a full HTML document.
    pub fn parse_document(source: &str) -> Self {
        let html = Html::parse_document(source);
        let mut dom = Self::new();
        let root = html.root_element();
        let id = dom.push_element(ROOT, root);
        dom.import_children(id, root);
        dom
    }

    /// Parse an HTML fragment as the document body.
    pub fn parse_fragment(source: &str) -> Self {
        let mut dom = Self::new();
        dom.set_inner_html(ROOT, source);
        dom
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.inner_html(ROOT)
    }

    /// Number of live nodes, the document node included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Slots allocated in the arena, live or released.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// How many times [`Dom::force_layout`] ran on `node`.
    pub fn layout_flushes(&self, node: NodeId) -> usize {
        self.layouts.get(&node).copied().unwrap_or(0)
    }

    /// Tag name of an element node.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(node.0)?.data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let node = Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        };
        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                NodeId(slot)
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        };
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push_element(&mut self, parent: NodeId, element: ElementRef<'_>) -> NodeId {
        let value = element.value();
        let mut data = ElementData {
            tag: value.name().to_ascii_lowercase(),
            attributes: Vec::new(),
            classes: Vec::new(),
            style: Vec::new(),
        };
        for (name, attr) in value.attrs() {
            match name {
                "class" => data.classes = attr.split_whitespace().map(str::to_string).collect(),
                "style" => data.style = parse_style(attr),
                _ => data.attributes.push((name.to_string(), attr.to_string())),
            }
        }
        self.push(parent, NodeData::Element(data))
    }

    fn import_children(&mut self, parent: NodeId, element: ElementRef<'_>) {
        for child in element.children() {
            if let Some(el) = ElementRef::wrap(child) {
                let id = self.push_element(parent, el);
                self.import_children(id, el);
            } else if let Some(text) = child.value().as_text() {
                self.push(parent, NodeData::Text(text.to_string()));
            }
        }
    }

    /// Drop every child of `node` and release the whole subtree.
    fn detach_children(&mut self, node: NodeId) {
        let mut stack = std::mem::take(&mut self.nodes[node.0].children);
        while let Some(id) = stack.pop() {
            let released = std::mem::replace(
                &mut self.nodes[id.0],
                Node {
                    data: NodeData::Text(String::new()),
                    parent: None,
                    children: Vec::new(),
                },
            );
            stack.extend(released.children);
            self.layouts.remove(&id);
            self.free.push(id.0);
        }
    }

    /// Attached nodes below `from`, depth first, excluding `from`.
    fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[from.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    fn find<F>(&self, from: NodeId, mut pred: F) -> Option<NodeId>
    where
        F: FnMut(&ElementData) -> bool,
    {
        self.descendants(from)
            .into_iter()
            .find(|id| self.element(*id).is_some_and(&mut pred))
    }

    fn clone_subtree(&mut self, parent: NodeId, node: NodeId) -> NodeId {
        let data = self.nodes[node.0].data.clone();
        let id = self.push(parent, data);
        let children = self.nodes[node.0].children.clone();
        for child in children {
            self.clone_subtree(id, child);
        }
        id
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].data {
            NodeData::Text(text) => out.push_str(&escape(text, false)),
            NodeData::Element(e) => {
                let _ = write!(out, "<{}", e.tag);
                for (name, value) in &e.attributes {
                    let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
                }
                if !e.classes.is_empty() {
                    let _ = write!(out, " class=\"{}\"", escape(&e.classes.join(" "), true));
                }
                if !e.style.is_empty() {
                    let style: Vec<String> = e.style.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                    let _ = write!(out, " style=\"{}\"", escape(&style.join("; "), true));
                }
                out.push('>');
                if VOID_TAGS.contains(&e.tag.as_str()) {
                    return;
                }
                for child in &self.nodes[node.0].children {
                    self.write_node(*child, out);
                }
                let _ = write!(out, "</{}>", e.tag);
            }
        }
    }
}

fn parse_style(attr: &str) -> Vec<(String, String)> {
    attr.split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let (k, v) = (k.trim(), v.trim());
            (!k.is_empty()).then(|| (k.to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}

fn escape(s: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

impl Dom for MemoryDom {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find(ROOT, |e| e.attributes.iter().any(|(k, v)| k == "id" && v == id))
    }

    fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find(ROOT, |e| e.tag.eq_ignore_ascii_case(tag))
    }

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(ROOT)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|e| e.classes.iter().any(|c| c == class)))
            .collect()
    }

    fn descendant_by_class(&self, root: NodeId, class: &str) -> Option<NodeId> {
        if root.0 >= self.nodes.len() {
            return None;
        }
        self.find(root, |e| e.classes.iter().any(|c| c == class))
    }

    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|c| self.element(*c).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let e = self.element(node)?;
        match name {
            "class" => Some(e.classes.join(" ")),
            _ => e
                .attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(e) = self.element_mut(node) {
            if !e.classes.iter().any(|c| c == class) {
                e.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(e) = self.element_mut(node) {
            e.classes.retain(|c| c != class);
        }
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) {
        if self.element(node).is_none() {
            return;
        }
        self.detach_children(node);
        let fragment = Html::parse_fragment(html);
        self.import_children(node, fragment.root_element());
    }

    fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(n) = self.nodes.get(node.0) {
            for child in &n.children {
                self.write_node(*child, &mut out);
            }
        }
        out
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if self.element(node).is_none() {
            return;
        }
        self.detach_children(node);
        self.push(node, NodeData::Text(text.to_string()));
    }

    fn text(&self, node: NodeId) -> String {
        if node.0 >= self.nodes.len() {
            return String::new();
        }
        self.descendants(node)
            .into_iter()
            .filter_map(|id| match &self.nodes[id.0].data {
                NodeData::Text(t) => Some(t.as_str()),
                NodeData::Element(_) => None,
            })
            .collect()
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(e) = self.element_mut(node) {
            match e.style.iter_mut().find(|(k, _)| k == property) {
                Some(slot) => slot.1 = value.to_string(),
                None => e.style.push((property.to_string(), value.to_string())),
            }
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.element(node)?
            .style
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.clone())
    }

    fn append_clone(&mut self, parent: NodeId, node: NodeId) -> NodeId {
        self.clone_subtree(parent, node)
    }

    fn force_layout(&mut self, node: NodeId) {
        *self.layouts.entry(node).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Home</title></head>
<body>
  <div id="navbar-placeholder"></div>
  <nav class="bg-transparent fixed"><a class="nav-link text-slate-300" href="index.html">Home</a></nav>
  <span id="current-year">2020</span>
</body></html>"#;

    #[test]
    fn test_lookup_by_id_tag_and_class() {
        let dom = MemoryDom::parse_document(PAGE);
        assert!(dom.element_by_id("navbar-placeholder").is_some());
        assert!(dom.element_by_id("missing").is_none());

        let nav = dom.first_by_tag("nav").unwrap();
        assert!(dom.has_class(nav, "bg-transparent"));

        let links = dom.elements_by_class("nav-link");
        assert_eq!(links.len(), 1);
        assert_eq!(dom.attribute(links[0], "href").as_deref(), Some("index.html"));
        assert_eq!(dom.text(links[0]), "Home");
    }

    #[test]
    fn test_set_inner_html_replaces_and_parses() {
        let mut dom = MemoryDom::parse_document(PAGE);
        let slot = dom.element_by_id("navbar-placeholder").unwrap();
        dom.set_inner_html(slot, r#"<ul><li><a class="mobile-nav-link" href="about.html">About</a></li></ul>"#);
        assert_eq!(dom.elements_by_class("mobile-nav-link").len(), 1);

        dom.set_inner_html(slot, "<p>gone</p>");
        assert!(dom.elements_by_class("mobile-nav-link").is_empty());
        assert_eq!(dom.inner_html(slot), "<p>gone</p>");
    }

    #[test]
    fn test_replaced_content_reuses_slots() {
        let mut dom = MemoryDom::parse_document(PAGE);
        let slot = dom.element_by_id("navbar-placeholder").unwrap();
        let panel = r#"<div class="error"><p>Failed</p><a href="http://localhost:3000">open</a></div>"#;

        dom.set_inner_html(slot, panel);
        let live = dom.node_count();
        let capacity = dom.capacity();
        for _ in 0..50 {
            dom.set_inner_html(slot, panel);
            dom.set_text(slot, "loading");
            dom.set_inner_html(slot, panel);
        }
        assert_eq!(dom.node_count(), live);
        assert_eq!(dom.capacity(), capacity);
        assert_eq!(dom.inner_html(slot), panel);
        assert_eq!(dom.text(dom.element_by_id("current-year").unwrap()), "2020");
    }

    #[test]
    fn test_released_nodes_drop_layout_counts() {
        let mut dom = MemoryDom::parse_document(PAGE);
        let slot = dom.element_by_id("navbar-placeholder").unwrap();
        dom.set_inner_html(slot, "<div class=\"slider-track\"></div>");
        let track = dom.descendant_by_class(slot, "slider-track").unwrap();
        dom.force_layout(track);
        assert_eq!(dom.layout_flushes(track), 1);

        dom.set_text(slot, "");
        assert_eq!(dom.layout_flushes(track), 0);
        assert!(dom.elements_by_class("slider-track").is_empty());
    }

    #[test]
    fn test_text_and_classes() {
        let mut dom = MemoryDom::parse_document(PAGE);
        let year = dom.element_by_id("current-year").unwrap();
        dom.set_text(year, "2026");
        assert_eq!(dom.text(year), "2026");

        assert!(dom.toggle_class(year, "hidden"));
        assert!(dom.has_class(year, "hidden"));
        assert!(!dom.toggle_class(year, "hidden"));
        assert!(!dom.has_class(year, "hidden"));
    }

    #[test]
    fn test_clone_and_style() {
        let mut dom = MemoryDom::parse_fragment(
            r#"<div class="slider-track" style="transition: transform 0.5s ease-out"><div class="card">A</div></div>"#,
        );
        let track = dom.elements_by_class("slider-track")[0];
        assert_eq!(dom.style(track, "transition").as_deref(), Some("transform 0.5s ease-out"));

        let card = dom.element_children(track)[0];
        dom.append_clone(track, card);
        assert_eq!(dom.element_children(track).len(), 2);
        assert_eq!(dom.text(track), "AA");

        dom.set_style(track, "transform", "translateX(-10px)");
        assert!(dom.inner_html(dom.root()).contains("transform: translateX(-10px)"));
    }

    #[test]
    fn test_class_patch() {
        const SOLID: ClassPatch = ClassPatch {
            add: &["solid", "shadow"],
            remove: &["clear"],
        };
        let mut dom = MemoryDom::parse_fragment(r#"<nav class="clear"></nav>"#);
        let nav = dom.first_by_tag("nav").unwrap();
        assert!(!SOLID.is_applied(&dom, nav));
        SOLID.apply(&mut dom, nav);
        assert!(SOLID.is_applied(&dom, nav));
        assert_eq!(dom.attribute(nav, "class").as_deref(), Some("solid shadow"));
    }

    #[test]
    fn test_escaping_round_trip() {
        let mut dom = MemoryDom::new();
        let root = dom.root();
        dom.set_text(root, "a < b & c");
        assert_eq!(dom.to_html(), "a &lt; b &amp; c");
    }
}
