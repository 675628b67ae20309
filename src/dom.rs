//! Headless document model shared by the bundled hosts.
//!
//! The tree itself is a `kuchiki` DOM; this module adds what an event host
//! needs on top of it: addressable event targets, parse readiness, scroll
//! offset and per-element layout boxes.

use std::cell::{Cell, RefCell};
use std::fmt;

use kuchiki::traits::*;
use kuchiki::NodeRef;

/// A point in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Border box of an element in viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Parse state of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Readiness {
    Loading,
    Interactive,
    Complete,
}

impl Readiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Readiness::Loading => "loading",
            Readiness::Interactive => "interactive",
            Readiness::Complete => "complete",
        }
    }

    /// True once the tree is fully parsed.
    pub fn is_parsed(&self) -> bool {
        *self >= Readiness::Interactive
    }
}

/// Something events can be addressed to: the window, the document, or a
/// node inside the document tree.
#[derive(Clone)]
pub enum Target {
    Window,
    Document,
    Node(NodeRef),
}

impl Target {
    /// Wrap a tree node, folding the kuchiki document node into
    /// [`Target::Document`].
    pub fn from_node(node: NodeRef) -> Self {
        if node.as_document().is_some() {
            Target::Document
        } else {
            Target::Node(node)
        }
    }

    pub fn node(&self) -> Option<&NodeRef> {
        match self {
            Target::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        self.node().is_some_and(|node| node.as_element().is_some())
    }

    pub fn tag_name(&self) -> Option<String> {
        self.node()
            .and_then(|node| node.as_element().map(|el| el.name.local.to_string()))
    }

    pub fn first_child(&self) -> Option<Target> {
        self.node()
            .and_then(|node| node.first_child())
            .map(Target::from_node)
    }

    pub fn parent(&self) -> Option<Target> {
        match self {
            Target::Window => None,
            Target::Document => Some(Target::Window),
            Target::Node(node) => Some(
                node.parent()
                    .map(Target::from_node)
                    .unwrap_or(Target::Document),
            ),
        }
    }

    /// Inclusive containment: a target contains itself and its descendants.
    /// The window contains everything and the document contains every node.
    pub fn contains(&self, other: &Target) -> bool {
        match (self, other) {
            (Target::Window, _) => true,
            (Target::Document, Target::Window) => false,
            (Target::Document, _) => true,
            (Target::Node(_), Target::Window | Target::Document) => false,
            (Target::Node(ancestor), Target::Node(node)) => node
                .inclusive_ancestors()
                .any(|candidate| same_node(&candidate, ancestor)),
        }
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Target::Window, Target::Window) | (Target::Document, Target::Document) => true,
            (Target::Node(a), Target::Node(b)) => same_node(a, b),
            _ => false,
        }
    }
}

impl Eq for Target {}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Window => write!(f, "#window"),
            Target::Document => write!(f, "#document"),
            Target::Node(node) => match node.as_element() {
                Some(element) => {
                    let attrs = element.attributes.borrow();
                    match attrs.get("id") {
                        Some(id) => write!(f, "<{}#{}>", element.name.local, id),
                        None => write!(f, "<{}>", element.name.local),
                    }
                }
                None if node.as_text().is_some() => write!(f, "#text"),
                None => write!(f, "#node"),
            },
        }
    }
}

fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    std::ptr::eq::<kuchiki::Node>(&**a, &**b)
}

/// A parsed document plus the page state a host tracks for it.
pub struct Document {
    root: NodeRef,
    readiness: Cell<Readiness>,
    scroll: Cell<Point>,
    layout: RefCell<Vec<(NodeRef, Rect)>>,
}

impl Document {
    /// Parse `html` into a document that is still `Loading`.
    pub fn parse(html: &str) -> Self {
        Self {
            root: kuchiki::parse_html().one(html),
            readiness: Cell::new(Readiness::Loading),
            scroll: Cell::new(Point::default()),
            layout: RefCell::new(Vec::new()),
        }
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Target> {
        self.query(&format!("#{id}"))
    }

    /// First element matching a CSS selector.
    pub fn query(&self, selector: &str) -> Option<Target> {
        self.root
            .select_first(selector)
            .ok()
            .map(|element| Target::Node(element.as_node().clone()))
    }

    pub fn body(&self) -> Option<Target> {
        self.query("body")
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness.get()
    }

    /// Readiness only moves forward.
    pub fn advance_readiness(&self, next: Readiness) -> bool {
        if next > self.readiness.get() {
            self.readiness.set(next);
            true
        } else {
            false
        }
    }

    pub fn scroll_offset(&self) -> Point {
        self.scroll.get()
    }

    pub fn scroll_to(&self, offset: Point) {
        self.scroll.set(offset);
    }

    pub fn set_bounding_rect(&self, target: &Target, rect: Rect) {
        let Some(node) = target.node() else {
            return;
        };
        let mut layout = self.layout.borrow_mut();
        match layout.iter_mut().find(|(n, _)| same_node(n, node)) {
            Some(entry) => entry.1 = rect,
            None => layout.push((node.clone(), rect)),
        }
    }

    pub fn bounding_rect(&self, target: &Target) -> Option<Rect> {
        let node = target.node()?;
        self.layout
            .borrow()
            .iter()
            .find(|(n, _)| same_node(n, node))
            .map(|(_, rect)| *rect)
    }

    /// Element nodes, the document and the window accept listeners; text
    /// and comment nodes do not.
    pub fn is_event_target(&self, target: &Target) -> bool {
        match target {
            Target::Window | Target::Document => true,
            Target::Node(_) => target.is_element(),
        }
    }

    /// Targets an event visits, innermost first, ending with the window.
    pub fn propagation_path(&self, target: &Target) -> Vec<Target> {
        let mut path = Vec::new();
        let mut current = Some(target.clone());
        while let Some(step) = current {
            current = step.parent();
            path.push(step);
        }
        path
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("readiness", &self.readiness.get())
            .field("scroll", &self.scroll.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<!DOCTYPE html><html><body>
        <div id="parent"><span id="a">A</span><span id="b">B</span></div>
        <p id="outside">text</p>
    </body></html>"#;

    #[test]
    fn finds_elements_by_id() {
        let doc = Document::parse(HTML);
        let parent = doc.get_element_by_id("parent").expect("parent");
        assert_eq!(parent.tag_name().as_deref(), Some("div"));
        assert!(doc.get_element_by_id("missing").is_none());
    }

    #[test]
    fn containment_is_inclusive() {
        let doc = Document::parse(HTML);
        let parent = doc.get_element_by_id("parent").unwrap();
        let a = doc.get_element_by_id("a").unwrap();
        let outside = doc.get_element_by_id("outside").unwrap();

        assert!(parent.contains(&parent));
        assert!(parent.contains(&a));
        assert!(!a.contains(&parent));
        assert!(!parent.contains(&outside));
        assert!(Target::Document.contains(&a));
        assert!(!parent.contains(&Target::Document));
    }

    #[test]
    fn propagation_path_ends_at_window() {
        let doc = Document::parse(HTML);
        let a = doc.get_element_by_id("a").unwrap();
        let path = doc.propagation_path(&a);

        assert_eq!(path.first(), Some(&a));
        assert_eq!(path[1], doc.get_element_by_id("parent").unwrap());
        assert_eq!(path[path.len() - 2], Target::Document);
        assert_eq!(path.last(), Some(&Target::Window));
    }

    #[test]
    fn text_nodes_are_not_event_targets() {
        let doc = Document::parse(HTML);
        let a = doc.get_element_by_id("a").unwrap();
        let text = a.first_child().expect("text child");

        assert!(doc.is_event_target(&a));
        assert!(doc.is_event_target(&Target::Window));
        assert!(!doc.is_event_target(&text));
        assert_eq!(format!("{text:?}"), "#text");
    }

    #[test]
    fn readiness_never_moves_backwards() {
        let doc = Document::parse(HTML);
        assert_eq!(doc.readiness(), Readiness::Loading);
        assert!(doc.advance_readiness(Readiness::Complete));
        assert!(!doc.advance_readiness(Readiness::Interactive));
        assert_eq!(doc.readiness().as_str(), "complete");
    }

    #[test]
    fn layout_boxes_are_per_element() {
        let doc = Document::parse(HTML);
        let a = doc.get_element_by_id("a").unwrap();
        let b = doc.get_element_by_id("b").unwrap();
        doc.set_bounding_rect(&a, Rect::new(10.0, 20.0, 50.0, 10.0));
        doc.set_bounding_rect(&a, Rect::new(12.0, 20.0, 50.0, 10.0));

        assert_eq!(doc.bounding_rect(&a).map(|r| r.left), Some(12.0));
        assert!(doc.bounding_rect(&b).is_none());
    }
}
