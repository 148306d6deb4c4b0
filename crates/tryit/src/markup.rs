//! Typed element descriptions.
//!
//! An [`Element`] describes a subtree: tag, classes, attributes, properties,
//! event listeners and children. Frontends materialize it with whatever DOM
//! they have; `H` is the frontend's event handler type.

use std::collections::BTreeMap;

/// A child of an element.
#[derive(Debug)]
pub enum Node<H> {
    Element(Element<H>),
    Text(String),
}

/// Description of one element.
#[derive(Debug)]
pub struct Element<H> {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub properties: BTreeMap<String, String>,
    pub listeners: Vec<(String, H)>,
    pub children: Vec<Node<H>>,
}

impl<H> Element<H> {
    /// Start from a `tag.class.class` selector, e.g. `"div.cell"`.
    pub fn new(selector: &str) -> Self {
        let mut parts = selector.split('.');
        let tag = parts.next().filter(|t| !t.is_empty()).unwrap_or("div");
        Self {
            tag: tag.to_string(),
            classes: parts
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
            attributes: BTreeMap::new(),
            properties: BTreeMap::new(),
            listeners: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn prop(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_string(), value.to_string());
        self
    }

    pub fn on(mut self, event: &str, handler: H) -> Self {
        self.listeners.push((event.to_string(), handler));
        self
    }

    pub fn child(mut self, child: Element<H>) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// The container holding all cells of one session.
pub fn session_container<H>() -> Element<H> {
    Element::new("div.session")
}

/// One cell block: editable input, run control, output region.
///
/// `run` is attached to the run control's `click` event.
pub fn cell_block<H>(input: &str, run_label: &str, run: H) -> Element<H> {
    Element::new("div.cell")
        .child(
            Element::new("div.input")
                .child(Element::new("textarea").prop("value", input))
                .child(Element::new("button.run").on("click", run).text(run_label)),
        )
        .child(Element::new("div.output"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &Node<u8>) -> &Element<u8> {
        match node {
            Node::Element(element) => element,
            Node::Text(text) => panic!("expected element, got text {:?}", text),
        }
    }

    #[test]
    fn test_selector_splits_tag_and_classes() {
        let el: Element<()> = Element::new("button.run.primary");
        assert_eq!(el.tag, "button");
        assert_eq!(el.classes, vec!["run", "primary"]);
        assert!(el.has_class("run"));
        assert!(!el.has_class("cell"));
    }

    #[test]
    fn test_selector_without_tag_defaults_to_div() {
        let el: Element<()> = Element::new(".output");
        assert_eq!(el.tag, "div");
        assert_eq!(el.classes, vec!["output"]);
    }

    #[test]
    fn test_builder_keeps_child_order() {
        let el: Element<()> = Element::new("p").text("a").child(Element::new("b")).text("c");

        assert_eq!(el.children.len(), 3);
        assert!(matches!(&el.children[0], Node::Text(t) if t == "a"));
        assert!(matches!(&el.children[1], Node::Element(e) if e.tag == "b"));
        assert!(matches!(&el.children[2], Node::Text(t) if t == "c"));
    }

    #[test]
    fn test_cell_block_layout() {
        let block = cell_block("1+1", "Run", 42u8);

        assert!(block.has_class("cell"));
        assert_eq!(block.children.len(), 2);

        let input = element(&block.children[0]);
        assert!(input.has_class("input"));
        let textarea = element(&input.children[0]);
        assert_eq!(textarea.tag, "textarea");
        assert_eq!(textarea.properties["value"], "1+1");
        let button = element(&input.children[1]);
        assert_eq!(button.tag, "button");
        assert!(matches!(&button.children[0], Node::Text(t) if t == "Run"));
        assert_eq!(button.listeners, vec![("click".to_string(), 42u8)]);

        assert!(element(&block.children[1]).has_class("output"));
    }
}
